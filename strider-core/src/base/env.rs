//! Environment.
use super::{Act, Info, Obs, Step};
use crate::{record::Record, BoxSpace};
use anyhow::Result;
use log::trace;

/// Represents an environment, typically an MDP.
///
/// Wrappers implement this trait as well and delegate to the environment they own,
/// so a chain of wrappers is used exactly like a bare environment.
pub trait Env {
    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Information in the [`Step`] object.
    type Info: Info;

    /// Description of the observation space.
    type ObsSpace: Clone + std::fmt::Debug;

    /// Resets the environment and returns the initial observation of a new episode.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Performes an environment step.
    fn step(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized;

    /// Returns the observation space.
    fn observation_space(&self) -> Self::ObsSpace;

    /// Returns the action space.
    fn action_space(&self) -> BoxSpace;

    /// Performes an environment step and resets the environment if the episode ends.
    ///
    /// The observation after the reset is stored in [`Step::init_obs`].
    fn step_with_reset(&mut self, a: &Self::Act) -> Result<(Step<Self>, Record)>
    where
        Self: Sized,
    {
        let (mut step, record) = self.step(a)?;
        if step.is_done() {
            trace!("Episode ended, resetting the environment");
            step.init_obs = Some(self.reset()?);
        }
        Ok((step, record))
    }
}
