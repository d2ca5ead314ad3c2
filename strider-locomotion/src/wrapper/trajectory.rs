use crate::{JointAct, LocomotionEnv, LocomotionError, Robot, TrajectoryGenerator};
use anyhow::Result;
use log::trace;
use strider_core::{record::Record, BoxSpace, Env, Step};

/// Interprets actions as residuals around the output of a [`TrajectoryGenerator`].
///
/// The wrapper keeps the elapsed time of the episode, restarted on every reset together
/// with the generator. Observations pass through unchanged; the action reported in a
/// [`Step`] is the residual given by the caller.
///
/// A residual must match the dimension of [`Env::action_space`] and contain only finite
/// values; otherwise `step` fails before anything is sent to the wrapped environment.
pub struct TrajectoryGeneratorWrapper<E, G> {
    env: E,
    generator: G,
    elapsed: f64,
}

impl<E, G> TrajectoryGeneratorWrapper<E, G>
where
    E: Env<Act = JointAct> + LocomotionEnv,
    G: TrajectoryGenerator,
{
    /// Wraps `env`.
    pub fn new(env: E, generator: G) -> Self {
        Self {
            env,
            generator,
            elapsed: 0.0,
        }
    }

    /// Time since the last reset, in seconds.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The wrapped environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// The trajectory generator.
    pub fn generator(&self) -> &G {
        &self.generator
    }
}

impl<E, G> LocomotionEnv for TrajectoryGeneratorWrapper<E, G>
where
    E: LocomotionEnv,
{
    fn env_time_step(&self) -> f64 {
        self.env.env_time_step()
    }

    fn robot(&self) -> &dyn Robot {
        self.env.robot()
    }
}

impl<E, G> Env for TrajectoryGeneratorWrapper<E, G>
where
    E: Env<Act = JointAct> + LocomotionEnv,
    G: TrajectoryGenerator,
{
    type Obs = E::Obs;
    type Act = JointAct;
    type Info = E::Info;
    type ObsSpace = E::ObsSpace;

    fn reset(&mut self) -> Result<E::Obs> {
        trace!("TrajectoryGeneratorWrapper::reset()");
        self.elapsed = 0.0;
        self.generator.reset();
        self.env.reset()
    }

    fn step(&mut self, a: &JointAct) -> Result<(Step<Self>, Record)> {
        trace!("TrajectoryGeneratorWrapper::step()");
        let dim = self.generator.action_space().dim();
        if a.0.len() != dim {
            return Err(LocomotionError::ActionDimension {
                expected: dim,
                found: a.0.len(),
            }
            .into());
        }
        if let Some(i) = a.0.iter().position(|v| !v.is_finite()) {
            return Err(LocomotionError::NonFiniteAction(i).into());
        }

        let residual = a.0.iter().map(|v| *v as f64).collect::<Vec<_>>();
        let command = self.generator.action(self.elapsed, &residual);
        let command = JointAct(command.into_iter().map(|v| v as f32).collect());
        let (step, record) = self.env.step(&command)?;
        self.elapsed += self.env.env_time_step();

        let mut step = step.relabel::<Self>();
        step.act = a.clone();
        Ok((step, record))
    }

    fn observation_space(&self) -> E::ObsSpace {
        self.env.observation_space()
    }

    fn action_space(&self) -> BoxSpace {
        self.generator.action_space()
    }
}
