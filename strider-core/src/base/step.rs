//! Environment step.
use super::Env;

/// Additional information to `Obs` and `Act`.
pub trait Info {}

impl Info for () {}

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with some additional information.
///
/// An environment emits [`Step`] object at every interaction steps.
pub struct Step<E: Env> {
    /// Action.
    pub act: E::Act,

    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f32,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Flag denoting if episode is truncated.
    pub is_truncated: bool,

    /// Information defined by user.
    pub info: E::Info,

    /// Initial observation of the next episode, set by [`Env::step_with_reset`].
    pub init_obs: Option<E::Obs>,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: E::Act,
        reward: f32,
        is_terminated: bool,
        is_truncated: bool,
        info: E::Info,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
            init_obs: None,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }

    /// Re-labels the step as a step of another environment sharing the same
    /// observation, action and info types.
    ///
    /// Wrappers that pass observations through unchanged use this to forward the
    /// step of the wrapped environment.
    pub fn relabel<F>(self) -> Step<F>
    where
        F: Env<Obs = E::Obs, Act = E::Act, Info = E::Info>,
    {
        Step {
            act: self.act,
            obs: self.obs,
            reward: self.reward,
            is_terminated: self.is_terminated,
            is_truncated: self.is_truncated,
            info: self.info,
            init_obs: self.init_obs,
        }
    }
}

impl<E: Env> std::fmt::Debug for Step<E>
where
    E::Act: std::fmt::Debug,
    E::Obs: std::fmt::Debug,
    E::Info: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Step")
            .field("act", &self.act)
            .field("obs", &self.obs)
            .field("reward", &self.reward)
            .field("is_terminated", &self.is_terminated)
            .field("is_truncated", &self.is_truncated)
            .field("info", &self.info)
            .field("init_obs", &self.init_obs)
            .finish()
    }
}
