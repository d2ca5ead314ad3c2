//! Policies that do not learn.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strider_core::{BoxSpace, Env, Policy};
use strider_locomotion::JointAct;

/// Policies available to the rollout driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Always emits zeros.
    Zero,

    /// Samples uniformly from the action space.
    Random,
}

/// Emits an action of zeros.
///
/// Behind a trajectory generator, this holds the reference pose.
pub struct ZeroPolicy {
    dim: usize,
}

impl ZeroPolicy {
    /// Constructs a policy for actions of dimension `dim`.
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl<E: Env<Act = JointAct>> Policy<E> for ZeroPolicy {
    fn sample(&mut self, _: &E::Obs) -> JointAct {
        JointAct::zeros(self.dim)
    }
}

/// Samples actions uniformly inside a box space.
pub struct RandomPolicy {
    space: BoxSpace,
    rng: fastrand::Rng,
}

impl RandomPolicy {
    /// Constructs a policy sampling from `space`.
    pub fn new(space: BoxSpace, seed: u64) -> Self {
        Self {
            space,
            rng: fastrand::Rng::with_seed(seed),
        }
    }
}

impl<E: Env<Act = JointAct>> Policy<E> for RandomPolicy {
    fn sample(&mut self, _: &E::Obs) -> JointAct {
        let rng = &self.rng;
        let mut act = self
            .space
            .low()
            .iter()
            .zip(self.space.high().iter())
            .map(|(l, h)| l + (h - l) * rng.f32())
            .collect::<Vec<_>>();
        self.space.clip(&mut act);
        JointAct::from_vec(act)
    }
}
