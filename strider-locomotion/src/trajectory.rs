//! Reference trajectories that policy actions are expressed relative to.
use crate::{robot::NUM_LEGS, RobotKind};
use strider_core::BoxSpace;

/// Maps a residual action onto a motor command around a reference trajectory.
pub trait TrajectoryGenerator {
    /// Restarts the trajectory at the beginning of an episode.
    fn reset(&mut self);

    /// Motor command at `time` seconds into the episode for the given residual.
    fn action(&mut self, time: f64, residual: &[f64]) -> Vec<f64>;

    /// Space of residual actions.
    fn action_space(&self) -> BoxSpace;
}

/// Offsets a fixed standing pose by a clipped residual.
///
/// The reference does not depend on time. Both supported morphologies share the pose of
/// the Laikago, three motors per leg.
#[derive(Clone, Debug, PartialEq)]
pub struct PoseOffsetGenerator {
    pose: Vec<f64>,
    action_limit: Vec<f64>,
}

impl PoseOffsetGenerator {
    /// Creates a generator with per-leg residual limits for abduction, hip and knee.
    pub fn new(action_limit: [f64; 3]) -> Self {
        Self {
            pose: RobotKind::Laikago.default_motor_angles(),
            action_limit: action_limit
                .iter()
                .cycle()
                .take(3 * NUM_LEGS)
                .cloned()
                .collect(),
        }
    }

    /// Creates a generator for `kind`, or `None` if the morphology has none.
    pub fn for_robot(kind: RobotKind, action_limit: [f64; 3]) -> Option<Self> {
        match kind {
            RobotKind::A1 | RobotKind::Laikago => Some(Self::new(action_limit)),
            RobotKind::Minitaur => None,
        }
    }

    /// The reference pose.
    pub fn pose(&self) -> &[f64] {
        &self.pose
    }
}

impl TrajectoryGenerator for PoseOffsetGenerator {
    fn reset(&mut self) {}

    fn action(&mut self, _time: f64, residual: &[f64]) -> Vec<f64> {
        self.pose
            .iter()
            .zip(residual.iter().zip(self.action_limit.iter()))
            .map(|(p, (r, l))| p + r.max(-l).min(*l))
            .collect()
    }

    fn action_space(&self) -> BoxSpace {
        BoxSpace::symmetric(
            &self
                .action_limit
                .iter()
                .map(|v| *v as f32)
                .collect::<Vec<_>>(),
        )
    }
}
