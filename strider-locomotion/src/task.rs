//! Tasks score the behavior of the robot and decide when an episode ends.
use crate::{math::matrix_from_quaternion, LocomotionError, Robot};
use anyhow::Result;
use log::trace;
use nalgebra::Vector3;

/// Episodes end once the cosine of the body tilt falls below this value, about 30 degrees.
pub const MIN_UPRIGHT_COSINE: f64 = 0.85;

/// Width of the reward bell around the target velocity.
pub const REWARD_SIGMA: f64 = 0.33;

/// Per-episode reward and termination logic.
///
/// The robot is supplied on every call. [`Task::update`] is the only operation that
/// mutates the task; [`Task::done`] and [`Task::reward`] can be called any number of
/// times per step with identical results.
pub trait Task {
    /// Starts a new episode from the current state of the robot.
    fn reset(&mut self, robot: &dyn Robot) -> Result<()>;

    /// Advances the task by one environment step. Called after the physics step.
    fn update(&mut self, robot: &dyn Robot) -> Result<()>;

    /// Whether the episode has ended.
    fn done(&self, robot: &dyn Robot) -> Result<bool>;

    /// Reward of the last step.
    fn reward(&self, robot: &dyn Robot) -> f64;

    /// Lifecycle phase.
    fn phase(&self) -> TaskPhase;
}

/// Lifecycle of a task within an episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskPhase {
    /// Constructed but never reset.
    Uninitialized,

    /// Reset for the current episode.
    Active,
}

/// Returns `true` if the body has tipped over, given its row-major rotation matrix.
pub fn tipped_over(rot_mat: &[f64; 9]) -> bool {
    rot_mat[8] < MIN_UPRIGHT_COSINE
}

/// Rewards walking forward at a target speed.
///
/// The velocity is the forward displacement of the base between two consecutive
/// updates, not divided by the time step.
#[derive(Clone, Debug)]
pub struct SimpleForwardTask {
    target_vel: f64,
    sigma: f64,
    current_vel: f64,
    current_base_pos: Vector3<f64>,
    last_base_pos: Vector3<f64>,
    phase: TaskPhase,
}

impl SimpleForwardTask {
    /// Creates a task with the given target forward displacement per step.
    pub fn new(target_vel: f64) -> Self {
        Self {
            target_vel,
            sigma: REWARD_SIGMA,
            current_vel: 0.0,
            current_base_pos: Vector3::zeros(),
            last_base_pos: Vector3::zeros(),
            phase: TaskPhase::Uninitialized,
        }
    }

    /// Target forward displacement per step.
    pub fn target_vel(&self) -> f64 {
        self.target_vel
    }

    /// Forward displacement during the last step.
    pub fn current_vel(&self) -> f64 {
        self.current_vel
    }

    /// Base position at the last update.
    pub fn current_base_pos(&self) -> &Vector3<f64> {
        &self.current_base_pos
    }

    /// Base position at the update before the last one.
    pub fn last_base_pos(&self) -> &Vector3<f64> {
        &self.last_base_pos
    }
}

impl Task for SimpleForwardTask {
    fn reset(&mut self, robot: &dyn Robot) -> Result<()> {
        let pos = robot.base_position()?;
        self.last_base_pos = pos;
        self.current_base_pos = pos;
        self.current_vel = 0.0;
        self.phase = TaskPhase::Active;
        trace!("SimpleForwardTask::reset(): base at {:?}", pos);
        Ok(())
    }

    fn update(&mut self, robot: &dyn Robot) -> Result<()> {
        if self.phase == TaskPhase::Uninitialized {
            return Err(LocomotionError::TaskNotReset.into());
        }
        self.last_base_pos = self.current_base_pos;
        self.current_base_pos = robot.base_position()?;
        self.current_vel = self.current_base_pos[0] - self.last_base_pos[0];
        Ok(())
    }

    fn done(&self, robot: &dyn Robot) -> Result<bool> {
        let rot_mat = matrix_from_quaternion(&robot.base_orientation()?);
        Ok(tipped_over(&rot_mat))
    }

    fn reward(&self, _robot: &dyn Robot) -> f64 {
        (-(self.current_vel - self.target_vel).powi(2) / self.sigma).exp()
    }

    fn phase(&self) -> TaskPhase {
        self.phase
    }
}
