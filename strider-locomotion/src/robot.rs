//! Robot collaborator interface.
//!
//! The physics engine and the robot's kinematic/dynamic model live outside this crate.
//! Environments only talk to them through [`Robot`], and build them through a
//! [`RobotFactory`]. [`KinematicRobot`] is a deterministic stand-in used by the rollout
//! driver, [`ScriptedRobot`] a puppet whose base pose is set by the caller.
mod kinematic;
mod scripted;
use crate::{MotorControlMode, SimulationParameters};
use anyhow::Result;
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub use kinematic::{KinematicRobot, KinematicRobotFactory};
pub use scripted::{ScriptHandle, ScriptedRobot, ScriptedRobotFactory};

/// Number of legs of every supported morphology.
pub const NUM_LEGS: usize = 4;

/// Known robot morphologies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RobotKind {
    /// Unitree A1.
    A1,

    /// Unitree Laikago.
    Laikago,

    /// Ghost Robotics Minitaur.
    Minitaur,
}

/// Limits of a single motor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotorLimits {
    /// Lowest reachable angle in radians.
    pub min_angle: f64,
    /// Highest reachable angle in radians.
    pub max_angle: f64,
    /// Largest absolute angular velocity in rad/s.
    pub max_velocity: f64,
    /// Largest absolute torque in Nm.
    pub max_torque: f64,
}

impl RobotKind {
    /// Number of motors of the robot.
    pub fn num_motors(&self) -> usize {
        NUM_LEGS * self.motors_per_leg()
    }

    /// Number of motors of a single leg.
    pub fn motors_per_leg(&self) -> usize {
        match self {
            Self::A1 | Self::Laikago => 3,
            Self::Minitaur => 2,
        }
    }

    /// Motor angles of the standing pose, leg by leg.
    pub fn default_motor_angles(&self) -> Vec<f64> {
        let leg: &[f64] = match self {
            Self::A1 => &[0.0, 0.9, -1.8],
            Self::Laikago => &[0.0, 0.67, -1.25],
            Self::Minitaur => &[PI / 2.0, PI / 2.0],
        };
        leg.iter().cycle().take(self.num_motors()).cloned().collect()
    }

    /// Height of the base above the ground in the standing pose.
    pub fn default_base_height(&self) -> f64 {
        match self {
            Self::A1 => 0.32,
            Self::Laikago => 0.48,
            Self::Minitaur => 0.2,
        }
    }

    /// Limits of each motor, leg by leg.
    pub fn motor_limits(&self) -> Vec<MotorLimits> {
        let leg: Vec<MotorLimits> = match self {
            Self::A1 => vec![
                MotorLimits::new(-0.802, 0.802, 21.0, 33.5),
                MotorLimits::new(-1.047, 4.189, 21.0, 33.5),
                MotorLimits::new(-2.697, -0.916, 21.0, 33.5),
            ],
            Self::Laikago => vec![
                MotorLimits::new(-1.047, 0.873, 20.0, 40.0),
                MotorLimits::new(-0.524, 3.927, 20.0, 40.0),
                MotorLimits::new(-2.775, -0.611, 20.0, 40.0),
            ],
            Self::Minitaur => vec![
                MotorLimits::new(0.0, PI, 60.0, 3.5),
                MotorLimits::new(0.0, PI, 60.0, 3.5),
            ],
        };
        leg.iter().cycle().take(self.num_motors()).cloned().collect()
    }
}

impl MotorLimits {
    const fn new(min_angle: f64, max_angle: f64, max_velocity: f64, max_torque: f64) -> Self {
        Self {
            min_angle,
            max_angle,
            max_velocity,
            max_torque,
        }
    }
}

/// A simulated robot together with the physics engine stepping it.
///
/// Reads return [`Result`] so a failing physics backend surfaces as an error of the
/// environment step; the environment never tries to recover from it.
pub trait Robot {
    /// Morphology of the robot.
    fn kind(&self) -> RobotKind;

    /// Number of motors.
    fn num_motors(&self) -> usize {
        self.kind().num_motors()
    }

    /// Puts the robot back into its standing pose at the start of an episode.
    ///
    /// Implementations honour [`SimulationParameters::robot_on_rack`] and
    /// [`SimulationParameters::reset_time`].
    fn reset(&mut self, params: &SimulationParameters) -> Result<()>;

    /// Sends a motor command to be held during the next physics step.
    ///
    /// `command` has `num_motors() * mode.values_per_motor()` values.
    fn apply_action(&mut self, command: &[f64], mode: MotorControlMode) -> Result<()>;

    /// Advances the physics by `dt` seconds.
    fn step_simulation(&mut self, dt: f64) -> Result<()>;

    /// Position of the base in the world frame.
    fn base_position(&self) -> Result<Vector3<f64>>;

    /// Orientation of the base in the world frame.
    fn base_orientation(&self) -> Result<UnitQuaternion<f64>>;

    /// Angular velocity of the base as roll, pitch and yaw rates.
    fn base_roll_pitch_yaw_rate(&self) -> Result<Vector3<f64>>;

    /// Motor angles in radians.
    fn motor_angles(&self) -> Result<Vec<f64>>;

    /// Motor velocities in rad/s.
    fn motor_velocities(&self) -> Result<Vec<f64>>;

    /// Whether each foot touches the ground.
    fn foot_contacts(&self) -> Result<Vec<bool>>;

    /// Simulated time since the last reset.
    fn time_since_reset(&self) -> f64;

    /// `false` once the robot has reached a state it cannot recover from.
    fn is_safe(&self) -> bool {
        true
    }
}

/// Builds robots for [`build_regular_env`](crate::build_regular_env).
pub trait RobotFactory {
    /// Creates a robot of the given kind, simulated with the given parameters.
    fn make(&self, kind: RobotKind, params: &SimulationParameters) -> Result<Box<dyn Robot>>;
}
