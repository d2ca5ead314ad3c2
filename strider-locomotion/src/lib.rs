//! Legged-locomotion environments composed from a robot, sensors, a task and wrappers.
//!
//! ## Base environment
//!
//! [`LocomotionGymEnv`] owns a simulated [`Robot`], a [`SensorSet`] and a [`Task`]. Its
//! observation is a [`DictObs`] with one entry per sensor, in the order the sensors were
//! given, and its action is a raw joint command whose layout depends on the
//! [`MotorControlMode`] of its [`SimulationParameters`]. On every step the action is
//! repeated over several physics substeps, then the sensors and the task are updated,
//! and finally the reward and termination are read from the task.
//!
//! The robot is an external collaborator reached through the [`Robot`] trait. This crate
//! provides [`KinematicRobot`](robot::KinematicRobot), a deterministic stand-in, and
//! [`ScriptedRobot`](robot::ScriptedRobot), whose base pose is set by the caller.
//!
//! ## Wrappers
//!
//! Wrappers implement [`Env`](strider_core::Env) and own the environment they wrap:
//!
//! * [`ObsDictToArrayWrapper`] flattens [`DictObs`] into [`FlatObs`], with a layout fixed
//!   when the wrapper is constructed.
//! * [`TrajectoryGeneratorWrapper`] interprets actions as residuals around a reference
//!   given by a [`TrajectoryGenerator`].
//!
//! ## Building
//!
//! [`build_regular_env`] assembles the standard forward-walking environment from an
//! [`EnvBuilderConfig`]:
//!
//! ```no_run
//! use strider_core::Env;
//! use strider_locomotion::{
//!     build_regular_env, robot::KinematicRobotFactory, EnvBuilderConfig, JointAct,
//!     MotorControlMode, RobotKind, TrajectoryWrapping,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = EnvBuilderConfig::new(RobotKind::A1, MotorControlMode::Position);
//! let built = build_regular_env(&config, &KinematicRobotFactory)?;
//! assert_eq!(built.trajectory_wrapping, TrajectoryWrapping::Applied);
//!
//! let mut env = built.env;
//! let _obs = env.reset()?;
//! let (step, _record) = env.step(&JointAct::zeros(env.action_space().dim()))?;
//! println!("reward = {}", step.reward);
//! # Ok(())
//! # }
//! ```
pub mod action;
mod builder;
mod config;
mod env;
mod error;
pub mod math;
mod obs;
pub mod robot;
mod sensor;
mod task;
mod trajectory;
mod wrapper;

pub use builder::{
    build_regular_env, regular_sensors, BaseEnv, BuiltEnv, EnvBuilderConfig, FlatEnv,
    TrajectoryEnv, TrajectoryWrapping, WrappedEnv,
};
pub use config::{GymConfig, MotorControlMode, SimulationParameters, SimulationParametersBuilder};
pub use env::{joint_space, LocomotionEnv, LocomotionGymEnv, LocomotionInfo};
pub use error::LocomotionError;
pub use obs::{DictObs, DictSpace, FlatObs, JointAct};
pub use robot::{MotorLimits, Robot, RobotFactory, RobotKind};
pub use sensor::{
    Axis, BaseDisplacementSensor, FootContactSensor, ImuChannel, ImuSensor, MotorAngleSensor,
    MotorVelocitySensor, Sensor, SensorSet,
};
pub use task::{tipped_over, SimpleForwardTask, Task, TaskPhase, MIN_UPRIGHT_COSINE, REWARD_SIGMA};
pub use trajectory::{PoseOffsetGenerator, TrajectoryGenerator};
pub use wrapper::{ObsDictToArrayWrapper, TrajectoryGeneratorWrapper};
