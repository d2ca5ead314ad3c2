//! Assembly of the standard locomotion environment.
use crate::{
    Axis, BaseDisplacementSensor, FlatObs, FootContactSensor, GymConfig, ImuChannel, ImuSensor,
    JointAct, LocomotionEnv, LocomotionGymEnv, LocomotionInfo, MotorAngleSensor,
    MotorControlMode, MotorVelocitySensor, ObsDictToArrayWrapper, PoseOffsetGenerator, Robot,
    RobotFactory, RobotKind, SensorSet, SimpleForwardTask, SimulationParameters,
    TrajectoryGeneratorWrapper,
};
use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use strider_core::{record::Record, BoxSpace, Env, Step};

/// Target forward displacement per step of the built task.
const TARGET_VEL: f64 = 1.0;

/// The base environment built by [`build_regular_env`].
pub type BaseEnv = LocomotionGymEnv<SimpleForwardTask>;

/// The base environment with flattened observations.
pub type FlatEnv = ObsDictToArrayWrapper<BaseEnv>;

/// [`FlatEnv`] driven through a pose-offset trajectory generator.
pub type TrajectoryEnv = TrajectoryGeneratorWrapper<FlatEnv, PoseOffsetGenerator>;

/// Configuration of [`build_regular_env`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvBuilderConfig {
    /// Robot morphology.
    pub robot: RobotKind,

    /// How actions are sent to the motors.
    pub motor_control_mode: MotorControlMode,

    /// Renders the simulation.
    pub enable_rendering: bool,

    /// Hangs the robot on a rack.
    pub on_rack: bool,

    /// Residual limits for abduction, hip and knee motors of the trajectory generator.
    pub action_limit: [f64; 3],

    /// Wraps the environment with a trajectory generator where supported.
    pub wrap_trajectory_generator: bool,

    /// Episodes are truncated after this many steps, if set.
    pub max_episode_steps: Option<usize>,
}

impl Default for EnvBuilderConfig {
    fn default() -> Self {
        Self {
            robot: RobotKind::A1,
            motor_control_mode: MotorControlMode::Position,
            enable_rendering: false,
            on_rack: false,
            action_limit: [0.75, 0.75, 0.75],
            wrap_trajectory_generator: true,
            max_episode_steps: None,
        }
    }
}

impl EnvBuilderConfig {
    /// A configuration with default flags.
    pub fn new(robot: RobotKind, motor_control_mode: MotorControlMode) -> Self {
        Self {
            robot,
            motor_control_mode,
            ..Self::default()
        }
    }

    /// Sets the rendering flag.
    pub fn enable_rendering(mut self, v: bool) -> Self {
        self.enable_rendering = v;
        self
    }

    /// Sets the on-rack flag.
    pub fn on_rack(mut self, v: bool) -> Self {
        self.on_rack = v;
        self
    }

    /// Sets the residual limits of the trajectory generator.
    pub fn action_limit(mut self, v: [f64; 3]) -> Self {
        self.action_limit = v;
        self
    }

    /// Sets whether a trajectory generator is applied.
    pub fn wrap_trajectory_generator(mut self, v: bool) -> Self {
        self.wrap_trajectory_generator = v;
        self
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_episode_steps(mut self, v: Option<usize>) -> Self {
        self.max_episode_steps = v;
        self
    }

    /// Constructs [`EnvBuilderConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EnvBuilderConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    fn simulation_parameters(&self) -> Result<SimulationParameters> {
        Ok(SimulationParameters::builder()
            .enable_rendering(self.enable_rendering)
            .motor_control_mode(self.motor_control_mode)
            .reset_time(2.0)
            .num_action_repeat(10)
            .enable_action_interpolation(false)
            .enable_action_filter(false)
            .enable_clip_motor_commands(false)
            .robot_on_rack(self.on_rack)
            .build()?)
    }
}

/// Whether the trajectory generator was applied by [`build_regular_env`], and if not, why.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrajectoryWrapping {
    /// The outermost layer is a trajectory generator wrapper.
    Applied,

    /// The configuration disabled the wrapper.
    NotRequested,

    /// Trajectory generators only drive position-controlled motors.
    UnsupportedMode(MotorControlMode),

    /// No trajectory generator exists for this robot.
    UnsupportedRobot(RobotKind),
}

/// An environment produced by [`build_regular_env`].
///
/// Observations are flat arrays in the order of the sensors of the base environment.
pub enum WrappedEnv {
    /// Flattened base environment taking raw joint commands.
    Flattened(FlatEnv),

    /// Flattened base environment taking residuals around a trajectory generator.
    TrajectoryGenerator(TrajectoryEnv),
}

impl WrappedEnv {
    /// The flattening layer, giving access to the observation layout.
    pub fn flattened(&self) -> &FlatEnv {
        match self {
            Self::Flattened(env) => env,
            Self::TrajectoryGenerator(env) => env.inner(),
        }
    }

    /// The base environment.
    pub fn base(&self) -> &BaseEnv {
        self.flattened().inner()
    }
}

impl LocomotionEnv for WrappedEnv {
    fn env_time_step(&self) -> f64 {
        self.base().env_time_step()
    }

    fn robot(&self) -> &dyn Robot {
        self.base().robot()
    }
}

impl Env for WrappedEnv {
    type Obs = FlatObs;
    type Act = JointAct;
    type Info = LocomotionInfo;
    type ObsSpace = BoxSpace;

    fn reset(&mut self) -> Result<FlatObs> {
        match self {
            Self::Flattened(env) => env.reset(),
            Self::TrajectoryGenerator(env) => env.reset(),
        }
    }

    fn step(&mut self, a: &JointAct) -> Result<(Step<Self>, Record)> {
        Ok(match self {
            Self::Flattened(env) => {
                let (step, record) = env.step(a)?;
                (step.relabel::<Self>(), record)
            }
            Self::TrajectoryGenerator(env) => {
                let (step, record) = env.step(a)?;
                (step.relabel::<Self>(), record)
            }
        })
    }

    fn observation_space(&self) -> BoxSpace {
        match self {
            Self::Flattened(env) => env.observation_space(),
            Self::TrajectoryGenerator(env) => env.observation_space(),
        }
    }

    fn action_space(&self) -> BoxSpace {
        match self {
            Self::Flattened(env) => env.action_space(),
            Self::TrajectoryGenerator(env) => env.action_space(),
        }
    }
}

/// Result of [`build_regular_env`].
pub struct BuiltEnv {
    /// The outermost environment.
    pub env: WrappedEnv,

    /// Whether the trajectory generator was applied.
    pub trajectory_wrapping: TrajectoryWrapping,
}

/// Sensors of the standard environment, in observation order.
pub fn regular_sensors(kind: RobotKind) -> Result<SensorSet> {
    Ok(SensorSet::new(vec![
        Box::new(MotorAngleSensor::new(kind.num_motors())),
        Box::new(MotorVelocitySensor::new(kind.num_motors())),
        Box::new(BaseDisplacementSensor::new(vec![Axis::X])),
        Box::new(ImuSensor::new(vec![
            ImuChannel::Roll,
            ImuChannel::Pitch,
            ImuChannel::RollRate,
            ImuChannel::PitchRate,
            ImuChannel::YawRate,
        ])),
        Box::new(FootContactSensor::new()),
    ])?)
}

/// Builds the standard forward-walking environment.
///
/// The base environment uses fixed simulation parameters (10 action repeats, 2 s reset
/// time, no action filtering, interpolation or clipping), the sensors of
/// [`regular_sensors`] and a [`SimpleForwardTask`]. Its observations are always
/// flattened. In position control, the flattened environment is further wrapped with a
/// [`PoseOffsetGenerator`] if requested and available for the robot; otherwise the
/// reason is reported in [`BuiltEnv::trajectory_wrapping`].
pub fn build_regular_env(
    config: &EnvBuilderConfig,
    factory: &dyn RobotFactory,
) -> Result<BuiltEnv> {
    let params = config.simulation_parameters()?;
    let gym_config = GymConfig::new(params).max_episode_steps(config.max_episode_steps);
    let sensors = regular_sensors(config.robot)?;
    let task = SimpleForwardTask::new(TARGET_VEL);
    let robot = factory.make(config.robot, &gym_config.simulation_parameters)?;
    let env = LocomotionGymEnv::new(gym_config, robot, sensors, task)?;
    let env = ObsDictToArrayWrapper::new(env);

    let (env, wrapping) = if !config.wrap_trajectory_generator {
        (WrappedEnv::Flattened(env), TrajectoryWrapping::NotRequested)
    } else if config.motor_control_mode != MotorControlMode::Position {
        let mode = config.motor_control_mode;
        (WrappedEnv::Flattened(env), TrajectoryWrapping::UnsupportedMode(mode))
    } else {
        match PoseOffsetGenerator::for_robot(config.robot, config.action_limit) {
            Some(generator) => (
                WrappedEnv::TrajectoryGenerator(TrajectoryGeneratorWrapper::new(env, generator)),
                TrajectoryWrapping::Applied,
            ),
            None => {
                warn!(
                    "No trajectory generator for {:?}, using raw joint commands",
                    config.robot
                );
                (
                    WrappedEnv::Flattened(env),
                    TrajectoryWrapping::UnsupportedRobot(config.robot),
                )
            }
        }
    };
    info!(
        "Built environment for {:?}: {:?} control, trajectory generator {:?}",
        config.robot, config.motor_control_mode, wrapping
    );

    Ok(BuiltEnv {
        env,
        trajectory_wrapping: wrapping,
    })
}
