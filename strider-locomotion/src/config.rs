//! Configuration of [`LocomotionGymEnv`](crate::LocomotionGymEnv).
use crate::LocomotionError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// How motor commands are interpreted by the robot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MotorControlMode {
    /// One target angle per motor.
    Position,

    /// One torque per motor.
    Torque,

    /// Five values per motor: target angle, kp, target velocity, kd, feed-forward torque.
    Hybrid,
}

impl MotorControlMode {
    /// Number of command values per motor.
    pub fn values_per_motor(&self) -> usize {
        match self {
            Self::Position | Self::Torque => 1,
            Self::Hybrid => 5,
        }
    }
}

/// Table form of [`SimulationParameters`], as read from a configuration file.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct SimulationParametersTable {
    sim_time_step_s: f64,
    num_action_repeat: usize,
    enable_rendering: bool,
    robot_on_rack: bool,
    motor_control_mode: MotorControlMode,
    reset_time: f64,
    enable_action_filter: bool,
    enable_action_interpolation: bool,
    enable_clip_motor_commands: bool,
}

impl Default for SimulationParametersTable {
    fn default() -> Self {
        Self {
            sim_time_step_s: 0.001,
            num_action_repeat: 33,
            enable_rendering: false,
            robot_on_rack: false,
            motor_control_mode: MotorControlMode::Position,
            reset_time: -1.0,
            enable_action_filter: true,
            enable_action_interpolation: true,
            enable_clip_motor_commands: true,
        }
    }
}

/// Parameters of the simulation, immutable once constructed.
///
/// Built either from a configuration table (unknown keys are rejected) or with
/// [`SimulationParameters::builder`]. Both paths validate that
/// `num_action_repeat >= 1` and `sim_time_step_s > 0`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SimulationParametersTable", into = "SimulationParametersTable")]
pub struct SimulationParameters {
    sim_time_step_s: f64,
    num_action_repeat: usize,
    enable_rendering: bool,
    robot_on_rack: bool,
    motor_control_mode: MotorControlMode,
    reset_time: f64,
    enable_action_filter: bool,
    enable_action_interpolation: bool,
    enable_clip_motor_commands: bool,
}

impl TryFrom<SimulationParametersTable> for SimulationParameters {
    type Error = LocomotionError;

    fn try_from(t: SimulationParametersTable) -> Result<Self, Self::Error> {
        if t.num_action_repeat < 1 {
            return Err(LocomotionError::InvalidSimulationParameters(
                "num_action_repeat must be at least 1".to_string(),
            ));
        }
        if !(t.sim_time_step_s > 0.0) {
            return Err(LocomotionError::InvalidSimulationParameters(format!(
                "sim_time_step_s must be positive, got {}",
                t.sim_time_step_s
            )));
        }
        Ok(Self::from_table(t))
    }
}

impl From<SimulationParameters> for SimulationParametersTable {
    fn from(p: SimulationParameters) -> Self {
        Self {
            sim_time_step_s: p.sim_time_step_s,
            num_action_repeat: p.num_action_repeat,
            enable_rendering: p.enable_rendering,
            robot_on_rack: p.robot_on_rack,
            motor_control_mode: p.motor_control_mode,
            reset_time: p.reset_time,
            enable_action_filter: p.enable_action_filter,
            enable_action_interpolation: p.enable_action_interpolation,
            enable_clip_motor_commands: p.enable_clip_motor_commands,
        }
    }
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self::from_table(SimulationParametersTable::default())
    }
}

impl SimulationParameters {
    fn from_table(t: SimulationParametersTable) -> Self {
        Self {
            sim_time_step_s: t.sim_time_step_s,
            num_action_repeat: t.num_action_repeat,
            enable_rendering: t.enable_rendering,
            robot_on_rack: t.robot_on_rack,
            motor_control_mode: t.motor_control_mode,
            reset_time: t.reset_time,
            enable_action_filter: t.enable_action_filter,
            enable_action_interpolation: t.enable_action_interpolation,
            enable_clip_motor_commands: t.enable_clip_motor_commands,
        }
    }

    /// Returns a builder starting from the default parameters.
    pub fn builder() -> SimulationParametersBuilder {
        SimulationParametersBuilder::default()
    }

    /// Constructs parameters from a YAML table.
    pub fn from_yaml_str(s: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Duration of one physics step in seconds.
    pub fn sim_time_step_s(&self) -> f64 {
        self.sim_time_step_s
    }

    /// Number of physics steps per environment step.
    pub fn num_action_repeat(&self) -> usize {
        self.num_action_repeat
    }

    /// Duration of one environment step in seconds.
    pub fn env_time_step(&self) -> f64 {
        self.sim_time_step_s * self.num_action_repeat as f64
    }

    /// Whether the simulation is rendered.
    pub fn enable_rendering(&self) -> bool {
        self.enable_rendering
    }

    /// Whether the robot base is held fixed in the air.
    pub fn robot_on_rack(&self) -> bool {
        self.robot_on_rack
    }

    /// Motor control mode.
    pub fn motor_control_mode(&self) -> MotorControlMode {
        self.motor_control_mode
    }

    /// Time in seconds the robot is given to settle on reset. Negative disables settling.
    pub fn reset_time(&self) -> f64 {
        self.reset_time
    }

    /// Whether policy actions are low-pass filtered.
    pub fn enable_action_filter(&self) -> bool {
        self.enable_action_filter
    }

    /// Whether commands are interpolated across the repeated physics steps.
    pub fn enable_action_interpolation(&self) -> bool {
        self.enable_action_interpolation
    }

    /// Whether position commands are clipped around the current motor angles.
    pub fn enable_clip_motor_commands(&self) -> bool {
        self.enable_clip_motor_commands
    }
}

/// Builder of [`SimulationParameters`].
#[derive(Clone, Debug, Default)]
pub struct SimulationParametersBuilder {
    table: SimulationParametersTable,
}

impl SimulationParametersBuilder {
    /// Sets the duration of one physics step.
    pub fn sim_time_step_s(mut self, v: f64) -> Self {
        self.table.sim_time_step_s = v;
        self
    }

    /// Sets the number of physics steps per environment step.
    pub fn num_action_repeat(mut self, v: usize) -> Self {
        self.table.num_action_repeat = v;
        self
    }

    /// Enables rendering.
    pub fn enable_rendering(mut self, v: bool) -> Self {
        self.table.enable_rendering = v;
        self
    }

    /// Holds the robot base fixed.
    pub fn robot_on_rack(mut self, v: bool) -> Self {
        self.table.robot_on_rack = v;
        self
    }

    /// Sets the motor control mode.
    pub fn motor_control_mode(mut self, v: MotorControlMode) -> Self {
        self.table.motor_control_mode = v;
        self
    }

    /// Sets the settling time on reset.
    pub fn reset_time(mut self, v: f64) -> Self {
        self.table.reset_time = v;
        self
    }

    /// Enables the action filter.
    pub fn enable_action_filter(mut self, v: bool) -> Self {
        self.table.enable_action_filter = v;
        self
    }

    /// Enables action interpolation.
    pub fn enable_action_interpolation(mut self, v: bool) -> Self {
        self.table.enable_action_interpolation = v;
        self
    }

    /// Enables clipping of motor commands.
    pub fn enable_clip_motor_commands(mut self, v: bool) -> Self {
        self.table.enable_clip_motor_commands = v;
        self
    }

    /// Validates and freezes the parameters.
    pub fn build(self) -> Result<SimulationParameters, LocomotionError> {
        SimulationParameters::try_from(self.table)
    }
}

/// Configuration of [`LocomotionGymEnv`](crate::LocomotionGymEnv).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GymConfig {
    /// Simulation parameters.
    pub simulation_parameters: SimulationParameters,

    /// Episodes are truncated after this many environment steps, if set.
    #[serde(default)]
    pub max_episode_steps: Option<usize>,
}

impl GymConfig {
    /// Constructs a configuration from simulation parameters.
    pub fn new(simulation_parameters: SimulationParameters) -> Self {
        Self {
            simulation_parameters,
            max_episode_steps: None,
        }
    }

    /// Sets the maximum number of steps in an episode.
    pub fn max_episode_steps(mut self, v: Option<usize>) -> Self {
        self.max_episode_steps = v;
        self
    }

    /// Constructs [`GymConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`GymConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
