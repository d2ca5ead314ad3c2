//! Rollouts of a fixed policy with experiment bookkeeping.
//!
//! A rollout creates a run directory `<log_dir>/<prefix>_<robot>_<timestamp>/`, saves a
//! snapshot of its configuration there as `config.yaml`, runs the episodes and writes
//! every step to `steps.csv`.
use crate::policy::{PolicyKind, RandomPolicy, ZeroPolicy};
use anyhow::Result;
use chrono::{DateTime, Local};
use csv::WriterBuilder;
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, Write},
    path::{Path, PathBuf},
};
use strider_core::{
    record::{BufferedRecorder, Record},
    util::eval_with_recorder,
    Env,
};
use strider_locomotion::{build_regular_env, robot::KinematicRobotFactory, EnvBuilderConfig};

/// Configuration of a rollout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolloutConfig {
    /// Environment to build.
    pub env: EnvBuilderConfig,

    /// Number of episodes.
    pub n_episodes: usize,

    /// Episodes are cut after this many steps, if set.
    pub max_steps: Option<usize>,

    /// Policy driving the robot.
    pub policy: PolicyKind,

    /// Seed of the random policy.
    pub seed: u64,

    /// Directory under which run directories are created.
    pub log_dir: String,

    /// Prefix of the run directory name.
    pub prefix: String,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            env: EnvBuilderConfig::default(),
            n_episodes: 5,
            max_steps: Some(1000),
            policy: PolicyKind::Zero,
            seed: 42,
            log_dir: "./logs".to_string(),
            prefix: "rollout".to_string(),
        }
    }
}

impl RolloutConfig {
    /// Sets the environment configuration.
    pub fn env(mut self, v: EnvBuilderConfig) -> Self {
        self.env = v;
        self
    }

    /// Sets the number of episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets the maximum number of steps per episode.
    pub fn max_steps(mut self, v: Option<usize>) -> Self {
        self.max_steps = v;
        self
    }

    /// Sets the policy.
    pub fn policy(mut self, v: PolicyKind) -> Self {
        self.policy = v;
        self
    }

    /// Sets the seed of the random policy.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the log directory.
    pub fn log_dir(mut self, v: impl Into<String>) -> Self {
        self.log_dir = v.into();
        self
    }

    /// Sets the prefix of run directories.
    pub fn prefix(mut self, v: impl Into<String>) -> Self {
        self.prefix = v.into();
        self
    }

    /// Constructs [`RolloutConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RolloutConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    /// Path of the run directory of a rollout started at `time`.
    pub fn run_dir(&self, time: &DateTime<Local>) -> PathBuf {
        let robot = format!("{:?}", self.env.robot).to_lowercase();
        let name = format!(
            "{}_{}_{}",
            self.prefix,
            robot,
            time.format("%Y-%m-%d-%H-%M-%S")
        );
        Path::new(&self.log_dir).join(name)
    }
}

/// A row of `steps.csv`.
#[derive(Debug, Serialize)]
struct StepRecord {
    episode: usize,
    step: usize,
    reward: f32,
    forward_displacement: f32,
    base_x: f32,
}

impl TryFrom<&Record> for StepRecord {
    type Error = anyhow::Error;

    fn try_from(record: &Record) -> Result<Self> {
        Ok(Self {
            episode: record.get_scalar("episode")? as _,
            step: record.get_scalar("step")? as _,
            reward: record.get_scalar("reward")?,
            forward_displacement: record.get_scalar("forward_displacement")?,
            base_x: record.get_scalar("base_x")?,
        })
    }
}

/// Outcome of [`run`].
#[derive(Clone, Debug)]
pub struct RolloutSummary {
    /// Directory holding the configuration snapshot and the step log.
    pub run_dir: PathBuf,

    /// Return of each episode.
    pub returns: Vec<f32>,
}

/// Runs the rollout described by `config` on a
/// [`KinematicRobot`](strider_locomotion::robot::KinematicRobot).
pub fn run(config: &RolloutConfig) -> Result<RolloutSummary> {
    let run_dir = config.run_dir(&Local::now());
    fs::create_dir_all(&run_dir)?;
    config.save(run_dir.join("config.yaml"))?;
    info!("Run directory: {}", run_dir.display());

    let built = build_regular_env(&config.env, &KinematicRobotFactory)?;
    info!("Trajectory generator: {:?}", built.trajectory_wrapping);
    let mut env = built.env;
    let mut recorder = BufferedRecorder::new();
    let returns = match config.policy {
        PolicyKind::Zero => {
            let mut policy = ZeroPolicy::new(env.action_space().dim());
            eval_with_recorder(
                &mut env,
                &mut policy,
                config.n_episodes,
                config.max_steps,
                &mut recorder,
            )?
        }
        PolicyKind::Random => {
            let mut policy = RandomPolicy::new(env.action_space(), config.seed);
            eval_with_recorder(
                &mut env,
                &mut policy,
                config.n_episodes,
                config.max_steps,
                &mut recorder,
            )?
        }
    };

    let mut wtr = WriterBuilder::new()
        .has_headers(true)
        .from_writer(File::create(run_dir.join("steps.csv"))?);
    for record in recorder.iter() {
        wtr.serialize(StepRecord::try_from(record)?)?;
    }
    wtr.flush()?;

    Ok(RolloutSummary { run_dir, returns })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use strider_locomotion::{MotorControlMode, RobotKind};

    #[test]
    fn test_run_dir_name() {
        let config = RolloutConfig::default()
            .env(EnvBuilderConfig::new(RobotKind::Laikago, MotorControlMode::Position))
            .log_dir("/tmp/logs")
            .prefix("zero");
        let time = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            config.run_dir(&time),
            PathBuf::from("/tmp/logs/zero_laikago_2024-03-09-14-05-07")
        );
    }

    #[test]
    fn test_config_defaults_from_partial_yaml() -> Result<()> {
        let config: RolloutConfig =
            serde_yaml::from_str("n_episodes: 2\npolicy: random\nenv:\n  robot: minitaur\n")?;
        assert_eq!(config.n_episodes, 2);
        assert_eq!(config.policy, PolicyKind::Random);
        assert_eq!(config.env.robot, RobotKind::Minitaur);
        assert_eq!(config.env.action_limit, [0.75; 3]);
        assert_eq!(config.max_steps, Some(1000));
        Ok(())
    }
}
