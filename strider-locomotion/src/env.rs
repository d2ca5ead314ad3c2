//! Base locomotion environment.
use crate::{
    action::ActionProcessor, DictObs, DictSpace, GymConfig, JointAct, LocomotionError,
    MotorControlMode, Robot, SensorSet, SimulationParameters, Task, TaskPhase,
};
use anyhow::Result;
use log::{info, trace};
use ndarray::Array1;
use strider_core::{
    record::{Record, RecordValue},
    BoxSpace, Env, Info, Step,
};

/// Bounds of the gains of a hybrid command.
const MAX_KP: f32 = 500.0;
const MAX_KD: f32 = 10.0;

/// Information of a step of [`LocomotionGymEnv`].
#[derive(Clone, Debug, PartialEq)]
pub struct LocomotionInfo {
    /// Number of environment steps since the last reset.
    pub env_step_counter: usize,

    /// Simulated time since the last reset, in seconds.
    pub time_since_reset: f64,
}

impl Info for LocomotionInfo {}

/// Environments that run on a simulated robot.
///
/// Implemented by [`LocomotionGymEnv`] and every wrapper around it, so wrappers can find
/// the control time step and the robot at the bottom of the chain.
pub trait LocomotionEnv {
    /// Simulated time of one environment step, in seconds.
    fn env_time_step(&self) -> f64;

    /// The simulated robot.
    fn robot(&self) -> &dyn Robot;
}

/// Raw joint-command space of a robot for the given control mode.
pub fn joint_space(robot: &dyn Robot, mode: MotorControlMode) -> Result<BoxSpace> {
    let limits = robot.kind().motor_limits();
    let (low, high): (Vec<f32>, Vec<f32>) = limits
        .iter()
        .flat_map(|l| {
            let angle = (l.min_angle as f32, l.max_angle as f32);
            let torque = (-l.max_torque as f32, l.max_torque as f32);
            match mode {
                MotorControlMode::Position => vec![angle],
                MotorControlMode::Torque => vec![torque],
                MotorControlMode::Hybrid => vec![
                    angle,
                    (0.0, MAX_KP),
                    (-l.max_velocity as f32, l.max_velocity as f32),
                    (0.0, MAX_KD),
                    torque,
                ],
            }
        })
        .unzip();
    Ok(BoxSpace::new(Array1::from(low), Array1::from(high))?)
}

/// A robot in a physics simulation, observed by sensors and scored by a task.
///
/// Observations are [`DictObs`] with one entry per sensor, in the order of the
/// [`SensorSet`]. Actions are raw joint commands whose layout depends on the
/// [`MotorControlMode`] of the simulation parameters.
pub struct LocomotionGymEnv<T: Task> {
    config: GymConfig,
    robot: Box<dyn Robot>,
    sensors: SensorSet,
    task: T,
    processor: ActionProcessor,
    action_space: BoxSpace,
    env_step_counter: usize,
    last_base_x: f64,
}

impl<T: Task> LocomotionGymEnv<T> {
    /// Constructs the environment. The robot is not reset until [`Env::reset`].
    pub fn new(
        config: GymConfig,
        robot: Box<dyn Robot>,
        sensors: SensorSet,
        task: T,
    ) -> Result<Self> {
        let params = &config.simulation_parameters;
        let action_space = joint_space(robot.as_ref(), params.motor_control_mode())?;
        let processor = ActionProcessor::new(params);
        info!(
            "Initialize LocomotionGymEnv: {:?}, {:?} control, sensors {:?}",
            robot.kind(),
            params.motor_control_mode(),
            sensors.names()
        );
        Ok(Self {
            config,
            robot,
            sensors,
            task,
            processor,
            action_space,
            env_step_counter: 0,
            last_base_x: 0.0,
        })
    }

    /// Configuration of the environment.
    pub fn config(&self) -> &GymConfig {
        &self.config
    }

    /// Simulation parameters.
    pub fn simulation_parameters(&self) -> &SimulationParameters {
        &self.config.simulation_parameters
    }

    /// The task.
    pub fn task(&self) -> &T {
        &self.task
    }

    /// The sensors.
    pub fn sensors(&self) -> &SensorSet {
        &self.sensors
    }

    /// Number of environment steps since the last reset.
    pub fn env_step_counter(&self) -> usize {
        self.env_step_counter
    }

    fn initial_command(&self) -> Result<Vec<f64>> {
        match self.simulation_parameters().motor_control_mode() {
            MotorControlMode::Position => self.robot.motor_angles(),
            _ => Ok(vec![0.0; self.action_space.dim()]),
        }
    }

    fn apply_step_action(&mut self, action: &[f64]) -> Result<()> {
        let params = self.config.simulation_parameters.clone();
        let mode = params.motor_control_mode();
        let target = self.processor.begin_step(action);
        for substep in 0..params.num_action_repeat() {
            let angles = self.robot.motor_angles()?;
            let command = self.processor.substep_command(&target, substep, &angles);
            self.robot.apply_action(&command, mode)?;
            self.robot.step_simulation(params.sim_time_step_s())?;
        }
        self.processor.end_step(target);
        Ok(())
    }
}

impl<T: Task> LocomotionEnv for LocomotionGymEnv<T> {
    fn env_time_step(&self) -> f64 {
        self.simulation_parameters().env_time_step()
    }

    fn robot(&self) -> &dyn Robot {
        self.robot.as_ref()
    }
}

impl<T: Task> Env for LocomotionGymEnv<T> {
    type Obs = DictObs;
    type Act = JointAct;
    type Info = LocomotionInfo;
    type ObsSpace = DictSpace;

    fn reset(&mut self) -> Result<DictObs> {
        trace!("LocomotionGymEnv::reset()");
        self.robot.reset(&self.config.simulation_parameters)?;
        let initial = self.initial_command()?;
        self.processor.reset(&initial);
        self.env_step_counter = 0;
        self.last_base_x = self.robot.base_position()?[0];
        self.sensors.on_reset(self.robot.as_ref())?;
        self.task.reset(self.robot.as_ref())?;
        self.sensors.observe(self.robot.as_ref())
    }

    /// Runs a step of the simulation.
    ///
    /// The robot reaches the end of the step first; then the sensors and the task are
    /// updated, and only then are the reward and termination evaluated.
    fn step(&mut self, a: &JointAct) -> Result<(Step<Self>, Record)> {
        trace!("LocomotionGymEnv::step()");
        if a.0.len() != self.action_space.dim() {
            return Err(LocomotionError::ActionDimension {
                expected: self.action_space.dim(),
                found: a.0.len(),
            }
            .into());
        }
        if self.task.phase() != TaskPhase::Active {
            return Err(LocomotionError::TaskNotReset.into());
        }
        let action = a.0.iter().map(|v| *v as f64).collect::<Vec<_>>();
        self.apply_step_action(&action)?;
        self.env_step_counter += 1;

        let robot = self.robot.as_ref();
        self.sensors.on_step(robot)?;
        self.task.update(robot)?;
        let reward = self.task.reward(robot);
        let is_terminated = !robot.is_safe() || self.task.done(robot)?;
        let is_truncated = self
            .config
            .max_episode_steps
            .map_or(false, |m| self.env_step_counter >= m);
        let obs = self.sensors.observe(robot)?;

        let base_x = robot.base_position()?[0];
        let info = LocomotionInfo {
            env_step_counter: self.env_step_counter,
            time_since_reset: robot.time_since_reset(),
        };
        let record = Record::from_slice(&[
            ("reward", RecordValue::Scalar(reward as f32)),
            (
                "forward_displacement",
                RecordValue::Scalar((base_x - self.last_base_x) as f32),
            ),
            ("base_x", RecordValue::Scalar(base_x as f32)),
            (
                "env_step_counter",
                RecordValue::Scalar(self.env_step_counter as f32),
            ),
        ]);
        self.last_base_x = base_x;

        let step = Step::<Self>::new(
            obs,
            a.clone(),
            reward as f32,
            is_terminated,
            is_truncated,
            info,
        );
        Ok((step, record))
    }

    fn observation_space(&self) -> DictSpace {
        self.sensors.space()
    }

    fn action_space(&self) -> BoxSpace {
        self.action_space.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        robot::{KinematicRobot, ScriptedRobot},
        FootContactSensor, MotorAngleSensor, RobotKind, SimpleForwardTask,
    };
    use nalgebra::{UnitQuaternion, Vector3};

    fn params() -> SimulationParameters {
        SimulationParameters::builder()
            .num_action_repeat(4)
            .enable_action_filter(false)
            .enable_action_interpolation(false)
            .enable_clip_motor_commands(false)
            .build()
            .unwrap()
    }

    fn sensors(kind: RobotKind) -> SensorSet {
        SensorSet::new(vec![
            Box::new(MotorAngleSensor::new(kind.num_motors())),
            Box::new(FootContactSensor::new()),
        ])
        .unwrap()
    }

    #[test]
    fn test_action_space_follows_control_mode() -> Result<()> {
        let (robot, _) = ScriptedRobot::new(RobotKind::Laikago);
        let space = joint_space(&robot, MotorControlMode::Position)?;
        assert_eq!(space.dim(), 12);
        assert!(space.contains(
            &RobotKind::Laikago
                .default_motor_angles()
                .iter()
                .map(|v| *v as f32)
                .collect::<Vec<_>>()
        ));
        assert_eq!(joint_space(&robot, MotorControlMode::Torque)?.dim(), 12);
        assert_eq!(joint_space(&robot, MotorControlMode::Hybrid)?.dim(), 60);
        Ok(())
    }

    #[test]
    fn test_step_sends_one_command_per_substep() -> Result<()> {
        let (robot, handle) = ScriptedRobot::new(RobotKind::A1);
        let config = GymConfig::new(params());
        let mut env = LocomotionGymEnv::new(
            config,
            Box::new(robot),
            sensors(RobotKind::A1),
            SimpleForwardTask::new(1.0),
        )?;
        let obs = env.reset()?;
        assert_eq!(obs.keys(), vec!["MotorAngle", "FootContactSensor"]);
        assert_eq!(handle.num_resets(), 1);

        handle.set_base_position(Vector3::new(0.1, 0.0, 0.3));
        let act = JointAct::from_vec(vec![0.5; 12]);
        let (step, record) = env.step(&act)?;
        assert_eq!(handle.commands().len(), 4);
        assert!(handle.commands().iter().all(|c| c == &vec![0.5; 12]));
        assert!((step.reward - (-0.81f32 / 0.33).exp()).abs() < 1e-5);
        assert!(!step.is_done());
        assert_eq!(step.info.env_step_counter, 1);
        assert!((step.info.time_since_reset - 0.004).abs() < 1e-12);
        assert!((record.get_scalar("forward_displacement")? - 0.1).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_tipping_over_terminates() -> Result<()> {
        let (robot, handle) = ScriptedRobot::new(RobotKind::A1);
        let mut env = LocomotionGymEnv::new(
            GymConfig::new(params()),
            Box::new(robot),
            sensors(RobotKind::A1),
            SimpleForwardTask::new(1.0),
        )?;
        env.reset()?;
        handle.set_base_orientation(UnitQuaternion::from_euler_angles(0.0, 0.7, 0.0));
        let (step, _) = env.step(&JointAct::zeros(12))?;
        assert!(step.is_terminated);
        assert!(!step.is_truncated);
        Ok(())
    }

    #[test]
    fn test_truncation_after_max_episode_steps() -> Result<()> {
        let kind = RobotKind::A1;
        let robot = KinematicRobot::new(kind, &params());
        let mut env = LocomotionGymEnv::new(
            GymConfig::new(params()).max_episode_steps(Some(3)),
            Box::new(robot),
            sensors(kind),
            SimpleForwardTask::new(1.0),
        )?;
        env.reset()?;
        let act = JointAct::from_vec(
            kind.default_motor_angles()
                .iter()
                .map(|v| *v as f32)
                .collect(),
        );
        for _ in 0..2 {
            let (step, _) = env.step(&act)?;
            assert!(!step.is_done());
        }
        let (step, _) = env.step(&act)?;
        assert!(step.is_truncated);

        let (step, _) = env.step_with_reset(&act)?;
        assert!(step.init_obs.is_some());
        assert_eq!(env.env_step_counter(), 0);
        Ok(())
    }

    #[test]
    fn test_wrong_action_length_rejected() -> Result<()> {
        let (robot, _) = ScriptedRobot::new(RobotKind::A1);
        let mut env = LocomotionGymEnv::new(
            GymConfig::new(params()),
            Box::new(robot),
            sensors(RobotKind::A1),
            SimpleForwardTask::new(1.0),
        )?;
        env.reset()?;
        let err = env.step(&JointAct::zeros(3)).err().unwrap();
        assert_eq!(
            err.downcast_ref::<LocomotionError>(),
            Some(&LocomotionError::ActionDimension {
                expected: 12,
                found: 3
            })
        );
        Ok(())
    }

    #[test]
    fn test_step_before_reset_leaves_robot_untouched() -> Result<()> {
        let (robot, handle) = ScriptedRobot::new(RobotKind::A1);
        let mut env = LocomotionGymEnv::new(
            GymConfig::new(params()),
            Box::new(robot),
            sensors(RobotKind::A1),
            SimpleForwardTask::new(1.0),
        )?;
        let err = env.step(&JointAct::zeros(12)).err().unwrap();
        assert_eq!(
            err.downcast_ref::<LocomotionError>(),
            Some(&LocomotionError::TaskNotReset)
        );
        assert!(handle.commands().is_empty());
        assert_eq!(env.env_step_counter(), 0);

        env.reset()?;
        env.step(&JointAct::zeros(12))?;
        assert_eq!(handle.commands().len(), 4);
        Ok(())
    }
}
