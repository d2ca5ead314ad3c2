//! A robot whose state is dictated by the caller.
use super::{Robot, RobotFactory, RobotKind, NUM_LEGS};
use crate::{MotorControlMode, SimulationParameters};
use anyhow::Result;
use nalgebra::{UnitQuaternion, Vector3};
use std::sync::{Arc, Mutex};

#[derive(Debug)]
struct ScriptedState {
    base_position: Vector3<f64>,
    base_orientation: UnitQuaternion<f64>,
    commands: Vec<Vec<f64>>,
    num_resets: usize,
    time: f64,
    fail_orientation: bool,
}

impl Default for ScriptedState {
    fn default() -> Self {
        Self {
            base_position: Vector3::zeros(),
            base_orientation: UnitQuaternion::identity(),
            commands: vec![],
            num_resets: 0,
            time: 0.0,
            fail_orientation: false,
        }
    }
}

/// A robot that does not move by itself.
///
/// Its base pose is set through a [`ScriptHandle`], which stays usable after the robot
/// has been moved into an environment. Every command passed to
/// [`Robot::apply_action`] is logged, which makes it easy to check what a chain of
/// wrappers finally sends to the robot.
#[derive(Debug)]
pub struct ScriptedRobot {
    kind: RobotKind,
    state: Arc<Mutex<ScriptedState>>,
}

/// Shared handle to the state of a [`ScriptedRobot`].
#[derive(Clone, Debug)]
pub struct ScriptHandle(Arc<Mutex<ScriptedState>>);

impl ScriptedRobot {
    /// Creates a robot at the origin, upright, with a handle to script it.
    pub fn new(kind: RobotKind) -> (Self, ScriptHandle) {
        let state = Arc::new(Mutex::new(ScriptedState::default()));
        let handle = ScriptHandle(state.clone());
        (Self { kind, state }, handle)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ScriptedState> {
        // A poisoned lock only happens after a panic in a test thread.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ScriptHandle {
    fn state(&self) -> std::sync::MutexGuard<'_, ScriptedState> {
        self.0.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Moves the base to `p`.
    pub fn set_base_position(&self, p: Vector3<f64>) {
        self.state().base_position = p;
    }

    /// Rotates the base to `q`.
    pub fn set_base_orientation(&self, q: UnitQuaternion<f64>) {
        self.state().base_orientation = q;
    }

    /// Makes subsequent orientation reads fail.
    pub fn fail_orientation_reads(&self, fail: bool) {
        self.state().fail_orientation = fail;
    }

    /// Commands received so far, oldest first.
    pub fn commands(&self) -> Vec<Vec<f64>> {
        self.state().commands.clone()
    }

    /// Number of times the robot has been reset.
    pub fn num_resets(&self) -> usize {
        self.state().num_resets
    }
}

impl Robot for ScriptedRobot {
    fn kind(&self) -> RobotKind {
        self.kind
    }

    fn reset(&mut self, _params: &SimulationParameters) -> Result<()> {
        let mut state = self.state();
        state.num_resets += 1;
        state.time = 0.0;
        Ok(())
    }

    fn apply_action(&mut self, command: &[f64], _mode: MotorControlMode) -> Result<()> {
        self.state().commands.push(command.to_vec());
        Ok(())
    }

    fn step_simulation(&mut self, dt: f64) -> Result<()> {
        self.state().time += dt;
        Ok(())
    }

    fn base_position(&self) -> Result<Vector3<f64>> {
        Ok(self.state().base_position)
    }

    fn base_orientation(&self) -> Result<UnitQuaternion<f64>> {
        let state = self.state();
        if state.fail_orientation {
            anyhow::bail!("Failed to read the base orientation");
        }
        Ok(state.base_orientation)
    }

    fn base_roll_pitch_yaw_rate(&self) -> Result<Vector3<f64>> {
        Ok(Vector3::zeros())
    }

    fn motor_angles(&self) -> Result<Vec<f64>> {
        Ok(self.kind.default_motor_angles())
    }

    fn motor_velocities(&self) -> Result<Vec<f64>> {
        Ok(vec![0.0; self.kind.num_motors()])
    }

    fn foot_contacts(&self) -> Result<Vec<bool>> {
        Ok(vec![true; NUM_LEGS])
    }

    fn time_since_reset(&self) -> f64 {
        self.state().time
    }
}

/// Hands out a single pre-built [`ScriptedRobot`].
#[derive(Debug)]
pub struct ScriptedRobotFactory {
    robot: Mutex<Option<ScriptedRobot>>,
}

impl ScriptedRobotFactory {
    /// Creates a factory together with the handle of the robot it will hand out.
    pub fn new(kind: RobotKind) -> (Self, ScriptHandle) {
        let (robot, handle) = ScriptedRobot::new(kind);
        let factory = Self {
            robot: Mutex::new(Some(robot)),
        };
        (factory, handle)
    }
}

impl RobotFactory for ScriptedRobotFactory {
    fn make(&self, kind: RobotKind, _params: &SimulationParameters) -> Result<Box<dyn Robot>> {
        let robot = self
            .robot
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
            .ok_or_else(|| anyhow::anyhow!("The scripted robot has already been handed out"))?;
        anyhow::ensure!(
            robot.kind == kind,
            "Scripted robot is a {:?}, requested {:?}",
            robot.kind,
            kind
        );
        Ok(Box::new(robot))
    }
}
