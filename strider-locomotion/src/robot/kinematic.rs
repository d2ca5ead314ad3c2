//! A kinematic stand-in for a simulated quadruped.
//!
//! Joints follow their commands through a single-inertia model, the base advances in
//! proportion to how fast the stance legs sweep backwards, and body roll/pitch follow the
//! left/right and front/rear asymmetry of the hips. No contact dynamics are simulated.
use super::{MotorLimits, Robot, RobotFactory, RobotKind, NUM_LEGS};
use crate::{LocomotionError, MotorControlMode, SimulationParameters};
use anyhow::Result;
use log::trace;
use nalgebra::{UnitQuaternion, Vector3};

/// Rotor inertia shared by every joint.
const JOINT_INERTIA: f64 = 0.05;

/// Gains of the internal position controller.
const POSITION_KP: f64 = 100.0;
const POSITION_KD: f64 = 1.0;

/// Forward base displacement per radian of hip sweep of a single stance leg.
const STRIDE_PER_RAD: f64 = 0.25;

/// Body tilt per radian of hip asymmetry.
const TILT_PER_RAD: f64 = 0.5;

/// Height of the base above its standing height when on the rack.
const RACK_HEIGHT: f64 = 0.5;

/// A deterministic kinematic quadruped.
#[derive(Debug, Clone)]
pub struct KinematicRobot {
    kind: RobotKind,
    limits: Vec<MotorLimits>,
    on_rack: bool,
    command: Option<(Vec<f64>, MotorControlMode)>,
    angles: Vec<f64>,
    velocities: Vec<f64>,
    contacts: Vec<bool>,
    base_position: Vector3<f64>,
    rpy: Vector3<f64>,
    rpy_rate: Vector3<f64>,
    time: f64,
}

impl KinematicRobot {
    /// Creates a robot standing in its default pose at the origin.
    pub fn new(kind: RobotKind, params: &SimulationParameters) -> Self {
        let mut robot = Self {
            kind,
            limits: kind.motor_limits(),
            on_rack: params.robot_on_rack(),
            command: None,
            angles: vec![],
            velocities: vec![],
            contacts: vec![],
            base_position: Vector3::zeros(),
            rpy: Vector3::zeros(),
            rpy_rate: Vector3::zeros(),
            time: 0.0,
        };
        robot.stand();
        robot
    }

    fn stand(&mut self) {
        let n = self.kind.num_motors();
        self.command = None;
        self.angles = self.kind.default_motor_angles();
        self.velocities = vec![0.0; n];
        self.contacts = vec![!self.on_rack; NUM_LEGS];
        self.base_position = Vector3::new(0.0, 0.0, self.standing_height());
        self.rpy = Vector3::zeros();
        self.rpy_rate = Vector3::zeros();
        self.time = 0.0;
    }

    fn standing_height(&self) -> f64 {
        match self.on_rack {
            true => self.kind.default_base_height() + RACK_HEIGHT,
            false => self.kind.default_base_height(),
        }
    }

    fn hip_index(&self, leg: usize) -> usize {
        match self.kind.motors_per_leg() {
            3 => leg * 3 + 1,
            n => leg * n,
        }
    }

    fn joint_torque(&self, i: usize, command: &[f64], mode: MotorControlMode) -> f64 {
        let (q, dq) = (self.angles[i], self.velocities[i]);
        let torque = match mode {
            MotorControlMode::Position => POSITION_KP * (command[i] - q) - POSITION_KD * dq,
            MotorControlMode::Torque => command[i],
            MotorControlMode::Hybrid => {
                let c = &command[5 * i..5 * i + 5];
                c[1] * (c[0] - q) + c[3] * (c[2] - dq) + c[4]
            }
        };
        let max = self.limits[i].max_torque;
        torque.max(-max).min(max)
    }

    fn step_joints(&mut self, dt: f64) {
        let (command, mode) = match &self.command {
            Some((c, m)) => (c.clone(), *m),
            None => (self.kind.default_motor_angles(), MotorControlMode::Position),
        };
        for i in 0..self.angles.len() {
            let limits = self.limits[i];
            let torque = self.joint_torque(i, &command, mode);
            let dq = (self.velocities[i] + torque / JOINT_INERTIA * dt)
                .max(-limits.max_velocity)
                .min(limits.max_velocity);
            let q = self.angles[i] + dq * dt;
            if q < limits.min_angle || q > limits.max_angle {
                self.angles[i] = q.max(limits.min_angle).min(limits.max_angle);
                self.velocities[i] = 0.0;
            } else {
                self.angles[i] = q;
                self.velocities[i] = dq;
            }
        }
    }

    fn step_base(&mut self, dt: f64) {
        if self.on_rack {
            self.contacts = vec![false; NUM_LEGS];
            return;
        }

        let defaults = self.kind.default_motor_angles();
        let mut sweep = 0.0;
        let mut offsets = [0.0; NUM_LEGS];
        for leg in 0..NUM_LEGS {
            let hip = self.hip_index(leg);
            let hip_velocity = self.velocities[hip];
            self.contacts[leg] = hip_velocity <= 0.0;
            if self.contacts[leg] {
                sweep -= hip_velocity;
            }
            offsets[leg] = self.angles[hip] - defaults[hip];
        }

        // Legs are ordered front right, front left, rear right, rear left.
        let roll = TILT_PER_RAD * ((offsets[1] + offsets[3]) - (offsets[0] + offsets[2])) / 2.0;
        let pitch = TILT_PER_RAD * ((offsets[0] + offsets[1]) - (offsets[2] + offsets[3])) / 2.0;
        let rpy = Vector3::new(roll, pitch, self.rpy.z);
        self.rpy_rate = (rpy - self.rpy) / dt;
        self.rpy = rpy;

        let forward = STRIDE_PER_RAD * sweep / NUM_LEGS as f64 * dt;
        let heading = UnitQuaternion::from_euler_angles(0.0, 0.0, self.rpy.z);
        self.base_position += heading * Vector3::new(forward, 0.0, 0.0);
    }
}

impl Robot for KinematicRobot {
    fn kind(&self) -> RobotKind {
        self.kind
    }

    fn reset(&mut self, params: &SimulationParameters) -> Result<()> {
        self.on_rack = params.robot_on_rack();
        self.stand();

        // Hold the standing pose for the settling time.
        if params.reset_time() > 0.0 {
            let dt = params.sim_time_step_s();
            let n = (params.reset_time() / dt).ceil() as usize;
            for _ in 0..n {
                self.step_joints(dt);
            }
            self.time = 0.0;
        }
        trace!("KinematicRobot::reset(), kind = {:?}", self.kind);
        Ok(())
    }

    fn apply_action(&mut self, command: &[f64], mode: MotorControlMode) -> Result<()> {
        let expected = self.kind.num_motors() * mode.values_per_motor();
        if command.len() != expected {
            return Err(LocomotionError::ActionDimension {
                expected,
                found: command.len(),
            }
            .into());
        }
        self.command = Some((command.to_vec(), mode));
        Ok(())
    }

    fn step_simulation(&mut self, dt: f64) -> Result<()> {
        self.step_joints(dt);
        self.step_base(dt);
        self.time += dt;
        Ok(())
    }

    fn base_position(&self) -> Result<Vector3<f64>> {
        Ok(self.base_position)
    }

    fn base_orientation(&self) -> Result<UnitQuaternion<f64>> {
        Ok(UnitQuaternion::from_euler_angles(
            self.rpy.x, self.rpy.y, self.rpy.z,
        ))
    }

    fn base_roll_pitch_yaw_rate(&self) -> Result<Vector3<f64>> {
        Ok(self.rpy_rate)
    }

    fn motor_angles(&self) -> Result<Vec<f64>> {
        Ok(self.angles.clone())
    }

    fn motor_velocities(&self) -> Result<Vec<f64>> {
        Ok(self.velocities.clone())
    }

    fn foot_contacts(&self) -> Result<Vec<bool>> {
        Ok(self.contacts.clone())
    }

    fn time_since_reset(&self) -> f64 {
        self.time
    }

    fn is_safe(&self) -> bool {
        self.rpy.x.cos() * self.rpy.y.cos() > 0.0
    }
}

/// Builds [`KinematicRobot`]s.
#[derive(Clone, Debug, Default)]
pub struct KinematicRobotFactory;

impl RobotFactory for KinematicRobotFactory {
    fn make(&self, kind: RobotKind, params: &SimulationParameters) -> Result<Box<dyn Robot>> {
        Ok(Box::new(KinematicRobot::new(kind, params)))
    }
}
