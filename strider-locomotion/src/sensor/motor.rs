use super::{to_array, Sensor};
use crate::Robot;
use anyhow::Result;
use ndarray::Array1;
use std::f32::consts::PI;
use strider_core::BoxSpace;

/// Largest motor velocity reported by [`MotorVelocitySensor`]'s space, in rad/s.
const MAX_MOTOR_VELOCITY: f32 = 100.0;

/// Motor angles in radians.
pub struct MotorAngleSensor {
    space: BoxSpace,
}

impl MotorAngleSensor {
    /// A sensor reading `num_motors` angles.
    pub fn new(num_motors: usize) -> Self {
        Self {
            space: BoxSpace::symmetric(&vec![PI; num_motors]),
        }
    }
}

impl Sensor for MotorAngleSensor {
    fn name(&self) -> &str {
        "MotorAngle"
    }

    fn space(&self) -> &BoxSpace {
        &self.space
    }

    fn observation(&self, robot: &dyn Robot) -> Result<Array1<f32>> {
        Ok(to_array(robot.motor_angles()?))
    }
}

/// Motor velocities in rad/s.
pub struct MotorVelocitySensor {
    space: BoxSpace,
}

impl MotorVelocitySensor {
    /// A sensor reading `num_motors` velocities.
    pub fn new(num_motors: usize) -> Self {
        Self {
            space: BoxSpace::symmetric(&vec![MAX_MOTOR_VELOCITY; num_motors]),
        }
    }
}

impl Sensor for MotorVelocitySensor {
    fn name(&self) -> &str {
        "MotorVelocity"
    }

    fn space(&self) -> &BoxSpace {
        &self.space
    }

    fn observation(&self, robot: &dyn Robot) -> Result<Array1<f32>> {
        Ok(to_array(robot.motor_velocities()?))
    }
}
