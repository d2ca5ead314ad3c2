use super::{to_array, Sensor};
use crate::{
    math::{roll_pitch_yaw, world_to_heading_frame},
    Robot,
};
use anyhow::Result;
use nalgebra::Vector3;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use strider_core::BoxSpace;

/// Largest per-step base displacement declared in the space, in meters.
const MAX_DISPLACEMENT: f32 = 0.1;

/// Largest angular rate declared in the space, about 2000 deg/s.
const MAX_ANGULAR_RATE: f32 = 34.9;

/// An axis of the world frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    /// Forward.
    X,
    /// Left.
    Y,
    /// Up.
    Z,
}

impl Axis {
    fn index(&self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Displacement of the base during the last environment step.
///
/// The reading is zero right after a reset.
pub struct BaseDisplacementSensor {
    axes: Vec<Axis>,
    space: BoxSpace,
    heading_frame: bool,
    last_position: Vector3<f64>,
    displacement: Vector3<f64>,
}

impl BaseDisplacementSensor {
    /// A sensor reporting the displacement along the given world axes.
    pub fn new(axes: Vec<Axis>) -> Self {
        let space = BoxSpace::symmetric(&vec![MAX_DISPLACEMENT; axes.len()]);
        Self {
            axes,
            space,
            heading_frame: false,
            last_position: Vector3::zeros(),
            displacement: Vector3::zeros(),
        }
    }

    /// Expresses the displacement in the heading frame of the robot instead of the
    /// world frame.
    pub fn heading_frame(mut self, v: bool) -> Self {
        self.heading_frame = v;
        self
    }
}

impl Sensor for BaseDisplacementSensor {
    fn name(&self) -> &str {
        "BaseDisplacement"
    }

    fn space(&self) -> &BoxSpace {
        &self.space
    }

    fn on_reset(&mut self, robot: &dyn Robot) -> Result<()> {
        self.last_position = robot.base_position()?;
        self.displacement = Vector3::zeros();
        Ok(())
    }

    fn on_step(&mut self, robot: &dyn Robot) -> Result<()> {
        let position = robot.base_position()?;
        let delta = position - self.last_position;
        self.displacement = if self.heading_frame {
            let yaw = roll_pitch_yaw(&robot.base_orientation()?)[2];
            world_to_heading_frame(&delta, yaw)
        } else {
            delta
        };
        self.last_position = position;
        Ok(())
    }

    fn observation(&self, _robot: &dyn Robot) -> Result<Array1<f32>> {
        Ok(to_array(self.axes.iter().map(|a| self.displacement[a.index()])))
    }
}

/// A channel of the inertial measurement unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImuChannel {
    /// Roll angle.
    Roll,
    /// Pitch angle.
    Pitch,
    /// Yaw angle.
    Yaw,
    /// Roll rate.
    RollRate,
    /// Pitch rate.
    PitchRate,
    /// Yaw rate.
    YawRate,
}

impl ImuChannel {
    fn limit(&self) -> f32 {
        match self {
            Self::Roll | Self::Pitch | Self::Yaw => 2.0 * PI,
            _ => MAX_ANGULAR_RATE,
        }
    }
}

/// Orientation angles and angular rates of the base.
pub struct ImuSensor {
    channels: Vec<ImuChannel>,
    space: BoxSpace,
}

impl ImuSensor {
    /// A sensor reporting the given channels, in order.
    pub fn new(channels: Vec<ImuChannel>) -> Self {
        let limits = channels.iter().map(|c| c.limit()).collect::<Vec<_>>();
        Self {
            channels,
            space: BoxSpace::symmetric(&limits),
        }
    }
}

impl Sensor for ImuSensor {
    fn name(&self) -> &str {
        "IMU"
    }

    fn space(&self) -> &BoxSpace {
        &self.space
    }

    fn observation(&self, robot: &dyn Robot) -> Result<Array1<f32>> {
        let rpy = roll_pitch_yaw(&robot.base_orientation()?);
        let rate = robot.base_roll_pitch_yaw_rate()?;
        Ok(to_array(self.channels.iter().map(|c| match c {
            ImuChannel::Roll => rpy[0],
            ImuChannel::Pitch => rpy[1],
            ImuChannel::Yaw => rpy[2],
            ImuChannel::RollRate => rate[0],
            ImuChannel::PitchRate => rate[1],
            ImuChannel::YawRate => rate[2],
        })))
    }
}
