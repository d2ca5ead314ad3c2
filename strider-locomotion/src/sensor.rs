//! Sensors and the ordered set of sensors attached to an environment.
mod base;
mod contact;
mod motor;
use crate::{DictObs, DictSpace, LocomotionError, Robot};
use anyhow::Result;
use ndarray::Array1;
use strider_core::BoxSpace;

pub use base::{Axis, BaseDisplacementSensor, ImuChannel, ImuSensor};
pub use contact::FootContactSensor;
pub use motor::{MotorAngleSensor, MotorVelocitySensor};

/// A sensor produces a named, fixed-length array of values every step.
pub trait Sensor {
    /// Name of the sensor, used as the key of its values in a [`DictObs`].
    fn name(&self) -> &str;

    /// Shape and bounds of the values, fixed at construction.
    fn space(&self) -> &BoxSpace;

    /// Called after the robot has been reset.
    fn on_reset(&mut self, _robot: &dyn Robot) -> Result<()> {
        Ok(())
    }

    /// Called after every environment step, before observations are read.
    fn on_step(&mut self, _robot: &dyn Robot) -> Result<()> {
        Ok(())
    }

    /// Reads the current values.
    fn observation(&self, robot: &dyn Robot) -> Result<Array1<f32>>;
}

/// Sensors of an environment, in a fixed order.
///
/// The order is the order of the entries of every observation and, after flattening,
/// the positional layout seen by a learner. It cannot change once the set is built.
#[derive(Default)]
pub struct SensorSet {
    sensors: Vec<Box<dyn Sensor>>,
}

impl SensorSet {
    /// Builds a set from sensors with distinct names.
    pub fn new(sensors: Vec<Box<dyn Sensor>>) -> Result<Self, LocomotionError> {
        for (i, s) in sensors.iter().enumerate() {
            if sensors[..i].iter().any(|t| t.name() == s.name()) {
                return Err(LocomotionError::DuplicateSensor(s.name().to_string()));
            }
        }
        Ok(Self { sensors })
    }

    /// Sensor names in order.
    pub fn names(&self) -> Vec<String> {
        self.sensors.iter().map(|s| s.name().to_string()).collect()
    }

    /// Number of sensors.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Returns `true` if there are no sensors.
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Observation space, one entry per sensor.
    pub fn space(&self) -> DictSpace {
        DictSpace(
            self.sensors
                .iter()
                .map(|s| (s.name().to_string(), s.space().clone()))
                .collect(),
        )
    }

    /// Notifies every sensor of a reset.
    pub fn on_reset(&mut self, robot: &dyn Robot) -> Result<()> {
        self.sensors.iter_mut().try_for_each(|s| s.on_reset(robot))
    }

    /// Notifies every sensor of a step.
    pub fn on_step(&mut self, robot: &dyn Robot) -> Result<()> {
        self.sensors.iter_mut().try_for_each(|s| s.on_step(robot))
    }

    /// Reads every sensor.
    pub fn observe(&self, robot: &dyn Robot) -> Result<DictObs> {
        let entries = self
            .sensors
            .iter()
            .map(|s| Ok((s.name().to_string(), s.observation(robot)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(DictObs(entries))
    }
}

fn to_array(v: impl IntoIterator<Item = f64>) -> Array1<f32> {
    v.into_iter().map(|x| x as f32).collect()
}
