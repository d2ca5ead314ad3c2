use super::Sensor;
use crate::{robot::NUM_LEGS, Robot};
use anyhow::Result;
use ndarray::Array1;
use strider_core::BoxSpace;

/// One flag per foot, `1.0` while the foot touches the ground.
pub struct FootContactSensor {
    space: BoxSpace,
}

impl FootContactSensor {
    /// A sensor reading the contact flags of every leg.
    pub fn new() -> Self {
        // Bounds are ordered, so the space is always valid.
        let space = BoxSpace::uniform(NUM_LEGS, 0.0, 1.0)
            .unwrap_or_else(|_| BoxSpace::symmetric(&[1.0; NUM_LEGS]));
        Self { space }
    }
}

impl Default for FootContactSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for FootContactSensor {
    fn name(&self) -> &str {
        "FootContactSensor"
    }

    fn space(&self) -> &BoxSpace {
        &self.space
    }

    fn observation(&self, robot: &dyn Robot) -> Result<Array1<f32>> {
        Ok(robot
            .foot_contacts()?
            .into_iter()
            .map(|c| if c { 1.0 } else { 0.0 })
            .collect())
    }
}
