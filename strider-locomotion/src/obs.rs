//! Observations and actions of locomotion environments.
use ndarray::Array1;
use strider_core::{Act, BoxSpace, Obs};

/// Observation as an ordered mapping from sensor name to values.
///
/// The order is the order of the sensors in the environment's
/// [`SensorSet`](crate::SensorSet).
#[derive(Clone, Debug, PartialEq)]
pub struct DictObs(pub Vec<(String, Array1<f32>)>);

impl DictObs {
    /// Sensor names in order.
    pub fn keys(&self) -> Vec<String> {
        self.0.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Values of the sensor with the given name.
    pub fn get(&self, key: &str) -> Option<&Array1<f32>> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl Obs for DictObs {
    fn len(&self) -> usize {
        self.0.iter().map(|(_, v)| v.len()).sum()
    }
}

/// Observation as a single array, as consumed by a learner.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatObs(pub Array1<f32>);

impl Obs for FlatObs {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<FlatObs> for Array1<f32> {
    fn from(obs: FlatObs) -> Self {
        obs.0
    }
}

/// Action as an array of joint commands or command residuals.
#[derive(Clone, Debug, PartialEq)]
pub struct JointAct(pub Array1<f32>);

impl JointAct {
    /// Constructs an action from a vector of values.
    pub fn from_vec(v: Vec<f32>) -> Self {
        Self(Array1::from(v))
    }

    /// An action of `dim` zeros.
    pub fn zeros(dim: usize) -> Self {
        Self(Array1::zeros(dim))
    }
}

impl Act for JointAct {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<JointAct> for Array1<f32> {
    fn from(act: JointAct) -> Self {
        act.0
    }
}

/// Observation space of a [`DictObs`]: the space of each sensor, in order.
#[derive(Clone, Debug, PartialEq)]
pub struct DictSpace(pub Vec<(String, BoxSpace)>);

impl DictSpace {
    /// Sensor names in order.
    pub fn keys(&self) -> Vec<String> {
        self.0.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Concatenation of the spaces of all sensors, in order.
    pub fn flatten(&self) -> BoxSpace {
        BoxSpace::concat(self.0.iter().map(|(_, s)| s))
    }
}
