//! Errors in locomotion environments.
use thiserror::Error;

/// Errors in locomotion environments.
#[derive(Error, Debug, PartialEq)]
pub enum LocomotionError {
    /// The wrapped environment returned an observation whose keys differ from the
    /// ones recorded when the flattening wrapper was constructed.
    #[error("Observation keys changed: expected {expected:?}, found {found:?}")]
    ObservationKeyMismatch {
        /// Keys recorded at construction.
        expected: Vec<String>,
        /// Keys of the offending observation.
        found: Vec<String>,
    },

    /// An observation entry has a different length than declared by its sensor.
    #[error("Observation {key:?} has {found} values, expected {expected}")]
    ObservationShapeMismatch {
        /// Sensor name.
        key: String,
        /// Declared length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// Two sensors of a sensor set share a name.
    #[error("Sensor name {0:?} is used more than once")]
    DuplicateSensor(String),

    /// The length of an action does not match the action space.
    #[error("Action has {found} values, expected {expected}")]
    ActionDimension {
        /// Dimension of the action space.
        expected: usize,
        /// Length of the given action.
        found: usize,
    },

    /// An action contains a NaN or infinite value.
    #[error("Action value at index {0} is not finite")]
    NonFiniteAction(usize),

    /// A task was updated before being reset for the episode.
    #[error("Task updated before reset")]
    TaskNotReset,

    /// Simulation parameters failed validation.
    #[error("Invalid simulation parameters: {0}")]
    InvalidSimulationParameters(String),
}
