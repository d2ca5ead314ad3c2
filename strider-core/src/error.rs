//! Errors in the library.
use thiserror::Error;

/// Errors in the library.
#[derive(Error, Debug, PartialEq)]
pub enum StriderError {
    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Lower and upper bounds of a space have different lengths.
    #[error("Space bounds have different lengths: low = {low}, high = {high}")]
    SpaceBoundsMismatch {
        /// Length of the lower bound.
        low: usize,
        /// Length of the upper bound.
        high: usize,
    },

    /// A lower bound exceeds the corresponding upper bound.
    #[error("Space lower bound exceeds upper bound at index {0}")]
    SpaceBoundsInverted(usize),
}
