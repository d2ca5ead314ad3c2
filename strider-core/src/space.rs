//! Continuous box space.
use crate::error::StriderError;
use ndarray::{concatenate, Array1, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

/// A box in `R^n`, given by element-wise lower and upper bounds.
///
/// Used to declare the shapes and bounds of observations and actions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoxSpace {
    low: Array1<f32>,
    high: Array1<f32>,
}

impl BoxSpace {
    /// Constructs a space from lower and upper bounds.
    pub fn new(low: Array1<f32>, high: Array1<f32>) -> Result<Self, StriderError> {
        if low.len() != high.len() {
            return Err(StriderError::SpaceBoundsMismatch {
                low: low.len(),
                high: high.len(),
            });
        }
        if let Some(ix) = low.iter().zip(high.iter()).position(|(l, h)| l > h) {
            return Err(StriderError::SpaceBoundsInverted(ix));
        }
        Ok(Self { low, high })
    }

    /// Constructs the space `[-limit_i, limit_i]` for each element of `limits`.
    pub fn symmetric(limits: &[f32]) -> Self {
        let high = Array1::from(limits.iter().map(|v| v.abs()).collect::<Vec<_>>());
        Self { low: -&high, high }
    }

    /// Constructs a space of `dim` elements sharing the same bounds.
    pub fn uniform(dim: usize, low: f32, high: f32) -> Result<Self, StriderError> {
        Self::new(Array1::from_elem(dim, low), Array1::from_elem(dim, high))
    }

    /// Stacks spaces one after another, in the given order.
    pub fn concat<'a>(spaces: impl IntoIterator<Item = &'a BoxSpace>) -> Self {
        let (lows, highs): (Vec<ArrayView1<f32>>, Vec<ArrayView1<f32>>) = spaces
            .into_iter()
            .map(|s| (s.low.view(), s.high.view()))
            .unzip();
        if lows.is_empty() {
            return Self {
                low: Array1::zeros(0),
                high: Array1::zeros(0),
            };
        }
        // Concatenating 1-d arrays along their only axis cannot fail.
        Self {
            low: concatenate(Axis(0), &lows).unwrap_or_else(|_| Array1::zeros(0)),
            high: concatenate(Axis(0), &highs).unwrap_or_else(|_| Array1::zeros(0)),
        }
    }

    /// Number of elements.
    pub fn dim(&self) -> usize {
        self.low.len()
    }

    /// Lower bound.
    pub fn low(&self) -> &Array1<f32> {
        &self.low
    }

    /// Upper bound.
    pub fn high(&self) -> &Array1<f32> {
        &self.high
    }

    /// Returns `true` if `x` has the dimension of the space and lies inside it.
    pub fn contains(&self, x: &[f32]) -> bool {
        x.len() == self.dim()
            && x
                .iter()
                .zip(self.low.iter().zip(self.high.iter()))
                .all(|(v, (l, h))| l <= v && v <= h)
    }

    /// Clips `x` element-wise into the space.
    pub fn clip(&self, x: &mut [f32]) {
        x.iter_mut()
            .zip(self.low.iter().zip(self.high.iter()))
            .for_each(|(v, (l, h))| *v = v.max(*l).min(*h));
    }
}
