//! Calibration batch accumulation
//!
//! Collects the feature vectors of the first `N` records. Once `N` vectors are
//! held the buffer freezes: further pushes are refused until it is cleared.

use core::num::NonZeroUsize;

use crate::record::FeatureVector;

/// Outcome of offering a vector to the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalibrationProgress {
    /// Stored; the buffer still needs more vectors
    Collecting {
        /// Vectors held after this push
        collected: usize,
    },
    /// Stored, and this vector completed the batch
    Complete,
    /// Refused, the buffer was already frozen
    Frozen,
}

/// Bounded, append-only batch of calibration vectors
#[derive(Debug, Clone)]
pub struct CalibrationBuffer {
    samples: Vec<FeatureVector>,
    target: NonZeroUsize,
}

impl CalibrationBuffer {
    /// Create an empty buffer that freezes at `target` vectors
    pub fn new(target: NonZeroUsize) -> Self {
        Self {
            samples: Vec::with_capacity(target.get()),
            target,
        }
    }

    /// Append a vector unless the buffer is frozen
    pub fn push(&mut self, features: FeatureVector) -> CalibrationProgress {
        if self.is_frozen() {
            return CalibrationProgress::Frozen;
        }

        self.samples.push(features);

        if self.is_frozen() {
            CalibrationProgress::Complete
        } else {
            CalibrationProgress::Collecting {
                collected: self.samples.len(),
            }
        }
    }

    /// Whether the batch is complete
    pub fn is_frozen(&self) -> bool {
        self.samples.len() >= self.target.get()
    }

    /// Number of vectors held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no vector has been collected
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Vectors needed to freeze
    pub fn target(&self) -> usize {
        self.target.get()
    }

    /// The collected batch, in arrival order
    pub fn samples(&self) -> &[FeatureVector] {
        &self.samples
    }

    /// Drop every vector and unfreeze
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
