//! Isolation Forest anomaly model for Vigil
//!
//! ## Overview
//!
//! This crate provides the anomaly model the detection pipeline trains once
//! its calibration batch is complete. The pipeline only sees the
//! [`AnomalyScorer`](vigil_core::AnomalyScorer) capability; this crate is one
//! implementation of it.
//!
//! ## Why Isolation Forest?
//!
//! 1. **Unsupervised**: the calibration batch carries no labels
//! 2. **Small batches**: a hundred records are enough to build useful trees
//! 3. **Fast Inference**: O(log n) per tree per prediction
//! 4. **No training data kept**: only the tree structures survive fitting
//!
//! ## Algorithm Overview
//!
//! The algorithm isolates points by randomly partitioning data:
//! ```text
//! Normal points: need many partitions to isolate
//! Anomalies:     isolated with few partitions
//!
//! s(x)     = 2^(-E[h(x)] / c(ψ))       ψ = sub-sample size
//! decision = 0.5 - s(x)                negative means anomalous
//! ```
//!
//! `c(ψ)` is the average path length of an unsuccessful search in a binary
//! search tree built from `ψ` points; see [`average_path_length`].
//!
//! ## Defaults
//!
//! | Parameter      | Value                      |
//! |----------------|----------------------------|
//! | trees          | 100                        |
//! | sub-sample     | min(256, batch size)       |
//! | max depth      | ceil(log2(sub-sample))     |
//! | seed           | 42                         |
//! | offset         | 0.5                        |
//!
//! With a fixed seed, fitting the same batch twice produces the same forest.
//!
//! ## Performance Characteristics
//!
//! | Operation       | Time       | Memory |
//! |-----------------|------------|--------|
//! | Train tree      | O(ψ log ψ) | O(ψ)   |
//! | Score sample    | O(t log ψ) | O(1)   |
//!
//! ## Example
//!
//! ```rust
//! use vigil_core::{AnomalyScorer, TrainedScorer};
//! use vigil_ml::IsolationForestScorer;
//!
//! let batch: Vec<[f64; 6]> = (0..100)
//!     .map(|i| [50.0 + (i % 5) as f64, (i % 3) as f64, 0.0, 500.0, 300.0, 1000.0])
//!     .collect();
//!
//! let model = IsolationForestScorer::default().fit(&batch).unwrap();
//! let outlier = [50.0, 900.0, 1.0, 10.0, 1000.0, 0.0];
//! assert!(model.score(&outlier) < 0.0);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

use thiserror::Error;

pub mod forest;
pub mod node;
pub mod scorer;
pub mod scoring;
pub mod tree;

pub use forest::{ForestConfig, ForestStats, IsolationForest};
pub use node::{Node, NodeType};
pub use scorer::IsolationForestScorer;
pub use scoring::{calculate_anomaly_score, AnomalyScore};
pub use tree::{IsolationTree, TreeConfig};

// ===== FOREST DEFAULTS =====

/// Trees in the forest
pub const DEFAULT_NUM_TREES: usize = 100;

/// Upper bound on the per-tree sub-sample
pub const DEFAULT_SAMPLE_SIZE: usize = 256;

/// Seed for reproducible forests
pub const DEFAULT_SEED: u64 = 42;

/// Anomaly score above which a sample is anomalous
///
/// Equivalent to a decision value below zero.
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 0.5;

// ===== SAMPLE SHAPE =====

/// Widest sample the model accepts
pub const MAX_FEATURES: usize = 16;

/// Euler-Mascheroni constant
const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Result type for model operations
pub type MLResult<T> = Result<T, MLError>;

/// Model errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MLError {
    /// Nothing to train on
    #[error("insufficient training data")]
    InsufficientData,

    /// Feature index outside the sample
    #[error("feature index out of range")]
    InvalidFeature,

    /// Sample wider than [`MAX_FEATURES`]
    #[error("sample has {found} features, at most {max} are supported")]
    TooManyFeatures {
        /// Supported width
        max: usize,
        /// Width offered
        found: usize,
    },

    /// Samples of different widths in one batch
    #[error("expected {expected} features, found {found}")]
    FeatureMismatch {
        /// Width of the first sample
        expected: usize,
        /// Width of the offending sample
        found: usize,
    },

    /// Non-finite feature value
    #[error("feature {index} is not a finite number")]
    NonFinite {
        /// Feature position
        index: usize,
    },

    /// Unusable configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Fixed-width feature sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Feature storage; only the first `num_features` entries are used
    pub features: [f64; MAX_FEATURES],
    /// Number of features in use
    pub num_features: usize,
}

impl Sample {
    /// Build a sample from a feature slice
    pub fn new(values: &[f64]) -> MLResult<Self> {
        if values.len() > MAX_FEATURES {
            return Err(MLError::TooManyFeatures {
                max: MAX_FEATURES,
                found: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(MLError::NonFinite { index });
        }

        let mut features = [0.0; MAX_FEATURES];
        features[..values.len()].copy_from_slice(values);
        Ok(Self {
            features,
            num_features: values.len(),
        })
    }

    /// Feature at `index`
    pub fn get_feature(&self, index: usize) -> Option<f64> {
        if index < self.num_features {
            Some(self.features[index])
        } else {
            None
        }
    }

    /// Features in use
    pub fn values(&self) -> &[f64] {
        &self.features[..self.num_features]
    }
}

/// Small xorshift generator
///
/// Reproducible across platforms, which is all tree building needs.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    /// Seeded generator; a zero seed is remapped
    pub fn new(seed: u64) -> Self {
        // splitmix64 scramble so nearby seeds diverge
        let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        Self {
            state: if z == 0 { 0x2545_F491_4F6C_DD1D } else { z },
        }
    }

    /// Next raw value
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform index in `0..n`; `n` must be non-zero
    pub fn next_range(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Uniform value in `[0, 1)`
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform value in `[min, max)`
    pub fn next_f64_range(&mut self, min: f64, max: f64) -> f64 {
        min + self.next_f64() * (max - min)
    }
}

/// Natural logarithm
pub fn ln(x: f64) -> f64 {
    libm::log(x)
}

/// Average path length `c(n)` of an unsuccessful BST search over `n` points
///
/// `c(n) = 2 H(n-1) - 2 (n-1) / n`, with `H(i) ≈ ln(i) + γ`.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * (ln(n - 1.0) + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}
