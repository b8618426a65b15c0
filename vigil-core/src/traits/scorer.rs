//! Anomaly Model Traits
//!
//! The pipeline never knows which algorithm sits behind it. A model is split
//! in two types:
//!
//! - an [`AnomalyScorer`] holds the hyper-parameters and can only `fit`
//! - fitting yields a [`TrainedScorer`], the only type that can `score`
//!
//! Scoring an untrained model is therefore not expressible: there is no
//! value to call `score` on until `fit` has succeeded.
//!
//! ## Score Convention
//!
//! `score` returns a decision value where negative means anomalous and
//! larger means more normal. Implementations are expected to centre the
//! value so that `0.0` is the decision boundary.
//!
//! ## Example
//!
//! ```rust
//! use vigil_core::{AnomalyScorer, FeatureVector, ScorerError, ScorerResult, TrainedScorer};
//!
//! /// Flags readings whose humidity exceeds the calibration maximum
//! struct HumidityCeiling;
//!
//! struct FittedCeiling(f64);
//!
//! impl AnomalyScorer for HumidityCeiling {
//!     type Trained = FittedCeiling;
//!
//!     fn fit(&self, batch: &[FeatureVector]) -> ScorerResult<FittedCeiling> {
//!         let max = batch.iter().map(|f| f[0]).fold(f64::NAN, f64::max);
//!         if max.is_nan() {
//!             return Err(ScorerError::EmptyBatch);
//!         }
//!         Ok(FittedCeiling(max))
//!     }
//! }
//!
//! impl TrainedScorer for FittedCeiling {
//!     fn score(&self, features: &FeatureVector) -> f64 {
//!         self.0 - features[0]
//!     }
//! }
//! ```

use crate::errors::ScorerResult;
use crate::record::FeatureVector;

/// Untrained anomaly model
pub trait AnomalyScorer {
    /// Model produced by a successful fit
    type Trained: TrainedScorer;

    /// Train on the calibration batch
    ///
    /// Called exactly once per calibration with the complete batch.
    fn fit(&self, batch: &[FeatureVector]) -> ScorerResult<Self::Trained>;
}

/// Fitted anomaly model
pub trait TrainedScorer {
    /// Decision value for one record, negative when anomalous
    fn score(&self, features: &FeatureVector) -> f64;
}
