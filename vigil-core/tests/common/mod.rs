//! Common test utilities for integration tests
//!
//! This module provides:
//! - Stub scorers with observable fit behaviour
//! - Sensor line generators for calibration and anomaly bursts
//! - Pre-built line scenarios

#![allow(dead_code)]

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vigil_core::{
    AnomalyScorer, DetectionPipeline, FeatureVector, PipelineConfig, ScorerError, ScorerResult,
    TrainedScorer,
};

pub mod generators;
pub mod scenarios;

/// Vibration above which the stub model calls a record anomalous
pub const VIBRATION_LIMIT: f64 = 50.0;

/// Scorer that counts fits and flags high vibration
///
/// Clones share the counters, so a test can keep one clone and hand the
/// other to the pipeline.
#[derive(Clone, Default)]
pub struct CountingScorer {
    fits: Arc<AtomicUsize>,
    last_batch: Arc<AtomicUsize>,
}

impl CountingScorer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `fit` ran
    pub fn fits(&self) -> usize {
        self.fits.load(Ordering::SeqCst)
    }

    /// Size of the most recent training batch
    pub fn last_batch(&self) -> usize {
        self.last_batch.load(Ordering::SeqCst)
    }
}

/// Fitted form of [`CountingScorer`]
pub struct VibrationModel;

impl AnomalyScorer for CountingScorer {
    type Trained = VibrationModel;

    fn fit(&self, batch: &[FeatureVector]) -> ScorerResult<VibrationModel> {
        if batch.is_empty() {
            return Err(ScorerError::EmptyBatch);
        }
        self.fits.fetch_add(1, Ordering::SeqCst);
        self.last_batch.store(batch.len(), Ordering::SeqCst);
        Ok(VibrationModel)
    }
}

impl TrainedScorer for VibrationModel {
    fn score(&self, features: &FeatureVector) -> f64 {
        VIBRATION_LIMIT - features[1]
    }
}

/// Scorer whose fit always fails
#[derive(Clone, Copy, Default)]
pub struct FailingScorer;

impl AnomalyScorer for FailingScorer {
    type Trained = VibrationModel;

    fn fit(&self, _batch: &[FeatureVector]) -> ScorerResult<VibrationModel> {
        Err(ScorerError::Training("degenerate calibration batch".into()))
    }
}

/// Non-zero helper for test sizes
pub fn nz(n: usize) -> NonZeroUsize {
    NonZeroUsize::new(n).expect("test sizes are non-zero")
}

/// Pipeline with default sizing around a fresh counting scorer
pub fn default_pipeline() -> (DetectionPipeline<CountingScorer>, CountingScorer) {
    let scorer = CountingScorer::new();
    (DetectionPipeline::new(scorer.clone(), PipelineConfig::default()), scorer)
}

/// Pipeline with custom sizing around a fresh counting scorer
pub fn sized_pipeline(
    calibration: usize,
    window: usize,
) -> (DetectionPipeline<CountingScorer>, CountingScorer) {
    let scorer = CountingScorer::new();
    let config = PipelineConfig::default()
        .with_calibration_samples(nz(calibration))
        .with_window_capacity(nz(window));
    (DetectionPipeline::new(scorer.clone(), config), scorer)
}
