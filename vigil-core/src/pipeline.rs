//! Detection Pipeline: calibrate once, then score
//!
//! ## State Machine
//!
//! ```text
//!              N-th record, fit Ok
//! Calibrating ─────────────────────▶ Detecting
//!      │                                 │
//!      │ N-th record, fit Err            │ (terminal until reset)
//!      ▼                                 │
//!   Faulted ◀────────── reset() ─────────┘──▶ Calibrating
//! ```
//!
//! - **Calibrating**: every record's feature vector is appended to the
//!   calibration buffer and `0.0` is returned. The record that brings the
//!   buffer to `N` triggers the single training run and still returns `0.0`;
//!   the first score is produced by record `N + 1`.
//! - **Detecting**: every record is scored, classified anomalous when the
//!   score is negative, and the decision is pushed into the anomaly window.
//!   The return value is the window's failure probability.
//! - **Faulted**: the model failed to fit. The failure is reported by the
//!   call that triggered training; every later call reports
//!   [`PipelineError::ModelUnavailable`]. Training is never retried
//!   implicitly.
//!
//! [`DetectionPipeline::reset`] returns to a state indistinguishable from a
//! freshly constructed pipeline.

use core::num::NonZeroUsize;

use log::{error, info, warn};
use serde::Serialize;

use crate::calibration::{CalibrationBuffer, CalibrationProgress};
use crate::constants::{
    ANOMALY_SCORE_THRESHOLD, CALIBRATION_LOG_INTERVAL, DEFAULT_CALIBRATION_SAMPLES,
    DEFAULT_WINDOW_CAPACITY,
};
use crate::errors::{PipelineError, PipelineResult};
use crate::record::{FeatureRecord, FeatureVector};
use crate::traits::{AnomalyScorer, TrainedScorer};
use crate::window::AnomalyWindow;

/// Sizing of the calibration batch and the anomaly window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Records collected before training
    pub calibration_samples: NonZeroUsize,
    /// Detections the failure probability is computed over
    pub window_capacity: NonZeroUsize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            calibration_samples: NonZeroUsize::new(DEFAULT_CALIBRATION_SAMPLES)
                .unwrap_or(NonZeroUsize::MIN),
            window_capacity: NonZeroUsize::new(DEFAULT_WINDOW_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl PipelineConfig {
    /// Set the calibration batch size
    pub fn with_calibration_samples(mut self, samples: NonZeroUsize) -> Self {
        self.calibration_samples = samples;
        self
    }

    /// Set the anomaly window capacity
    pub fn with_window_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.window_capacity = capacity;
        self
    }
}

/// Externally visible pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Collecting the calibration batch
    Calibrating,
    /// Model trained, records are scored
    Detecting,
    /// Training failed, waiting for a reset
    Faulted,
}

/// What the pipeline did with one record
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Added to the calibration batch
    Calibrating {
        /// Records collected so far
        collected: usize,
        /// Records needed before training
        target: usize,
    },
    /// Completed the calibration batch; the model was trained on it
    Trained {
        /// Size of the training batch
        samples: usize,
    },
    /// Scored by the trained model
    Scored {
        /// Decision value, negative when anomalous
        score: f64,
        /// Whether the record was classified anomalous
        anomalous: bool,
    },
}

/// Result of feeding one record to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Assessment {
    /// What happened to the record
    pub outcome: Outcome,
    /// Anomalies in the window divided by the window capacity
    pub failure_probability: f64,
}

impl Assessment {
    /// Phase that handled the record
    pub fn phase(&self) -> Phase {
        match self.outcome {
            Outcome::Calibrating { .. } => Phase::Calibrating,
            Outcome::Trained { .. } | Outcome::Scored { .. } => Phase::Detecting,
        }
    }
}

/// Snapshot of the pipeline's internal state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipelineStatus {
    /// Current phase
    pub phase: Phase,
    /// Calibration records collected
    pub calibration_collected: usize,
    /// Calibration records needed
    pub calibration_target: usize,
    /// Decisions in the anomaly window
    pub window_len: usize,
    /// Capacity of the anomaly window
    pub window_capacity: usize,
    /// Anomalous decisions in the window
    pub window_anomalies: usize,
    /// Current failure probability
    pub failure_probability: f64,
    /// Times the model has been fitted since construction or reset
    pub training_events: usize,
    /// Records scored since training
    pub records_scored: u64,
}

enum State<T> {
    Calibrating,
    Detecting(T),
    Faulted,
}

/// Calibration buffer, trainable model and anomaly window behind one
/// `ingest` entry point
///
/// ## Example
///
/// ```rust
/// use core::num::NonZeroUsize;
/// use vigil_core::{
///     AnomalyScorer, DetectionPipeline, FeatureRecord, FeatureVector, PipelineConfig,
///     Presence, ScorerResult, TrainedScorer,
/// };
///
/// struct Always(f64);
/// impl AnomalyScorer for Always {
///     type Trained = Always;
///     fn fit(&self, _batch: &[FeatureVector]) -> ScorerResult<Always> {
///         Ok(Always(self.0))
///     }
/// }
/// impl TrainedScorer for Always {
///     fn score(&self, _features: &FeatureVector) -> f64 {
///         self.0
///     }
/// }
///
/// let config = PipelineConfig::default()
///     .with_calibration_samples(NonZeroUsize::new(2).unwrap())
///     .with_window_capacity(NonZeroUsize::new(4).unwrap());
/// let mut pipeline = DetectionPipeline::new(Always(-1.0), config);
/// let record = FeatureRecord::new(40, 1, Presence::Clear, [0, 0, 0]);
///
/// assert_eq!(pipeline.ingest(&record).unwrap(), 0.0); // calibrating
/// assert_eq!(pipeline.ingest(&record).unwrap(), 0.0); // trains
/// assert_eq!(pipeline.ingest(&record).unwrap(), 0.25); // 1 anomaly / 4
/// ```
pub struct DetectionPipeline<S: AnomalyScorer> {
    config: PipelineConfig,
    scorer: S,
    state: State<S::Trained>,
    calibration: CalibrationBuffer,
    window: AnomalyWindow,
    training_events: usize,
    records_scored: u64,
}

impl<S: AnomalyScorer> DetectionPipeline<S> {
    /// Create a pipeline in the calibrating phase
    pub fn new(scorer: S, config: PipelineConfig) -> Self {
        Self {
            config,
            scorer,
            state: State::Calibrating,
            calibration: CalibrationBuffer::new(config.calibration_samples),
            window: AnomalyWindow::new(config.window_capacity),
            training_events: 0,
            records_scored: 0,
        }
    }

    /// Feed one record and return the current failure probability
    ///
    /// Always `0.0` while calibrating, including the record that triggers
    /// training.
    pub fn ingest(&mut self, record: &FeatureRecord) -> PipelineResult<f64> {
        self.assess(record).map(|a| a.failure_probability)
    }

    /// Feed one record and describe what happened to it
    pub fn assess(&mut self, record: &FeatureRecord) -> PipelineResult<Assessment> {
        let features = record.features();

        if let State::Detecting(model) = &self.state {
            let score = model.score(&features);
            return Ok(self.record_decision(score));
        }
        if let State::Faulted = self.state {
            return Err(PipelineError::ModelUnavailable);
        }

        self.calibrate(features)
    }

    fn calibrate(&mut self, features: FeatureVector) -> PipelineResult<Assessment> {
        let target = self.calibration.target();

        match self.calibration.push(features) {
            CalibrationProgress::Collecting { collected } => {
                if collected % CALIBRATION_LOG_INTERVAL == 0 {
                    info!("{}/{} calibration samples received", collected, target);
                }
                Ok(Assessment {
                    outcome: Outcome::Calibrating { collected, target },
                    failure_probability: 0.0,
                })
            }
            CalibrationProgress::Complete => {
                self.train()?;
                Ok(Assessment {
                    outcome: Outcome::Trained { samples: target },
                    failure_probability: 0.0,
                })
            }
            // Only reachable if the state and the buffer disagree
            CalibrationProgress::Frozen => Err(PipelineError::ModelUnavailable),
        }
    }

    fn train(&mut self) -> PipelineResult<()> {
        let samples = self.calibration.len();
        info!("Training anomaly model on {} calibration samples", samples);
        self.training_events += 1;

        match self.scorer.fit(self.calibration.samples()) {
            Ok(model) => {
                self.state = State::Detecting(model);
                info!("Training complete, anomaly detection active");
                Ok(())
            }
            Err(source) => {
                self.state = State::Faulted;
                error!("Anomaly model training failed: {}", source);
                Err(PipelineError::TrainingFailed { samples, source })
            }
        }
    }

    fn record_decision(&mut self, score: f64) -> Assessment {
        let anomalous = score < ANOMALY_SCORE_THRESHOLD;
        self.window.push(anomalous);
        self.records_scored += 1;

        let failure_probability = self.window.failure_probability();
        if anomalous {
            warn!(
                "Anomaly detected: score={:.4} failure_probability={:.2}",
                score, failure_probability
            );
        }

        Assessment {
            outcome: Outcome::Scored { score, anomalous },
            failure_probability,
        }
    }

    /// Discard the model, the calibration batch and the window
    pub fn reset(&mut self) {
        self.state = State::Calibrating;
        self.calibration.clear();
        self.window.clear();
        self.training_events = 0;
        self.records_scored = 0;
        info!("Pipeline reset, recalibrating");
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Calibrating => Phase::Calibrating,
            State::Detecting(_) => Phase::Detecting,
            State::Faulted => Phase::Faulted,
        }
    }

    /// Whether a trained model is available
    pub fn is_trained(&self) -> bool {
        matches!(self.state, State::Detecting(_))
    }

    /// Configuration the pipeline was built with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Calibration batch
    pub fn calibration(&self) -> &CalibrationBuffer {
        &self.calibration
    }

    /// Anomaly window
    pub fn window(&self) -> &AnomalyWindow {
        &self.window
    }

    /// Times the model has been fitted since construction or the last reset
    pub fn training_events(&self) -> usize {
        self.training_events
    }

    /// Snapshot of the pipeline's state
    pub fn status(&self) -> PipelineStatus {
        PipelineStatus {
            phase: self.phase(),
            calibration_collected: self.calibration.len(),
            calibration_target: self.calibration.target(),
            window_len: self.window.len(),
            window_capacity: self.window.capacity(),
            window_anomalies: self.window.anomaly_count(),
            failure_probability: self.window.failure_probability(),
            training_events: self.training_events,
            records_scored: self.records_scored,
        }
    }
}
