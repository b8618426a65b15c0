//! Latest-reading store shared with the request surface
//!
//! The ingestion worker is the only writer; HTTP handlers are readers. A
//! reading is built completely before it is published, and publication swaps
//! one `Arc` under a write lock, so a reader sees either the previous
//! reading or the new one, never a mix of both.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use crate::pipeline::{Assessment, Outcome, Phase};
use crate::record::{FeatureRecord, Presence};

/// Calibration progress attached to readings taken while calibrating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalibrationView {
    /// Records collected
    pub collected: usize,
    /// Records needed before training
    pub target: usize,
}

/// Most recent reading, enriched for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestReading {
    /// Position of this reading since start-up or the last reset
    pub sequence: u64,
    /// When the reading was processed
    pub received_at: DateTime<Utc>,
    /// Relative humidity (%)
    pub humidity: i32,
    /// Vibration level
    pub vibration: i32,
    /// Infrared presence state
    pub presence: Presence,
    /// Display label for `presence`
    pub presence_label: &'static str,
    /// First potentiometer
    pub pot1: i32,
    /// Second potentiometer
    pub pot2: i32,
    /// Third potentiometer
    pub pot3: i32,
    /// Failure probability after this reading
    pub failure_probability: f64,
    /// Phase that handled the reading
    pub phase: Phase,
    /// Calibration progress, while calibrating
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calibration: Option<CalibrationView>,
    /// Model decision value, once detecting
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Whether the model classified this reading anomalous
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anomalous: Option<bool>,
}

impl LatestReading {
    /// Combine a record with the pipeline's assessment of it
    pub fn new(sequence: u64, record: &FeatureRecord, assessment: &Assessment) -> Self {
        let (calibration, score, anomalous) = match assessment.outcome {
            Outcome::Calibrating { collected, target } => {
                (Some(CalibrationView { collected, target }), None, None)
            }
            Outcome::Trained { samples } => (
                Some(CalibrationView {
                    collected: samples,
                    target: samples,
                }),
                None,
                None,
            ),
            Outcome::Scored { score, anomalous } => (None, Some(score), Some(anomalous)),
        };

        Self {
            sequence,
            received_at: Utc::now(),
            humidity: record.humidity,
            vibration: record.vibration,
            presence: record.presence,
            presence_label: record.presence.label(),
            pot1: record.pots[0],
            pot2: record.pots[1],
            pot3: record.pots[2],
            failure_probability: assessment.failure_probability,
            phase: assessment.phase(),
            calibration,
            score,
            anomalous,
        }
    }
}

/// Cloneable handle to the latest published reading
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    latest: Arc<RwLock<Option<Arc<LatestReading>>>>,
}

impl StateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the latest reading
    pub fn publish(&self, reading: LatestReading) -> Arc<LatestReading> {
        let reading = Arc::new(reading);
        *self.latest.write() = Some(Arc::clone(&reading));
        reading
    }

    /// Latest reading, or `None` before the first one
    pub fn read(&self) -> Option<Arc<LatestReading>> {
        self.latest.read().clone()
    }

    /// Forget the latest reading
    pub fn clear(&self) {
        *self.latest.write() = None;
    }
}
