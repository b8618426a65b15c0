//! Pipeline Sizing Constants
//!
//! Shape of a feature record and the default sizes of the calibration batch
//! and the anomaly window.

// ===== RECORD SHAPE =====

/// Number of sensor fields in one transport line.
///
/// Humidity, vibration, infrared presence and three potentiometers. The
/// record layout is fixed at this width; changing it means changing
/// [`FeatureRecord`](crate::record::FeatureRecord) as well.
pub const SENSOR_FIELDS: usize = 6;

/// Zero-based position of the presence flag within a line.
pub const PRESENCE_FIELD_INDEX: usize = 2;

// ===== CALIBRATION =====

/// Records collected before the model is trained.
///
/// At the board's default output rate of roughly one line per second this is
/// a little under two minutes of normal operation.
pub const DEFAULT_CALIBRATION_SAMPLES: usize = 100;

/// Log calibration progress every this many records.
pub const CALIBRATION_LOG_INTERVAL: usize = 10;

// ===== ANOMALY WINDOW =====

/// Number of recent detections the failure probability is computed over.
pub const DEFAULT_WINDOW_CAPACITY: usize = 50;

/// Decision scores strictly below this value are anomalous.
pub const ANOMALY_SCORE_THRESHOLD: f64 = 0.0;
