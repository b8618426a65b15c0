//! Constants for Vigil Core
//!
//! Centralised defaults for the anomaly-scoring pipeline and its transports.
//! Runtime configuration (environment, builder setters) always falls back to
//! the values defined here.
//!
//! ## Organization
//!
//! - **Pipeline**: record shape, calibration and window sizing
//! - **Transport**: serial line settings, timeouts and header detection

/// Record shape, calibration and sliding-window defaults.
pub mod pipeline;

/// Transport defaults: serial port, line rate, timeouts.
pub mod transport;

pub use pipeline::{
    SENSOR_FIELDS, PRESENCE_FIELD_INDEX, DEFAULT_CALIBRATION_SAMPLES,
    DEFAULT_WINDOW_CAPACITY, ANOMALY_SCORE_THRESHOLD, CALIBRATION_LOG_INTERVAL,
};

pub use transport::{
    DEFAULT_SERIAL_PORT, DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT_MS,
    DEFAULT_SETTLE_DELAY_MS, DEFAULT_ERROR_BACKOFF_MS, DEFAULT_FIELD_DELIMITER,
    DEFAULT_HEADER_PREFIXES,
};
