//! Error Types for the Anomaly-Scoring Pipeline
//!
//! ## Error Categories
//!
//! ### Input Rejections
//! - [`ParseError`]: a transport line is not a usable record. These are
//!   expected (boot headers, partial lines after a reset, line noise) and are
//!   never fatal; the line is dropped and nothing is mutated.
//!
//! ### Model Failures
//! - [`ScorerError`]: the anomaly model could not be fitted on the
//!   calibration batch.
//!
//! ### Pipeline Failures
//! - [`PipelineError`]: wraps training failures and reports a pipeline whose
//!   model is unavailable until it is reset.
//!
//! ## Error Handling Strategy
//!
//! ```rust
//! use vigil_core::{ParseError, SampleParser};
//!
//! let parser = SampleParser::default();
//! match parser.try_parse("Humedad,Vibracion,Infra,Pot1,Pot2,Pot3") {
//!     Ok(_record) => {
//!         // hand to the pipeline
//!     }
//!     Err(ParseError::Header) => {
//!         // boot banner, ignore
//!     }
//!     Err(_) => {
//!         // malformed line, drop it
//!     }
//! }
//! ```

use thiserror::Error;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Result type for model operations
pub type ScorerResult<T> = Result<T, ScorerError>;

/// Reasons a transport line is rejected by the parser
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Nothing but whitespace and delimiters
    #[error("empty line")]
    Empty,

    /// Column header printed by the firmware
    #[error("header line")]
    Header,

    /// Wrong number of non-empty fields
    #[error("expected {expected} fields, found {found}")]
    FieldCount {
        /// Fields a record must have
        expected: usize,
        /// Non-empty fields present in the line
        found: usize,
    },

    /// A numeric field did not parse as an integer
    #[error("field {index} is not an integer")]
    InvalidInteger {
        /// Zero-based field position
        index: usize,
    },
}

/// Failures reported by an anomaly model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScorerError {
    /// Fit called with an empty batch
    #[error("cannot fit on an empty batch")]
    EmptyBatch,

    /// Model-specific training failure
    #[error("training failed: {0}")]
    Training(String),
}

/// Pipeline failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Fitting the model on the calibration batch failed
    #[error("model training failed after {samples} samples: {source}")]
    TrainingFailed {
        /// Size of the calibration batch
        samples: usize,
        /// Underlying model error
        #[source]
        source: ScorerError,
    },

    /// Training failed earlier; nothing can be scored until reset
    #[error("anomaly model unavailable, reset the pipeline to recalibrate")]
    ModelUnavailable,
}
