//! Core anomaly-scoring pipeline for Vigil
//!
//! Turns delimited sensor lines into a rolling failure probability.
//!
//! The first records after start-up (or a reset) calibrate the model; once
//! the batch is complete the model is trained exactly once, and every later
//! record is scored. The fraction of anomalous decisions over the most recent
//! window is the failure probability published with each reading.
//!
//! Key constraints:
//! - One pipeline per process, shared by the ingestion worker and readers
//! - Readers never observe a partially built reading
//! - A bad line never stops ingestion
//!
//! ```no_run
//! use vigil_core::{Monitor, PipelineConfig, SampleParser};
//! # use vigil_core::{AnomalyScorer, FeatureVector, ScorerResult, TrainedScorer};
//! # struct Model;
//! # impl AnomalyScorer for Model {
//! #     type Trained = Model;
//! #     fn fit(&self, _: &[FeatureVector]) -> ScorerResult<Model> { Ok(Model) }
//! # }
//! # impl TrainedScorer for Model {
//! #     fn score(&self, _: &FeatureVector) -> f64 { 1.0 }
//! # }
//!
//! let monitor = Monitor::new(Model, PipelineConfig::default());
//! let parser = SampleParser::default();
//!
//! if let Some(record) = parser.parse("48,2,1,512,300,1020") {
//!     let reading = monitor.process(&record).unwrap();
//!     println!("failure probability: {}", reading.failure_probability);
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod calibration;
pub mod constants;
pub mod errors;
pub mod ingest;
pub mod monitor;
pub mod parser;
pub mod pipeline;
pub mod record;
pub mod state;
pub mod stream;
pub mod traits;
pub mod window;

// Public API
pub use calibration::{CalibrationBuffer, CalibrationProgress};
pub use errors::{ParseError, PipelineError, PipelineResult, ScorerError, ScorerResult};
pub use ingest::{IngestConfig, IngestStats, IngestStatus, IngestStatusHandle, IngestionLoop};
pub use monitor::Monitor;
pub use parser::SampleParser;
pub use pipeline::{Assessment, DetectionPipeline, Outcome, Phase, PipelineConfig, PipelineStatus};
pub use record::{FeatureRecord, FeatureVector, Presence};
pub use state::{CalibrationView, LatestReading, StateStore};
pub use stream::{MemoryStream, Scripted, StreamError};
pub use traits::{AnomalyScorer, Stream, TrainedScorer};
pub use window::AnomalyWindow;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
