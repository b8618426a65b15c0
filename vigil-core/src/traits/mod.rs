//! Core Traits and Abstractions for Vigil
//!
//! The two extension points of the pipeline:
//!
//! - [`scorer`] - the trainable anomaly model (`fit` once, then `score`)
//! - [`stream`] - pull-based sources of transport lines
//!
//! Both are used through static dispatch: the pipeline is generic over its
//! model and the ingestion loop over its stream.

pub mod scorer;
pub mod stream;

pub use scorer::{AnomalyScorer, TrainedScorer};
pub use stream::Stream;
