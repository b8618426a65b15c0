//! Vigil service
//!
//! Wires the detection pipeline, the Isolation Forest model and a line
//! transport into one process:
//!
//! ```text
//! transport ──▶ ingestion thread ──▶ Monitor ──▶ StateStore ──▶ HTTP handlers
//!                                       ▲
//!                      POST /reset ─────┘
//! ```
//!
//! The ingestion loop runs on its own OS thread because every transport is
//! blocking; the HTTP side runs on tokio and only reads published state.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::io;
use std::thread::JoinHandle;

use log::info;
use vigil_core::{IngestStatusHandle, IngestionLoop, Monitor, SampleParser};
use vigil_ml::IsolationForestScorer;

pub mod config;
pub mod error;
pub mod http;

pub use config::{Config, ConfigError};
pub use error::{ApiError, ApiResult};
pub use http::{create_router, AppState};

/// Model served by this binary
pub type Model = IsolationForestScorer;

/// Build the monitor described by `config`
pub fn build_monitor(config: &Config) -> Monitor<Model> {
    Monitor::new(IsolationForestScorer::new(config.forest.clone()), config.pipeline)
}

/// Start the ingestion worker for `config.source`
pub fn spawn_ingestion(
    config: &Config,
    monitor: Monitor<Model>,
    status: IngestStatusHandle,
) -> io::Result<JoinHandle<()>> {
    let parser = SampleParser::new().with_header_prefixes(config.header_prefixes.iter().cloned());
    let source = config.source.clone();
    info!("Starting ingestion from {}", source);

    IngestionLoop::new(monitor, parser)
        .with_config(config.ingest)
        .spawn(move || source.open(), status)
}
