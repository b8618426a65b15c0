//! Ingestion loop: transport lines in, published readings out
//!
//! ## Overview
//!
//! The loop pulls lines from a [`Stream`], filters headers and malformed
//! lines through the [`SampleParser`], and hands every record to the shared
//! [`Monitor`], which scores it and publishes the enriched reading.
//!
//! ## Failure Policy
//!
//! | Condition                 | Effect                                    |
//! |---------------------------|-------------------------------------------|
//! | read timeout              | poll again                                |
//! | blank / header line       | skipped                                   |
//! | malformed line            | dropped, logged at `debug`                |
//! | transport read error      | logged, back-off, poll again              |
//! | pipeline error            | logged, nothing published                 |
//! | end of stream             | loop ends, status `finished`              |
//! | transport cannot be opened| loop never starts, status `failed`        |
//! | panic inside the worker   | caught, status `failed`                   |
//!
//! No failure escapes the worker thread.

use core::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, error, info, warn};
use parking_lot::RwLock;
use serde::Serialize;

use crate::constants::DEFAULT_ERROR_BACKOFF_MS;
use crate::errors::ParseError;
use crate::monitor::Monitor;
use crate::parser::SampleParser;
use crate::state::LatestReading;
use crate::stream::StreamError;
use crate::traits::{AnomalyScorer, Stream};

/// Ingestion loop tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestConfig {
    /// Pause after a transport read error
    pub error_backoff: Duration,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            error_backoff: Duration::from_millis(DEFAULT_ERROR_BACKOFF_MS),
        }
    }
}

/// Counters kept by the ingestion loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// Lines delivered by the transport
    pub lines_read: u64,
    /// Records accepted by the pipeline and published
    pub records_published: u64,
    /// Header lines skipped
    pub headers_skipped: u64,
    /// Blank or malformed lines dropped
    pub lines_rejected: u64,
    /// Transport read errors
    pub read_errors: u64,
    /// Polls that timed out
    pub timeouts: u64,
    /// Records the pipeline refused
    pub pipeline_errors: u64,
}

/// Lifecycle of the ingestion worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum IngestStatus {
    /// Worker spawned, transport not open yet
    Starting,
    /// Transport open, reading lines
    Running,
    /// Transport reached end of stream
    Finished,
    /// Transport could not be opened or the worker panicked
    Failed {
        /// Human-readable cause
        reason: String,
    },
}

/// Cloneable handle to the worker's status
#[derive(Debug, Clone)]
pub struct IngestStatusHandle(Arc<RwLock<IngestStatus>>);

impl Default for IngestStatusHandle {
    fn default() -> Self {
        Self(Arc::new(RwLock::new(IngestStatus::Starting)))
    }
}

impl IngestStatusHandle {
    /// Create a handle in the `Starting` state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status
    pub fn get(&self) -> IngestStatus {
        self.0.read().clone()
    }

    /// Replace the status
    pub fn set(&self, status: IngestStatus) {
        *self.0.write() = status;
    }
}

/// Reads lines, feeds the pipeline, publishes readings
pub struct IngestionLoop<S: AnomalyScorer> {
    monitor: Monitor<S>,
    parser: SampleParser,
    config: IngestConfig,
    stats: IngestStats,
}

impl<S: AnomalyScorer> IngestionLoop<S> {
    /// Create a loop feeding `monitor`
    pub fn new(monitor: Monitor<S>, parser: SampleParser) -> Self {
        Self {
            monitor,
            parser,
            config: IngestConfig::default(),
            stats: IngestStats::default(),
        }
    }

    /// Override the tuning
    pub fn with_config(mut self, config: IngestConfig) -> Self {
        self.config = config;
        self
    }

    /// Counters so far
    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Handle one raw line; returns the published reading, if any
    pub fn handle_line(&mut self, line: &str) -> Option<Arc<LatestReading>> {
        let record = match self.parser.try_parse(line) {
            Ok(record) => record,
            Err(ParseError::Header) => {
                self.stats.headers_skipped += 1;
                return None;
            }
            Err(ParseError::Empty) => {
                self.stats.lines_rejected += 1;
                return None;
            }
            Err(e) => {
                self.stats.lines_rejected += 1;
                debug!("Dropping line {:?}: {}", line, e);
                return None;
            }
        };

        match self.monitor.process(&record) {
            Ok(reading) => {
                self.stats.records_published += 1;
                Some(reading)
            }
            Err(e) => {
                self.stats.pipeline_errors += 1;
                error!("Pipeline rejected record: {}", e);
                None
            }
        }
    }

    /// Poll `stream` until it ends
    pub fn run<St, E>(&mut self, stream: &mut St) -> IngestStats
    where
        St: Stream<Item = String, Error = StreamError<E>>,
        E: fmt::Display,
    {
        loop {
            match stream.poll_next() {
                Ok(line) => {
                    self.stats.lines_read += 1;
                    self.handle_line(&line);
                }
                Err(nb::Error::WouldBlock) => {
                    self.stats.timeouts += 1;
                }
                Err(nb::Error::Other(StreamError::EndOfStream)) => {
                    info!("Transport reached end of stream");
                    break;
                }
                Err(nb::Error::Other(e)) => {
                    self.stats.read_errors += 1;
                    warn!("Transport read error: {}", e);
                    if !self.config.error_backoff.is_zero() {
                        thread::sleep(self.config.error_backoff);
                    }
                }
            }
        }

        info!("Ingestion finished: {:?}", self.stats);
        self.stats
    }

    /// Open the transport with `open`, then run until it ends
    ///
    /// Every outcome, including a panic, is recorded in `status`.
    pub fn run_transport<St, E, O, OE>(&mut self, open: O, status: &IngestStatusHandle)
    where
        St: Stream<Item = String, Error = StreamError<E>>,
        E: fmt::Display,
        O: FnOnce() -> Result<St, OE>,
        OE: fmt::Display,
    {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match open() {
            Ok(mut stream) => {
                status.set(IngestStatus::Running);
                self.run(&mut stream);
                IngestStatus::Finished
            }
            Err(e) => {
                error!("Could not open transport: {}", e);
                IngestStatus::Failed {
                    reason: format!("could not open transport: {}", e),
                }
            }
        }));

        let final_status = outcome.unwrap_or_else(|payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!("Ingestion worker panicked: {}", reason);
            IngestStatus::Failed {
                reason: format!("worker panicked: {}", reason),
            }
        });
        status.set(final_status);
    }
}

impl<S> IngestionLoop<S>
where
    S: AnomalyScorer + Send + 'static,
    S::Trained: Send,
{
    /// Run the loop on a dedicated, named thread
    ///
    /// The thread is detached in spirit: nothing waits for it at shutdown,
    /// and its outcome is only observable through `status`.
    pub fn spawn<St, E, O, OE>(
        mut self,
        open: O,
        status: IngestStatusHandle,
    ) -> std::io::Result<JoinHandle<()>>
    where
        St: Stream<Item = String, Error = StreamError<E>> + 'static,
        E: fmt::Display + 'static,
        O: FnOnce() -> Result<St, OE> + Send + 'static,
        OE: fmt::Display + 'static,
    {
        thread::Builder::new()
            .name("vigil-ingest".into())
            .spawn(move || self.run_transport(open, &status))
    }
}
