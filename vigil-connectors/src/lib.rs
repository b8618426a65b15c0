//! Line Transports for Sensor Ingestion
//!
//! ## Overview
//!
//! This crate provides the byte sources the ingestion loop reads from. Every
//! transport is wrapped in a [`LineStream`], which turns raw reads into
//! complete text lines and exposes them through the core
//! [`Stream`](vigil_core::Stream) trait.
//!
//! ## Transport Selection Guide
//!
//! ### Serial (`serial:<path>`)
//!
//! **When to use:**
//! - The microcontroller is attached over USB or UART
//! - Production deployments
//!
//! **Characteristics:**
//! - Read timeout bounds every poll
//! - Most boards reset when the port is opened, so the transport waits a
//!   settle delay before the first read and discards whatever arrived
//! - A zero-byte read is treated like a timeout
//!
//! ### TCP (`tcp:<host:port>`)
//!
//! **When to use:**
//! - A serial-to-network bridge sits between the board and this host
//! - Feeding the pipeline from a simulator
//!
//! **Characteristics:**
//! - Socket read timeout bounds every poll
//! - The peer closing the connection ends the stream
//!
//! ### File (`file:<path>`)
//!
//! **When to use:**
//! - Replaying a recorded capture
//! - Demos and tests without hardware
//!
//! **Characteristics:**
//! - Never times out
//! - End of file ends the stream; a final unterminated line is still
//!   delivered
//!
//! A source without a scheme is taken to be a serial device path.
//!
//! ## Line Framing
//!
//! ```text
//! bytes ──▶ pending buffer ──▶ split at '\n' ──▶ strip '\r' ──▶ lossy UTF-8
//!               │
//!               └── survives timeouts; cleared when longer than the limit
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use vigil_connectors::{LinkSettings, TransportConfig};
//! use vigil_core::Stream;
//!
//! let config = TransportConfig::from_source("serial:/dev/ttyACM0", &LinkSettings::default())?;
//! let mut stream = config.open()?;
//! if let Ok(line) = stream.poll_next() {
//!     println!("{line}");
//! }
//! # Ok::<(), vigil_connectors::ConnectorError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

use core::fmt;
use core::str::FromStr;
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use vigil_core::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT_MS, DEFAULT_SERIAL_PORT, DEFAULT_SETTLE_DELAY_MS,
};

pub mod file;
pub mod line;
pub mod serial;
pub mod tcp;

// Re-export common types
pub use file::FileConfig;
pub use line::{LineStats, LineStream, DEFAULT_MAX_LINE_LEN};
pub use serial::SerialConfig;
pub use tcp::TcpConfig;

/// Result type for connector operations
pub type ConnectorResult<T> = Result<T, ConnectorError>;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Source string could not be understood
    #[error("invalid source {source_str:?}: {reason}")]
    InvalidSource {
        /// The offending source
        source_str: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Serial device could not be opened or configured
    #[error("serial port {path}: {source}")]
    Serial {
        /// Device path
        path: String,
        /// Driver error
        #[source]
        source: serialport::Error,
    },

    /// Socket or file error
    #[error("{target}: {source}")]
    Io {
        /// Address or path being opened
        target: String,
        /// Underlying error
        #[source]
        source: io::Error,
    },

    /// Configuration error
    #[error("configuration error: {0}")]
    ConfigError(String),
}

/// Stream type every transport opens to
pub type TransportStream = LineStream<Box<dyn Read + Send>>;

/// Link parameters shared by the transports that use them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkSettings {
    /// Serial line rate
    pub baud_rate: u32,
    /// Longest wait for data in one poll
    pub read_timeout: Duration,
    /// Pause after opening a serial port
    pub settle_delay: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
        }
    }
}

/// Which transport to open, and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    /// Serial device
    Serial(SerialConfig),
    /// TCP client
    Tcp(TcpConfig),
    /// Recorded capture
    File(FileConfig),
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::Serial(SerialConfig::default())
    }
}

impl TransportConfig {
    /// Build from a `scheme:target` source string
    pub fn from_source(source: &str, link: &LinkSettings) -> ConnectorResult<Self> {
        let source = source.trim();
        let invalid = |reason| ConnectorError::InvalidSource {
            source_str: source.to_string(),
            reason,
        };

        if source.is_empty() {
            return Err(invalid("empty source"));
        }
        if link.read_timeout.is_zero() {
            return Err(ConnectorError::ConfigError(
                "read timeout must be non-zero".into(),
            ));
        }

        let (scheme, target) = match source.split_once(':') {
            Some((scheme, target)) if matches!(scheme, "serial" | "tcp" | "file") => {
                (scheme, target)
            }
            _ => ("serial", source),
        };
        if target.is_empty() {
            return Err(invalid("missing target after scheme"));
        }

        Ok(match scheme {
            "tcp" => {
                if !target.contains(':') {
                    return Err(invalid("expected host:port"));
                }
                Self::Tcp(TcpConfig {
                    address: target.to_string(),
                    read_timeout: link.read_timeout,
                    ..TcpConfig::default()
                })
            }
            "file" => Self::File(FileConfig {
                path: PathBuf::from(target),
            }),
            _ => Self::Serial(SerialConfig {
                path: target.to_string(),
                baud_rate: link.baud_rate,
                read_timeout: link.read_timeout,
                settle_delay: link.settle_delay,
            }),
        })
    }

    /// Open the transport
    pub fn open(&self) -> ConnectorResult<TransportStream> {
        match self {
            Self::Serial(config) => serial::open(config),
            Self::Tcp(config) => tcp::open(config),
            Self::File(config) => file::open(config),
        }
    }
}

impl FromStr for TransportConfig {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_source(s, &LinkSettings::default())
    }
}

impl fmt::Display for TransportConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial(c) => write!(f, "serial:{}@{}", c.path, c.baud_rate),
            Self::Tcp(c) => write!(f, "tcp:{}", c.address),
            Self::File(c) => write!(f, "file:{}", c.path.display()),
        }
    }
}

/// Default source string
pub fn default_source() -> String {
    format!("serial:{}", DEFAULT_SERIAL_PORT)
}
