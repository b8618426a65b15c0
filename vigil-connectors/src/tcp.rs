//! TCP transport
//!
//! Connects to a serial-to-network bridge (or a simulator) and frames the
//! byte stream into lines. The socket read timeout bounds every poll.

use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use log::{info, warn};
use vigil_core::constants::DEFAULT_READ_TIMEOUT_MS;

use crate::{ConnectorError, ConnectorResult, LineStream, TransportStream};

/// Longest wait for the connection to be established
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// TCP client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TcpConfig {
    /// `host:port` of the line source
    pub address: String,
    /// Longest wait for data in one poll
    pub read_timeout: Duration,
    /// Longest wait per resolved address when connecting
    pub connect_timeout: Duration,
}

impl Default for TcpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:7000".to_string(),
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

/// Connect and frame the peer's output
pub fn open(config: &TcpConfig) -> ConnectorResult<TransportStream> {
    let io_error = |source| ConnectorError::Io {
        target: config.address.clone(),
        source,
    };

    let addrs = config.address.to_socket_addrs().map_err(io_error)?;
    let mut last_error = None;
    let mut connected = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, config.connect_timeout) {
            Ok(stream) => {
                connected = Some(stream);
                break;
            }
            Err(e) => {
                warn!("Connecting to {} failed: {}", addr, e);
                last_error = Some(e);
            }
        }
    }

    let stream = match connected {
        Some(stream) => stream,
        None => {
            return Err(io_error(last_error.unwrap_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "address resolved to nothing")
            })))
        }
    };

    stream.set_read_timeout(Some(config.read_timeout)).map_err(io_error)?;
    info!("Connected to line source {}", config.address);

    Ok(LineStream::new(stream).boxed())
}
