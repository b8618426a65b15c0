//! Serial transport
//!
//! Opens the device with the `serialport` crate. Boards built around a
//! USB-serial bridge reset when the port is opened and print a banner or a
//! column header while booting, so the transport waits a settle delay and
//! drops whatever arrived before handing the port to the line framer.

use std::thread;
use std::time::Duration;

use log::{debug, info, warn};
use serialport::ClearBuffer;
use vigil_core::constants::{
    DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT_MS, DEFAULT_SERIAL_PORT, DEFAULT_SETTLE_DELAY_MS,
};

use crate::{ConnectorError, ConnectorResult, LineStream, TransportStream};

/// Serial device settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyACM0` or `COM3`
    pub path: String,
    /// Line rate
    pub baud_rate: u32,
    /// Longest wait for data in one poll
    pub read_timeout: Duration,
    /// Pause after opening the port
    pub settle_delay: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_SERIAL_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(DEFAULT_READ_TIMEOUT_MS),
            settle_delay: Duration::from_millis(DEFAULT_SETTLE_DELAY_MS),
        }
    }
}

/// Open the serial device and frame its output
pub fn open(config: &SerialConfig) -> ConnectorResult<TransportStream> {
    let port = serialport::new(config.path.as_str(), config.baud_rate)
        .timeout(config.read_timeout)
        .open()
        .map_err(|source| ConnectorError::Serial {
            path: config.path.clone(),
            source,
        })?;
    info!(
        "Opened serial port {} at {} baud",
        config.path, config.baud_rate
    );

    if !config.settle_delay.is_zero() {
        debug!("Waiting {:?} for the device to settle", config.settle_delay);
        thread::sleep(config.settle_delay);
    }
    if let Err(e) = port.clear(ClearBuffer::Input) {
        warn!("Could not clear serial input buffer: {}", e);
    }

    Ok(LineStream::new(port).zero_read_is_timeout(true).boxed())
}
