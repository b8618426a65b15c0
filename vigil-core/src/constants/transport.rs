//! Transport Constants
//!
//! Defaults for the line-oriented transports feeding the pipeline.

// ===== SERIAL =====

/// Serial device the sensor board enumerates as on Linux.
pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyACM0";

/// Line rate of the sensor board firmware.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Per-read timeout (milliseconds).
///
/// Bounds how long a single poll blocks when the board is silent.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Delay after opening a serial port before the first read (milliseconds).
///
/// Opening the port toggles DTR, which resets most Arduino-class boards.
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 2000;

/// Pause after a transport read error before polling again (milliseconds).
pub const DEFAULT_ERROR_BACKOFF_MS: u64 = 100;

// ===== LINE FORMAT =====

/// Field separator within a line.
pub const DEFAULT_FIELD_DELIMITER: char = ',';

/// Case-insensitive prefixes identifying header lines.
///
/// The firmware prints a Spanish column header on boot.
pub const DEFAULT_HEADER_PREFIXES: &[&str] = &["humedad", "humidity"];
