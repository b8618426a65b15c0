//! Stream Processing Traits
//!
//! Transports hand lines to the ingestion loop through a pull-based stream
//! built on the `nb` crate. The loop owns the pacing: it polls, and a
//! transport that has nothing to deliver within its read timeout answers
//! `WouldBlock` instead of blocking forever.
//!
//! ## Common Patterns
//!
//! ```rust
//! use vigil_core::stream::{MemoryStream, StreamError};
//! use vigil_core::traits::Stream;
//!
//! let mut stream = MemoryStream::from_lines(["48,2,1,512,300,1020"]);
//! loop {
//!     match stream.poll_next() {
//!         Ok(line) => println!("{line}"),
//!         Err(nb::Error::WouldBlock) => continue,
//!         Err(nb::Error::Other(StreamError::EndOfStream)) => break,
//!         Err(nb::Error::Other(e)) => eprintln!("read error: {e}"),
//!     }
//! }
//! ```

/// Core stream trait for line sources
///
/// ## Error Handling
///
/// Streams use a two-level error model:
/// - `nb::Error::WouldBlock` - nothing arrived within the read timeout
/// - `nb::Error::Other(E)` - an actual stream error
///
/// This lets the consumer tell "poll again" apart from "something went
/// wrong".
pub trait Stream {
    /// Type of items produced by the stream
    type Item;

    /// Type of errors that can occur
    type Error;

    /// Attempt to pull the next item from the stream
    ///
    /// Returns:
    /// - `Ok(item)` - next item available
    /// - `Err(nb::Error::WouldBlock)` - no data available yet
    /// - `Err(nb::Error::Other(e))` - stream error occurred
    ///
    /// ## Contract
    ///
    /// - This method must not block indefinitely
    /// - Multiple `WouldBlock` returns are normal and expected
    /// - After returning an error, the stream may still be usable
    /// - End of stream is sticky
    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error>;

    /// Returns bounds on remaining items
    ///
    /// Default implementation returns `(0, None)` indicating unknown size.
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, None)
    }
}
