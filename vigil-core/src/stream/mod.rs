//! Stream processing for transport lines
//!
//! ## Module Organization
//!
//! - Core stream error (this file)
//! - `memory` - scripted in-memory streams for testing and replay
//!
//! Real transports (serial, TCP, file replay) live in `vigil-connectors` and
//! implement the same [`Stream`] trait.

use core::fmt;

pub mod memory;

pub use memory::{MemoryStream, Scripted};

/// Errors that can occur while pulling from a stream
#[derive(Debug)]
pub enum StreamError<E> {
    /// Transport-level error (e.g., I/O error)
    Transport(E),
    /// End of stream reached
    EndOfStream,
    /// A line exceeded the transport's line buffer
    Overflow,
}

impl<E: fmt::Display> fmt::Display for StreamError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "Transport error: {}", e),
            Self::EndOfStream => write!(f, "End of stream"),
            Self::Overflow => write!(f, "Line buffer overflow"),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for StreamError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            _ => None,
        }
    }
}

// Re-export the trait for convenience
pub use crate::traits::Stream;
