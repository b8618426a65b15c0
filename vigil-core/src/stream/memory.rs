//! Memory-based streams for testing and replay
//!
//! A [`MemoryStream`] plays back a script of lines, timeouts and transport
//! faults, which makes the ingestion loop's error handling testable without
//! hardware.

use std::io;

use super::{Stream, StreamError};

/// One step of a scripted stream
#[derive(Debug, Clone, PartialEq)]
pub enum Scripted {
    /// Deliver a line
    Line(String),
    /// Report that the read timed out
    Timeout,
    /// Report a transport error of this kind
    Fault(io::ErrorKind),
}

/// Scripted in-memory line stream
///
/// ## Example
///
/// ```rust
/// use vigil_core::stream::{MemoryStream, Scripted, Stream, StreamError};
///
/// let mut stream = MemoryStream::new(vec![
///     Scripted::Line("48,2,1,512,300,1020".into()),
///     Scripted::Timeout,
/// ]);
///
/// assert_eq!(stream.poll_next().unwrap(), "48,2,1,512,300,1020");
/// assert!(matches!(stream.poll_next(), Err(nb::Error::WouldBlock)));
/// assert!(matches!(stream.poll_next(), Err(nb::Error::Other(StreamError::EndOfStream))));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStream {
    script: Vec<Scripted>,
    position: usize,
}

impl MemoryStream {
    /// Create a stream that plays `script` once
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script,
            position: 0,
        }
    }

    /// Create a stream delivering only lines
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(lines.into_iter().map(|l| Scripted::Line(l.into())).collect())
    }

    /// Rewind to the beginning
    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Current position in the script
    pub fn position(&self) -> usize {
        self.position
    }

    /// Whether the script has been played completely
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.script.len()
    }
}

impl Stream for MemoryStream {
    type Item = String;
    type Error = StreamError<io::Error>;

    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error> {
        let step = self
            .script
            .get(self.position)
            .cloned()
            .ok_or(nb::Error::Other(StreamError::EndOfStream))?;
        self.position += 1;

        match step {
            Scripted::Line(line) => Ok(line),
            Scripted::Timeout => Err(nb::Error::WouldBlock),
            Scripted::Fault(kind) => Err(nb::Error::Other(StreamError::Transport(
                io::Error::new(kind, "scripted transport fault"),
            ))),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.script.len() - self.position.min(self.script.len());
        (remaining, Some(remaining))
    }
}
