//! Line framing over any byte reader
//!
//! [`LineStream`] reads whatever the underlying reader has, keeps incomplete
//! data across polls, and yields one line per successful poll.
//!
//! ## Read outcomes
//!
//! | `read` result                  | Poll result                          |
//! |--------------------------------|--------------------------------------|
//! | bytes completing a line        | `Ok(line)`                           |
//! | bytes, no newline yet          | keeps reading                        |
//! | `TimedOut` / `WouldBlock`      | `WouldBlock`                         |
//! | `Interrupted`                  | retried                              |
//! | `Ok(0)`                        | end of stream, or `WouldBlock` when  |
//! |                                | zero-byte reads are timeouts         |
//! | other error                    | `Transport(e)`, stream stays usable  |
//! | line longer than the limit     | `Overflow`, line dropped             |

use std::io::{self, Read};

use log::warn;
use vigil_core::stream::StreamError;
use vigil_core::Stream;

/// Longest line kept before the pending buffer is discarded
pub const DEFAULT_MAX_LINE_LEN: usize = 1024;

const READ_CHUNK: usize = 256;

/// Framing counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineStats {
    /// Complete lines delivered
    pub lines: u64,
    /// Bytes read from the reader
    pub bytes: u64,
    /// Polls that ended in a timeout
    pub timeouts: u64,
    /// Lines discarded for exceeding the length limit
    pub overflows: u64,
}

/// Newline-delimited text over a byte reader
pub struct LineStream<R> {
    reader: R,
    pending: Vec<u8>,
    max_line_len: usize,
    zero_read_is_timeout: bool,
    finished: bool,
    stats: LineStats,
}

impl<R: Read> LineStream<R> {
    /// Frame lines read from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::with_capacity(READ_CHUNK),
            max_line_len: DEFAULT_MAX_LINE_LEN,
            zero_read_is_timeout: false,
            finished: false,
            stats: LineStats::default(),
        }
    }

    /// Override the line length limit
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = max_line_len.max(1);
        self
    }

    /// Treat `Ok(0)` from the reader as a timeout instead of end of stream
    pub fn zero_read_is_timeout(mut self, enabled: bool) -> Self {
        self.zero_read_is_timeout = enabled;
        self
    }

    /// Framing counters
    pub fn stats(&self) -> LineStats {
        self.stats
    }

    /// Bytes received but not yet part of a complete line
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Underlying reader
    pub fn get_ref(&self) -> &R {
        &self.reader
    }

    /// Wrap the reader in a boxed trait object
    pub fn boxed(self) -> LineStream<Box<dyn Read + Send>>
    where
        R: Send + 'static,
    {
        LineStream {
            reader: Box::new(self.reader),
            pending: self.pending,
            max_line_len: self.max_line_len,
            zero_read_is_timeout: self.zero_read_is_timeout,
            finished: self.finished,
            stats: self.stats,
        }
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let newline = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=newline).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(line)
    }

    fn finish_line(&mut self, line: Vec<u8>) -> nb::Result<String, StreamError<io::Error>> {
        if line.len() > self.max_line_len {
            warn!(
                "Discarding {}-byte line (limit {})",
                line.len(),
                self.max_line_len
            );
            self.stats.overflows += 1;
            return Err(nb::Error::Other(StreamError::Overflow));
        }
        self.stats.lines += 1;
        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    fn overflowed(&mut self) -> bool {
        if self.pending.len() <= self.max_line_len {
            return false;
        }
        warn!(
            "Discarding {} bytes without a line break (limit {})",
            self.pending.len(),
            self.max_line_len
        );
        self.pending.clear();
        self.stats.overflows += 1;
        true
    }
}

impl<R: Read> Stream for LineStream<R> {
    type Item = String;
    type Error = StreamError<io::Error>;

    fn poll_next(&mut self) -> nb::Result<Self::Item, Self::Error> {
        let mut chunk = [0u8; READ_CHUNK];

        loop {
            if let Some(line) = self.take_line() {
                return self.finish_line(line);
            }
            if self.overflowed() {
                return Err(nb::Error::Other(StreamError::Overflow));
            }
            if self.finished {
                if self.pending.is_empty() {
                    return Err(nb::Error::Other(StreamError::EndOfStream));
                }
                let mut rest = std::mem::take(&mut self.pending);
                if rest.last() == Some(&b'\r') {
                    rest.pop();
                }
                return self.finish_line(rest);
            }

            match self.reader.read(&mut chunk) {
                Ok(0) if self.zero_read_is_timeout => {
                    self.stats.timeouts += 1;
                    return Err(nb::Error::WouldBlock);
                }
                Ok(0) => self.finished = true,
                Ok(n) => {
                    self.stats.bytes += n as u64;
                    self.pending.extend_from_slice(&chunk[..n]);
                }
                Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                    self.stats.timeouts += 1;
                    return Err(nb::Error::WouldBlock);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(nb::Error::Other(StreamError::Transport(e))),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;

    /// Reader replaying a fixed sequence of read results
    struct Chunks(VecDeque<io::Result<Vec<u8>>>);

    impl Chunks {
        fn new(steps: Vec<io::Result<&[u8]>>) -> Self {
            Self(steps.into_iter().map(|s| s.map(<[u8]>::to_vec)).collect())
        }
    }

    impl Read for Chunks {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.0.pop_front() {
                None => Ok(0),
                Some(Err(e)) => Err(e),
                Some(Ok(bytes)) => {
                    let n = bytes.len().min(buf.len());
                    buf[..n].copy_from_slice(&bytes[..n]);
                    if n < bytes.len() {
                        self.0.push_front(Ok(bytes[n..].to_vec()));
                    }
                    Ok(n)
                }
            }
        }
    }

    fn data(bytes: &[u8]) -> io::Result<&[u8]> {
        Ok(bytes)
    }

    fn timeout() -> io::Result<&'static [u8]> {
        Err(io::Error::new(io::ErrorKind::TimedOut, "timed out"))
    }

    #[test]
    fn partial_line_survives_timeout() {
        let mut stream = LineStream::new(Chunks::new(vec![
            data(b"48,2,1,"),
            timeout(),
            data(b"512,300,1020\r\n49,"),
            data(b"3,0,1,2,3\n"),
        ]));

        assert!(matches!(stream.poll_next(), Err(nb::Error::WouldBlock)));
        assert_eq!(stream.pending_len(), 7);
        assert_eq!(stream.poll_next().unwrap(), "48,2,1,512,300,1020");
        assert_eq!(stream.poll_next().unwrap(), "49,3,0,1,2,3");
        assert!(matches!(
            stream.poll_next(),
            Err(nb::Error::Other(StreamError::EndOfStream))
        ));

        let stats = stream.stats();
        assert_eq!(stats.lines, 2);
        assert_eq!(stats.timeouts, 1);
    }

    #[test]
    fn unterminated_last_line_is_delivered() {
        let mut stream = LineStream::new(Chunks::new(vec![data(b"a\nb")]));
        assert_eq!(stream.poll_next().unwrap(), "a");
        assert_eq!(stream.poll_next().unwrap(), "b");
        assert!(matches!(
            stream.poll_next(),
            Err(nb::Error::Other(StreamError::EndOfStream))
        ));
        // End of stream is sticky
        assert!(matches!(
            stream.poll_next(),
            Err(nb::Error::Other(StreamError::EndOfStream))
        ));
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let mut stream = LineStream::new(Chunks::new(vec![data(b"4\xff8,1\n")]));
        assert_eq!(stream.poll_next().unwrap(), "4\u{fffd}8,1");
    }

    #[test]
    fn long_garbage_is_discarded() {
        let noise = [b'x'; 40];
        let mut stream = LineStream::new(Chunks::new(vec![data(&noise), data(b"\nok\n")]))
            .with_max_line_len(16);

        assert!(matches!(
            stream.poll_next(),
            Err(nb::Error::Other(StreamError::Overflow))
        ));
        // The rest of the discarded line arrives empty
        assert_eq!(stream.poll_next().unwrap(), "");
        assert_eq!(stream.poll_next().unwrap(), "ok");
        assert_eq!(stream.stats().overflows, 1);
    }

    #[test]
    fn long_line_ending_in_same_read_is_discarded() {
        let mut long = vec![b'7'; 30];
        long.extend_from_slice(b"\r\nok\n");
        let mut stream = LineStream::new(Chunks::new(vec![data(&long)])).with_max_line_len(16);

        assert!(matches!(
            stream.poll_next(),
            Err(nb::Error::Other(StreamError::Overflow))
        ));
        assert_eq!(stream.poll_next().unwrap(), "ok");

        let stats = stream.stats();
        assert_eq!(stats.overflows, 1);
        assert_eq!(stats.lines, 1);
    }

    #[test]
    fn line_at_limit_is_delivered() {
        let mut exact = vec![b'5'; 16];
        exact.extend_from_slice(b"\r\n");
        let mut stream = LineStream::new(Chunks::new(vec![data(&exact)])).with_max_line_len(16);

        assert_eq!(stream.poll_next().unwrap(), "5".repeat(16));
        assert_eq!(stream.stats().overflows, 0);
    }

    #[test]
    fn read_errors_leave_stream_usable() {
        let mut stream = LineStream::new(Chunks::new(vec![
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "glitch")),
            Err(io::Error::new(io::ErrorKind::Interrupted, "signal")),
            data(b"1,2,0,3,4,5\n"),
        ]));

        assert!(matches!(
            stream.poll_next(),
            Err(nb::Error::Other(StreamError::Transport(_)))
        ));
        assert_eq!(stream.poll_next().unwrap(), "1,2,0,3,4,5");
    }

    #[test]
    fn zero_reads_can_mean_timeout() {
        let mut stream = LineStream::new(Chunks::new(vec![data(b"1,"), data(b""), data(b"2\n")]))
            .zero_read_is_timeout(true);

        assert!(matches!(stream.poll_next(), Err(nb::Error::WouldBlock)));
        assert_eq!(stream.poll_next().unwrap(), "1,2");
        assert!(matches!(stream.poll_next(), Err(nb::Error::WouldBlock)));
    }
}
