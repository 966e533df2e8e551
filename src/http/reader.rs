//! Stream reader loop
//!
//! Reads from any [`std::io::Read`] into a [`ReadBuffer`] and feeds the
//! parser until the request is done.

use super::{DeadlineExpired, Error, ParseState, ReadBuffer, Request, Result, DEFAULT_BUFFER_SIZE, MAX_BUFFER_SIZE};
use std::io::{ErrorKind, Read};
use std::thread;
use std::time::Duration;

/// What to do when the source ends before the request is done
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EofPolicy {
    /// Fail with [`Error::Truncated`]
    #[default]
    Error,
    /// Mark the request done without a request line
    Complete,
}

/// Reader loop configuration
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    pub initial_capacity: usize,
    pub max_buffer_size: usize,
    pub eof_policy: EofPolicy,
    /// Sleep between retries of a read that would block
    pub retry_backoff: Duration,
    /// Consecutive would-block reads tolerated before giving up
    pub max_retries: u32,
}

impl ReaderConfig {
    pub fn new() -> Self {
        ReaderConfig {
            initial_capacity: DEFAULT_BUFFER_SIZE,
            max_buffer_size: MAX_BUFFER_SIZE,
            eof_policy: EofPolicy::Error,
            retry_backoff: Duration::from_millis(10),
            max_retries: 100,
        }
    }

    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn max_buffer_size(mut self, size: usize) -> Self {
        self.max_buffer_size = size;
        self
    }

    pub fn eof_policy(mut self, policy: EofPolicy) -> Self {
        self.eof_policy = policy;
        self
    }

    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a request from `source` with the default configuration
pub fn request_from_reader<R: Read>(source: R) -> Result<Request> {
    request_from_reader_with(source, &ReaderConfig::default())
}

/// Read a request from `source`
///
/// Returns the request once its request line is parsed, or the first error
/// raised by the source or the parser.
pub fn request_from_reader_with<R: Read>(mut source: R, config: &ReaderConfig) -> Result<Request> {
    let mut buffer = ReadBuffer::with_capacity(config.initial_capacity, config.max_buffer_size);
    let mut request = Request::new();

    while request.state != ParseState::Done {
        buffer.reserve()?;

        let n = read_some(&mut source, buffer.spare_mut(), config)?;
        if n == 0 {
            return match config.eof_policy {
                EofPolicy::Error => Err(Error::Truncated {
                    buffered: buffer.len(),
                }),
                EofPolicy::Complete => {
                    log::debug!("stream ended with {} unparsed bytes", buffer.len());
                    request.state = ParseState::Done;
                    Ok(request)
                }
            };
        }

        log::trace!("read {} bytes", n);
        buffer.advance_filled(n);

        let consumed = request.parse(buffer.data())?;
        if consumed > 0 {
            buffer.consume(consumed);
        }
    }

    if let Some(line) = request.request_line() {
        log::debug!("parsed request line: {}", line);
    }

    Ok(request)
}

/// Read once, retrying reads that made no progress
fn read_some<R: Read>(source: &mut R, buf: &mut [u8], config: &ReaderConfig) -> Result<usize> {
    let mut retries = 0;

    loop {
        match source.read(buf) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                if retries >= config.max_retries {
                    return Err(Error::Timeout);
                }
                retries += 1;
                thread::sleep(config.retry_backoff);
            }
            Err(e) if DeadlineExpired::is(&e) => return Err(Error::Timeout),
            Err(e) => return Err(Error::Io(e)),
        }
    }
}
