//! Read deadlines for blocking transports
//!
//! A plain blocking read on a stalled connection never returns.
//! [`DeadlineSession`] waits for readability with `poll(2)` before every read
//! and fails with [`DeadlineExpired`] once its timeout runs out, so a reader
//! loop driven through it always terminates.

use std::io::{self, Read};
use std::net::{Shutdown, TcpStream};
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};

/// Transport that can wait for incoming data
pub trait SessionOps: Read {
    /// Block until data can be read or `timeout` elapses
    ///
    /// Returns false on timeout. `None` waits forever.
    fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool>;

    fn close(&mut self) -> io::Result<()>;
}

/// Payload of the `TimedOut` error raised when a read deadline expires
#[derive(Debug, thiserror::Error)]
#[error("read deadline expired")]
pub struct DeadlineExpired;

impl DeadlineExpired {
    /// True if `err` was raised by a [`DeadlineSession`]
    pub fn is(err: &io::Error) -> bool {
        err.kind() == io::ErrorKind::TimedOut
            && err.get_ref().is_some_and(|inner| inner.is::<DeadlineExpired>())
    }
}

/// Transport wrapper applying a deadline to every read
pub struct DeadlineSession<S: SessionOps> {
    inner: S,
    timeout: Option<Duration>,
}

impl<S: SessionOps> DeadlineSession<S> {
    /// Wrap `inner` with a 10 second deadline
    pub fn new(inner: S) -> Self {
        DeadlineSession {
            inner,
            timeout: Some(Duration::from_secs(10)),
        }
    }

    /// Set the deadline, `None` waits forever
    pub fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub fn close(&mut self) -> io::Result<()> {
        self.inner.close()
    }
}

impl<S: SessionOps> Read for DeadlineSession<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.inner.wait_readable(self.timeout)? {
            return Err(io::Error::new(io::ErrorKind::TimedOut, DeadlineExpired));
        }

        self.inner.read(buf)
    }
}

/// Milliseconds left until `deadline`, rounded up, in `poll(2)` form
fn poll_timeout_ms(deadline: Option<Instant>, now: Instant) -> i32 {
    let Some(deadline) = deadline else {
        return -1; // infinite
    };

    let left = deadline.saturating_duration_since(now);
    let mut ms = left.as_millis();
    if left.subsec_nanos() % 1_000_000 != 0 {
        ms += 1;
    }
    ms.min(i32::MAX as u128) as i32
}

impl SessionOps for TcpStream {
    fn wait_readable(&self, timeout: Option<Duration>) -> io::Result<bool> {
        let deadline = timeout.map(|t| Instant::now() + t);

        loop {
            let mut pfd = libc::pollfd {
                fd: self.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            };
            let timeout_ms = poll_timeout_ms(deadline, Instant::now());

            let result = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if result >= 0 {
                return Ok(result > 0);
            }

            // EINTR resumes with whatever is left of the deadline
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn close(&mut self) -> io::Result<()> {
        self.shutdown(Shutdown::Both)
    }
}

/// Helper to create a session from a TCP stream
pub fn from_tcp_stream(stream: TcpStream) -> DeadlineSession<TcpStream> {
    DeadlineSession::new(stream)
}
