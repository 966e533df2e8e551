//! TCP listener
//!
//! Accepts connections one at a time and runs the reader loop for each on
//! its own thread. A connection that fails to produce a request is logged
//! and dropped; the accept loop carries on.

use crate::http::{self, session, ReaderConfig, Request};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Result type for network operations
pub type Result<T> = std::result::Result<T, Error>;

/// Network errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Default listen address
pub const DEFAULT_ADDR: &str = "127.0.0.1:42069";

/// Listener configuration
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    pub addr: String,
    pub backlog: i32,
    /// Read deadline per connection, `None` waits forever
    pub read_timeout: Option<Duration>,
    /// Pause after a failed accept before trying again
    pub accept_backoff: Duration,
    pub reader: ReaderConfig,
}

impl ListenerConfig {
    pub fn new() -> Self {
        ListenerConfig {
            addr: DEFAULT_ADDR.to_string(),
            backlog: 128,
            read_timeout: Some(Duration::from_secs(10)),
            accept_backoff: Duration::from_millis(50),
            reader: ReaderConfig::default(),
        }
    }

    pub fn addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    pub fn backlog(mut self, backlog: i32) -> Self {
        self.backlog = backlog;
        self
    }

    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn accept_backoff(mut self, backoff: Duration) -> Self {
        self.accept_backoff = backoff;
        self
    }

    pub fn reader(mut self, reader: ReaderConfig) -> Self {
        self.reader = reader;
        self
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a listening socket with `SO_REUSEADDR` set
pub fn bind(config: &ListenerConfig) -> Result<TcpListener> {
    let addr: SocketAddr = config
        .addr
        .parse()
        .map_err(|_| Error::InvalidAddress(config.addr.clone()))?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(config.backlog)?;

    Ok(socket.into())
}

/// Call `accept` until it yields a connection
///
/// `Interrupted` is retried at once. Any other failure, such as running out
/// of file descriptors, is logged and retried after `backoff`.
fn accept_retrying<T>(mut accept: impl FnMut() -> io::Result<T>, backoff: Duration) -> T {
    loop {
        match accept() {
            Ok(conn) => return conn,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => {
                log::warn!("accept failed, retrying in {:?}: {}", backoff, e);
                thread::sleep(backoff);
            }
        }
    }
}

/// Serve connections forever
///
/// `handler` is called with each successfully parsed request.
pub fn serve<F>(listener: TcpListener, config: &ListenerConfig, handler: F) -> !
where
    F: Fn(SocketAddr, Request) + Send + Sync + 'static,
{
    let handler = Arc::new(handler);

    loop {
        let (stream, peer) = accept_retrying(|| listener.accept(), config.accept_backoff);

        log::info!("connection accepted from {}", peer);

        let handler = Arc::clone(&handler);
        let read_timeout = config.read_timeout;
        let reader = config.reader.clone();

        thread::spawn(move || {
            let mut session = session::from_tcp_stream(stream);
            session.set_timeout(read_timeout);

            match http::request_from_reader_with(&mut session, &reader) {
                Ok(request) => handler(peer, request),
                Err(e) => log::warn!("rejected request from {}: {}", peer, e),
            }

            if let Err(e) = session.close() {
                log::debug!("closing connection to {}: {}", peer, e);
            }
            log::info!("connection to {} closed", peer);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_bind_ephemeral_port() {
        let config = ListenerConfig::new().addr("127.0.0.1:0");
        let listener = bind(&config).unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[test]
    fn test_accept_backs_off_after_failure() {
        let backoff = Duration::from_millis(30);
        let mut failures = 2;
        let start = Instant::now();

        let conn = accept_retrying(
            || {
                if failures > 0 {
                    failures -= 1;
                    return Err(io::Error::from_raw_os_error(libc::EMFILE));
                }
                Ok("conn")
            },
            backoff,
        );

        assert_eq!(conn, "conn");
        assert_eq!(failures, 0);
        assert!(start.elapsed() >= backoff * 2);
    }

    #[test]
    fn test_accept_retries_interrupted_at_once() {
        let mut failures = 3;
        let start = Instant::now();

        let conn = accept_retrying(
            || {
                if failures > 0 {
                    failures -= 1;
                    return Err(io::Error::from(io::ErrorKind::Interrupted));
                }
                Ok(7)
            },
            Duration::from_secs(5),
        );

        assert_eq!(conn, 7);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_bind_invalid_address() {
        let config = ListenerConfig::new().addr(":42069");
        assert!(matches!(bind(&config), Err(Error::InvalidAddress(_))));
    }
}
