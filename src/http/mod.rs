//! HTTP/1.1 request-line parsing
//!
//! The module is split into two collaborating halves:
//!
//! - [`reader`] pulls bytes from a source into a [`ReadBuffer`] and calls
//!   the parser until a request is complete
//! - [`parser`] holds the state machine that turns a byte span into a
//!   validated [`RequestLine`]
//!
//! # Examples
//!
//! ```
//! use httpline::http::request_from_reader;
//!
//! let data = b"GET /coffee HTTP/1.1\r\nHost: localhost\r\n\r\n";
//! let request = request_from_reader(&data[..]).unwrap();
//!
//! let line = request.request_line().unwrap();
//! assert_eq!(line.method(), "GET");
//! assert_eq!(line.target(), "/coffee");
//! assert_eq!(line.http_version(), "1.1");
//! ```

pub mod buffer;
pub mod message;
pub mod parser;
pub mod reader;
pub mod session;

pub use buffer::ReadBuffer;
pub use message::{ParseState, Request, RequestLine};
pub use parser::parse_request_line;
pub use reader::{request_from_reader, request_from_reader_with, EofPolicy, ReaderConfig};
pub use session::{DeadlineExpired, DeadlineSession, SessionOps};

/// Result type for HTTP operations
pub type Result<T> = std::result::Result<T, Error>;

/// HTTP operation errors
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Unsupported HTTP version: {0}")]
    UnsupportedVersion(String),

    #[error("Request already parsed")]
    AlreadyParsed,

    #[error("Stream ended with {buffered} unparsed bytes before the request line was complete")]
    Truncated { buffered: usize },

    #[error("Request line exceeds {limit} bytes")]
    LineTooLong { limit: usize },

    #[error("Timeout")]
    Timeout,
}

/// The only version accepted on the request line
pub const SUPPORTED_VERSION: &str = "HTTP/1.1";

/// Initial read buffer capacity
pub const DEFAULT_BUFFER_SIZE: usize = 8;

/// Upper bound for read buffer growth
pub const MAX_BUFFER_SIZE: usize = 8192;

/// CRLF line ending
pub const CRLF: &str = "\r\n";
