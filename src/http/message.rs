//! Request types
//!
//! A [`Request`] only carries a [`RequestLine`] once the parser has moved it
//! to [`ParseState::Done`].

use std::fmt;

/// Parser state of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseState {
    #[default]
    Initialized,
    Done,
}

impl ParseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseState::Initialized => "Initialized",
            ParseState::Done => "Done",
        }
    }
}

impl fmt::Display for ParseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parsed request line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: String,
    target: String,
    http_version: String,
}

impl RequestLine {
    pub(crate) fn new(method: &str, target: &str, http_version: &str) -> Self {
        RequestLine {
            method: method.to_string(),
            target: target.to_string(),
            http_version: http_version.to_string(),
        }
    }

    /// Request method, e.g. `GET`
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request target as sent by the client
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Version number after the `HTTP/` prefix, e.g. `1.1`
    pub fn http_version(&self) -> &str {
        &self.http_version
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} HTTP/{}", self.method, self.target, self.http_version)
    }
}

/// A request under construction
#[derive(Debug, Default)]
pub struct Request {
    pub(crate) state: ParseState,
    pub(crate) request_line: Option<RequestLine>,
}

impl Request {
    /// Create a new request in the `Initialized` state
    pub fn new() -> Self {
        Request::default()
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    /// The request line, present once parsing completed successfully
    pub fn request_line(&self) -> Option<&RequestLine> {
        self.request_line.as_ref()
    }

    /// Take ownership of the request line
    pub fn into_request_line(self) -> Option<RequestLine> {
        self.request_line
    }
}
