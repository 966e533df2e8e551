//! httpline - incremental HTTP/1.1 request-line parsing
//!
//! This crate reads an HTTP/1.1 request line from any byte stream without
//! assuming the whole message arrives in one read, plus the small amount of
//! TCP plumbing needed to run it against real connections.

pub mod http;
pub mod net;
