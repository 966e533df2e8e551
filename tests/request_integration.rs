//! Integration tests for the reader loop
//!
//! These tests drive `request_from_reader` with sources that return data in
//! fixed-size chunks, simulating partial reads from a network connection.

use httpline::http::{request_from_reader, Error, RequestLine};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Reads up to `num_bytes_per_read` bytes per call
struct ChunkReader {
    data: Vec<u8>,
    num_bytes_per_read: usize,
    pos: usize,
}

impl ChunkReader {
    fn new(data: &str, num_bytes_per_read: usize) -> Self {
        ChunkReader {
            data: data.as_bytes().to_vec(),
            num_bytes_per_read,
            pos: 0,
        }
    }
}

impl Read for ChunkReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let end = (self.pos + self.num_bytes_per_read)
            .min(self.data.len())
            .min(self.pos + buf.len());
        let n = end - self.pos;
        buf[..n].copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(n)
    }
}

const TRAILER: &str = "Host: localhost:42069\r\nUser-Agent: curl/7.81.0\r\nAccept: */*\r\n\r\n";

fn parse_chunked(line: &str, chunk: usize) -> httpline::http::Result<RequestLine> {
    let data = format!("{}{}", line, TRAILER);
    let request = request_from_reader(ChunkReader::new(&data, chunk))?;
    Ok(request
        .into_request_line()
        .expect("completed request has a request line"))
}

fn fields(line: &RequestLine) -> (&str, &str, &str) {
    (line.method(), line.target(), line.http_version())
}

#[test]
fn test_good_get_request_line() {
    let line = parse_chunked("GET / HTTP/1.1\r\n", 3).unwrap();
    assert_eq!(fields(&line), ("GET", "/", "1.1"));
}

#[test]
fn test_good_get_request_line_with_query() {
    let line = parse_chunked("GET /coffee?flavor=arabica HTTP/1.1\r\n", 4).unwrap();
    assert_eq!(fields(&line), ("GET", "/coffee?flavor=arabica", "1.1"));
}

#[test]
fn test_good_post_request_line_one_shot() {
    let data = format!("POST /coffee HTTP/1.1\r\n{}", TRAILER);
    let request = request_from_reader(ChunkReader::new(&data, data.len())).unwrap();
    let line = request.request_line().unwrap();
    assert_eq!(fields(line), ("POST", "/coffee", "1.1"));
}

#[test]
fn test_missing_method() {
    let result = parse_chunked("/coffee HTTP/1.1\r\n", 3);
    assert!(matches!(result, Err(Error::MalformedRequestLine(_))));
}

#[test]
fn test_lowercase_method() {
    let result = parse_chunked("get / HTTP/1.1\r\n", 3);
    assert!(matches!(result, Err(Error::InvalidMethod(_))));
}

#[test]
fn test_unsupported_version() {
    let result = parse_chunked("GET / HTTP/1.0\r\n", 3);
    assert!(matches!(result, Err(Error::UnsupportedVersion(_))));
}

#[test]
fn test_leading_empty_line() {
    let result = parse_chunked("\r\nGET / HTTP/1.1\r\n", 2);
    assert!(matches!(result, Err(Error::MalformedRequestLine(_))));
}

#[test]
fn test_chunk_size_does_not_change_result() {
    let lines = [
        "GET / HTTP/1.1\r\n",
        "GET /coffee?flavor=arabica HTTP/1.1\r\n",
        "POST /coffee HTTP/1.1\r\n",
        "DELETE /orders/42 HTTP/1.1\r\n",
    ];

    for line in lines {
        let expected = parse_chunked(line, 1).unwrap();
        let total = line.len() + TRAILER.len();

        for chunk in 2..=total {
            let actual = parse_chunked(line, chunk).unwrap();
            assert_eq!(actual, expected, "chunk size {}", chunk);
        }
    }
}

#[test]
fn test_request_from_file() {
    let mut file = tempfile::tempfile().unwrap();
    write!(file, "PUT /coffee/1 HTTP/1.1\r\n{}", TRAILER).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let request = request_from_reader(file).unwrap();
    let line = request.request_line().unwrap();
    assert_eq!(fields(line), ("PUT", "/coffee/1", "1.1"));
}

#[test]
fn test_truncated_file() {
    let mut file = tempfile::tempfile().unwrap();
    write!(file, "GET /coffee HTTP/1.1").unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let result = request_from_reader(file);
    assert!(matches!(result, Err(Error::Truncated { buffered: 20 })));
}
