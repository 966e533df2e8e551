//! Request-line parsing
//!
//! [`Request::parse`] is fed the unconsumed bytes of the read buffer and
//! reports how many of them it accepted. Returning `Ok(0)` means more input
//! is needed.

use super::{Error, ParseState, Request, RequestLine, Result, CRLF, SUPPORTED_VERSION};

/// Find the next CRLF in a buffer
fn find_crlf(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == CRLF.as_bytes())
}

/// Ranges of the Latin script, as used for method validation
const LATIN_RANGES: &[(char, char)] = &[
    ('\u{0041}', '\u{005A}'),
    ('\u{0061}', '\u{007A}'),
    ('\u{00AA}', '\u{00AA}'),
    ('\u{00BA}', '\u{00BA}'),
    ('\u{00C0}', '\u{00D6}'),
    ('\u{00D8}', '\u{00F6}'),
    ('\u{00F8}', '\u{02B8}'),
    ('\u{02E0}', '\u{02E4}'),
    ('\u{1D00}', '\u{1D25}'),
    ('\u{1D2C}', '\u{1D5C}'),
    ('\u{1D62}', '\u{1D65}'),
    ('\u{1D6B}', '\u{1D77}'),
    ('\u{1D79}', '\u{1DBE}'),
    ('\u{1E00}', '\u{1EFF}'),
    ('\u{2071}', '\u{2071}'),
    ('\u{207F}', '\u{207F}'),
    ('\u{2090}', '\u{209C}'),
    ('\u{212A}', '\u{212B}'),
    ('\u{2132}', '\u{2132}'),
    ('\u{214E}', '\u{214E}'),
    ('\u{2160}', '\u{2188}'),
    ('\u{2C60}', '\u{2C7F}'),
    ('\u{A722}', '\u{A787}'),
    ('\u{A78B}', '\u{A7FF}'),
    ('\u{AB30}', '\u{AB5A}'),
    ('\u{AB5C}', '\u{AB64}'),
    ('\u{AB66}', '\u{AB69}'),
    ('\u{FB00}', '\u{FB06}'),
    ('\u{FF21}', '\u{FF3A}'),
    ('\u{FF41}', '\u{FF5A}'),
    ('\u{10780}', '\u{10785}'),
    ('\u{10787}', '\u{107B0}'),
    ('\u{107B2}', '\u{107BA}'),
    ('\u{1DF00}', '\u{1DF1E}'),
    ('\u{1DF25}', '\u{1DF2A}'),
];

fn is_latin_letter(c: char) -> bool {
    c.is_alphabetic()
        && LATIN_RANGES
            .iter()
            .any(|&(lo, hi)| (lo..=hi).contains(&c))
}

/// Validate an HTTP request line
///
/// Format: METHOD SP TARGET SP HTTP/1.1, without the trailing CRLF.
/// Example: GET /index.html HTTP/1.1
pub fn parse_request_line(line: &str) -> Result<RequestLine> {
    let parts: Vec<&str> = line.split(' ').collect();

    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(format!(
            "expected 3 parts, got {}",
            parts.len()
        )));
    }

    let (method, target, version) = (parts[0], parts[1], parts[2]);

    if method.is_empty() || target.is_empty() || version.is_empty() {
        return Err(Error::MalformedRequestLine("empty parts".to_string()));
    }

    if method != method.to_uppercase() {
        return Err(Error::InvalidMethod(format!("{}: not uppercase", method)));
    }

    if !method.chars().all(is_latin_letter) {
        return Err(Error::InvalidMethod(format!(
            "{}: contains non-alphabetic characters",
            method
        )));
    }

    if version != SUPPORTED_VERSION {
        return Err(Error::UnsupportedVersion(version.to_string()));
    }

    let number = match version.split_once('/') {
        Some((_, number)) => number,
        None => return Err(Error::UnsupportedVersion(version.to_string())),
    };

    Ok(RequestLine::new(method, target, number))
}

impl Request {
    /// Feed data to the parser
    ///
    /// Returns the number of bytes consumed, including line terminators.
    /// `Ok(0)` means the data holds no complete line yet. Calling this on a
    /// request that is already done is an error.
    pub fn parse(&mut self, data: &[u8]) -> Result<usize> {
        if self.state == ParseState::Done {
            return Err(Error::AlreadyParsed);
        }

        let mut consumed = 0;
        while self.state != ParseState::Done {
            let n = self.parse_single(&data[consumed..])?;
            if n == 0 {
                break;
            }
            consumed += n;
        }

        Ok(consumed)
    }

    fn parse_single(&mut self, data: &[u8]) -> Result<usize> {
        match self.state {
            ParseState::Initialized => {
                let Some(crlf_pos) = find_crlf(data) else {
                    return Ok(0);
                };

                if crlf_pos == 0 {
                    return Err(Error::MalformedRequestLine(
                        "does not start with a method token".to_string(),
                    ));
                }

                let line = std::str::from_utf8(&data[..crlf_pos])
                    .map_err(|_| Error::MalformedRequestLine("not valid UTF-8".to_string()))?;

                self.request_line = Some(parse_request_line(line)?);
                self.state = ParseState::Done;

                Ok(crlf_pos + CRLF.len())
            }
            ParseState::Done => Err(Error::AlreadyParsed),
        }
    }
}
