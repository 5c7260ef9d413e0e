//! HTTP header decoder implementation for framing HTTP request heads
//!
//! This module extracts one complete request head from the connection buffer and
//! parses it into a [`RequestHeader`]. Framing is purely syntactic:
//!
//! 1. Look for the `\r\n\r\n` terminator among the unconsumed bytes
//! 2. Consume the head, terminator included, from the front of the buffer
//! 3. Split it on CRLF, parse the request line, and check every header line
//! 4. Decide the body envelope from `Content-Length` and `Transfer-Encoding`
//!
//! # Limits
//!
//! - Maximum head size: 8KB by default ([`MAX_HEADER_BYTES`])
//! - The request line must be exactly `METHOD SP URI SP HTTP/VERSION`

use bytes::Bytes;
use http::Method;
use tracing::trace;

use crate::buffer::GrowableBuffer;
use crate::codec::Decoder;
use crate::ensure;
use crate::protocol::{Headers, ParseError, PayloadSize, RequestHeader, is_valid_header_line};
use crate::utils::find_subslice;

/// Maximum size in bytes allowed for the entire head, terminator included
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

const CRLF: &[u8] = b"\r\n";
const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";
const VERSION_PREFIX: &[u8] = b"HTTP/";

/// Decoder for HTTP request heads implementing the [`Decoder`] trait.
///
/// Each decoded item pairs the [`RequestHeader`] with the [`PayloadSize`]
/// describing how its body is framed.
#[derive(Debug, Clone, Copy)]
pub struct HeaderDecoder {
    max_header_bytes: usize,
}

impl HeaderDecoder {
    pub fn new(max_header_bytes: usize) -> Self {
        Self { max_header_bytes }
    }
}

impl Default for HeaderDecoder {
    fn default() -> Self {
        Self::new(MAX_HEADER_BYTES)
    }
}

impl Decoder for HeaderDecoder {
    type Item = (RequestHeader, PayloadSize);
    type Error = ParseError;

    /// Attempts to frame a request head from the buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((header, payload_size)))` once the terminator has arrived
    /// - `Ok(None)` if more data is needed
    /// - `Err(ParseError)` if the head is too large or malformed
    fn decode(&mut self, src: &mut GrowableBuffer) -> Result<Option<Self::Item>, Self::Error> {
        let Some(header) = try_extract_header(src, self.max_header_bytes)? else {
            return Ok(None);
        };

        let payload_size = body_envelope(&header)?;
        Ok(Some((header, payload_size)))
    }

    fn decode_eof(&mut self, src: &mut GrowableBuffer) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }

        ensure!(src.is_empty(), ParseError::UnexpectedEof { pending: src.len() });
        Ok(None)
    }
}

/// Frames one request head out of `buf`.
///
/// Returns `Ok(None)` without touching the buffer while the terminator is
/// missing. Once it is present the whole head is consumed from the buffer, even
/// if parsing it then fails.
pub fn try_extract_header(buf: &mut GrowableBuffer, max_header_bytes: usize) -> Result<Option<RequestHeader>, ParseError> {
    let Some(pos) = buf.find(HEAD_TERMINATOR) else {
        ensure!(buf.len() < max_header_bytes, ParseError::header_too_large(buf.len(), max_header_bytes));
        return Ok(None);
    };

    let head_len = pos + HEAD_TERMINATOR.len();
    ensure!(head_len <= max_header_bytes, ParseError::header_too_large(head_len, max_header_bytes));

    let head = buf.split_front(head_len);
    trace!(head_size = head_len, "framed request head");

    parse_head(&head.slice(..pos)).map(Some)
}

/// Parses the head without its terminating blank line.
fn parse_head(block: &Bytes) -> Result<RequestHeader, ParseError> {
    let mut lines = Lines { rest: block.clone() };

    let request_line = lines.next().unwrap_or_default();
    let (method, uri, version) = parse_request_line(&request_line)?;

    let mut headers = Headers::with_capacity(16);
    for line in lines {
        ensure!(is_valid_header_line(&line), ParseError::malformed_header_field(String::from_utf8_lossy(&line)));
        headers.push(line);
    }

    Ok(RequestHeader::new(method, uri, version, headers))
}

fn parse_request_line(line: &Bytes) -> Result<(Method, Bytes, Bytes), ParseError> {
    let malformed = || ParseError::malformed_request_line(String::from_utf8_lossy(line));

    let mut tokens = line.split(|&b| b == b' ');
    let (Some(method), Some(uri), Some(version), None) = (tokens.next(), tokens.next(), tokens.next(), tokens.next()) else {
        return Err(malformed());
    };

    let method = Method::from_bytes(method).map_err(|e| {
        trace!(cause = %e, "rejected request method");
        malformed()
    })?;
    ensure!(uri.starts_with(b"/"), malformed());
    ensure!(version.starts_with(VERSION_PREFIX), malformed());

    Ok((method, line.slice_ref(uri), line.slice_ref(&version[VERSION_PREFIX.len()..])))
}

/// Splits a head block on CRLF without copying.
struct Lines {
    rest: Bytes,
}

impl Iterator for Lines {
    type Item = Bytes;

    fn next(&mut self) -> Option<Self::Item> {
        if self.rest.is_empty() {
            return None;
        }

        match find_subslice(&self.rest, CRLF) {
            Some(pos) => {
                let line = self.rest.slice(..pos);
                self.rest = self.rest.slice(pos + CRLF.len()..);
                Some(line)
            }
            None => Some(std::mem::take(&mut self.rest)),
        }
    }
}

/// Determines the body envelope of a request from its headers.
///
/// # Errors
///
/// - `BadContentLength` if both `Content-Length` and chunked encoding are
///   present, or if `Content-Length` holds anything but decimal digits
/// - `BodyNotAllowed` if a `GET`/`HEAD` declares a non-empty body
fn body_envelope(header: &RequestHeader) -> Result<PayloadSize, ParseError> {
    let content_length = header.headers().get("Content-Length");
    let chunked = header.headers().get("Transfer-Encoding").is_some_and(is_chunked);

    match (content_length, chunked) {
        (Some(_), true) => Err(ParseError::bad_content_length("content-length and chunked transfer-encoding both present")),

        (Some(value), false) => {
            let length = parse_content_length(value)?;
            if !header.need_body() {
                ensure!(length == 0, ParseError::body_not_allowed(header.method().clone()));
                return Ok(PayloadSize::Empty);
            }
            Ok(if length == 0 { PayloadSize::Empty } else { PayloadSize::Length(length) })
        }

        (None, true) => {
            ensure!(header.need_body(), ParseError::body_not_allowed(header.method().clone()));
            Ok(PayloadSize::Chunked)
        }

        (None, false) if header.need_body() => Ok(PayloadSize::UntilEof),

        (None, false) => Ok(PayloadSize::Empty),
    }
}

/// Parses a strictly decimal `Content-Length`: no sign, no inner whitespace.
fn parse_content_length(value: &[u8]) -> Result<u64, ParseError> {
    let invalid = || ParseError::bad_content_length(format!("value {} is not a non-negative integer", String::from_utf8_lossy(value)));

    ensure!(!value.is_empty(), invalid());

    value.iter().try_fold(0u64, |length, &b| {
        ensure!(b.is_ascii_digit(), invalid());
        length.checked_mul(10).and_then(|length| length.checked_add(u64::from(b - b'0'))).ok_or_else(invalid)
    })
}

fn is_chunked(value: &[u8]) -> bool {
    value.eq_ignore_ascii_case(b"chunked")
}
