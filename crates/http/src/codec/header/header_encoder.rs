//! HTTP header encoder implementation for serializing HTTP response heads
//!
//! The status line is always `HTTP/1.1`, the caller's header lines follow in
//! insertion order, and the encoder itself appends exactly one framing header:
//! `Content-Length` when the body length is known, `Transfer-Encoding: chunked`
//! otherwise.

use std::fmt::Write;

use bytes::{BufMut, BytesMut};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{PayloadSize, ResponseHead, SendError, is_valid_header_line, reason_phrase};

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 1024;

/// Headers the encoder owns; a response must not carry them itself.
const FRAMING_HEADERS: [&[u8]; 2] = [b"content-length", b"transfer-encoding"];

/// Encoder for HTTP response heads implementing the [`Encoder`] trait.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderEncoder;

impl Encoder<(ResponseHead, PayloadSize)> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the response head into `dst`.
    ///
    /// # Errors
    ///
    /// Returns `SendError::InvalidHeader` without writing anything if a header
    /// line is malformed or is one of the framing headers.
    fn encode(&mut self, item: (ResponseHead, PayloadSize), dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (head, payload_size) = item;

        for line in head.headers() {
            if !is_valid_header_line(line) {
                return Err(SendError::invalid_header(format!("malformed line {:?}", String::from_utf8_lossy(line))));
            }
            let name = line.split(|&b| b == b':').next().unwrap_or_default().trim_ascii();
            if FRAMING_HEADERS.iter().any(|framing| name.eq_ignore_ascii_case(framing)) {
                error!(header = %String::from_utf8_lossy(name), "response must not set framing headers");
                return Err(SendError::invalid_header(format!("{} is set by the encoder", String::from_utf8_lossy(name))));
            }
        }

        dst.reserve(INIT_HEADER_SIZE);
        let status = head.status();
        write!(dst, "HTTP/1.1 {} {}\r\n", status.as_u16(), reason_phrase(status)).map_err(SendError::invalid_header)?;

        for line in head.headers() {
            dst.put_slice(line);
            dst.put_slice(b"\r\n");
        }

        match payload_size.declared_length() {
            Some(n) => write!(dst, "Content-Length: {n}\r\n").map_err(SendError::invalid_header)?,
            None => dst.put_slice(b"Transfer-Encoding: chunked\r\n"),
        }

        dst.put_slice(b"\r\n");
        Ok(())
    }
}
