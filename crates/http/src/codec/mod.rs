//! HTTP codec module for encoding and decoding HTTP messages
//!
//! This module turns the bytes accumulated in a [`GrowableBuffer`] into request
//! heads and body chunks, and renders responses back into wire bytes. Every
//! decoder is a small state machine that consumes exactly the bytes it has
//! recognised and leaves the rest in the buffer, so a message may be split
//! across reads at any byte boundary.
//!
//! # Architecture
//!
//! - Request handling:
//!   - [`RequestDecoder`]: yields one head followed by the body chunks of that request
//!   - Head framing via [`HeaderDecoder`]
//!   - Body decoding via [`PayloadDecoder`] (Content-Length, chunked, until EOF)
//!
//! - Response handling:
//!   - [`ResponseEncoder`]: renders the head, then frames body chunks
//!   - Status line and header lines via [`HeaderEncoder`]
//!   - Body framing via [`PayloadEncoder`]
//!
//! # Example
//!
//! ```
//! use ebb_http::buffer::GrowableBuffer;
//! use ebb_http::codec::{Decoder, RequestDecoder};
//! use ebb_http::protocol::Message;
//!
//! let mut decoder = RequestDecoder::new();
//! let mut buffer = GrowableBuffer::from(&b"GET / HTTP/1.1\r\nHost: x\r\n\r\n"[..]);
//!
//! let message = decoder.decode(&mut buffer).unwrap();
//! assert!(matches!(message, Some(Message::Header(_))));
//! assert!(buffer.is_empty());
//! ```

mod body;
mod header;
mod request_decoder;
mod response_encoder;

pub use body::{ChunkedDecoder, ChunkedEncoder, PayloadDecoder, PayloadEncoder};
pub use header::{HeaderDecoder, HeaderEncoder, MAX_HEADER_BYTES, try_extract_header};
pub use request_decoder::RequestDecoder;
pub use response_encoder::ResponseEncoder;

use crate::buffer::GrowableBuffer;

/// Incremental decoding from a [`GrowableBuffer`].
///
/// `decode` consumes the bytes of a complete item from the front of `src`, or
/// returns `Ok(None)` leaving `src` untouched when more bytes are needed.
/// `decode_eof` is called once the transport has reached end of stream and
/// decides whether the remaining bytes form a valid ending.
pub trait Decoder {
    type Item;
    type Error;

    fn decode(&mut self, src: &mut GrowableBuffer) -> Result<Option<Self::Item>, Self::Error>;

    fn decode_eof(&mut self, src: &mut GrowableBuffer) -> Result<Option<Self::Item>, Self::Error>;
}
