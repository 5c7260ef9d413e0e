//! HTTP header processing module for encoding and decoding heads
//!
//! # Components
//!
//! - [`HeaderDecoder`]: frames one request head out of the buffer
//!   - Enforces the head size limit
//!   - Validates the request line and the shape of each header line
//!   - Decides the body envelope from `Content-Length`/`Transfer-Encoding`
//!
//! - [`HeaderEncoder`]: renders a response head
//!   - Status line with the canonical reason phrase
//!   - Caller header lines in insertion order
//!   - Exactly one framing header derived from the body

mod header_decoder;
mod header_encoder;

pub use header_decoder::{HeaderDecoder, MAX_HEADER_BYTES, try_extract_header};
pub use header_encoder::HeaderEncoder;
