//! Core HTTP protocol abstractions.
//!
//! This module provides the types every other layer speaks: parsed request
//! heads, responses, body envelopes, streaming bodies and the error taxonomy.
//!
//! # Architecture
//!
//! - **Message Handling** ([`message`]): Core message types and payload processing
//!   - [`Message`]: Represents either a head or a payload item
//!   - [`PayloadItem`]: A chunk of body data or the end-of-body marker
//!   - [`PayloadSize`]: The body envelope announced by a head
//!
//! - **Headers** ([`header`]): Ordered raw header lines with case-insensitive lookup
//!
//! - **Request Processing** ([`request`]): [`RequestHeader`], immutable once framed
//!
//! - **Response Processing** ([`response`]): [`Response`], [`ResponseHead`] and the
//!   status line helpers
//!
//! - **Body Streaming** ([`body`]): [`body::ReqBody`], [`body::RespBody`] and the
//!   [`body::ReadBody`] pull interface
//!
//! - **Error Handling** ([`error`]):
//!   - [`HttpError`]: Top-level error type
//!   - [`ParseError`]: Request framing errors, each with an [`ErrorKind`] and a status hint
//!   - [`SendError`]: Response sending errors
//!   - [`ChannelError`]: Misuse or failure of the backpressured channel

mod message;
pub use message::Message;
pub use message::PayloadItem;
pub use message::PayloadSize;

mod header;
pub use header::Headers;
pub use header::is_valid_header_line;

mod request;
pub use request::RequestHeader;

mod response;
pub use response::Response;
pub use response::ResponseHead;
pub use response::reason_phrase;
pub use response::status_line;

mod error;
pub use error::ChannelError;
pub use error::ErrorKind;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;

pub mod body;
