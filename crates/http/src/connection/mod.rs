//! HTTP connection handling module
//!
//! This module owns everything that touches the transport of one connection.
//!
//! # Components
//!
//! - [`Channel`]: the backpressured byte channel. Its [`ChannelReader`] reads
//!   the socket only when asked to, with at most one read outstanding, and its
//!   [`ChannelWriter`] flushes every write.
//! - [`RequestReader`]: the connection's single buffer plus the request
//!   decoder. It frames heads and feeds request bodies on demand.
//! - [`HttpConnection`]: the connection loop that:
//!   - Frames the next request
//!   - Hands it to the handler
//!   - Streams the response
//!   - Drains any unread request body before the next request
//!   - Keeps the connection alive unless the request declared `HTTP/1.0`
//! - [`ServerOptions`]: per-connection limits and timeouts
//!
//! # Features
//!
//! - Memory bounded by what the handler actually consumes
//! - Streaming request and response bodies
//! - Best-effort error responses for malformed requests

mod channel;
mod http_connection;
mod message_writer;
mod options;
mod request_reader;

pub use channel::{Channel, ChannelReader, ChannelWriter, DEFAULT_READ_SIZE};
pub use http_connection::HttpConnection;
pub use options::ServerOptions;
pub use request_reader::RequestReader;
