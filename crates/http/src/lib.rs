//! A backpressured HTTP/1.1 server framing layer
//!
//! This crate frames HTTP/1.1 requests off a byte stream and writes responses
//! back, one request at a time per connection. It is built so that a slow
//! consumer slows down the peer: the transport is only read when the framer or
//! a request body asks for more bytes, so a connection's memory stays bounded
//! by what is actually being processed.
//!
//! # Features
//!
//! - Incremental request head framing with an 8 KiB head limit
//! - Request bodies by Content-Length, chunked encoding, or until end of stream
//! - Streaming response bodies, sent with Content-Length when the size is known
//!   and chunked otherwise
//! - Keep-alive connections, closed after an `HTTP/1.0` request
//! - Typed protocol errors answered with a best-effort 400 or 413
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use ebb_http::connection::HttpConnection;
//! use ebb_http::handler::{HandlerError, make_handler};
//! use ebb_http::protocol::{RequestHeader, Response};
//! use http::StatusCode;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn};
//!
//! #[tokio::main]
//! async fn main() {
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     let handler = Arc::new(make_handler(hello_world));
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         let handler = handler.clone();
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             match connection.process(handler).await {
//!                 Ok(()) => info!("finished process, connection shutdown"),
//!                 Err(e) => error!("service has error, cause {}, connection shutdown", e),
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(request: RequestHeader) -> Result<Response<&'static str>, HandlerError> {
//!     info!(path = %String::from_utf8_lossy(request.path()), "receive request");
//!     Ok(Response::new(StatusCode::OK, "Hello World!\r\n"))
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`buffer`]: The growable byte buffer every connection frames from
//! - [`connection`]: The backpressured channel and the connection loop
//! - [`protocol`]: Protocol types, bodies and errors
//! - [`codec`]: Request decoding and response encoding
//! - [`handler`]: The request handler seam
//!
//! # Limitations
//!
//! - HTTP/1.1 only, one request in flight per connection (no pipelining)
//! - No TLS support (use a reverse proxy for HTTPS)
//! - No trailers on chunked bodies
//! - Maximum header size: 8KB by default

pub mod buffer;
pub mod codec;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
