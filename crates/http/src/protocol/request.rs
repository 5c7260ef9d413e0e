//! HTTP request head.
//!
//! A [`RequestHeader`] is produced once per message by the header decoder and
//! is immutable afterwards. The request URI and the version token are kept as
//! the raw bytes that arrived on the wire.

use bytes::Bytes;
use http::{Method, Version};

use crate::protocol::Headers;

/// The parsed request line plus header fields of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    method: Method,
    uri: Bytes,
    version: Bytes,
    headers: Headers,
}

impl RequestHeader {
    /// Assembles a request head. `version` is the token after `HTTP/`, such as `1.1`.
    pub fn new(method: Method, uri: impl Into<Bytes>, version: impl Into<Bytes>, headers: Headers) -> Self {
        Self { method, uri: uri.into(), version: version.into(), headers }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The raw request target, always starting with `/`.
    pub fn uri(&self) -> &[u8] {
        &self.uri
    }

    /// The request target without its query string.
    pub fn path(&self) -> &[u8] {
        match self.uri.iter().position(|&b| b == b'?') {
            Some(pos) => &self.uri[..pos],
            None => &self.uri,
        }
    }

    /// The version token following `HTTP/`, exactly as sent.
    pub fn raw_version(&self) -> &[u8] {
        &self.version
    }

    /// `HTTP/1.0` maps to [`Version::HTTP_10`], every other token is served as HTTP/1.1.
    pub fn version(&self) -> Version {
        if self.is_http_10() { Version::HTTP_10 } else { Version::HTTP_11 }
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Whether the connection stays open once this request has been answered.
    pub fn keep_alive(&self) -> bool {
        !self.is_http_10()
    }

    /// `GET` and `HEAD` never carry a body.
    pub fn need_body(&self) -> bool {
        !matches!(self.method, Method::GET | Method::HEAD)
    }

    fn is_http_10(&self) -> bool {
        &self.version[..] == b"1.0"
    }
}
