//! HTTP response type.
//!
//! A [`Response`] carries a status, raw header lines and a body. The framing
//! header (`Content-Length` or `Transfer-Encoding`) is never part of
//! [`Response::headers`]; the encoder derives it from the body.

use http::StatusCode;

use crate::protocol::Headers;

/// Reason phrase used when a status code is not in the table.
pub const UNKNOWN_REASON: &str = "???";

/// The response head before a body is attached.
pub type ResponseHead = Response<()>;

#[derive(Debug, Clone)]
pub struct Response<B> {
    status: StatusCode,
    headers: Headers,
    body: B,
}

impl<B> Response<B> {
    pub fn new(status: StatusCode, body: B) -> Self {
        Self { status, headers: Headers::new(), body }
    }

    pub fn from_parts(head: ResponseHead, body: B) -> Self {
        Self { status: head.status, headers: head.headers, body }
    }

    /// Appends `name: value` and returns the response, for chained construction.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &B {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut B {
        &mut self.body
    }

    pub fn into_parts(self) -> (ResponseHead, B) {
        (Response { status: self.status, headers: self.headers, body: () }, self.body)
    }

    pub fn into_body(self) -> B {
        self.body
    }

    pub fn map<F, T>(self, f: F) -> Response<T>
    where
        F: FnOnce(B) -> T,
    {
        Response { status: self.status, headers: self.headers, body: f(self.body) }
    }
}

impl<B: Default> Default for Response<B> {
    fn default() -> Self {
        Self::new(StatusCode::OK, B::default())
    }
}

/// Reason phrase for `status`, `???` when the code has none.
pub fn reason_phrase(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or(UNKNOWN_REASON)
}

/// Renders `HTTP/1.1 <code> <reason>\r\n`.
pub fn status_line(status: StatusCode) -> String {
    format!("HTTP/1.1 {} {}\r\n", status.as_u16(), reason_phrase(status))
}
