use std::io;

use http::{Method, StatusCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("request error: {source}")]
    RequestError {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    ResponseError {
        #[from]
        source: SendError,
    },
}

/// Fieldless tag naming the failure class of a [`ParseError`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    HeaderTooLarge,
    MalformedRequestLine,
    MalformedHeaderField,
    BadContentLength,
    BodyNotAllowed,
    BadChunkSize,
    BadChunkTerminator,
    UnexpectedBodyEof,
    UnexpectedEof,
    Io,
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    HeaderTooLarge { current_size: usize, max_size: usize },

    #[error("malformed request line: {reason}")]
    MalformedRequestLine { reason: String },

    #[error("malformed header field: {reason}")]
    MalformedHeaderField { reason: String },

    #[error("invalid content-length header: {reason}")]
    BadContentLength { reason: String },

    #[error("{method} request must not carry a body")]
    BodyNotAllowed { method: Method },

    #[error("invalid chunk size: {reason}")]
    BadChunkSize { reason: String },

    #[error("chunk data is not followed by CRLF")]
    BadChunkTerminator,

    #[error("connection closed with {remaining} body bytes outstanding")]
    UnexpectedBodyEof { remaining: u64 },

    #[error("connection closed with {pending} bytes of an incomplete request head")]
    UnexpectedEof { pending: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn header_too_large(current_size: usize, max_size: usize) -> Self {
        Self::HeaderTooLarge { current_size, max_size }
    }

    pub fn malformed_request_line<S: ToString>(str: S) -> Self {
        Self::MalformedRequestLine { reason: str.to_string() }
    }

    pub fn malformed_header_field<S: ToString>(str: S) -> Self {
        Self::MalformedHeaderField { reason: str.to_string() }
    }

    pub fn bad_content_length<S: ToString>(str: S) -> Self {
        Self::BadContentLength { reason: str.to_string() }
    }

    pub fn body_not_allowed(method: Method) -> Self {
        Self::BodyNotAllowed { method }
    }

    pub fn bad_chunk_size<S: ToString>(str: S) -> Self {
        Self::BadChunkSize { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HeaderTooLarge { .. } => ErrorKind::HeaderTooLarge,
            Self::MalformedRequestLine { .. } => ErrorKind::MalformedRequestLine,
            Self::MalformedHeaderField { .. } => ErrorKind::MalformedHeaderField,
            Self::BadContentLength { .. } => ErrorKind::BadContentLength,
            Self::BodyNotAllowed { .. } => ErrorKind::BodyNotAllowed,
            Self::BadChunkSize { .. } => ErrorKind::BadChunkSize,
            Self::BadChunkTerminator => ErrorKind::BadChunkTerminator,
            Self::UnexpectedBodyEof { .. } => ErrorKind::UnexpectedBodyEof,
            Self::UnexpectedEof { .. } => ErrorKind::UnexpectedEof,
            Self::Io { .. } => ErrorKind::Io,
        }
    }

    /// The status a best-effort error response should carry.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HeaderTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("invalid response header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Failures of the backpressured channel contract.
#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("a read is already in flight on this channel")]
    ReadInFlight,

    #[error("channel is closed")]
    Closed,

    #[error("transport error: {source}")]
    Transport {
        #[from]
        source: io::Error,
    },
}

impl From<ChannelError> for io::Error {
    fn from(e: ChannelError) -> Self {
        match e {
            ChannelError::Transport { source } => source,
            ChannelError::Closed => io::Error::new(io::ErrorKind::ConnectionAborted, ChannelError::Closed),
            ChannelError::ReadInFlight => io::Error::new(io::ErrorKind::ResourceBusy, ChannelError::ReadInFlight),
        }
    }
}

impl From<ChannelError> for ParseError {
    fn from(e: ChannelError) -> Self {
        Self::io(e)
    }
}

impl From<ChannelError> for SendError {
    fn from(e: ChannelError) -> Self {
        Self::io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_hints() {
        assert_eq!(ParseError::header_too_large(9000, 8192).status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(ParseError::malformed_header_field("no colon").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ParseError::body_not_allowed(Method::GET).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ParseError::BadChunkTerminator.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ParseError::io(ChannelError::Closed).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn kinds() {
        assert_eq!(ParseError::bad_content_length("-1").kind(), ErrorKind::BadContentLength);
        assert_eq!(ParseError::UnexpectedBodyEof { remaining: 3 }.kind(), ErrorKind::UnexpectedBodyEof);
        assert_eq!(ParseError::from(ChannelError::ReadInFlight).kind(), ErrorKind::Io);
    }

    #[test]
    fn channel_error_survives_io_conversion() {
        let error: io::Error = ChannelError::ReadInFlight.into();
        assert_eq!(error.kind(), io::ErrorKind::ResourceBusy);
        let inner = error.get_ref().and_then(|e| e.downcast_ref::<ChannelError>());
        assert!(matches!(inner, Some(ChannelError::ReadInFlight)));
    }

    #[test]
    fn display_messages() {
        assert_eq!(
            ParseError::body_not_allowed(Method::GET).to_string(),
            "GET request must not carry a body"
        );
        assert_eq!(
            ParseError::header_too_large(9000, 8192).to_string(),
            "header size too large, current: 9000 exceed the limit 8192"
        );
    }
}
