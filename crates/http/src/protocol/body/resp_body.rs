use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};
use http_body_util::{BodyExt, Empty, Full};

use crate::protocol::body::ReqBody;

/// Boxed error produced by a response body.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Type-erased response body.
///
/// A response body may borrow from the connection for `'conn`, which is how a
/// handler streams the request body straight back (see `From<ReqBody>`).
/// In-memory bodies report an exact size and are sent with `Content-Length`;
/// every other body is sent chunked.
pub struct RespBody<'conn> {
    inner: Pin<Box<dyn Body<Data = Bytes, Error = BoxError> + Send + 'conn>>,
}

impl<'conn> RespBody<'conn> {
    pub fn new<B>(body: B) -> Self
    where
        B: Body<Data = Bytes> + Send + 'conn,
        B::Error: Into<BoxError>,
    {
        Self { inner: Box::pin(body.map_err(Into::into)) }
    }

    pub fn empty() -> Self {
        Self::new(Empty::<Bytes>::new())
    }

    pub fn full(bytes: impl Into<Bytes>) -> Self {
        Self::new(Full::new(bytes.into()))
    }
}

impl Default for RespBody<'_> {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for RespBody<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RespBody").field("size_hint", &self.inner.size_hint()).finish_non_exhaustive()
    }
}

impl Body for RespBody<'_> {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        self.inner.as_mut().poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl<'conn> From<ReqBody<'conn>> for RespBody<'conn> {
    fn from(body: ReqBody<'conn>) -> Self {
        Self::new(body)
    }
}

impl From<Bytes> for RespBody<'_> {
    fn from(bytes: Bytes) -> Self {
        Self::full(bytes)
    }
}

impl From<String> for RespBody<'_> {
    fn from(s: String) -> Self {
        Self::full(s)
    }
}

impl From<&'static str> for RespBody<'_> {
    fn from(s: &'static str) -> Self {
        Self::full(s)
    }
}

impl From<Vec<u8>> for RespBody<'_> {
    fn from(v: Vec<u8>) -> Self {
        Self::full(v)
    }
}

impl From<()> for RespBody<'_> {
    fn from((): ()) -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use futures::stream;
    use http_body_util::StreamBody;

    use super::*;
    use crate::protocol::body::ReadBody;

    #[tokio::test]
    async fn in_memory_bodies_have_exact_size() {
        assert_eq!(RespBody::from("hello").declared_length(), Some(5));
        assert_eq!(RespBody::empty().declared_length(), Some(0));
        assert_eq!(RespBody::from(String::from("abc")).declared_length(), Some(3));

        let mut body = RespBody::full("hello");
        assert_eq!(&body.read().await.unwrap()[..], b"hello");
        assert!(body.read().await.unwrap().is_empty());
        assert!(body.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn streaming_body_has_unknown_size() {
        let units = vec![
            Ok::<_, std::io::Error>(Frame::data(Bytes::from_static(b"a"))),
            Ok(Frame::data(Bytes::new())),
            Ok(Frame::data(Bytes::from_static(b"b"))),
        ];
        let mut body = RespBody::new(StreamBody::new(stream::iter(units)));
        assert_eq!(body.declared_length(), None);

        assert_eq!(&body.read().await.unwrap()[..], b"a");
        assert_eq!(&body.read().await.unwrap()[..], b"b");
        assert!(body.read().await.unwrap().is_empty());
    }
}
