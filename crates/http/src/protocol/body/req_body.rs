use std::pin::Pin;
use std::task::{Context, Poll, ready};

use bytes::Bytes;
use http_body::{Body, Frame, SizeHint};

use crate::connection::RequestReader;
use crate::protocol::{ParseError, PayloadItem, PayloadSize};

/// ReqBody streams the body of the request currently being handled.
///
/// It borrows the connection's [`RequestReader`] for `'conn`, so each poll
/// pulls the next decoded unit straight out of the shared buffer, reading from
/// the transport only when the buffer runs dry. Nothing is read ahead; a
/// handler that stops polling stops the connection from pulling bytes off the
/// wire.
///
/// Whatever the handler leaves unread is drained by the connection after the
/// response has been sent.
#[derive(Debug)]
pub struct ReqBody<'conn> {
    reader: Option<&'conn mut RequestReader>,
    size: PayloadSize,
    received: u64,
    eof: bool,
}

impl<'conn> ReqBody<'conn> {
    pub(crate) fn new(reader: &'conn mut RequestReader, size: PayloadSize) -> Self {
        Self { reader: Some(reader), size, received: 0, eof: false }
    }

    /// A body with no bytes, not attached to any connection.
    pub fn empty() -> Self {
        Self { reader: None, size: PayloadSize::Empty, received: 0, eof: true }
    }

    /// The envelope the request head declared.
    pub fn payload_size(&self) -> PayloadSize {
        self.size
    }
}

impl Body for ReqBody<'_> {
    type Data = Bytes;
    type Error = ParseError;

    fn poll_frame(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.eof {
            return Poll::Ready(None);
        }

        let Some(reader) = this.reader.as_deref_mut() else {
            this.eof = true;
            return Poll::Ready(None);
        };

        match ready!(reader.poll_payload(cx)) {
            Ok(PayloadItem::Chunk(bytes)) => {
                this.received += bytes.len() as u64;
                Poll::Ready(Some(Ok(Frame::data(bytes))))
            }
            Ok(PayloadItem::Eof) => {
                this.eof = true;
                Poll::Ready(None)
            }
            Err(e) => {
                this.eof = true;
                Poll::Ready(Some(Err(e)))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.eof || self.size.is_empty()
    }

    fn size_hint(&self) -> SizeHint {
        match self.size {
            PayloadSize::Length(n) => SizeHint::with_exact(n.saturating_sub(self.received)),
            size => size.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    #[tokio::test]
    async fn empty_body() {
        let body = ReqBody::empty();
        assert!(body.is_end_stream());
        assert_eq!(body.size_hint().exact(), Some(0));

        let collected = body.collect().await.unwrap().to_bytes();
        assert!(collected.is_empty());
    }
}
