use std::future::poll_fn;
use std::io;
use std::task::{Context, Poll, ready};

use tracing::{info, trace};

use crate::buffer::GrowableBuffer;
use crate::codec::{Decoder, RequestDecoder};
use crate::connection::channel::ChannelReader;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHeader};

/// Frames requests and their bodies out of one connection's byte stream.
///
/// The reader owns the connection's single [`GrowableBuffer`]. Heads and body
/// units are decoded from the buffer first; the channel is only read when the
/// decoder needs more bytes, one read at a time.
#[derive(Debug)]
pub struct RequestReader {
    buffer: GrowableBuffer,
    channel: ChannelReader,
    decoder: RequestDecoder,
    eof: bool,
    broken: bool,
}

impl RequestReader {
    pub fn new(channel: ChannelReader, max_header_bytes: usize) -> Self {
        Self {
            buffer: GrowableBuffer::new(),
            channel,
            decoder: RequestDecoder::with_max_header_bytes(max_header_bytes),
            eof: false,
            broken: false,
        }
    }

    /// Bytes received but not yet consumed by the decoder.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_eof(&self) -> bool {
        self.eof
    }

    /// True once a body read has failed; the byte stream is no longer framed.
    pub fn is_broken(&self) -> bool {
        self.broken
    }

    pub fn close(&mut self) {
        self.channel.close();
    }

    fn poll_message(&mut self, cx: &mut Context<'_>) -> Poll<Result<Option<Message<(RequestHeader, PayloadSize)>>, ParseError>> {
        loop {
            if self.eof {
                return Poll::Ready(self.decoder.decode_eof(&mut self.buffer));
            }

            if let Some(message) = self.decoder.decode(&mut self.buffer)? {
                return Poll::Ready(Ok(Some(message)));
            }

            let bytes = ready!(self.channel.poll_read(cx))?;
            if bytes.is_empty() {
                trace!(buffered = self.buffer.len(), "request stream reached end of stream");
                self.eof = true;
            } else {
                self.buffer.append(&bytes);
            }
        }
    }

    /// Frames the next request head.
    ///
    /// Any unread body of the previous request is drained first. Returns
    /// `Ok(None)` on a clean end of stream between requests.
    pub async fn read_request(&mut self) -> Result<Option<(RequestHeader, PayloadSize)>, ParseError> {
        if self.decoder.in_payload() {
            self.skip_body().await?;
        }

        match poll_fn(|cx| self.poll_message(cx)).await? {
            Some(Message::Header(head)) => Ok(Some(head)),
            Some(Message::Payload(_)) => Err(ParseError::io(io::Error::other("body unit decoded while awaiting a request head"))),
            None => Ok(None),
        }
    }

    /// Polls the next unit of the current request's body.
    ///
    /// Yields `PayloadItem::Eof` once the body has been fully consumed, and on
    /// every call after that until the next head is framed.
    pub(crate) fn poll_payload(&mut self, cx: &mut Context<'_>) -> Poll<Result<PayloadItem, ParseError>> {
        if self.broken {
            return Poll::Ready(Err(ParseError::io(io::Error::other("request body is no longer readable"))));
        }
        if !self.decoder.in_payload() {
            return Poll::Ready(Ok(PayloadItem::Eof));
        }

        let result = match ready!(self.poll_message(cx)) {
            Ok(Some(Message::Payload(item))) => Ok(item),
            Ok(Some(Message::Header(_))) => Err(ParseError::io(io::Error::other("request head decoded while reading a body"))),
            Ok(None) => Err(ParseError::UnexpectedBodyEof { remaining: 0 }),
            Err(e) => Err(e),
        };

        if result.is_err() {
            self.broken = true;
        }
        Poll::Ready(result)
    }

    /// Reads and discards whatever is left of the current request's body.
    pub async fn skip_body(&mut self) -> Result<(), ParseError> {
        let mut size = 0u64;
        loop {
            match poll_fn(|cx| self.poll_payload(cx)).await? {
                PayloadItem::Chunk(bytes) => size += bytes.len() as u64,
                PayloadItem::Eof => break,
            }
        }

        if size > 0 {
            info!(size, "skip request body");
        }
        Ok(())
    }
}
