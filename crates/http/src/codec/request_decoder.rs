//! HTTP request decoder module
//!
//! This module decodes requests in two phases: the head, then the payload that
//! head announced. Body bytes are always consumed through the payload decoder,
//! so the next head is only framed once the previous body has been drained.
//!
//! # Components
//!
//! - [`RequestDecoder`]: Main decoder that coordinates header and payload parsing
//! - Header parsing: Uses [`HeaderDecoder`] for framing request heads
//! - Payload handling: Uses [`PayloadDecoder`] for handling request bodies if any

use crate::buffer::GrowableBuffer;
use crate::codec::Decoder;
use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::protocol::{Message, ParseError, PayloadItem, PayloadSize, RequestHeader};

/// A decoder for HTTP requests that handles both headers and payload
///
/// # State Machine
///
/// The decoder maintains its state through the `payload_decoder` field:
/// - `None`: Currently parsing headers
/// - `Some(PayloadDecoder)`: Currently parsing payload
#[derive(Debug, Default)]
pub struct RequestDecoder {
    header_decoder: HeaderDecoder,
    payload_decoder: Option<PayloadDecoder>,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decoder rejecting heads larger than `max_header_bytes`.
    pub fn with_max_header_bytes(max_header_bytes: usize) -> Self {
        Self { header_decoder: HeaderDecoder::new(max_header_bytes), payload_decoder: None }
    }

    /// True while the body of the last decoded head is still being decoded.
    pub fn in_payload(&self) -> bool {
        self.payload_decoder.is_some()
    }

    fn decode_payload(&mut self, item: Option<PayloadItem>) -> Option<Message<(RequestHeader, PayloadSize)>> {
        match item {
            Some(item @ PayloadItem::Chunk(_)) => Some(Message::Payload(item)),
            Some(item @ PayloadItem::Eof) => {
                // no need payload decoder in this request now
                self.payload_decoder.take();
                Some(Message::Payload(item))
            }
            None => None,
        }
    }
}

impl Decoder for RequestDecoder {
    type Item = Message<(RequestHeader, PayloadSize)>;
    type Error = ParseError;

    /// Attempts to decode an HTTP request from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::Header(_)))`: Successfully decoded request headers
    /// - `Ok(Some(Message::Payload(_)))`: Successfully decoded a payload chunk
    /// - `Ok(None)`: Need more data to proceed
    /// - `Err(_)`: Encountered a parsing error
    fn decode(&mut self, src: &mut GrowableBuffer) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let item = payload_decoder.decode(src)?;
            return Ok(self.decode_payload(item));
        }

        let message = match self.header_decoder.decode(src)? {
            Some((header, payload_size)) => {
                self.payload_decoder = Some(payload_size.into());
                Some(Message::Header((header, payload_size)))
            }
            None => None,
        };

        Ok(message)
    }

    fn decode_eof(&mut self, src: &mut GrowableBuffer) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(payload_decoder) = &mut self.payload_decoder {
            let item = payload_decoder.decode_eof(src)?;
            return Ok(self.decode_payload(item));
        }

        let message = self.header_decoder.decode_eof(src)?.map(|(header, payload_size)| {
            self.payload_decoder = Some(payload_size.into());
            Message::Header((header, payload_size))
        });

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use indoc::indoc;

    use super::*;

    #[test]
    fn two_requests_in_one_buffer() {
        let wire = indoc! {r##"
        POST /echo HTTP/1.1
        Content-Length: 5

        helloGET / HTTP/1.1
        Host: x

        "##}
        .replace('\n', "\r\n");

        let mut buffer = GrowableBuffer::from(wire.as_bytes());
        let mut decoder = RequestDecoder::new();

        let Some(Message::Header((header, payload_size))) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expected a head");
        };
        assert_eq!(header.path(), b"/echo");
        assert_eq!(payload_size, PayloadSize::Length(5));
        assert!(decoder.in_payload());

        let message = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(message.into_payload_item(), Some(PayloadItem::Chunk(Bytes::from_static(b"hello"))));

        let message = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(message.into_payload_item(), Some(PayloadItem::Eof));
        assert!(!decoder.in_payload());

        let Some(Message::Header((header, payload_size))) = decoder.decode(&mut buffer).unwrap() else {
            panic!("expected the second head");
        };
        assert_eq!(header.path(), b"/");
        assert_eq!(payload_size, PayloadSize::Empty);

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().into_payload_item().unwrap().is_eof());
        assert!(decoder.decode(&mut buffer).unwrap().is_none());
        assert!(decoder.decode_eof(&mut buffer).unwrap().is_none());
    }

    #[test]
    fn body_until_eof() {
        let mut buffer = GrowableBuffer::from(&b"PUT /f HTTP/1.1\r\n\r\nraw"[..]);
        let mut decoder = RequestDecoder::new();

        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_header());
        assert!(decoder.decode(&mut buffer).unwrap().unwrap().is_payload());
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        let message = decoder.decode_eof(&mut buffer).unwrap().unwrap();
        assert_eq!(message.into_payload_item(), Some(PayloadItem::Eof));
        assert!(decoder.decode_eof(&mut buffer).unwrap().is_none());
    }
}
