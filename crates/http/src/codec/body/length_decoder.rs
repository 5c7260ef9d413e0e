//! Decoder implementation for HTTP messages with Content-Length header.
//!
//! This module decodes message bodies whose size is given up front by the
//! Content-Length header, as defined in
//! [RFC 7230 Section 3.3.2](https://tools.ietf.org/html/rfc7230#section-3.3.2).

use crate::buffer::GrowableBuffer;
use crate::codec::Decoder;
use crate::protocol::{ParseError, PayloadItem};

/// A decoder for handling HTTP messages with a known content length.
///
/// The decoder tracks the remaining bytes and never consumes past the end of
/// the body, so the next request in the buffer is left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthDecoder {
    /// The number of bytes remaining to be read from the payload
    length: u64,
}

impl LengthDecoder {
    pub fn new(length: u64) -> Self {
        Self { length }
    }
}

impl Decoder for LengthDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Decodes bytes from the input buffer according to the content length.
    ///
    /// # Returns
    /// * `Ok(Some(PayloadItem::Eof))` when all bytes have been read
    /// * `Ok(Some(PayloadItem::Chunk(bytes)))` when some body bytes are buffered
    /// * `Ok(None)` when more data is needed
    fn decode(&mut self, src: &mut GrowableBuffer) -> Result<Option<Self::Item>, Self::Error> {
        if self.length == 0 {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        // Read the minimum of remaining length and available bytes
        let len = usize::try_from(self.length).map_or(src.len(), |length| length.min(src.len()));
        let bytes = src.split_front(len);

        self.length -= bytes.len() as u64;
        Ok(Some(PayloadItem::Chunk(bytes)))
    }

    fn decode_eof(&mut self, src: &mut GrowableBuffer) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None => Err(ParseError::UnexpectedBodyEof { remaining: self.length }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic() {
        let mut buffer = GrowableBuffer::from(&b"101234567890abcdef\r\n\r\n"[..]);

        let mut length_decoder = LengthDecoder::new(10);
        let payload = length_decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(payload.is_chunk());

        let bytes = payload.as_bytes().unwrap();
        assert_eq!(&bytes[..], b"1012345678");
        assert_eq!(buffer.as_slice(), b"90abcdef\r\n\r\n");

        assert!(length_decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn test_split_delivery() {
        let mut buffer = GrowableBuffer::from(&b"hel"[..]);
        let mut length_decoder = LengthDecoder::new(5);

        assert_eq!(length_decoder.decode(&mut buffer).unwrap().unwrap().as_bytes().unwrap(), &b"hel"[..]);
        assert!(length_decoder.decode(&mut buffer).unwrap().is_none());

        buffer.append(b"lo");
        assert_eq!(length_decoder.decode(&mut buffer).unwrap().unwrap().as_bytes().unwrap(), &b"lo"[..]);
        assert!(length_decoder.decode(&mut buffer).unwrap().unwrap().is_eof());
    }

    #[test]
    fn test_short_body() {
        let mut buffer = GrowableBuffer::from(&b"abc"[..]);
        let mut length_decoder = LengthDecoder::new(5);
        length_decoder.decode(&mut buffer).unwrap();

        let error = length_decoder.decode_eof(&mut buffer).unwrap_err();
        assert!(matches!(error, ParseError::UnexpectedBodyEof { remaining: 2 }));
    }
}
