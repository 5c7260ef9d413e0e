use std::fmt::Write;

use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

use crate::protocol::{PayloadItem, SendError};

/// Frames each non-empty unit as `hex(len) CRLF data CRLF` and finishes with
/// `0 CRLF CRLF`. Trailer fields are never written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkedEncoder {
    eof: bool,
}

impl ChunkedEncoder {
    pub fn new() -> Self {
        Self { eof: false }
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for ChunkedEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        if self.eof {
            return Ok(());
        }

        match item {
            PayloadItem::Chunk(mut bytes) => {
                // an empty chunk would read as the last one
                if !bytes.has_remaining() {
                    return Ok(());
                }

                write!(dst, "{:x}\r\n", bytes.remaining()).map_err(SendError::invalid_body)?;
                dst.reserve(bytes.remaining() + 2);
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let len = chunk.len();
                    dst.extend_from_slice(chunk);
                    bytes.advance(len);
                }
                dst.extend_from_slice(b"\r\n");
                Ok(())
            }
            PayloadItem::Eof => {
                self.eof = true;
                dst.extend_from_slice(b"0\r\n\r\n");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::buffer::GrowableBuffer;
    use crate::codec::Decoder;
    use crate::codec::body::chunked_decoder::ChunkedDecoder;

    #[test]
    fn frames_chunks() {
        let mut encoder = ChunkedEncoder::new();
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"hello")), &mut dst).unwrap();
        encoder.encode(PayloadItem::Chunk(Bytes::new()), &mut dst).unwrap();
        encoder.encode(PayloadItem::Chunk(Bytes::from(vec![b'x'; 26])), &mut dst).unwrap();
        assert!(!encoder.is_finish());
        encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).unwrap();
        assert!(encoder.is_finish());

        let mut expected = b"5\r\nhello\r\n1a\r\n".to_vec();
        expected.extend_from_slice(&[b'x'; 26]);
        expected.extend_from_slice(b"\r\n0\r\n\r\n");
        assert_eq!(&dst[..], &expected[..]);

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"late")), &mut dst).unwrap();
        assert_eq!(dst.len(), expected.len());
    }

    #[test]
    fn decodes_back_to_the_same_payload() {
        for payload in [&b""[..], &b"a"[..], &[b'z'; 20_000][..]] {
            let mut encoder = ChunkedEncoder::new();
            let mut dst = BytesMut::new();
            for unit in payload.chunks(8 * 1024) {
                encoder.encode(PayloadItem::Chunk(Bytes::copy_from_slice(unit)), &mut dst).unwrap();
            }
            encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).unwrap();

            let mut buffer = GrowableBuffer::from(&dst[..]);
            let mut decoder = ChunkedDecoder::new();
            let mut decoded = vec![];
            loop {
                match decoder.decode(&mut buffer).unwrap().unwrap() {
                    PayloadItem::Chunk(bytes) => decoded.extend_from_slice(&bytes),
                    PayloadItem::Eof => break,
                }
            }

            assert_eq!(decoded, payload);
            assert!(buffer.is_empty());
        }
    }
}
