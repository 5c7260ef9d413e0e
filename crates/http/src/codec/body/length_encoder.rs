use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;

use crate::ensure;
use crate::protocol::{PayloadItem, SendError};

/// Writes a body of a declared length, refusing to send more or fewer bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
    eof: bool,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length, eof: false }
    }

    pub fn is_finish(&self) -> bool {
        self.eof
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(mut bytes) => {
                let size = bytes.remaining() as u64;
                ensure!(
                    size <= self.length,
                    SendError::invalid_body(format!("body exceeds content-length by {} bytes", size - self.length))
                );

                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let len = chunk.len();
                    dst.extend_from_slice(chunk);
                    bytes.advance(len);
                }
                self.length -= size;
                Ok(())
            }
            PayloadItem::Eof => {
                ensure!(
                    self.length == 0,
                    SendError::invalid_body(format!("body ended {} bytes short of content-length", self.length))
                );
                self.eof = true;
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn exact_length() {
        let mut encoder = LengthEncoder::new(5);
        let mut dst = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"he")), &mut dst).unwrap();
        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"llo")), &mut dst).unwrap();
        encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).unwrap();

        assert!(encoder.is_finish());
        assert_eq!(&dst[..], b"hello");
    }

    #[test]
    fn too_long_or_too_short() {
        let mut dst = BytesMut::new();

        let mut encoder = LengthEncoder::new(2);
        let error = encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"abc")), &mut dst).unwrap_err();
        assert!(matches!(error, SendError::InvalidBody { .. }));

        let mut encoder = LengthEncoder::new(4);
        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"ab")), &mut dst).unwrap();
        let error = encoder.encode(PayloadItem::<Bytes>::Eof, &mut dst).unwrap_err();
        assert!(matches!(error, SendError::InvalidBody { .. }));
        assert!(!encoder.is_finish());
    }
}
