//! Decoder for bodies delimited by the end of the stream.
//!
//! Used for requests that carry neither Content-Length nor chunked encoding.
//! Everything buffered belongs to the body; the body ends when the peer closes
//! its side of the connection.

use crate::buffer::GrowableBuffer;
use crate::codec::Decoder;
use crate::protocol::{ParseError, PayloadItem};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EofDecoder {
    finished: bool,
}

impl EofDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for EofDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut GrowableBuffer) -> Result<Option<Self::Item>, Self::Error> {
        if self.finished {
            return Ok(Some(PayloadItem::Eof));
        }

        if src.is_empty() {
            return Ok(None);
        }

        Ok(Some(PayloadItem::Chunk(src.split_front(src.len()))))
    }

    fn decode_eof(&mut self, src: &mut GrowableBuffer) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }

        self.finished = true;
        Ok(Some(PayloadItem::Eof))
    }
}
