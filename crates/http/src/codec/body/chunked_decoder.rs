//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! Each chunk is a hexadecimal size line, the chunk data and a CRLF. A zero-size
//! chunk followed by a final CRLF ends the body. Chunk extensions and trailer
//! fields are not accepted.

use std::task::Poll;

use ChunkedState::{Data, DataCrlf, End, LastCrlf, Size};
use tracing::trace;

use crate::buffer::GrowableBuffer;
use crate::codec::Decoder;
use crate::protocol::{ParseError, PayloadItem};
use crate::utils::find_subslice;

/// Unconsumed bytes allowed to pile up before a size line must have ended.
const MAX_SIZE_LINE: usize = 32;

const CRLF: &[u8] = b"\r\n";

/// A decoder for handling HTTP chunked transfer encoding.
///
/// Chunk data is emitted as soon as it is buffered, so a large chunk may come
/// out as several [`PayloadItem::Chunk`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    remaining_size: u64,
}

impl ChunkedDecoder {
    /// Creates a decoder expecting the size line of the first chunk.
    pub fn new() -> Self {
        Self { state: Size, remaining_size: 0 }
    }
}

impl Default for ChunkedDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Read the hex size line
    Size,
    /// Read chunk data
    Data,
    /// Read the CRLF after chunk data
    DataCrlf,
    /// Read the CRLF after the zero-size chunk
    LastCrlf,
    /// The final chunk has been read
    End,
}

impl Decoder for ChunkedDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    /// Decodes chunked transfer encoded data from the input buffer.
    ///
    /// # Returns
    /// - `Ok(Some(PayloadItem::Chunk(bytes)))` when chunk data is available
    /// - `Ok(Some(PayloadItem::Eof))` once the final chunk has been read
    /// - `Ok(None)` when more data is needed
    /// - `Err(ParseError)` if the chunked encoding is invalid
    fn decode(&mut self, src: &mut GrowableBuffer) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.state == End {
                trace!("finished reading chunked data");
                return Ok(Some(PayloadItem::Eof));
            }

            let mut buf = None;

            self.state = match self.state.step(src, &mut self.remaining_size, &mut buf) {
                Poll::Pending => return Ok(None),
                Poll::Ready(Ok(new_state)) => new_state,
                Poll::Ready(Err(e)) => return Err(e),
            };

            if let Some(bytes) = buf {
                trace!(len = bytes.len(), "read chunked bytes");
                return Ok(Some(PayloadItem::Chunk(bytes)));
            }
        }
    }

    fn decode_eof(&mut self, src: &mut GrowableBuffer) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None => Err(ParseError::UnexpectedBodyEof { remaining: self.remaining_size }),
        }
    }
}

impl ChunkedState {
    fn step(
        self,
        src: &mut GrowableBuffer,
        remaining_size: &mut u64,
        buf: &mut Option<bytes::Bytes>,
    ) -> Poll<Result<ChunkedState, ParseError>> {
        match self {
            Size => ChunkedState::read_size(src, remaining_size),
            Data => ChunkedState::read_data(src, remaining_size, buf),
            DataCrlf => ChunkedState::read_crlf(src, Size),
            LastCrlf => ChunkedState::read_crlf(src, End),
            End => Poll::Ready(Ok(End)),
        }
    }

    /// Reads a complete size line and parses it as a hex number.
    ///
    /// # State Transitions
    /// - Size greater than zero: `Data`
    /// - Size zero: `LastCrlf`
    fn read_size(src: &mut GrowableBuffer, remaining_size: &mut u64) -> Poll<Result<ChunkedState, ParseError>> {
        let window = &src.as_slice()[..src.len().min(MAX_SIZE_LINE + 1)];

        let Some(pos) = find_subslice(window, CRLF) else {
            if src.len() > MAX_SIZE_LINE {
                return Poll::Ready(Err(ParseError::bad_chunk_size(format!("size line exceeds {MAX_SIZE_LINE} bytes"))));
            }
            return Poll::Pending;
        };

        let size = match parse_hex(&src.as_slice()[..pos]) {
            Ok(size) => size,
            Err(e) => return Poll::Ready(Err(e)),
        };
        src.consume_front(pos + CRLF.len());
        *remaining_size = size;

        trace!(size, "read chunk size");
        Poll::Ready(Ok(if size == 0 { LastCrlf } else { Data }))
    }

    fn read_data(
        src: &mut GrowableBuffer,
        remaining_size: &mut u64,
        buf: &mut Option<bytes::Bytes>,
    ) -> Poll<Result<ChunkedState, ParseError>> {
        if src.is_empty() {
            return Poll::Pending;
        }

        let len = usize::try_from(*remaining_size).map_or(src.len(), |remaining| remaining.min(src.len()));
        *buf = Some(src.split_front(len));
        *remaining_size -= len as u64;

        if *remaining_size > 0 { Poll::Ready(Ok(Data)) } else { Poll::Ready(Ok(DataCrlf)) }
    }

    /// Requires exactly CRLF, then moves to `next`.
    fn read_crlf(src: &mut GrowableBuffer, next: ChunkedState) -> Poll<Result<ChunkedState, ParseError>> {
        match src.as_slice() {
            [] | [b'\r'] => Poll::Pending,
            [b'\r', b'\n', ..] => {
                src.consume_front(CRLF.len());
                Poll::Ready(Ok(next))
            }
            _ => Poll::Ready(Err(ParseError::BadChunkTerminator)),
        }
    }
}

fn parse_hex(digits: &[u8]) -> Result<u64, ParseError> {
    let invalid = || ParseError::bad_chunk_size(format!("{:?} is not a hex size", String::from_utf8_lossy(digits)));

    if digits.is_empty() {
        return Err(invalid());
    }

    digits.iter().try_fold(0u64, |size, &b| {
        let digit = char::from(b).to_digit(16).ok_or_else(invalid)?;
        size.checked_mul(16).and_then(|size| size.checked_add(u64::from(digit))).ok_or_else(invalid)
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::protocol::ErrorKind;

    fn decode_all(decoder: &mut ChunkedDecoder, buffer: &mut GrowableBuffer) -> Result<Vec<PayloadItem>, ParseError> {
        let mut items = vec![];
        while let Some(item) = decoder.decode(buffer)? {
            let eof = item.is_eof();
            items.push(item);
            if eof {
                break;
            }
        }
        Ok(items)
    }

    #[test]
    fn test_basic() {
        let mut buffer = GrowableBuffer::from(&b"10\r\n1234567890abcdef\r\n0\r\n\r\n"[..]);
        let mut decoder = ChunkedDecoder::new();

        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(item.is_chunk());
        assert_eq!(item.as_bytes().unwrap().len(), 16);
        assert_eq!(item.as_bytes().unwrap(), &Bytes::from_static(b"1234567890abcdef"));

        let item = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(item.is_eof());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_multiple_chunks() {
        let mut buffer = GrowableBuffer::from(&b"5\r\nhello\r\n7\r\n, world\r\n0\r\n\r\nGET"[..]);
        let mut decoder = ChunkedDecoder::new();

        let items = decode_all(&mut decoder, &mut buffer).unwrap();
        assert_eq!(
            items,
            vec![
                PayloadItem::Chunk(Bytes::from_static(b"hello")),
                PayloadItem::Chunk(Bytes::from_static(b", world")),
                PayloadItem::Eof,
            ]
        );
        assert_eq!(buffer.as_slice(), b"GET");
    }

    #[test]
    fn test_uppercase_hex() {
        let mut buffer = GrowableBuffer::from(&b"A\r\n0123456789\r\n0\r\n\r\n"[..]);
        let items = decode_all(&mut ChunkedDecoder::new(), &mut buffer).unwrap();
        assert_eq!(items[0].as_bytes().unwrap().len(), 10);
    }

    #[test]
    fn test_incomplete_chunk() {
        let mut buffer = GrowableBuffer::from(&b"5\r\nhel"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::from_static(b"hel"));
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.append(b"lo\r");
        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::from_static(b"lo"));
        assert!(decoder.decode(&mut buffer).unwrap().is_none());

        buffer.append(b"\n0\r\n\r\n");
        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_byte_by_byte() {
        let wire = b"3\r\nabc\r\n2\r\nde\r\n0\r\n\r\n";
        let mut buffer = GrowableBuffer::new();
        let mut decoder = ChunkedDecoder::new();
        let mut body = vec![];
        let mut eof = false;

        for &b in wire {
            buffer.append(&[b]);
            while let Some(item) = decoder.decode(&mut buffer).unwrap() {
                match item {
                    PayloadItem::Chunk(bytes) => body.extend_from_slice(&bytes),
                    PayloadItem::Eof => {
                        eof = true;
                        break;
                    }
                }
            }
        }

        assert!(eof);
        assert_eq!(body, b"abcde");
    }

    #[test]
    fn test_invalid_chunk_size() {
        for wire in [&b"x\r\n"[..], &b"-1\r\n"[..], &b"5;ext=1\r\n"[..], &b" 5\r\n"[..], &b"\r\n"[..], &b"10000000000000000\r\n"[..]] {
            let mut buffer = GrowableBuffer::from(wire);
            let error = ChunkedDecoder::new().decode(&mut buffer).unwrap_err();
            assert_eq!(error.kind(), ErrorKind::BadChunkSize, "{wire:?}");
        }
    }

    #[test]
    fn test_size_line_too_long() {
        let mut buffer = GrowableBuffer::from(&[b'0'; 32][..]);
        assert!(ChunkedDecoder::new().decode(&mut buffer).unwrap().is_none());

        buffer.append(b"0");
        let error = ChunkedDecoder::new().decode(&mut buffer).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BadChunkSize);
    }

    #[test]
    fn test_size_line_at_the_limit() {
        let mut wire = vec![b'0'; 30];
        wire.extend_from_slice(b"5\r\nhello\r\n0\r\n\r\n");
        let mut buffer = GrowableBuffer::from(&wire[..]);

        let items = decode_all(&mut ChunkedDecoder::new(), &mut buffer).unwrap();
        assert_eq!(items, vec![PayloadItem::Chunk(Bytes::from_static(b"hello")), PayloadItem::Eof]);

        let mut wire = vec![b'0'; 31];
        wire.extend_from_slice(b"5\r\nhello\r\n0\r\n\r\n");
        let mut buffer = GrowableBuffer::from(&wire[..]);
        let error = ChunkedDecoder::new().decode(&mut buffer).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BadChunkSize);
    }

    #[test]
    fn test_missing_crlf() {
        let mut buffer = GrowableBuffer::from(&b"5\r\nhelloXX"[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap(), &Bytes::from_static(b"hello"));

        let error = decoder.decode(&mut buffer).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BadChunkTerminator);
    }

    #[test]
    fn test_missing_final_crlf() {
        let mut buffer = GrowableBuffer::from(&b"0\r\nX-Trailer: 1\r\n\r\n"[..]);
        let error = ChunkedDecoder::new().decode(&mut buffer).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::BadChunkTerminator);
    }

    #[test]
    fn test_large_chunk() {
        let size = 1024 * 64;
        let mut wire = format!("{size:x}\r\n").into_bytes();
        wire.extend(std::iter::repeat_n(b'A', size));
        wire.extend_from_slice(b"\r\n0\r\n\r\n");

        let mut buffer = GrowableBuffer::from(&wire[..]);
        let mut decoder = ChunkedDecoder::new();

        let chunk = decoder.decode(&mut buffer).unwrap().unwrap();
        assert_eq!(chunk.as_bytes().unwrap().len(), size);
        assert!(chunk.as_bytes().unwrap().iter().all(|&b| b == b'A'));

        let eof = decoder.decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_zero_size_chunk() {
        let mut buffer = GrowableBuffer::from(&b"0\r\n\r\n"[..]);
        let eof = ChunkedDecoder::new().decode(&mut buffer).unwrap().unwrap();
        assert!(eof.is_eof());
    }

    #[test]
    fn test_eof_inside_chunk() {
        let mut buffer = GrowableBuffer::from(&b"5\r\nhel"[..]);
        let mut decoder = ChunkedDecoder::new();
        decoder.decode(&mut buffer).unwrap();

        let error = decoder.decode_eof(&mut buffer).unwrap_err();
        assert!(matches!(error, ParseError::UnexpectedBodyEof { remaining: 2 }));
    }
}
