use bytes::{Buf, Bytes};
use http_body::SizeHint;

/// Represents a HTTP message that can either be a header or payload.
///
/// The request decoder yields one `Header` per request, followed by the
/// `Payload` items of its body, the last one being [`PayloadItem::Eof`].
pub enum Message<T, Data: Buf = Bytes> {
    /// Contains the header information of type `T`
    Header(T),
    /// Contains a chunk of payload data or EOF marker
    Payload(PayloadItem<Data>),
}

/// Represents an item in the HTTP message payload stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}

/// The body envelope of a message, decided from its head.
///
/// - `Length`: exactly that many bytes follow the head
/// - `Chunked`: chunked transfer encoding
/// - `UntilEof`: the body runs until the peer closes its side
/// - `Empty`: no body at all
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PayloadSize {
    Length(u64),
    Chunked,
    UntilEof,
    Empty,
}

impl PayloadSize {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, PayloadSize::Empty | PayloadSize::Length(0))
    }

    /// The exact body length if it is known up front.
    #[inline]
    pub fn declared_length(&self) -> Option<u64> {
        match self {
            PayloadSize::Length(n) => Some(*n),
            PayloadSize::Empty => Some(0),
            PayloadSize::Chunked | PayloadSize::UntilEof => None,
        }
    }
}

impl From<PayloadSize> for SizeHint {
    fn from(size: PayloadSize) -> Self {
        match size.declared_length() {
            Some(n) => SizeHint::with_exact(n),
            None => SizeHint::new(),
        }
    }
}

impl From<&SizeHint> for PayloadSize {
    fn from(hint: &SizeHint) -> Self {
        match hint.exact() {
            Some(0) => PayloadSize::Empty,
            Some(n) => PayloadSize::Length(n),
            None => PayloadSize::Chunked,
        }
    }
}

impl<T> Message<T> {
    #[inline]
    pub fn is_payload(&self) -> bool {
        matches!(self, Message::Payload(_))
    }

    #[inline]
    pub fn is_header(&self) -> bool {
        matches!(self, Message::Header(_))
    }

    /// Converts the message into a `PayloadItem`, or `None` for a header.
    pub fn into_payload_item(self) -> Option<PayloadItem> {
        match self {
            Message::Header(_) => None,
            Message::Payload(payload_item) => Some(payload_item),
        }
    }
}

impl<D: Buf> PayloadItem<D> {
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }
}

impl PayloadItem {
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_hint_conversions() {
        assert_eq!(PayloadSize::from(&SizeHint::with_exact(0)), PayloadSize::Empty);
        assert_eq!(PayloadSize::from(&SizeHint::with_exact(12)), PayloadSize::Length(12));
        assert_eq!(PayloadSize::from(&SizeHint::new()), PayloadSize::Chunked);

        assert_eq!(SizeHint::from(PayloadSize::Length(5)).exact(), Some(5));
        assert_eq!(SizeHint::from(PayloadSize::Empty).exact(), Some(0));
        assert_eq!(SizeHint::from(PayloadSize::UntilEof).exact(), None);
    }

    #[test]
    fn payload_item_accessors() {
        let item = PayloadItem::Chunk(Bytes::from_static(b"abc"));
        assert!(item.is_chunk());
        assert_eq!(item.as_bytes().map(|b| &b[..]), Some(&b"abc"[..]));
        assert!(PayloadItem::<Bytes>::Eof.is_eof());
        assert_eq!(PayloadItem::<Bytes>::Eof.into_bytes(), None);
    }
}
