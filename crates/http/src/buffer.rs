//! Growable byte buffer used to accumulate partial socket reads.
//!
//! Each connection owns exactly one [`GrowableBuffer`]. Bytes read from the
//! transport are appended at the back, and the framer and body decoders consume
//! them from the front. The capacity only ever grows, by doubling from a base of
//! 32 bytes, so a connection that only sees small messages stays small.

use bytes::{Buf, Bytes, BytesMut};

use crate::utils::find_subslice;

/// Capacity of the first allocation.
const MIN_CAPACITY: usize = 32;

/// Append/consume byte storage with amortized doubling.
///
/// The capacity reported by [`GrowableBuffer::capacity`] is either zero (never
/// grown) or a power of two no smaller than 32, and it is never reduced by
/// [`GrowableBuffer::consume_front`].
#[derive(Debug, Default)]
pub struct GrowableBuffer {
    storage: BytesMut,
    capacity: usize,
}

impl GrowableBuffer {
    /// Creates an empty buffer without allocating.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer able to hold at least `capacity` bytes before growing.
    pub fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            return Self::new();
        }
        let capacity = grown_capacity(0, capacity);
        Self { storage: BytesMut::with_capacity(capacity), capacity }
    }

    /// Number of unconsumed bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The unconsumed bytes.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.storage
    }

    /// Appends `data`, doubling the capacity until it fits.
    pub fn append(&mut self, data: &[u8]) {
        let required = self.storage.len() + data.len();
        if required > self.capacity {
            let capacity = grown_capacity(self.capacity, required);
            let mut storage = BytesMut::with_capacity(capacity);
            storage.extend_from_slice(&self.storage);
            self.storage = storage;
            self.capacity = capacity;
        }
        self.storage.extend_from_slice(data);
    }

    /// Drops the first `n` bytes, moving the rest to offset 0.
    ///
    /// # Panics
    ///
    /// Panics if `n` is larger than [`GrowableBuffer::len`].
    pub fn consume_front(&mut self, n: usize) {
        let len = self.storage.len();
        assert!(n <= len, "cannot consume {n} bytes from a buffer holding {len}");
        self.storage.copy_within(n..len, 0);
        self.storage.truncate(len - n);
    }

    /// Copies out and consumes the first `n` bytes.
    pub fn split_front(&mut self, n: usize) -> Bytes {
        let bytes = Bytes::copy_from_slice(&self.storage[..n]);
        self.consume_front(n);
        bytes
    }

    /// Position of the first occurrence of `needle` among the unconsumed bytes.
    pub fn find(&self, needle: &[u8]) -> Option<usize> {
        find_subslice(&self.storage, needle)
    }
}

impl Buf for GrowableBuffer {
    fn remaining(&self) -> usize {
        self.len()
    }

    fn chunk(&self) -> &[u8] {
        self.as_slice()
    }

    fn advance(&mut self, cnt: usize) {
        self.consume_front(cnt);
    }
}

impl From<&[u8]> for GrowableBuffer {
    fn from(bytes: &[u8]) -> Self {
        let mut buffer = GrowableBuffer::new();
        buffer.append(bytes);
        buffer
    }
}

fn grown_capacity(current: usize, required: usize) -> usize {
    let mut capacity = current.max(MIN_CAPACITY);
    while capacity < required {
        capacity *= 2;
    }
    capacity
}
