use std::time::Duration;

use crate::codec::MAX_HEADER_BYTES;
use crate::connection::channel::DEFAULT_READ_SIZE;

/// Per-connection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerOptions {
    /// Largest request head accepted, terminator included.
    pub max_header_bytes: usize,
    /// Capacity of a single channel read.
    pub read_chunk_size: usize,
    /// How long the connection may wait for the next request head. `None`
    /// waits forever.
    pub header_timeout: Option<Duration>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self { max_header_bytes: MAX_HEADER_BYTES, read_chunk_size: DEFAULT_READ_SIZE, header_timeout: None }
    }
}

impl ServerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes;
        self
    }

    #[must_use]
    pub fn with_read_chunk_size(mut self, read_chunk_size: usize) -> Self {
        self.read_chunk_size = read_chunk_size;
        self
    }

    #[must_use]
    pub fn with_header_timeout(mut self, header_timeout: Duration) -> Self {
        self.header_timeout = Some(header_timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_defaults() {
        let defaults = ServerOptions::new();
        assert_eq!(defaults.max_header_bytes, 8192);
        assert_eq!(defaults.read_chunk_size, 8 * 1024);
        assert_eq!(defaults.header_timeout, None);

        let options = ServerOptions::new().with_max_header_bytes(1024).with_header_timeout(Duration::from_secs(5));
        assert_eq!(options.max_header_bytes, 1024);
        assert_eq!(options.read_chunk_size, 8 * 1024);
        assert_eq!(options.header_timeout, Some(Duration::from_secs(5)));
    }
}
