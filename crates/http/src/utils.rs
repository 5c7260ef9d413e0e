//! Utility macros and functions for the HTTP crate.
//!
//! This module provides helper macros and functions that are used internally
//! by the HTTP crate implementation.

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
///
/// ```ignore
/// ensure!(line.len() <= MAX_SIZE_LINE, ParseError::bad_chunk_size("size line too long"));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Returns the position of the first `needle` inside `haystack`.
pub(crate) fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_crlf() {
        assert_eq!(find_subslice(b"abc\r\ndef", b"\r\n"), Some(3));
        assert_eq!(find_subslice(b"\r\n", b"\r\n"), Some(0));
        assert_eq!(find_subslice(b"abc\r", b"\r\n"), None);
        assert_eq!(find_subslice(b"", b"\r\n"), None);
    }
}
