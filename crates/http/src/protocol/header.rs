//! Ordered raw header lines.
//!
//! Header fields are kept exactly as they appeared on the wire, one entry per
//! line without the trailing CRLF. Only the syntactic shape is checked; field
//! semantics are left to the handler.

use bytes::Bytes;

/// Returns true if `line` is a syntactically valid header field: it holds a
/// colon that is not the first byte and no embedded line feed.
pub fn is_valid_header_line(line: &[u8]) -> bool {
    matches!(line.iter().position(|&b| b == b':'), Some(pos) if pos > 0) && !line.contains(&b'\n')
}

/// Ordered sequence of raw `Name: value` lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    lines: Vec<Bytes>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { lines: Vec::with_capacity(capacity) }
    }

    /// Appends a raw header line. The line must not carry a CRLF.
    pub fn push(&mut self, line: impl Into<Bytes>) {
        self.lines.push(line.into());
    }

    /// Appends `name: value`.
    pub fn append(&mut self, name: &str, value: &str) {
        self.lines.push(Bytes::from(format!("{name}: {value}")));
    }

    /// Looks up a field by name, ignoring ASCII case.
    ///
    /// The first matching line wins and the value is trimmed of surrounding
    /// whitespace; its case is preserved.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.lines.iter().find_map(|line| {
            let (field, value) = split_field(line)?;
            field.eq_ignore_ascii_case(name.as_bytes()).then(|| value.trim_ascii())
        })
    }

    /// Like [`Headers::get`], for values that are valid UTF-8.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|value| std::str::from_utf8(value).ok())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over the raw lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Bytes> {
        self.lines.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = &'a Bytes;
    type IntoIter = std::slice::Iter<'a, Bytes>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}

impl<L: Into<Bytes>> FromIterator<L> for Headers {
    fn from_iter<I: IntoIterator<Item = L>>(iter: I) -> Self {
        Self { lines: iter.into_iter().map(Into::into).collect() }
    }
}

fn split_field(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let colon = line.iter().position(|&b| b == b':')?;
    Some((&line[..colon], &line[colon + 1..]))
}
