//! Line streaming and record splitting.
//!
//! A physical table member may end mid-record (split releases, chunked
//! downloads). Lines are therefore kept as raw bytes until a complete record
//! has been assembled: a line whose field count is wrong is handed back as a
//! [`Remnant`] and prepended to the first line of the next member. Splitting
//! at any byte offset, even inside a multi-byte character, reassembles to the
//! original record.

use std::io::{self, BufRead};

/// Pull-based iterator over the `\n`-terminated lines of a reader, as bytes.
///
/// The terminator (and a preceding `\r`) is stripped. A final line without a
/// terminator is still yielded.
pub struct TableLines<R> {
    inner: R,
}

impl<R: BufRead> TableLines<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<'a> TableLines<&'a [u8]> {
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<R: BufRead> Iterator for TableLines<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = Vec::new();
        match self.inner.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                }
                Some(Ok(line))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// The unconsumed partial record at the end of a member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Remnant(Vec<u8>);

impl Remnant {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Prepend this remnant to `line`, consuming it.
    pub fn join(&mut self, line: Vec<u8>) -> Vec<u8> {
        if self.0.is_empty() {
            return line;
        }
        let mut joined = std::mem::take(&mut self.0);
        joined.extend_from_slice(&line);
        joined
    }
}

/// Split a record on `|`. Returns `None` when the field count is not
/// `field_count`, i.e. the line is a fragment.
///
/// The trailing empty field produced by the final `|` is dropped from the
/// result, so a complete record yields `field_count - 1` fields.
pub fn split_record(line: &[u8], field_count: usize) -> Option<Vec<&[u8]>> {
    let mut fields: Vec<&[u8]> = line.split(|b| *b == b'|').collect();
    if fields.len() != field_count {
        return None;
    }
    fields.pop();
    Some(fields)
}
