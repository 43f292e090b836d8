use std::{ops::Deref, ops::Range, sync::Arc};

/// A view of a range of a reference sequence.
///
/// The view shares the underlying buffer with the session cursor and, when shared, with the
/// reference sequence set.
#[derive(Clone, Debug)]
pub struct Subsequence {
    buf: Arc<[u8]>,
    range: Range<usize>,
}

impl Subsequence {
    pub(crate) fn new(buf: Arc<[u8]>, range: Range<usize>) -> Self {
        Self { buf, range }
    }

    /// Returns the bases.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[self.range.clone()]
    }

    /// Returns whether two subsequences view the same buffer.
    pub fn shares_buffer(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.buf, &other.buf)
    }
}

impl Deref for Subsequence {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for Subsequence {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq<[u8]> for Subsequence {
    fn eq(&self, other: &[u8]) -> bool {
        self.as_bytes() == other
    }
}
