use std::{path::Path, sync::Arc};

use bstr::BString;
use noodles_fasta::fai;

/// The resolution state of a reference sequence entry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    /// The location of the sequence is unknown.
    Unresolved,
    /// The sequence can be read from a backing file.
    Located,
    /// The whole sequence is held in memory.
    Materialized,
}

/// A reference sequence entry.
///
/// An entry describes where a sequence's bases live on disk and, while it is shared, holds the
/// whole sequence in memory.
#[derive(Clone, Debug, Default)]
pub struct Entry {
    pub(crate) name: BString,
    pub(crate) length: u64,
    pub(crate) offset: u64,
    pub(crate) line_bases: u64,
    pub(crate) line_width: u64,
    pub(crate) path: Option<Arc<Path>>,
    pub(crate) md5_checksum: Option<BString>,
    pub(crate) uri: Option<BString>,
    pub(crate) sequence: Option<Arc<[u8]>>,
    pub(crate) count: usize,
}

impl Entry {
    pub(crate) fn from_index_record(record: &fai::Record, path: Arc<Path>) -> Self {
        let name: &[u8] = record.name().as_ref();

        Self {
            name: BString::from(name),
            length: record.length(),
            offset: record.offset(),
            line_bases: record.line_bases(),
            line_width: record.line_width(),
            path: Some(path),
            ..Default::default()
        }
    }

    pub(crate) fn placeholder(
        name: BString,
        md5_checksum: Option<BString>,
        uri: Option<BString>,
    ) -> Self {
        Self {
            name,
            md5_checksum,
            uri,
            ..Default::default()
        }
    }

    /// Returns the sequence name.
    pub fn name(&self) -> &[u8] {
        self.name.as_ref()
    }

    /// Returns the sequence length in bases.
    ///
    /// This is 0 while the entry is unresolved.
    pub fn length(&self) -> u64 {
        self.length
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the MD5 checksum from the header (`M5`).
    pub fn md5_checksum(&self) -> Option<&BString> {
        self.md5_checksum.as_ref()
    }

    /// Returns the URI from the header (`UR`).
    pub fn uri(&self) -> Option<&BString> {
        self.uri.as_ref()
    }

    /// Returns the number of sessions sharing the in-memory sequence.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Returns the resolution state.
    pub fn state(&self) -> State {
        if self.sequence.is_some() {
            State::Materialized
        } else if self.length > 0 && self.path.is_some() {
            State::Located
        } else {
            State::Unresolved
        }
    }

    pub(crate) fn sequence(&self) -> Option<&Arc<[u8]>> {
        self.sequence.as_ref()
    }

    /// Returns the byte offset of a 1-based position in the backing file.
    pub(crate) fn position_offset(&self, position: u64) -> u64 {
        let i = position.saturating_sub(1);

        if self.line_width == 0 || self.line_bases == 0 {
            self.offset + i
        } else {
            self.offset + i / self.line_bases * self.line_width + i % self.line_bases
        }
    }

    pub(crate) fn merge_tags(&mut self, md5_checksum: Option<&BString>, uri: Option<&BString>) {
        if self.md5_checksum.is_none() {
            self.md5_checksum = md5_checksum.cloned();
        }

        if self.uri.is_none() {
            self.uri = uri.cloned();
        }
    }

    pub(crate) fn release(&mut self) {
        self.sequence = None;
        self.count = 0;
    }
}
