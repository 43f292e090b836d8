//! Reference sequences.
//!
//! A [`ReferenceSet`] maps reference sequence IDs to entries located through FASTA indexes, a
//! local MD5-keyed cache, or the `REF_PATH` search path. Each session reads bases through its own
//! [`ReferenceSource`].

mod entry;
mod search_paths;
mod set;
mod source;
mod subsequence;

use std::{
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

pub use self::{
    entry::{Entry, State},
    search_paths::{SearchPaths, expand_cache_path},
    set::ReferenceSet,
    source::{DEFAULT_WHOLE_LOAD_FRACTION, ReferenceSource},
    subsequence::Subsequence,
};

/// A reference sequence set shared by multiple sessions.
///
/// The set is dropped with its last handle.
#[derive(Clone, Debug, Default)]
pub struct SharedReferenceSet(Arc<Mutex<ReferenceSet>>);

impl SharedReferenceSet {
    /// Wraps a reference sequence set for sharing.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::reference::{ReferenceSet, SharedReferenceSet};
    /// let reference_set = SharedReferenceSet::new(ReferenceSet::default());
    /// ```
    pub fn new(reference_set: ReferenceSet) -> Self {
        Self(Arc::new(Mutex::new(reference_set)))
    }

    /// Locks the set.
    pub fn lock(&self) -> io::Result<MutexGuard<'_, ReferenceSet>> {
        self.0
            .lock()
            .map_err(|_| io::Error::other("reference sequence set lock poisoned"))
    }

    /// Returns the number of handles to the set.
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// Returns whether two handles refer to the same set.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Returns the path of the index of a FASTA file (`<src>.fai`).
pub(crate) fn index_path(src: &Path) -> PathBuf {
    let mut s = src.as_os_str().to_owned();
    s.push(".fai");
    PathBuf::from(s)
}

/// Drops bytes outside `!`..=`~` and uppercases the rest.
pub(crate) fn normalize_sequence(buf: &mut Vec<u8>) {
    buf.retain(|b| b.is_ascii_graphic());
    buf.make_ascii_uppercase();
}
