use std::{io, sync::Arc};

use log::debug;

use super::{ReferenceSet, SearchPaths, SharedReferenceSet, State, Subsequence};

/// The default minimum fraction of a sequence a request must cover to load the whole sequence.
pub const DEFAULT_WHOLE_LOAD_FRACTION: f64 = 0.5;

#[derive(Debug)]
struct Cursor {
    id: usize,
    start: u64,
    end: u64,
    buf: Arc<[u8]>,
}

impl Cursor {
    fn contains(&self, id: usize, start: u64, end: u64) -> bool {
        self.id == id && start >= self.start && end <= self.end
    }

    fn subsequence(&self, start: u64, end: u64) -> Subsequence {
        let i = (start - self.start) as usize;
        let j = (end - self.start) as usize + 1;
        Subsequence::new(self.buf.clone(), i..j)
    }
}

/// A session's view of a reference sequence set.
///
/// The source remembers the last range it loaded and serves requests within it without touching
/// the set. In shared mode, whole sequences are kept in the set and reference counted across
/// sessions.
#[derive(Debug)]
pub struct ReferenceSource {
    reference_set: SharedReferenceSet,
    search_paths: SearchPaths,
    shared: bool,
    whole_load_fraction: f64,
    cursor: Option<Cursor>,
}

impl ReferenceSource {
    /// Creates a reference source.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::reference::{ReferenceSource, SearchPaths, SharedReferenceSet};
    /// let source = ReferenceSource::new(SharedReferenceSet::default(), SearchPaths::default());
    /// ```
    pub fn new(reference_set: SharedReferenceSet, search_paths: SearchPaths) -> Self {
        Self {
            reference_set,
            search_paths,
            shared: false,
            whole_load_fraction: DEFAULT_WHOLE_LOAD_FRACTION,
            cursor: None,
        }
    }

    /// Returns the reference sequence set.
    pub fn reference_set(&self) -> &SharedReferenceSet {
        &self.reference_set
    }

    /// Replaces the reference sequence set.
    pub fn set_reference_set(&mut self, reference_set: SharedReferenceSet) {
        self.release();
        self.reference_set = reference_set;
    }

    /// Returns the search paths.
    pub fn search_paths(&self) -> &SearchPaths {
        &self.search_paths
    }

    /// Sets the search paths.
    pub fn set_search_paths(&mut self, search_paths: SearchPaths) {
        self.search_paths = search_paths;
    }

    /// Returns whether whole sequences are shared through the set.
    pub fn is_shared(&self) -> bool {
        self.shared
    }

    /// Sets whether whole sequences are shared through the set.
    pub fn set_shared(&mut self, shared: bool) {
        self.release();
        self.shared = shared;
    }

    /// Sets the minimum fraction of a sequence a request must cover to load the whole sequence.
    pub fn set_whole_load_fraction(&mut self, whole_load_fraction: f64) {
        self.whole_load_fraction = whole_load_fraction;
    }

    /// Returns the bases in the 1-based, inclusive range `[start, end]` of a sequence.
    ///
    /// An `end` of 0 or past the end of the sequence is clamped to the sequence length. An
    /// unresolved entry is populated first.
    pub fn get_range(&mut self, id: usize, start: usize, end: usize) -> io::Result<Subsequence> {
        if start == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid reference sequence start: 0",
            ));
        }

        let reference_set = self.reference_set.clone();
        let mut set = reference_set.lock()?;

        if self.shared && self.cursor.as_ref().map(|cursor| cursor.id) != Some(id) {
            if let Some(cursor) = self.cursor.take() {
                release_shared(&mut set, cursor.id);
            }

            if let Some(entry) = set.get_mut(id) {
                if entry.sequence.is_some() {
                    entry.count += 1;
                }
            }
        }

        let state = set
            .get(id)
            .map(|entry| entry.state())
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no reference sequence bound to ID {id}"),
                )
            })?;

        if state == State::Unresolved {
            set.populate(id, &self.search_paths)?;
        }

        let (length, sequence) = match set.get(id) {
            Some(entry) => (entry.length(), entry.sequence().cloned()),
            None => return Err(io::Error::from(io::ErrorKind::NotFound)),
        };

        let start = start as u64;
        let end = match end as u64 {
            0 => length,
            n => n.min(length),
        };

        if start > end {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid reference sequence range: {start}-{end}"),
            ));
        }

        if let Some(cursor) = self.cursor.as_ref().filter(|c| c.contains(id, start, end)) {
            return Ok(cursor.subsequence(start, end));
        }

        let cursor = match sequence {
            Some(buf) => Cursor {
                id,
                start: 1,
                end: length,
                buf,
            },
            None => {
                let is_whole = self.shared
                    || (end - start + 1) as f64 >= self.whole_load_fraction * length as f64;

                let (load_start, load_end) = if is_whole { (1, length) } else { (start, end) };

                debug!("loading reference sequence {id}:{load_start}-{load_end}");

                let buf: Arc<[u8]> = set.read_sequence(id, load_start, load_end)?.into();

                if self.shared {
                    if let Some(entry) = set.get_mut(id) {
                        entry.sequence = Some(buf.clone());
                        entry.count = 1;
                    }
                }

                Cursor {
                    id,
                    start: load_start,
                    end: load_end,
                    buf,
                }
            }
        };

        let subsequence = cursor.subsequence(start, end);
        self.cursor = Some(cursor);

        Ok(subsequence)
    }

    /// Drops the session's cursor.
    ///
    /// In shared mode, this releases the session's hold on the cursor's sequence.
    pub fn release(&mut self) {
        let Some(cursor) = self.cursor.take() else {
            return;
        };

        if self.shared {
            if let Ok(mut set) = self.reference_set.lock() {
                release_shared(&mut set, cursor.id);
            }
        }
    }
}

impl Drop for ReferenceSource {
    fn drop(&mut self) {
        self.release();
    }
}

fn release_shared(set: &mut ReferenceSet, id: usize) {
    if let Some(entry) = set.get_mut(id) {
        entry.count = entry.count.saturating_sub(1);

        if entry.count == 0 {
            entry.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs::File,
        io::Write,
        path::{Path, PathBuf},
    };

    use super::*;
    use crate::reference::index_path;

    fn write_fasta(dir: &Path) -> io::Result<PathBuf> {
        let src = dir.join("ref.fa");

        let mut file = File::create(&src)?;
        file.write_all(b">sq0\nACGTACGTAC\nGTACGTACGT\n>sq1\nTTTTGGGGCC\n")?;

        let mut index = File::create(index_path(&src))?;
        index.write_all(b"sq0\t20\t5\t10\t11\nsq1\t10\t32\t10\t11\n")?;

        Ok(src)
    }

    fn build_source(src: &Path) -> io::Result<ReferenceSource> {
        let mut reference_set = ReferenceSet::from_path(src)?;
        reference_set.bind(["sq0", "sq1"]);
        Ok(ReferenceSource::new(
            SharedReferenceSet::new(reference_set),
            SearchPaths::default(),
        ))
    }

    fn load_count(source: &ReferenceSource) -> io::Result<usize> {
        source.reference_set().lock().map(|set| set.load_count())
    }

    #[test]
    fn test_get_range() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let src = write_fasta(dir.path())?;
        let mut source = build_source(&src)?;

        let subsequence = source.get_range(0, 5, 10)?;
        assert_eq!(&subsequence[..], b"ACGTAC");
        assert_eq!(subsequence.len(), 6);
        assert_eq!(load_count(&source)?, 1);

        // Within the cursor.
        let subsequence = source.get_range(0, 6, 8)?;
        assert_eq!(&subsequence[..], b"CGT");
        assert_eq!(load_count(&source)?, 1);

        // Past the cursor.
        let subsequence = source.get_range(0, 9, 12)?;
        assert_eq!(&subsequence[..], b"ACGT");
        assert_eq!(load_count(&source)?, 2);

        Ok(())
    }

    #[test]
    fn test_get_range_with_whole_load() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let src = write_fasta(dir.path())?;
        let mut source = build_source(&src)?;

        let a = source.get_range(0, 1, 10)?;
        assert_eq!(&a[..], b"ACGTACGTAC");
        assert_eq!(load_count(&source)?, 1);

        let b = source.get_range(0, 15, 20)?;
        assert_eq!(&b[..], b"GTACGT");
        assert!(a.shares_buffer(&b));
        assert_eq!(load_count(&source)?, 1);

        let c = source.get_range(0, 1, 0)?;
        assert_eq!(c.len(), 20);
        assert_eq!(load_count(&source)?, 1);

        Ok(())
    }

    #[test]
    fn test_get_range_with_clamped_end() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let src = write_fasta(dir.path())?;
        let mut source = build_source(&src)?;

        assert_eq!(&source.get_range(1, 9, 100)?[..], b"CC");

        assert!(matches!(
            source.get_range(1, 11, 20),
            Err(e) if e.kind() == io::ErrorKind::InvalidInput
        ));
        assert!(matches!(
            source.get_range(1, 0, 5),
            Err(e) if e.kind() == io::ErrorKind::InvalidInput
        ));
        assert!(matches!(
            source.get_range(2, 1, 5),
            Err(e) if e.kind() == io::ErrorKind::NotFound
        ));

        Ok(())
    }

    #[test]
    fn test_get_range_with_shared_sessions() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let src = write_fasta(dir.path())?;

        let mut a = build_source(&src)?;
        a.set_shared(true);

        let mut b = ReferenceSource::new(a.reference_set().clone(), SearchPaths::default());
        b.set_shared(true);

        let x = a.get_range(0, 1, 2)?;
        let y = b.get_range(0, 3, 4)?;
        assert_eq!(&x[..], b"AC");
        assert_eq!(&y[..], b"GT");
        assert!(x.shares_buffer(&y));
        assert_eq!(load_count(&a)?, 1);

        {
            let set = a.reference_set().lock()?;
            assert_eq!(set.get(0).map(|entry| entry.count()), Some(2));
        }

        a.get_range(1, 1, 2)?;

        {
            let set = a.reference_set().lock()?;
            assert_eq!(set.get(0).map(|entry| entry.count()), Some(1));
            assert_eq!(set.get(1).map(|entry| entry.count()), Some(1));
        }

        drop(b);

        let set = a.reference_set().lock()?;
        assert_eq!(set.get(0).map(|entry| entry.state()), Some(State::Located));

        Ok(())
    }
}
