use std::{
    fs::{self, File},
    io::{self, BufReader, Read, Seek, SeekFrom},
    path::Path,
    sync::Arc,
};

use bstr::{BString, ByteSlice};
use indexmap::IndexMap;
use log::{debug, warn};
use noodles_fasta::fai;
use noodles_sam::{self as sam, header::record::value::map::reference_sequence::tag};

use super::{
    Entry, SearchPaths, State, index_path, normalize_sequence, search_paths::write_cache,
};

/// A set of reference sequence entries.
///
/// Entries are keyed by name and bound to the reference sequence IDs of a SAM header. At most one
/// backing file is held open at a time.
#[derive(Debug, Default)]
pub struct ReferenceSet {
    entries: IndexMap<BString, Entry>,
    ids: Vec<Option<usize>>,
    names: Vec<BString>,
    path: Option<Arc<Path>>,
    handle: Option<(Arc<Path>, BufReader<File>)>,
    load_count: usize,
}

impl ReferenceSet {
    /// Creates a reference sequence set from an indexed FASTA file.
    ///
    /// The index is read from `<src>.fai`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cram_io::reference::ReferenceSet;
    /// let reference_set = ReferenceSet::from_path("ref.fa")?;
    /// # Ok::<_, std::io::Error>(())
    /// ```
    pub fn from_path<P>(src: P) -> io::Result<Self>
    where
        P: AsRef<Path>,
    {
        let mut reference_set = Self::default();
        reference_set.load_index(src)?;
        Ok(reference_set)
    }

    /// Adds the entries of an indexed FASTA file.
    ///
    /// An entry replaces any existing entry with the same name, keeping its header tags.
    pub fn load_index<P>(&mut self, src: P) -> io::Result<()>
    where
        P: AsRef<Path>,
    {
        let src = src.as_ref();

        let file = File::open(src)?;

        let index = File::open(index_path(src))
            .map(BufReader::new)
            .map(fai::io::Reader::new)?
            .read_index()?;

        let records: &[fai::Record] = index.as_ref();

        let path: Arc<Path> = Arc::from(src);
        let record_count = records.len();

        for record in records {
            validate_index_record(record)?;

            let mut entry = Entry::from_index_record(record, path.clone());

            if let Some(prev) = self.entries.get(&entry.name) {
                debug!("replacing reference sequence entry: {}", entry.name);
                entry.merge_tags(prev.md5_checksum(), prev.uri());
            }

            self.entries.insert(entry.name.clone(), entry);
        }

        debug!(
            "loaded {record_count} reference sequence entries from {}",
            src.display()
        );

        self.handle = Some((path.clone(), BufReader::new(file)));
        self.path = Some(path);

        Ok(())
    }

    /// Returns the path of the most recently loaded FASTA file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of reference sequence IDs bound.
    pub fn id_count(&self) -> usize {
        self.ids.len()
    }

    /// Returns the entry bound to a reference sequence ID.
    pub fn get(&self, id: usize) -> Option<&Entry> {
        self.index_of(id).map(|i| &self.entries[i])
    }

    /// Returns the entry with the given name.
    pub fn get_by_name(&self, name: &[u8]) -> Option<&Entry> {
        self.entries.get(name)
    }

    /// Returns the number of times sequence data was read from disk.
    pub fn load_count(&self) -> usize {
        self.load_count
    }

    /// Adds placeholder entries for header reference sequences that have none and binds the
    /// header order.
    ///
    /// Existing entries take any `M5` and `UR` tags they lack from the header.
    pub fn resolve_from_header(&mut self, header: &sam::Header) {
        for (name, reference_sequence) in header.reference_sequences() {
            let other_fields = reference_sequence.other_fields();
            let md5_checksum = other_fields.get(&tag::MD5_CHECKSUM);
            let uri = other_fields.get(&tag::URI);

            match self.entries.get_mut(name) {
                Some(entry) => entry.merge_tags(md5_checksum, uri),
                None => {
                    let entry = Entry::placeholder(name.clone(), md5_checksum.cloned(), uri.cloned());
                    self.entries.insert(name.clone(), entry);
                }
            }
        }

        self.bind(header.reference_sequences().keys());
    }

    /// Binds reference sequence IDs to entries by name.
    ///
    /// The `n`th name becomes reference sequence ID `n`. Names without an entry are left unbound.
    pub fn bind<I, N>(&mut self, names: I)
    where
        I: IntoIterator<Item = N>,
        N: AsRef<[u8]>,
    {
        self.names = names
            .into_iter()
            .map(|name| BString::from(name.as_ref()))
            .collect();

        self.rebind();
    }

    fn rebind(&mut self) {
        self.ids = self
            .names
            .iter()
            .map(|name| {
                let i = self.entries.get_index_of(name.as_bytes());

                if i.is_none() {
                    warn!("reference sequence not found: {name}");
                }

                i
            })
            .collect();
    }

    fn index_of(&self, id: usize) -> Option<usize> {
        self.ids.get(id).copied().flatten()
    }

    fn index_of_or_err(&self, id: usize) -> io::Result<usize> {
        self.index_of(id).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no reference sequence bound to ID {id}"),
            )
        })
    }

    pub(crate) fn get_mut(&mut self, id: usize) -> Option<&mut Entry> {
        self.index_of(id).map(|i| &mut self.entries[i])
    }

    /// Resolves an unresolved entry.
    ///
    /// The sources are tried in order: the local cache and the search path by `M5` checksum, then
    /// the FASTA file named by `UR`. A sequence found on the search path is written back to the
    /// cache; failing to do so is not an error.
    pub fn populate(&mut self, id: usize, search_paths: &SearchPaths) -> io::Result<()> {
        let i = self.index_of_or_err(id)?;

        let entry = &self.entries[i];
        let name = entry.name.clone();
        let md5_checksum = entry.md5_checksum.clone();
        let uri = entry.uri.clone();

        if let Some(md5_checksum) = md5_checksum.as_ref().and_then(|s| s.to_str().ok()) {
            debug!("querying reference sequence {name} (M5:{md5_checksum})");

            if let Some(cache_path) = search_paths.cache_path(md5_checksum) {
                if let Ok(metadata) = fs::metadata(&cache_path) {
                    if metadata.is_file() {
                        debug!("using cached reference sequence at {}", cache_path.display());

                        let entry = &mut self.entries[i];
                        entry.length = metadata.len();
                        entry.offset = 0;
                        entry.line_bases = 0;
                        entry.line_width = 0;
                        entry.path = Some(cache_path.into());

                        return Ok(());
                    }
                }
            }

            if let Some(src) = search_paths.find(md5_checksum) {
                let cache_path = search_paths.cache_path(md5_checksum);

                if self.read_from_search_path(i, &src, cache_path.as_deref()) {
                    return Ok(());
                }
            }
        }

        if let Some(uri) = uri {
            let src = uri.strip_prefix(b"file:").unwrap_or(&uri[..]);
            let src = src
                .to_path()
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

            debug!("loading reference sequence {name} from {}", src.display());

            self.load_index(src).map_err(|e| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!(
                        "failed to load reference sequence {name} from {}: {e}",
                        src.display()
                    ),
                )
            })?;

            self.rebind();

            if self.get(id).is_some_and(|entry| entry.state() != State::Unresolved) {
                return Ok(());
            }
        }

        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("failed to populate reference sequence {name}"),
        ))
    }

    /// Materializes an entry from a whole-sequence file found on the search path.
    ///
    /// A file that cannot be read is logged and skipped so the caller can try the next source.
    fn read_from_search_path(&mut self, i: usize, src: &Path, cache_path: Option<&Path>) -> bool {
        let name = &self.entries[i].name;

        debug!("reading reference sequence {name} from {}", src.display());

        let sequence = match fs::read(src) {
            Ok(sequence) => sequence,
            Err(e) => {
                warn!(
                    "failed to read reference sequence {name} from {}: {e}",
                    src.display()
                );

                return false;
            }
        };

        self.load_count += 1;

        if let Some(cache_path) = cache_path {
            if let Err(e) = write_cache(cache_path, &sequence) {
                warn!(
                    "failed to cache reference sequence at {}: {e}",
                    cache_path.display()
                );
            }
        }

        let entry = &mut self.entries[i];
        entry.length = sequence.len() as u64;
        entry.sequence = Some(sequence.into());

        true
    }

    /// Reads the 1-based, inclusive range `[start, end]` of a sequence from its backing file.
    ///
    /// Bytes outside `!`..=`~` are dropped and the rest are uppercased.
    pub(crate) fn read_sequence(&mut self, id: usize, start: u64, end: u64) -> io::Result<Vec<u8>> {
        let i = self.index_of_or_err(id)?;
        let entry = &self.entries[i];

        let path = entry.path.clone().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("reference sequence {} has no backing file", entry.name),
            )
        })?;

        let start_offset = entry.position_offset(start);
        let end_offset = entry.position_offset(end);
        let len = usize::try_from(end_offset - start_offset + 1)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let reader = self.open(&path)?;
        reader.seek(SeekFrom::Start(start_offset))?;

        let mut buf = Vec::new();
        reader.take(len as u64).read_to_end(&mut buf)?;

        if buf.len() != len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "truncated reference sequence {}: expected {len} bytes, got {}",
                    self.entries[i].name,
                    buf.len()
                ),
            ));
        }

        self.load_count += 1;

        normalize_sequence(&mut buf);

        let expected_len = end - start + 1;

        if buf.len() as u64 != expected_len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "malformed reference sequence {}: expected {expected_len} bases, got {}",
                    self.entries[i].name,
                    buf.len()
                ),
            ));
        }

        Ok(buf)
    }

    fn open(&mut self, path: &Arc<Path>) -> io::Result<&mut BufReader<File>> {
        let is_open = matches!(&self.handle, Some((p, _)) if p == path);

        if !is_open {
            let file = File::open(path)?;
            self.handle = Some((path.clone(), BufReader::new(file)));
        }

        self.handle
            .as_mut()
            .map(|(_, reader)| reader)
            .ok_or_else(|| io::Error::other("reference sequence file is not open"))
    }

    /// Closes the open backing file, if any.
    pub fn close(&mut self) {
        self.handle = None;
    }
}

fn validate_index_record(record: &fai::Record) -> io::Result<()> {
    let is_valid = record.length() == 0
        || (record.line_bases() > 0 && record.line_width() >= record.line_bases());

    if is_valid {
        Ok(())
    } else {
        let name: &[u8] = record.name().as_ref();

        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "invalid line geometry for reference sequence {}: {} bases per line, {} bytes per line",
                name.as_bstr(),
                record.line_bases(),
                record.line_width()
            ),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_fasta(dir: &Path) -> io::Result<std::path::PathBuf> {
        let src = dir.join("ref.fa");

        let mut file = File::create(&src)?;
        file.write_all(b">sq0\nttcaccca\n>sq1\nGATC\nTTAC\nTTTT\nT\n")?;

        let mut index = File::create(index_path(&src))?;
        index.write_all(b"sq0\t8\t5\t8\t9\nsq1\t13\t19\t4\t5\n")?;

        Ok(src)
    }

    #[test]
    fn test_load_index_and_read_sequence() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let src = write_fasta(dir.path())?;

        let mut reference_set = ReferenceSet::from_path(&src)?;
        assert_eq!(reference_set.len(), 2);
        assert_eq!(reference_set.path(), Some(src.as_path()));

        reference_set.bind(["sq1", "sq0"]);

        assert_eq!(reference_set.read_sequence(0, 1, 13)?, b"GATCTTACTTTTT");
        assert_eq!(reference_set.read_sequence(0, 4, 6)?, b"CTT");
        assert_eq!(reference_set.read_sequence(1, 1, 8)?, b"TTCACCCA");
        assert_eq!(reference_set.load_count(), 3);

        Ok(())
    }

    #[test]
    fn test_bind_with_unknown_name() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let src = write_fasta(dir.path())?;

        let mut reference_set = ReferenceSet::from_path(src)?;
        reference_set.bind(["sq0", "sq2"]);

        assert_eq!(reference_set.id_count(), 2);
        assert!(reference_set.get(0).is_some());
        assert!(reference_set.get(1).is_none());

        Ok(())
    }

    #[test]
    fn test_resolve_from_header() -> Result<(), Box<dyn std::error::Error>> {
        let header: sam::Header = "\
@SQ\tSN:sq0\tLN:8\tM5:be19336b7e15968f7ac7dc82493d9cd8
@SQ\tSN:sq1\tLN:13\tUR:file:/data/ref.fa
"
        .parse()?;

        let mut reference_set = ReferenceSet::default();
        reference_set.resolve_from_header(&header);

        let sq0 = reference_set.get(0).ok_or("missing sq0")?;
        assert_eq!(sq0.state(), State::Unresolved);
        assert_eq!(
            sq0.md5_checksum().map(|s| s.as_bytes()),
            Some(&b"be19336b7e15968f7ac7dc82493d9cd8"[..])
        );

        let sq1 = reference_set.get(1).ok_or("missing sq1")?;
        assert_eq!(sq1.uri().map(|s| s.as_bytes()), Some(&b"file:/data/ref.fa"[..]));

        Ok(())
    }

    #[test]
    fn test_populate_from_uri() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let src = write_fasta(dir.path())?;

        let header: sam::Header =
            format!("@SQ\tSN:sq1\tLN:13\tUR:file:{}\n", src.display()).parse()?;

        let mut reference_set = ReferenceSet::default();
        reference_set.resolve_from_header(&header);

        let search_paths = SearchPaths::new(dir.path().join("md5").display().to_string(), None);
        reference_set.populate(0, &search_paths)?;

        let sq1 = reference_set.get(0).ok_or("missing sq1")?;
        assert_eq!(sq1.state(), State::Located);
        assert_eq!(sq1.length(), 13);
        assert_eq!(
            sq1.uri().map(|s| s.as_bytes()),
            Some(format!("file:{}", src.display()).as_bytes())
        );

        Ok(())
    }

    #[test]
    fn test_populate_from_search_path_with_cache() -> Result<(), Box<dyn std::error::Error>> {
        const MD5_CHECKSUM: &str = "be19336b7e15968f7ac7dc82493d9cd8";

        let dir = tempfile::tempdir()?;
        let md5_dir = dir.path().join("md5");
        fs::create_dir(&md5_dir)?;
        fs::write(md5_dir.join(MD5_CHECKSUM), b"TTCACCCA")?;

        let cache_template = format!("{}/cache/%2s/%s", dir.path().display());
        let search_paths = SearchPaths::new(md5_dir.display().to_string(), Some(cache_template));

        let header: sam::Header = format!("@SQ\tSN:sq0\tLN:8\tM5:{MD5_CHECKSUM}\n").parse()?;

        let mut reference_set = ReferenceSet::default();
        reference_set.resolve_from_header(&header);
        reference_set.populate(0, &search_paths)?;

        let sq0 = reference_set.get(0).ok_or("missing sq0")?;
        assert_eq!(sq0.state(), State::Materialized);
        assert_eq!(sq0.length(), 8);

        let cache_path = search_paths.cache_path(MD5_CHECKSUM).ok_or("missing cache path")?;
        assert_eq!(fs::read(&cache_path)?, b"TTCACCCA");

        // A second set resolves the sequence through the cache.
        let mut reference_set = ReferenceSet::default();
        reference_set.resolve_from_header(&header);
        fs::remove_file(md5_dir.join(MD5_CHECKSUM))?;
        reference_set.populate(0, &search_paths)?;

        let sq0 = reference_set.get(0).ok_or("missing sq0")?;
        assert_eq!(sq0.state(), State::Located);
        assert_eq!(sq0.path(), Some(cache_path.as_path()));
        assert_eq!(reference_set.read_sequence(0, 3, 5)?, b"CAC");

        Ok(())
    }

    #[test]
    fn test_populate_without_tags() -> Result<(), Box<dyn std::error::Error>> {
        let header: sam::Header = "@SQ\tSN:sq0\tLN:8\n".parse()?;

        let mut reference_set = ReferenceSet::default();
        reference_set.resolve_from_header(&header);

        assert!(matches!(
            reference_set.populate(0, &SearchPaths::default()),
            Err(e) if e.kind() == io::ErrorKind::NotFound
        ));

        Ok(())
    }

    #[test]
    fn test_read_sequence_with_truncated_file() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let src = write_fasta(dir.path())?;

        fs::write(index_path(&src), b"sq0\t20\t5\t8\t9\n")?;

        let mut reference_set = ReferenceSet::from_path(&src)?;
        reference_set.bind(["sq0"]);

        // Reads past the first record and picks up the next definition line, which is not all
        // bases once newlines are stripped.
        assert!(reference_set.read_sequence(0, 1, 20).is_err());

        Ok(())
    }

    #[test]
    fn test_populate_with_unreadable_search_path_file() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let src = write_fasta(dir.path())?;

        let header: sam::Header = format!(
            "@SQ\tSN:sq1\tLN:13\tM5:d80f22a19aeeb623b3e4f746c762f21d\tUR:file:{}\n",
            src.display()
        )
        .parse()?;

        let mut reference_set = ReferenceSet::default();
        reference_set.resolve_from_header(&header);

        let missing = dir.path().join("md5").join("d80f22a19aeeb623b3e4f746c762f21d");
        assert!(!reference_set.read_from_search_path(0, &missing, None));
        assert_eq!(reference_set.load_count(), 0);

        let sq1 = reference_set.get(0).ok_or("missing sq1")?;
        assert_eq!(sq1.state(), State::Unresolved);

        reference_set.populate(0, &SearchPaths::new(dir.path().display().to_string(), None))?;

        let sq1 = reference_set.get(0).ok_or("missing sq1")?;
        assert_eq!(sq1.state(), State::Located);
        assert_eq!(sq1.path(), Some(src.as_path()));

        Ok(())
    }

    #[test]
    fn test_load_index_with_invalid_line_geometry() -> io::Result<()> {
        let dir = tempfile::tempdir()?;
        let src = write_fasta(dir.path())?;

        fs::write(index_path(&src), b"sq0\t8\t5\t8\t7\n")?;

        assert!(matches!(
            ReferenceSet::from_path(&src),
            Err(e) if e.kind() == io::ErrorKind::InvalidData
        ));

        Ok(())
    }
}
