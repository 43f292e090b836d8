use std::{io, path::PathBuf};

use flate2::Compression;

use crate::{
    codecs::Encoder,
    container::{
        block::{
            ContentId, DEFAULT_SECONDARY_MARGIN, DEFAULT_TRIAL_COUNT, DEFAULT_TRIAL_INTERVAL,
        },
        slice::content_id,
    },
    file_definition::Version,
    reference::SharedReferenceSet,
};

pub(crate) const DEFAULT_COMPRESSION_LEVEL: u32 = 5;
pub(crate) const DEFAULT_RECORDS_PER_SLICE: usize = 10000;
pub(crate) const DEFAULT_SLICES_PER_CONTAINER: usize = 1;

const MAX_COMPRESSION_LEVEL: u32 = 9;

/// A 1-based, inclusive region of a reference sequence.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Region {
    reference_sequence_id: usize,
    start: usize,
    end: usize,
}

impl Region {
    /// Creates a region.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::io::Region;
    /// let region = Region::new(0, 1000, 2000);
    /// ```
    pub fn new(reference_sequence_id: usize, start: usize, end: usize) -> Self {
        Self {
            reference_sequence_id,
            start,
            end,
        }
    }

    /// Returns the reference sequence ID.
    pub fn reference_sequence_id(&self) -> usize {
        self.reference_sequence_id
    }

    /// Returns the 1-based start position.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Returns the 1-based, inclusive end position.
    pub fn end(&self) -> usize {
        self.end
    }
}

/// A session option.
///
/// Options are applied to an open reader or writer with `set_option`.
#[derive(Clone, Debug)]
pub enum SessionOption {
    /// Whether to decode per-record metadata.
    DecodeMetadata(bool),
    /// The prefix used for generated read names.
    Prefix(String),
    /// The verbosity of per-container logging.
    Verbosity(u8),
    /// The maximum number of records per slice.
    RecordsPerSlice(usize),
    /// The number of slices per container.
    SlicesPerContainer(usize),
    /// Whether to embed reference bases in slices.
    EmbedReference(bool),
    /// Whether to write without a reference.
    NoReference(bool),
    /// Whether to skip slice reference checksum verification.
    IgnoreChecksums(bool),
    /// Whether to compress blocks with bzip2 instead of gzip.
    UseBzip2(bool),
    /// A reference sequence set shared with other sessions.
    SharedReference(SharedReferenceSet),
    /// A region to restrict reading to.
    Range(Region),
    /// A FASTA file (with a `.fai` index) to load reference sequences from.
    Reference(PathBuf),
    /// The format version of the output.
    Version(Version),
    /// Whether a container may span multiple reference sequences.
    MultiReferencePerSlice(bool),
    /// The block compression level. 0 stores blocks raw.
    CompressionLevel(u32),
}

/// Reader and writer options.
#[derive(Clone, Debug)]
pub struct Options {
    /// The format version.
    pub version: Version,
    /// Whether to decode per-record metadata.
    pub decode_metadata: bool,
    /// The verbosity of per-container logging.
    pub verbosity: u8,
    /// The block compression level, from 0 (raw) to 9.
    pub compression_level: u32,
    /// The maximum number of records per slice.
    pub records_per_slice: usize,
    /// The number of slices per container.
    pub slices_per_container: usize,
    /// Whether to embed reference bases in slices.
    pub embed_reference_sequences: bool,
    /// Whether to write without a reference.
    pub no_reference: bool,
    /// Whether to skip slice reference checksum verification.
    pub ignore_checksums: bool,
    /// Whether to compress blocks with bzip2 instead of gzip.
    pub use_bzip2: bool,
    /// Whether a container may span multiple reference sequences.
    pub multi_reference_per_slice: bool,
    /// The prefix used for generated read names.
    pub prefix: Option<String>,
    /// A region to restrict reading to.
    pub range: Option<Region>,
    /// The number of blocks between adaptive compression trials.
    pub trial_interval: usize,
    /// The number of blocks compressed both ways in each trial phase.
    pub trial_count: usize,
    /// The size ratio the secondary encoder must reach to win a trial.
    pub secondary_margin: f64,
}

impl Options {
    pub(crate) fn set(&mut self, option: SessionOption) -> io::Result<()> {
        match option {
            SessionOption::DecodeMetadata(value) => self.decode_metadata = value,
            SessionOption::Prefix(prefix) => self.prefix = Some(prefix),
            SessionOption::Verbosity(verbosity) => self.verbosity = verbosity,
            SessionOption::RecordsPerSlice(n) => {
                self.records_per_slice = non_zero("records per slice", n)?;
            }
            SessionOption::SlicesPerContainer(n) => {
                self.slices_per_container = non_zero("slices per container", n)?;
            }
            SessionOption::EmbedReference(value) => self.embed_reference_sequences = value,
            SessionOption::NoReference(value) => self.no_reference = value,
            SessionOption::IgnoreChecksums(value) => self.ignore_checksums = value,
            SessionOption::UseBzip2(value) => self.use_bzip2 = value,
            SessionOption::Range(region) => self.range = Some(region),
            SessionOption::Version(version) => {
                version.validate()?;
                self.version = version;
            }
            SessionOption::MultiReferencePerSlice(value) => self.multi_reference_per_slice = value,
            SessionOption::CompressionLevel(level) => {
                if level > MAX_COMPRESSION_LEVEL {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("invalid compression level: {level}"),
                    ));
                }

                self.compression_level = level;
            }
            SessionOption::SharedReference(_) | SessionOption::Reference(_) => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "reference options apply to a session",
                ));
            }
        }

        Ok(())
    }

    /// Returns the encoder used for every block, or `None` to store blocks raw.
    pub(crate) fn primary_encoder(&self) -> Option<Encoder> {
        match self.compression_level {
            0 => None,
            level if self.use_bzip2 => Some(Encoder::Bzip2(level)),
            level => Some(Encoder::Gzip(Compression::new(level))),
        }
    }

    /// Returns the encoder that competes with the primary encoder for blocks with the given
    /// content ID.
    pub(crate) fn secondary_encoder(&self, content_id: ContentId) -> Option<Encoder> {
        if self.compression_level == 0 || self.use_bzip2 {
            return None;
        }

        // Quality scores tend to favor a fast, shallow match search.
        (content_id == content_id::QUALITY_SCORES).then(|| Encoder::Gzip(Compression::fast()))
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            version: Version::default(),
            decode_metadata: false,
            verbosity: 0,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            records_per_slice: DEFAULT_RECORDS_PER_SLICE,
            slices_per_container: DEFAULT_SLICES_PER_CONTAINER,
            embed_reference_sequences: false,
            no_reference: false,
            ignore_checksums: false,
            use_bzip2: false,
            multi_reference_per_slice: false,
            prefix: None,
            range: None,
            trial_interval: DEFAULT_TRIAL_INTERVAL,
            trial_count: DEFAULT_TRIAL_COUNT,
            secondary_margin: DEFAULT_SECONDARY_MARGIN,
        }
    }
}

fn non_zero(name: &str, n: usize) -> io::Result<usize> {
    if n == 0 {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{name} must be > 0"),
        ))
    } else {
        Ok(n)
    }
}
