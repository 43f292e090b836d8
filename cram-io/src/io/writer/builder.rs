use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use super::{BlockCompressor, Writer};
use crate::{
    Container,
    file_definition::Version,
    io::Options,
    reference::{ReferenceSet, ReferenceSource, SearchPaths, SharedReferenceSet},
};

/// A CRAM writer builder.
#[derive(Default)]
pub struct Builder {
    reference_set: Option<SharedReferenceSet>,
    reference_sequence_path: Option<PathBuf>,
    is_shared: bool,
    search_paths: Option<SearchPaths>,
    options: Options,
}

impl Builder {
    /// Sets the reference sequence set.
    ///
    /// If the set was loaded from a FASTA file, its absolute path is written to the `UR` tags of
    /// the SAM header.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::{io::writer::Builder, reference::ReferenceSet};
    /// let builder = Builder::default().set_reference_set(ReferenceSet::default());
    /// ```
    pub fn set_reference_set(mut self, reference_set: ReferenceSet) -> Self {
        self.reference_sequence_path = reference_set.path().map(PathBuf::from);
        self.reference_set = Some(SharedReferenceSet::new(reference_set));
        self.is_shared = false;
        self
    }

    /// Sets a reference sequence set shared with other sessions.
    pub fn set_shared_reference_set(mut self, reference_set: SharedReferenceSet) -> Self {
        self.reference_sequence_path = None;
        self.reference_set = Some(reference_set);
        self.is_shared = true;
        self
    }

    /// Sets the reference sequence search paths.
    ///
    /// By default, these are read from `REF_PATH` and `REF_CACHE` when the writer is built.
    pub fn set_search_paths(mut self, search_paths: SearchPaths) -> Self {
        self.search_paths = Some(search_paths);
        self
    }

    /// Sets the format version of the output.
    ///
    /// The default is 2.0.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::{file_definition::Version, io::writer::Builder};
    /// let builder = Builder::default().set_version(Version::V1_0);
    /// ```
    pub fn set_version(mut self, version: Version) -> Self {
        self.options.version = version;
        self
    }

    /// Sets the block compression level, from 0 (raw) to 9.
    ///
    /// The default is 5.
    ///
    /// # Panics
    ///
    /// Panics if `compression_level` is greater than 9.
    pub fn set_compression_level(mut self, compression_level: u32) -> Self {
        assert!(compression_level <= 9, "compression_level must be <= 9");
        self.options.compression_level = compression_level;
        self
    }

    /// Sets the maximum number of records per slice.
    ///
    /// The default is 10000.
    ///
    /// # Panics
    ///
    /// Panics if `records_per_slice` is 0.
    pub fn set_records_per_slice(mut self, records_per_slice: usize) -> Self {
        assert!(records_per_slice > 0, "records_per_slice must be > 0");
        self.options.records_per_slice = records_per_slice;
        self
    }

    /// Sets the number of slices per container.
    ///
    /// The default is 1.
    ///
    /// # Panics
    ///
    /// Panics if `slices_per_container` is 0.
    pub fn set_slices_per_container(mut self, slices_per_container: usize) -> Self {
        assert!(slices_per_container > 0, "slices_per_container must be > 0");
        self.options.slices_per_container = slices_per_container;
        self
    }

    /// Sets whether to embed reference bases in slices.
    ///
    /// The default is `false`.
    pub fn embed_reference_sequences(mut self, value: bool) -> Self {
        self.options.embed_reference_sequences = value;
        self
    }

    /// Sets whether to write without a reference.
    ///
    /// When enabled, no `M5` tags are added to the SAM header and no slice reference MD5s are
    /// calculated.
    ///
    /// The default is `false`.
    pub fn set_no_reference(mut self, value: bool) -> Self {
        self.options.no_reference = value;
        self
    }

    /// Sets whether to compress blocks with bzip2 instead of gzip.
    ///
    /// The default is `false`.
    pub fn set_use_bzip2(mut self, value: bool) -> Self {
        self.options.use_bzip2 = value;
        self
    }

    /// Sets whether a container may span multiple reference sequences.
    ///
    /// The default is `false`.
    pub fn set_multi_reference_per_slice(mut self, value: bool) -> Self {
        self.options.multi_reference_per_slice = value;
        self
    }

    /// Sets the verbosity of per-container logging.
    ///
    /// At 1 or above, containers are logged at the info level instead of the debug level.
    pub fn set_verbosity(mut self, verbosity: u8) -> Self {
        self.options.verbosity = verbosity;
        self
    }

    /// Builds a CRAM writer from a path.
    ///
    /// The file name is used as the file ID.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cram_io::io::writer::Builder;
    /// let writer = Builder::default().build_from_path("out.cram")?;
    /// # Ok::<_, std::io::Error>(())
    /// ```
    pub fn build_from_path<P>(self, dst: P) -> io::Result<Writer<BufWriter<File>>>
    where
        P: AsRef<Path>,
    {
        let dst = dst.as_ref();

        let file_name = dst
            .file_name()
            .map(|name| name.as_encoded_bytes().to_vec());

        let file = File::create(dst)?;

        let mut writer = self.build_from_writer(BufWriter::new(file));
        writer.file_name = file_name;

        Ok(writer)
    }

    /// Builds a CRAM writer from a writer.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::io::writer::Builder;
    /// let writer = Builder::default().build_from_writer(Vec::new());
    /// ```
    pub fn build_from_writer<W>(self, writer: W) -> Writer<W>
    where
        W: Write,
    {
        let search_paths = self.search_paths.unwrap_or_else(SearchPaths::from_env);

        let mut reference_source =
            ReferenceSource::new(self.reference_set.unwrap_or_default(), search_paths);
        reference_source.set_shared(self.is_shared);

        Writer {
            inner: writer,
            reference_source,
            reference_sequence_path: self.reference_sequence_path,
            options: self.options,
            file_name: None,
            header: None,
            is_file_definition_written: false,
            container: Container::default(),
            compressor: BlockCompressor::default(),
            record_counter: 0,
        }
    }
}
