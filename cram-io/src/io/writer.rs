//! CRAM writer.

mod builder;
mod compressor;
pub mod container;
pub mod header;
pub mod num;

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    mem,
    path::{self, PathBuf},
};

use bstr::BString;
use indexmap::map::Entry;
use log::{Level, log};
use noodles_sam::{
    self as sam,
    header::record::value::{
        Map,
        map::{
            ReadGroup,
            read_group,
            reference_sequence::{Md5Checksum, tag},
        },
    },
};

pub use self::builder::Builder;
use self::{
    compressor::BlockCompressor,
    container::write_container,
    header::{write_file_definition, write_file_header},
};
use super::{Options, SessionOption};
use crate::{
    Container, FileDefinition, calculate_normalized_sequence_digest,
    container::{
        Block, ReferenceSequenceContext, Slice, Statistics,
        block::ContentType,
        slice::EMBEDDED_REFERENCE_BASES_CONTENT_ID,
    },
    file_definition::Dialect,
    reference::{ReferenceSource, State},
};

const UNKNOWN_READ_GROUP_ID: &[u8] = b"UNKNOWN";

/// A CRAM writer.
///
/// Slices are buffered into a pending container, which is written when it is full, on
/// [`Self::flush`], or when the writer is finished.
///
/// # Examples
///
/// ```
/// use cram_io::{
///     container::{block::ContentType, Block, Slice},
///     io::writer::Builder,
///     reference::SearchPaths,
/// };
/// use noodles_sam as sam;
///
/// let mut writer = Builder::default()
///     .set_search_paths(SearchPaths::default())
///     .build_from_writer(Vec::new());
///
/// writer.write_header(&sam::Header::default())?;
///
/// let slice = Slice::builder()
///     .set_record_count(1)
///     .add_block(Block::new(ContentType::ExternalData, 1, b"ABC".to_vec()))
///     .build();
///
/// writer.write_slice(slice)?;
/// writer.try_finish()?;
/// # Ok::<_, std::io::Error>(())
/// ```
pub struct Writer<W> {
    inner: W,
    reference_source: ReferenceSource,
    reference_sequence_path: Option<PathBuf>,
    options: Options,
    file_name: Option<Vec<u8>>,
    header: Option<sam::Header>,
    is_file_definition_written: bool,
    container: Container,
    compressor: BlockCompressor,
    record_counter: u64,
}

impl<W> Writer<W> {
    /// Returns a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Returns a mutable reference to the underlying writer.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    /// Returns the writer options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the reference source.
    pub fn reference_source(&self) -> &ReferenceSource {
        &self.reference_source
    }

    /// Returns a mutable reference to the reference source.
    pub fn reference_source_mut(&mut self) -> &mut ReferenceSource {
        &mut self.reference_source
    }

    /// Returns the written SAM header, if any.
    pub fn header(&self) -> Option<&sam::Header> {
        self.header.as_ref()
    }

    /// Returns the data series statistics of the pending container.
    pub fn statistics_mut(&mut self) -> &mut Statistics {
        &mut self.container.statistics
    }

    /// Sets the compression header payload of the pending container.
    ///
    /// The payload is stored raw.
    pub fn set_compression_header(&mut self, data: Vec<u8>) {
        self.container.compression_header = Block::new(ContentType::CompressionHeader, 0, data);
    }

    /// Returns the number of slices in the pending container.
    pub fn pending_slice_count(&self) -> usize {
        self.container.slices().len()
    }

    fn bind_reference_sequences(&mut self) -> io::Result<()> {
        if let Some(header) = &self.header {
            self.reference_source
                .reference_set()
                .lock()?
                .resolve_from_header(header);
        }

        Ok(())
    }

    fn add_missing_reference_sequence_tags(&mut self, header: &mut sam::Header) -> io::Result<()> {
        let uri = self
            .reference_sequence_path
            .as_deref()
            .map(path::absolute)
            .transpose()?;

        for (id, reference_sequence) in header.reference_sequences_mut().values_mut().enumerate() {
            let is_located = self
                .reference_source
                .reference_set()
                .lock()?
                .get(id)
                .is_some_and(|entry| entry.state() != State::Unresolved);

            if !is_located {
                continue;
            }

            if let Entry::Vacant(entry) = reference_sequence
                .other_fields_mut()
                .entry(tag::MD5_CHECKSUM)
            {
                let sequence = self.reference_source.get_range(id, 1, 0)?;
                let checksum = calculate_normalized_sequence_digest(&sequence);
                entry.insert(Md5Checksum::from(checksum).to_string().into());
            }

            if let Some(uri) = &uri {
                reference_sequence
                    .other_fields_mut()
                    .insert(tag::URI, BString::from(uri.to_string_lossy().into_owned()));
            }
        }

        Ok(())
    }

    /// Assigns record counters, adds reference data and compresses the pending slices.
    ///
    /// This returns the record counter following the last slice. Reprocessing a slice is a no-op
    /// for blocks that are already compressed or embedded.
    fn prepare_slices(&mut self, slices: &mut [Slice]) -> io::Result<u64> {
        let mut record_counter = self.record_counter;

        for slice in slices {
            slice.header.record_counter = record_counter;
            record_counter += slice.header().record_count() as u64;

            self.add_slice_reference(slice)?;
            self.compressor.compress_slice(slice, &self.options)?;
        }

        Ok(record_counter)
    }

    fn add_slice_reference(&mut self, slice: &mut Slice) -> io::Result<()> {
        let ReferenceSequenceContext::Some(context) = slice.header().reference_sequence_context()
        else {
            return Ok(());
        };

        if context.alignment_span() == 0 {
            return Ok(());
        }

        let embed = self.options.embed_reference_sequences
            && slice
                .header()
                .embedded_reference_bases_block_content_id()
                .is_none();

        let compute_md5 =
            !self.options.no_reference && self.options.version.dialect() == Dialect::Modern;

        if !embed && !compute_md5 {
            return Ok(());
        }

        let sequence = self.reference_source.get_range(
            context.reference_sequence_id(),
            context.alignment_start(),
            context.alignment_end(),
        )?;

        if compute_md5 {
            slice.header.reference_md5 = Some(calculate_normalized_sequence_digest(&sequence));
        }

        if embed {
            slice.push_block(Block::new(
                ContentType::ExternalData,
                EMBEDDED_REFERENCE_BASES_CONTENT_ID,
                sequence.to_vec(),
            ));

            slice.header.embedded_reference_bases_block_content_id =
                Some(EMBEDDED_REFERENCE_BASES_CONTENT_ID);
        }

        Ok(())
    }
}

impl<W> Writer<W>
where
    W: Write,
{
    /// Creates a CRAM writer with default options.
    ///
    /// Reference sequences are searched for using `REF_PATH` and `REF_CACHE`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::io::Writer;
    /// let writer = Writer::new(Vec::new());
    /// ```
    pub fn new(inner: W) -> Self {
        Builder::default().build_from_writer(inner)
    }

    /// Applies a session option.
    ///
    /// The format version can only be set before the file definition is written.
    pub fn set_option(&mut self, option: SessionOption) -> io::Result<()> {
        match option {
            SessionOption::Version(_) if self.is_file_definition_written => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "the format version cannot be changed after the file definition is written",
            )),
            SessionOption::SharedReference(reference_set) => {
                self.reference_source.set_reference_set(reference_set);
                self.reference_source.set_shared(true);
                self.bind_reference_sequences()
            }
            SessionOption::Reference(src) => {
                self.reference_source
                    .reference_set()
                    .lock()?
                    .load_index(&src)?;

                self.reference_sequence_path = Some(src);
                self.bind_reference_sequences()
            }
            option => self.options.set(option),
        }
    }

    /// Writes the file definition.
    ///
    /// This does nothing if it was already written.
    pub fn write_file_definition(&mut self) -> io::Result<()> {
        if self.is_file_definition_written {
            return Ok(());
        }

        let version = self.options.version;
        version.validate()?;

        let file_definition = match &self.file_name {
            Some(name) => FileDefinition::with_name(version, name),
            None => FileDefinition::new(version, Default::default()),
        };

        write_file_definition(&mut self.inner, &file_definition)?;
        self.is_file_definition_written = true;

        Ok(())
    }

    /// Writes the file definition, if needed, and the SAM header.
    ///
    /// Unless writing without a reference, reference sequences with a known location get an `M5`
    /// tag if they lack one, and a `UR` tag naming the loaded reference file, if any. CRAM 1.0
    /// output also gets an `UNKNOWN` read group.
    pub fn write_header(&mut self, header: &sam::Header) -> io::Result<()> {
        if self.header.is_some() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "the SAM header was already written",
            ));
        }

        self.write_file_definition()?;

        let version = self.options.version;
        let mut header = header.clone();

        if version.dialect() == Dialect::Legacy {
            add_unknown_read_group(&mut header);
        }

        self.reference_source
            .reference_set()
            .lock()?
            .resolve_from_header(&header);

        if !self.options.no_reference {
            self.add_missing_reference_sequence_tags(&mut header)?;
        }

        write_file_header(&mut self.inner, &header, version)?;
        self.inner.flush()?;

        self.header = Some(header);
        self.bind_reference_sequences()
    }

    /// Adds a slice to the pending container.
    ///
    /// The container is written once it holds the configured number of slices. If that fails, the
    /// given slice is removed again, and the slices before it stay pending.
    pub fn write_slice(&mut self, slice: Slice) -> io::Result<()> {
        if self.header.is_none() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "the SAM header has not been written",
            ));
        }

        let record_count = slice.header().record_count();

        if record_count > self.options.records_per_slice {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "slice has too many records: expected at most {}, got {record_count}",
                    self.options.records_per_slice
                ),
            ));
        }

        self.container.slices.push(slice);

        if self.container.slices.len() >= self.options.slices_per_container {
            if let Err(e) = self.flush_container() {
                self.container.slices.pop();
                return Err(e);
            }
        }

        Ok(())
    }

    fn flush_container(&mut self) -> io::Result<()> {
        if self.container.slices.is_empty() {
            return Ok(());
        }

        let version = self.options.version;

        let mut slices = mem::take(&mut self.container.slices);
        let result = self.prepare_slices(&mut slices);
        self.container.slices = slices;
        let record_counter = result?;

        write_container(
            &mut self.inner,
            &mut self.container,
            version,
            self.options.multi_reference_per_slice,
        )?;

        self.record_counter = record_counter;

        let level = if self.options.verbosity > 0 {
            Level::Info
        } else {
            Level::Debug
        };

        let header = self.container.header();

        log!(
            level,
            "wrote container: {} slices, {} records, {} bytes",
            self.container.slices().len(),
            header.record_count(),
            header.length()
        );

        self.inner.flush()?;
        self.container.clear();

        Ok(())
    }

    /// Writes the pending container, if any, and flushes the underlying writer.
    pub fn flush(&mut self) -> io::Result<()> {
        self.flush_container()?;
        self.inner.flush()
    }

    /// Writes the pending container, if any, and releases the session's reference sequence.
    pub fn try_finish(&mut self) -> io::Result<()> {
        self.flush()?;
        self.reference_source.release();
        Ok(())
    }
}

fn add_unknown_read_group(header: &mut sam::Header) {
    if let Entry::Vacant(entry) = header
        .read_groups_mut()
        .entry(BString::from(UNKNOWN_READ_GROUP_ID))
    {
        let mut read_group = Map::<ReadGroup>::default();

        read_group
            .other_fields_mut()
            .insert(read_group::tag::SAMPLE, UNKNOWN_READ_GROUP_ID.into());

        entry.insert(read_group);
    }
}

impl Writer<BufWriter<File>> {
    /// Finishes the output and syncs it to storage.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cram_io::io::writer::Builder;
    /// use noodles_sam as sam;
    ///
    /// let mut writer = Builder::default().build_from_path("out.cram")?;
    /// writer.write_header(&sam::Header::default())?;
    /// writer.close()?;
    /// # Ok::<_, std::io::Error>(())
    /// ```
    pub fn close(mut self) -> io::Result<()> {
        self.try_finish()?;

        let file = self
            .inner
            .into_inner()
            .map_err(io::IntoInnerError::into_error)?;

        file.sync_all()
    }
}
