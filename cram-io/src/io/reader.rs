//! CRAM reader.

mod builder;
pub mod container;
pub mod header;
pub mod num;

use std::io::{self, Read};

use log::debug;
use noodles_sam::{self as sam, header::record::value::map::reference_sequence::Md5Checksum};

pub use self::builder::Builder;
use self::{
    container::{read_body, read_header as read_container_header},
    header::{read_file_definition, read_file_header},
};
use super::{Options, SessionOption};
use crate::{
    Container, FileDefinition, calculate_normalized_sequence_digest,
    container::{ReferenceSequenceContext, slice},
    file_definition::Version,
    reference::{ReferenceSource, Subsequence},
};

/// A CRAM reader.
///
/// A reader reads the file definition, the SAM header, and then containers. Reference sequences
/// bound to the header are served through the reader's reference source.
///
/// # Examples
///
/// ```no_run
/// use cram_io::{Container, io::reader::Builder};
///
/// let mut reader = Builder::default().build_from_path("sample.cram")?;
/// let header = reader.read_header()?;
///
/// let mut container = Container::default();
///
/// while reader.read_container(&mut container)? != 0 {
///     // ...
/// }
/// # Ok::<_, std::io::Error>(())
/// ```
pub struct Reader<R> {
    inner: R,
    reference_source: ReferenceSource,
    options: Options,
    file_definition: Option<FileDefinition>,
    header: Option<sam::Header>,
    eof: bool,
}

impl<R> Reader<R> {
    /// Returns a reference to the underlying reader.
    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Returns a mutable reference to the underlying reader.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Returns the file definition, if it has been read.
    pub fn file_definition(&self) -> Option<&FileDefinition> {
        self.file_definition.as_ref()
    }

    /// Returns the SAM header, if it has been read.
    pub fn header(&self) -> Option<&sam::Header> {
        self.header.as_ref()
    }

    /// Returns the reader options.
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

    /// Returns whether the end of the stream was reached.
    pub fn is_eof(&self) -> bool {
        self.eof
    }

    fn version(&self) -> Version {
        self.file_definition
            .as_ref()
            .map(|file_definition| file_definition.version())
            .unwrap_or(self.options.version)
    }

    /// Applies a session option.
    ///
    /// The format version is fixed by the input and cannot be set.
    pub fn set_option(&mut self, option: SessionOption) -> io::Result<()> {
        match option {
            SessionOption::Version(_) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "the format version of a reader cannot be set",
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

                self.bind_reference_sequences()
            }
            option => self.options.set(option),
        }
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

    /// Returns the bases in the 1-based, inclusive range `[start, end]` of a reference sequence.
    ///
    /// An `end` of 0 selects the rest of the sequence.
    pub fn get_reference_range(
        &mut self,
        reference_sequence_id: usize,
        start: usize,
        end: usize,
    ) -> io::Result<Subsequence> {
        self.reference_source
            .get_range(reference_sequence_id, start, end)
    }

    /// Verifies the reference MD5 recorded in a slice header against the reference sequence.
    ///
    /// This does nothing if checksums are ignored or the slice has no reference MD5. Slices that
    /// are not placed on a single reference sequence are not checked.
    pub fn verify_reference_md5(&mut self, header: &slice::Header) -> io::Result<()> {
        if self.options.ignore_checksums {
            return Ok(());
        }

        let ReferenceSequenceContext::Some(context) = header.reference_sequence_context() else {
            return Ok(());
        };

        let Some(expected) = header.reference_md5() else {
            return Ok(());
        };

        if context.alignment_span() == 0 {
            return Ok(());
        }

        let sequence = self.reference_source.get_range(
            context.reference_sequence_id(),
            context.alignment_start(),
            context.alignment_end(),
        )?;

        let actual = calculate_normalized_sequence_digest(&sequence);

        if &actual == expected {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "reference sequence checksum mismatch: expected {}, got {}",
                    Md5Checksum::from(*expected),
                    Md5Checksum::from(actual)
                ),
            ))
        }
    }
}

impl<R> Reader<R>
where
    R: Read,
{
    /// Creates a CRAM reader with default options.
    ///
    /// Reference sequences are searched for using `REF_PATH` and `REF_CACHE`.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::io::Reader;
    /// let reader = Reader::new(&[][..]);
    /// ```
    pub fn new(inner: R) -> Self {
        Builder::default().build_from_reader(inner)
    }

    /// Reads the file definition.
    ///
    /// The magic number and format version are validated.
    pub fn read_file_definition(&mut self) -> io::Result<FileDefinition> {
        let file_definition = read_file_definition(&mut self.inner)?;

        debug!("reading CRAM {}", file_definition.version());

        self.file_definition = Some(file_definition.clone());

        Ok(file_definition)
    }

    /// Reads the SAM header.
    ///
    /// The stream must be positioned after the file definition. Reference sequences named in the
    /// header are bound to the reference source, in header order.
    pub fn read_file_header(&mut self) -> io::Result<sam::Header> {
        let version = self.version();
        let header = read_file_header(&mut self.inner, version)?;

        self.header = Some(header.clone());
        self.bind_reference_sequences()?;

        Ok(header)
    }

    /// Reads the file definition and the SAM header.
    pub fn read_header(&mut self) -> io::Result<sam::Header> {
        self.read_file_definition()?;
        self.read_file_header()
    }

    /// Reads a container.
    ///
    /// This returns the length of the container body, or 0 at end of stream. If a range is set,
    /// containers that do not overlap it are skipped.
    pub fn read_container(&mut self, container: &mut Container) -> io::Result<usize> {
        let version = self.version();

        loop {
            let Some(len) = read_container_header(&mut self.inner, &mut container.header, version)?
            else {
                self.eof = true;
                return Ok(0);
            };

            if let Some(region) = self.options.range {
                let is_overlapping = container.header.reference_sequence_context().overlaps(
                    region.reference_sequence_id(),
                    region.start(),
                    region.end(),
                );

                if !is_overlapping {
                    debug!("skipping container ({len} bytes) outside of range");
                    skip(&mut self.inner, len)?;
                    continue;
                }
            }

            read_body(&mut self.inner, container, len, version)?;

            return Ok(len);
        }
    }
}

fn skip<R>(reader: &mut R, len: usize) -> io::Result<()>
where
    R: Read,
{
    let n = io::copy(&mut reader.by_ref().take(len as u64), &mut io::sink())?;

    if n == len as u64 {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "truncated container",
        ))
    }
}
