//! CRAM container block.

mod compression_method;
mod content_type;
mod metrics;

use std::io;

use log::trace;

pub use self::{
    compression_method::CompressionMethod,
    content_type::ContentType,
    metrics::{
        Choice, DEFAULT_SECONDARY_MARGIN, DEFAULT_TRIAL_COUNT, DEFAULT_TRIAL_INTERVAL, Metrics,
    },
};
use crate::codecs::{Encoder, bzip2, gzip};

/// A block content ID.
pub type ContentId = i32;

/// A CRAM container block.
///
/// A block is a typed, identified payload. A raw block holds its bytes as-is; a compressed block
/// holds the codec output and remembers the size of the data it expands to.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Block {
    pub(crate) compression_method: CompressionMethod,
    pub(crate) content_type: ContentType,
    pub(crate) content_id: ContentId,
    pub(crate) uncompressed_size: usize,
    pub(crate) data: Vec<u8>,
}

impl Block {
    /// Creates a raw block.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::container::{block::ContentType, Block};
    /// let block = Block::new(ContentType::ExternalData, 1, b"ABC".to_vec());
    /// assert_eq!(block.uncompressed_size(), 3);
    /// ```
    pub fn new(content_type: ContentType, content_id: ContentId, data: Vec<u8>) -> Self {
        Self {
            compression_method: CompressionMethod::None,
            content_type,
            content_id,
            uncompressed_size: data.len(),
            data,
        }
    }

    /// Returns the compression method.
    pub fn compression_method(&self) -> CompressionMethod {
        self.compression_method
    }

    /// Returns the content type.
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Returns the content ID.
    pub fn content_id(&self) -> ContentId {
        self.content_id
    }

    /// Returns the size of the stored data.
    pub fn compressed_size(&self) -> usize {
        self.data.len()
    }

    /// Returns the size of the data after decompression.
    pub fn uncompressed_size(&self) -> usize {
        self.uncompressed_size
    }

    /// Returns the stored data.
    ///
    /// This is the codec output if the block is compressed.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns whether the block holds uncompressed data.
    pub fn is_raw(&self) -> bool {
        self.compression_method == CompressionMethod::None
    }

    /// Appends data to a raw block.
    pub fn append(&mut self, buf: &[u8]) -> io::Result<()> {
        if !self.is_raw() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "cannot append to a compressed block",
            ));
        }

        self.data.extend_from_slice(buf);
        self.uncompressed_size = self.data.len();

        Ok(())
    }

    /// Decompresses the block in place.
    ///
    /// A block with an uncompressed size of 0 becomes an empty raw block regardless of its method.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::{
    ///     codecs::Encoder,
    ///     container::{block::{CompressionMethod, ContentType, Metrics}, Block},
    /// };
    ///
    /// let data = b"ACGT".repeat(16);
    /// let mut block = Block::new(ContentType::ExternalData, 1, data.clone());
    ///
    /// let encoder = Encoder::Gzip(Default::default());
    /// block.compress(Some(&encoder), None, &mut Metrics::default())?;
    /// assert_eq!(block.compression_method(), CompressionMethod::Gzip);
    ///
    /// block.decompress()?;
    /// assert_eq!(block.compression_method(), CompressionMethod::None);
    /// assert_eq!(block.data(), &data[..]);
    /// # Ok::<_, std::io::Error>(())
    /// ```
    pub fn decompress(&mut self) -> io::Result<()> {
        if self.uncompressed_size == 0 {
            self.compression_method = CompressionMethod::None;
            self.data.clear();
            return Ok(());
        }

        let data = match self.compression_method {
            CompressionMethod::None => {
                self.uncompressed_size = self.data.len();
                return Ok(());
            }
            CompressionMethod::Gzip => gzip::decode(&self.data, self.uncompressed_size)?,
            CompressionMethod::Bzip2 => bzip2::decode(&self.data, self.uncompressed_size)?,
        };

        if data.len() != self.uncompressed_size {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "{} block size mismatch: expected {}, got {}",
                    self.compression_method,
                    self.uncompressed_size,
                    data.len()
                ),
            ));
        }

        self.compression_method = CompressionMethod::None;
        self.data = data;

        Ok(())
    }

    /// Compresses the block in place.
    ///
    /// Without a primary encoder, the block is stored raw. With only a primary encoder, it is
    /// always used. With both, `metrics` decides: during trials, both are run and the smaller
    /// output is kept; otherwise, the encoder that won more trials is used alone.
    ///
    /// Compressing a block that is already compressed is an error.
    pub fn compress(
        &mut self,
        primary: Option<&Encoder>,
        secondary: Option<&Encoder>,
        metrics: &mut Metrics,
    ) -> io::Result<()> {
        let Some(primary) = primary else {
            return self.decompress();
        };

        if !self.is_raw() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "block (content ID {}) is already compressed",
                    self.content_id
                ),
            ));
        }

        let (encoder, buf) = match secondary {
            Some(secondary) => match metrics.next_choice() {
                Choice::Trial => {
                    let primary_buf = primary.encode(&self.data)?;
                    let secondary_buf = secondary.encode(&self.data)?;

                    if metrics.record_trial(primary_buf.len(), secondary_buf.len()) {
                        (secondary, secondary_buf)
                    } else {
                        (primary, primary_buf)
                    }
                }
                Choice::Primary => (primary, primary.encode(&self.data)?),
                Choice::Secondary => (secondary, secondary.encode(&self.data)?),
            },
            None => (primary, primary.encode(&self.data)?),
        };

        trace!(
            "compressed block (content ID {}) with {}: {} -> {} bytes",
            self.content_id,
            encoder.compression_method(),
            self.data.len(),
            buf.len()
        );

        self.compression_method = encoder.compression_method();
        self.data = buf;

        Ok(())
    }
}
