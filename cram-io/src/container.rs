//! CRAM container and fields.

pub mod block;
mod header;
mod reference_sequence_context;
pub mod slice;
mod statistics;

pub use self::{
    block::Block,
    header::Header,
    reference_sequence_context::{Context, ReferenceSequenceContext},
    slice::Slice,
    statistics::Statistics,
};

use self::block::ContentType;

/// The payload of a compression header that declares no encodings.
///
/// This is an empty preservation map, an empty data series encoding map, and an empty tag
/// encoding map.
pub const EMPTY_COMPRESSION_HEADER: [u8; 6] = [0x01, 0x00, 0x01, 0x00, 0x01, 0x00];

/// A CRAM container.
///
/// A container is a header, a compression header block, and a list of slices.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Container {
    pub(crate) header: Header,
    pub(crate) compression_header: Block,
    pub(crate) slices: Vec<Slice>,
    pub(crate) statistics: Statistics,
}

impl Container {
    /// Returns the container header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the compression header block.
    pub fn compression_header(&self) -> &Block {
        &self.compression_header
    }

    /// Returns the slices.
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// Returns a mutable reference to the slices.
    pub fn slices_mut(&mut self) -> &mut Vec<Slice> {
        &mut self.slices
    }

    /// Returns the data series statistics.
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Returns the number of records in all slices.
    pub fn record_count(&self) -> usize {
        self.slices
            .iter()
            .map(|slice| slice.header().record_count())
            .sum()
    }

    pub(crate) fn clear(&mut self) {
        self.header = Header::default();
        self.compression_header = default_compression_header();
        self.slices.clear();
        self.statistics.clear();
    }
}

impl Default for Container {
    fn default() -> Self {
        Self {
            header: Header::default(),
            compression_header: default_compression_header(),
            slices: Vec::new(),
            statistics: Statistics::default(),
        }
    }
}

fn default_compression_header() -> Block {
    Block::new(
        ContentType::CompressionHeader,
        0,
        EMPTY_COMPRESSION_HEADER.to_vec(),
    )
}
