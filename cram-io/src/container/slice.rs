//! CRAM container slice.

mod builder;
mod header;

use std::io;

pub use self::{builder::Builder, header::Header};
use super::{
    Block,
    block::{ContentId, ContentType},
};

/// Content IDs below this bound are looked up through a direct index.
pub const DIRECT_INDEX_BOUND: ContentId = 1024;

/// The content ID of the block holding embedded reference bases.
///
/// This is outside the range of the well-known content IDs and the direct index.
pub const EMBEDDED_REFERENCE_BASES_CONTENT_ID: ContentId = ContentId::MAX;

/// Well-known external block content IDs.
pub mod content_id {
    use crate::container::block::ContentId;

    /// Read names.
    pub const READ_NAMES: ContentId = 11;
    /// Quality scores.
    pub const QUALITY_SCORES: ContentId = 12;
    /// Inserted bases.
    pub const INSERTED_BASES: ContentId = 13;
    /// Auxiliary tag data.
    pub const TAG_DATA: ContentId = 14;
    /// Soft-clipped bases.
    pub const SOFT_CLIP_BASES: ContentId = 15;
}

/// A CRAM container slice.
///
/// A slice is a slice header followed by its data blocks: a core data block and any number of
/// external data blocks.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Slice {
    pub(crate) header: Header,
    pub(crate) blocks: Vec<Block>,
    pub(crate) base_count: u64,
    block_index: Vec<Option<usize>>,
}

impl Slice {
    /// Creates a slice builder.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::container::Slice;
    /// let builder = Slice::builder();
    /// ```
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub(crate) fn new(header: Header, blocks: Vec<Block>) -> Self {
        let block_index = build_block_index(&blocks);

        Self {
            header,
            blocks,
            base_count: 0,
            block_index,
        }
    }

    /// Returns the slice header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the data blocks.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the number of bases in the slice.
    ///
    /// This is only tracked for slices built for writing.
    pub fn base_count(&self) -> u64 {
        self.base_count
    }

    /// Returns the core data block.
    pub fn core_data_block(&self) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|block| block.content_type() == ContentType::CoreData)
    }

    /// Returns the external data block with the given content ID.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::container::{block::ContentType, Block, Slice};
    ///
    /// let slice = Slice::builder()
    ///     .add_block(Block::new(ContentType::ExternalData, 12, b"IIII".to_vec()))
    ///     .build();
    ///
    /// assert_eq!(slice.get_block(12).map(|block| block.data()), Some(&b"IIII"[..]));
    /// assert!(slice.get_block(13).is_none());
    /// ```
    pub fn get_block(&self, content_id: ContentId) -> Option<&Block> {
        let i = match usize::try_from(content_id)
            .ok()
            .and_then(|j| self.block_index.get(j))
        {
            Some(entry) => *entry,
            None => self.blocks.iter().position(|block| {
                block.content_type() == ContentType::ExternalData
                    && block.content_id() == content_id
            }),
        };

        i.map(|j| &self.blocks[j])
    }

    /// Decompresses all data blocks in place.
    pub fn decompress(&mut self) -> io::Result<()> {
        for block in &mut self.blocks {
            block.decompress()?;
        }

        Ok(())
    }

    pub(crate) fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub(crate) fn push_block(&mut self, block: Block) {
        self.header.block_count += 1;
        self.header.block_content_ids.push(block.content_id());
        self.blocks.push(block);
        self.block_index = build_block_index(&self.blocks);
    }
}

fn build_block_index(blocks: &[Block]) -> Vec<Option<usize>> {
    let external_content_ids = blocks
        .iter()
        .filter(|block| block.content_type() == ContentType::ExternalData)
        .map(|block| block.content_id());

    let Some(max_content_id) = external_content_ids.max() else {
        return Vec::new();
    };

    if !(0..DIRECT_INDEX_BOUND).contains(&max_content_id) {
        return Vec::new();
    }

    let mut index = vec![None; max_content_id as usize + 1];

    for (i, block) in blocks.iter().enumerate() {
        if block.content_type() != ContentType::ExternalData {
            continue;
        }

        if let Ok(j) = usize::try_from(block.content_id()) {
            index[j].get_or_insert(i);
        }
    }

    index
}
