use super::{Header, Slice};
use crate::container::{Block, ReferenceSequenceContext};

/// A CRAM container slice builder.
#[derive(Debug, Default)]
pub struct Builder {
    reference_sequence_context: ReferenceSequenceContext,
    record_count: usize,
    base_count: u64,
    blocks: Vec<Block>,
}

impl Builder {
    /// Sets the reference sequence context.
    pub fn set_reference_sequence_context(
        mut self,
        reference_sequence_context: ReferenceSequenceContext,
    ) -> Self {
        self.reference_sequence_context = reference_sequence_context;
        self
    }

    /// Sets the number of records in the slice.
    pub fn set_record_count(mut self, record_count: usize) -> Self {
        self.record_count = record_count;
        self
    }

    /// Sets the number of bases in the slice.
    pub fn set_base_count(mut self, base_count: u64) -> Self {
        self.base_count = base_count;
        self
    }

    /// Adds a data block.
    pub fn add_block(mut self, block: Block) -> Self {
        self.blocks.push(block);
        self
    }

    /// Builds a slice.
    ///
    /// The record counter, embedded reference, and reference MD5 are filled in when the slice is
    /// written.
    pub fn build(self) -> Slice {
        let header = Header {
            reference_sequence_context: self.reference_sequence_context,
            record_count: self.record_count,
            block_count: self.blocks.len(),
            block_content_ids: self.blocks.iter().map(Block::content_id).collect(),
            ..Default::default()
        };

        let mut slice = Slice::new(header, self.blocks);
        slice.base_count = self.base_count;
        slice
    }
}
