use crate::container::{
    ReferenceSequenceContext,
    block::{ContentId, ContentType},
};

/// A CRAM container slice header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Header {
    pub(crate) content_type: ContentType,
    pub(crate) reference_sequence_context: ReferenceSequenceContext,
    pub(crate) record_count: usize,
    pub(crate) record_counter: u64,
    pub(crate) block_count: usize,
    pub(crate) block_content_ids: Vec<ContentId>,
    pub(crate) embedded_reference_bases_block_content_id: Option<ContentId>,
    pub(crate) reference_md5: Option<[u8; 16]>,
}

impl Header {
    /// Returns the content type of the block holding this header.
    ///
    /// This is either [`ContentType::MappedSlice`] or [`ContentType::UnmappedSlice`].
    pub fn content_type(&self) -> ContentType {
        self.content_type
    }

    /// Returns the reference sequence context.
    pub fn reference_sequence_context(&self) -> ReferenceSequenceContext {
        self.reference_sequence_context
    }

    /// Returns the number of records in the slice.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Returns the number of records written before this slice.
    pub fn record_counter(&self) -> u64 {
        self.record_counter
    }

    /// Returns the number of blocks in the slice, excluding the slice header block.
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Returns the content IDs of the blocks in the slice.
    pub fn block_content_ids(&self) -> &[ContentId] {
        &self.block_content_ids
    }

    /// Returns the content ID of the block holding embedded reference bases.
    pub fn embedded_reference_bases_block_content_id(&self) -> Option<ContentId> {
        self.embedded_reference_bases_block_content_id
    }

    /// Returns the MD5 digest of the reference subsequence the slice covers.
    pub fn reference_md5(&self) -> Option<&[u8; 16]> {
        self.reference_md5.as_ref()
    }
}

impl Default for Header {
    fn default() -> Self {
        Self {
            content_type: ContentType::MappedSlice,
            reference_sequence_context: ReferenceSequenceContext::None,
            record_count: 0,
            record_counter: 0,
            block_count: 0,
            block_content_ids: Vec::new(),
            embedded_reference_bases_block_content_id: None,
            reference_md5: None,
        }
    }
}
