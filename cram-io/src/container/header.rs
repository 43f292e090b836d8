use super::ReferenceSequenceContext;

/// A CRAM container header.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Header {
    pub(crate) length: usize,
    pub(crate) reference_sequence_context: ReferenceSequenceContext,
    pub(crate) record_count: usize,
    pub(crate) record_counter: u64,
    pub(crate) base_count: u64,
    pub(crate) block_count: usize,
    pub(crate) landmarks: Vec<usize>,
}

impl Header {
    /// Returns the length of the container body in bytes.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Returns the reference sequence context.
    pub fn reference_sequence_context(&self) -> ReferenceSequenceContext {
        self.reference_sequence_context
    }

    /// Returns the number of records in the container.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Returns the number of records written before this container.
    ///
    /// This is always 0 in CRAM 1.0.
    pub fn record_counter(&self) -> u64 {
        self.record_counter
    }

    /// Returns the number of bases in the container.
    ///
    /// This is always 0 in CRAM 1.0.
    pub fn base_count(&self) -> u64 {
        self.base_count
    }

    /// Returns the number of blocks in the container.
    ///
    /// This includes the compression header block and every slice header block.
    pub fn block_count(&self) -> usize {
        self.block_count
    }

    /// Returns the byte offsets of the slices, relative to the start of the container body.
    pub fn landmarks(&self) -> &[usize] {
        &self.landmarks
    }
}
