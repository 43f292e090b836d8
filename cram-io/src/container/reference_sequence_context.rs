use std::io;

const UNMAPPED: i32 = -1;
const MULTIREF: i32 = -2;

/// The reference sequence context of a container or slice.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ReferenceSequenceContext {
    /// All records are placed on a single reference sequence.
    Some(Context),
    /// All records are unplaced.
    #[default]
    None,
    /// Records are placed on multiple reference sequences.
    Many,
}

impl ReferenceSequenceContext {
    /// Creates a single reference sequence context.
    ///
    /// `alignment_start` is 1-based. `alignment_span` is the number of bases covered.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::container::ReferenceSequenceContext;
    /// let context = ReferenceSequenceContext::some(0, 5, 8);
    /// ```
    pub fn some(reference_sequence_id: usize, alignment_start: usize, alignment_span: usize) -> Self {
        Self::Some(Context {
            reference_sequence_id,
            alignment_start,
            alignment_span,
        })
    }

    /// Returns whether this context overlaps the given 1-based, inclusive range.
    ///
    /// A multi-reference context overlaps every range. An unplaced context overlaps none.
    pub fn overlaps(&self, reference_sequence_id: usize, start: usize, end: usize) -> bool {
        match self {
            Self::Some(context) => {
                context.reference_sequence_id == reference_sequence_id
                    && context.alignment_start <= end
                    && context.alignment_end() >= start
            }
            Self::None => false,
            Self::Many => true,
        }
    }

    pub(crate) fn to_triplet(self) -> io::Result<(i32, i32, i32)> {
        match self {
            Self::Some(context) => {
                let id = i32::try_from(context.reference_sequence_id)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

                let start = i32::try_from(context.alignment_start)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

                let span = i32::try_from(context.alignment_span)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

                Ok((id, start, span))
            }
            Self::None => Ok((UNMAPPED, 0, 0)),
            Self::Many => Ok((MULTIREF, 0, 0)),
        }
    }
}

impl TryFrom<(i32, i32, i32)> for ReferenceSequenceContext {
    type Error = io::Error;

    fn try_from(
        (reference_sequence_id, alignment_start, alignment_span): (i32, i32, i32),
    ) -> Result<Self, Self::Error> {
        match reference_sequence_id {
            UNMAPPED => Ok(Self::None),
            MULTIREF => Ok(Self::Many),
            _ => {
                let reference_sequence_id = usize::try_from(reference_sequence_id)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

                let alignment_start = usize::try_from(alignment_start)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

                let alignment_span = usize::try_from(alignment_span)
                    .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

                Ok(Self::some(
                    reference_sequence_id,
                    alignment_start,
                    alignment_span,
                ))
            }
        }
    }
}

/// A single reference sequence context.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Context {
    reference_sequence_id: usize,
    alignment_start: usize,
    alignment_span: usize,
}

impl Context {
    /// Returns the reference sequence ID.
    pub fn reference_sequence_id(&self) -> usize {
        self.reference_sequence_id
    }

    /// Returns the 1-based alignment start.
    pub fn alignment_start(&self) -> usize {
        self.alignment_start
    }

    /// Returns the alignment span.
    pub fn alignment_span(&self) -> usize {
        self.alignment_span
    }

    /// Returns the 1-based, inclusive alignment end.
    pub fn alignment_end(&self) -> usize {
        (self.alignment_start + self.alignment_span).saturating_sub(1)
    }
}
