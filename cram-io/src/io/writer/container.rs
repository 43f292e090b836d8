mod block;
mod header;
mod slice;

use std::{
    cmp,
    io::{self, Write},
};

pub use self::{block::write_block, header::write_header};
pub(crate) use self::{block::block_size, slice::build_slice_header_block};
use crate::{
    container::{Block, Container, Header, ReferenceSequenceContext, Slice},
    file_definition::Version,
};

/// Writes a container.
///
/// The container header is rebuilt from the compression header and slices: the record and base
/// counts, block count, landmarks, and body length are recalculated. The record counter is taken
/// from the first slice.
///
/// Blocks are written as they are. Compress them first, if desired.
pub fn write_container<W>(
    writer: &mut W,
    container: &mut Container,
    version: Version,
    allow_many: bool,
) -> io::Result<()>
where
    W: Write,
{
    let slice_header_blocks = container
        .slices()
        .iter()
        .map(|slice| build_slice_header_block(slice, version))
        .collect::<io::Result<Vec<_>>>()?;

    container.header = build_header(container, &slice_header_blocks, allow_many)?;

    write_header(writer, &container.header, version)?;
    write_block(writer, container.compression_header())?;

    for (slice, slice_header_block) in container.slices().iter().zip(&slice_header_blocks) {
        write_block(writer, slice_header_block)?;

        for block in slice.blocks() {
            write_block(writer, block)?;
        }
    }

    Ok(())
}

fn build_header(
    container: &Container,
    slice_header_blocks: &[Block],
    allow_many: bool,
) -> io::Result<Header> {
    let slices = container.slices();

    let mut len = block_size(container.compression_header())?;
    let mut landmarks = Vec::with_capacity(slices.len());
    let mut block_count = 1;

    for (slice, slice_header_block) in slices.iter().zip(slice_header_blocks) {
        landmarks.push(len);

        len += block_size(slice_header_block)?;

        for block in slice.blocks() {
            len += block_size(block)?;
        }

        block_count += 1 + slice.blocks().len();
    }

    Ok(Header {
        length: len,
        reference_sequence_context: merge_reference_sequence_contexts(slices, allow_many)?,
        record_count: container.record_count(),
        record_counter: slices
            .first()
            .map(|slice| slice.header().record_counter())
            .unwrap_or_default(),
        base_count: slices.iter().map(|slice| slice.base_count()).sum(),
        block_count,
        landmarks,
    })
}

/// Returns the reference sequence context that covers all slices.
///
/// Slices on different reference sequences, or a mix of placed and unplaced slices, can only be
/// combined when `allow_many` is set.
pub(crate) fn merge_reference_sequence_contexts(
    slices: &[Slice],
    allow_many: bool,
) -> io::Result<ReferenceSequenceContext> {
    let mut contexts = slices
        .iter()
        .map(|slice| slice.header().reference_sequence_context());

    let Some(first) = contexts.next() else {
        return Ok(ReferenceSequenceContext::None);
    };

    let mut container_context = first;

    for slice_context in contexts {
        container_context = match (container_context, slice_context) {
            (ReferenceSequenceContext::Some(a), ReferenceSequenceContext::Some(b))
                if a.reference_sequence_id() == b.reference_sequence_id() =>
            {
                let alignment_start = cmp::min(a.alignment_start(), b.alignment_start());

                // exclusive, so that empty spans do not underflow
                let alignment_end = cmp::max(
                    a.alignment_start() + a.alignment_span(),
                    b.alignment_start() + b.alignment_span(),
                );

                ReferenceSequenceContext::some(
                    a.reference_sequence_id(),
                    alignment_start,
                    alignment_end.saturating_sub(alignment_start),
                )
            }
            (ReferenceSequenceContext::None, ReferenceSequenceContext::None) => {
                ReferenceSequenceContext::None
            }
            _ => ReferenceSequenceContext::Many,
        };
    }

    if container_context == ReferenceSequenceContext::Many && !allow_many {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "container spans multiple reference sequences",
        ));
    }

    Ok(container_context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{container::block::ContentType, io::reader::container::read_container};

    fn build_slice(reference_sequence_context: ReferenceSequenceContext, data: &[u8]) -> Slice {
        Slice::builder()
            .set_reference_sequence_context(reference_sequence_context)
            .set_record_count(1)
            .set_base_count(data.len() as u64)
            .add_block(Block::new(ContentType::ExternalData, 1, data.to_vec()))
            .build()
    }

    #[test]
    fn test_write_container() -> io::Result<()> {
        let mut container = Container::default();
        container.slices_mut().extend([
            build_slice(ReferenceSequenceContext::some(0, 1, 8), b"ABC"),
            build_slice(ReferenceSequenceContext::some(0, 5, 10), b"DEFG"),
            build_slice(ReferenceSequenceContext::some(0, 20, 2), b"H"),
        ]);

        let mut buf = Vec::new();
        write_container(&mut buf, &mut container, Version::V2_0, false)?;

        let header = container.header();
        assert_eq!(
            header.reference_sequence_context(),
            ReferenceSequenceContext::some(0, 1, 21)
        );
        assert_eq!(header.record_count(), 3);
        assert_eq!(header.base_count(), 8);
        assert_eq!(header.block_count(), 7);
        assert_eq!(header.landmarks().len(), 3);

        let mut actual = Container::default();
        let len = read_container(&mut &buf[..], &mut actual, Version::V2_0)?;

        assert_eq!(len, header.length());
        assert_eq!(actual.header().landmarks(), header.landmarks());
        assert!(actual.header().landmarks().is_sorted());
        assert_eq!(actual.slices().len(), 3);

        let data: Vec<_> = actual
            .slices()
            .iter()
            .filter_map(|slice| slice.get_block(1))
            .map(|block| block.data().to_vec())
            .collect();

        assert_eq!(data, [b"ABC".to_vec(), b"DEFG".to_vec(), b"H".to_vec()]);

        Ok(())
    }

    #[test]
    fn test_merge_reference_sequence_contexts() -> io::Result<()> {
        let slices = [
            build_slice(ReferenceSequenceContext::None, b""),
            build_slice(ReferenceSequenceContext::None, b""),
        ];
        assert_eq!(
            merge_reference_sequence_contexts(&slices, false)?,
            ReferenceSequenceContext::None
        );

        let slices = [
            build_slice(ReferenceSequenceContext::some(0, 1, 8), b""),
            build_slice(ReferenceSequenceContext::some(1, 1, 8), b""),
        ];
        assert_eq!(
            merge_reference_sequence_contexts(&slices, true)?,
            ReferenceSequenceContext::Many
        );
        assert!(matches!(
            merge_reference_sequence_contexts(&slices, false),
            Err(e) if e.kind() == io::ErrorKind::InvalidInput
        ));

        let slices = [
            build_slice(ReferenceSequenceContext::some(0, 1, 8), b""),
            build_slice(ReferenceSequenceContext::None, b""),
        ];
        assert_eq!(
            merge_reference_sequence_contexts(&slices, true)?,
            ReferenceSequenceContext::Many
        );

        assert_eq!(
            merge_reference_sequence_contexts(&[], false)?,
            ReferenceSequenceContext::None
        );

        Ok(())
    }

    #[test]
    fn test_merge_reference_sequence_contexts_with_same_reference_sequence() -> io::Result<()> {
        let slices = [
            build_slice(ReferenceSequenceContext::some(0, 5, 0), b""),
            build_slice(ReferenceSequenceContext::some(0, 5, 0), b""),
        ];
        assert_eq!(
            merge_reference_sequence_contexts(&slices, false)?,
            ReferenceSequenceContext::some(0, 5, 0)
        );

        let slices = [
            build_slice(ReferenceSequenceContext::some(0, 5, 0), b""),
            build_slice(ReferenceSequenceContext::some(0, 8, 3), b""),
        ];
        assert_eq!(
            merge_reference_sequence_contexts(&slices, false)?,
            ReferenceSequenceContext::some(0, 5, 6)
        );

        let slices = [
            build_slice(ReferenceSequenceContext::some(0, 10, 4), b""),
            build_slice(ReferenceSequenceContext::some(0, 1, 8), b""),
        ];
        assert_eq!(
            merge_reference_sequence_contexts(&slices, false)?,
            ReferenceSequenceContext::some(0, 1, 13)
        );

        Ok(())
    }
}
