use std::io::{self, Read};

use crate::{
    container::{
        ReferenceSequenceContext,
        block::{ContentId, ContentType},
        slice::Header,
    },
    file_definition::{Dialect, Version},
    io::reader::num::{read_itf8, read_itf8_as},
};

const NO_EMBEDDED_REFERENCE: ContentId = -1;

pub(super) fn read_header(
    src: &mut &[u8],
    content_type: ContentType,
    version: Version,
) -> io::Result<Header> {
    let reference_sequence_id = read_itf8(src)?;
    let alignment_start = read_itf8(src)?;
    let alignment_span = read_itf8(src)?;

    let reference_sequence_context = ReferenceSequenceContext::try_from((
        reference_sequence_id,
        alignment_start,
        alignment_span,
    ))?;

    let record_count = read_itf8_as(src)?;

    let record_counter = match version.dialect() {
        Dialect::Legacy => 0,
        Dialect::Modern => read_itf8_as(src)?,
    };

    let block_count = read_itf8_as(src)?;
    let block_content_ids = read_block_content_ids(src)?;

    let embedded_reference_bases_block_content_id = if content_type == ContentType::MappedSlice {
        match read_itf8(src)? {
            NO_EMBEDDED_REFERENCE => None,
            id => Some(id),
        }
    } else {
        None
    };

    let reference_md5 = match version.dialect() {
        Dialect::Legacy => None,
        Dialect::Modern => read_reference_md5(src)?,
    };

    Ok(Header {
        content_type,
        reference_sequence_context,
        record_count,
        record_counter,
        block_count,
        block_content_ids,
        embedded_reference_bases_block_content_id,
        reference_md5,
    })
}

fn read_block_content_ids(src: &mut &[u8]) -> io::Result<Vec<ContentId>> {
    let len: usize = read_itf8_as(src)?;
    (0..len).map(|_| read_itf8(src)).collect()
}

fn read_reference_md5(src: &mut &[u8]) -> io::Result<Option<[u8; 16]>> {
    let mut buf = [0; 16];
    src.read_exact(&mut buf)?;

    if buf == [0; 16] {
        Ok(None)
    } else {
        Ok(Some(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_header() -> io::Result<()> {
        let mut src = vec![
            0x02, // reference sequence ID = 2
            0x03, // alignment start = 3
            0x05, // alignment span = 5
            0x08, // number of records = 8
            0x0d, // record counter = 13
            0x01, // number of blocks = 1
            0x01, // block content ID count = 1
            0x01, // block content IDs[0] = 1
            0xff, 0xff, 0xff, 0xff, 0x0f, // embedded reference bases block content ID = -1
        ];
        src.extend([
            0x57, 0xb2, 0x96, 0xa3, 0x16, 0x0a, 0x2c, 0xac, 0x9c, 0x83, 0x33, 0x12, 0x6f, 0xf2,
            0x7e, 0xf7,
        ]); // reference MD5

        let header = read_header(&mut &src[..], ContentType::MappedSlice, Version::V2_0)?;

        assert_eq!(header.content_type(), ContentType::MappedSlice);
        assert_eq!(
            header.reference_sequence_context(),
            ReferenceSequenceContext::some(2, 3, 5)
        );
        assert_eq!(header.record_count(), 8);
        assert_eq!(header.record_counter(), 13);
        assert_eq!(header.block_count(), 1);
        assert_eq!(header.block_content_ids(), [1]);
        assert!(header.embedded_reference_bases_block_content_id().is_none());
        assert_eq!(
            header.reference_md5(),
            Some(&[
                0x57, 0xb2, 0x96, 0xa3, 0x16, 0x0a, 0x2c, 0xac, 0x9c, 0x83, 0x33, 0x12, 0x6f,
                0xf2, 0x7e, 0xf7,
            ])
        );

        Ok(())
    }

    #[test]
    fn test_read_header_with_legacy_unmapped_slice() -> io::Result<()> {
        let src = [
            0xff, 0xff, 0xff, 0xff, 0x0f, // reference sequence ID = -1 (none)
            0x00, // alignment start = 0
            0x00, // alignment span = 0
            0x02, // number of records = 2
            0x02, // number of blocks = 2
            0x02, // block content ID count = 2
            0x00, // block content IDs[0] = 0
            0x0c, // block content IDs[1] = 12
        ];

        let header = read_header(&mut &src[..], ContentType::UnmappedSlice, Version::V1_0)?;

        assert_eq!(
            header.reference_sequence_context(),
            ReferenceSequenceContext::None
        );
        assert_eq!(header.record_count(), 2);
        assert_eq!(header.record_counter(), 0);
        assert_eq!(header.block_content_ids(), [0, 12]);
        assert!(header.embedded_reference_bases_block_content_id().is_none());
        assert!(header.reference_md5().is_none());

        Ok(())
    }

    #[test]
    fn test_read_header_with_zeroed_md5() -> io::Result<()> {
        let mut src = vec![
            0x00, 0x01, 0x0a, // reference sequence context = (0, 1, 10)
            0x01, // number of records = 1
            0x00, // record counter = 0
            0x00, // number of blocks = 0
            0x00, // block content ID count = 0
            0x8f, 0xff, // embedded reference bases block content ID = 4095
        ];
        src.extend([0; 16]); // reference MD5

        let header = read_header(&mut &src[..], ContentType::MappedSlice, Version::V1_1)?;

        assert_eq!(
            header.embedded_reference_bases_block_content_id(),
            Some(4095)
        );
        assert!(header.reference_md5().is_none());

        Ok(())
    }
}
