use std::io::{self, Write};

use super::super::header::{write_count, write_reference_sequence_context};
use crate::{
    container::{block::ContentType, slice::Header},
    file_definition::{Dialect, Version},
    io::writer::num::write_itf8,
};

const NO_EMBEDDED_REFERENCE: i32 = -1;

pub(super) fn write_header<W>(writer: &mut W, header: &Header, version: Version) -> io::Result<()>
where
    W: Write,
{
    write_reference_sequence_context(writer, header.reference_sequence_context())?;
    write_count(writer, header.record_count())?;

    if version.dialect() == Dialect::Modern {
        let record_counter = i32::try_from(header.record_counter())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        write_itf8(writer, record_counter)?;
    }

    write_count(writer, header.block_count())?;

    write_count(writer, header.block_content_ids().len())?;

    for &id in header.block_content_ids() {
        write_itf8(writer, id)?;
    }

    if header.content_type() == ContentType::MappedSlice {
        let id = header
            .embedded_reference_bases_block_content_id()
            .unwrap_or(NO_EMBEDDED_REFERENCE);

        write_itf8(writer, id)?;
    }

    if version.dialect() == Dialect::Modern {
        writer.write_all(header.reference_md5().unwrap_or(&[0; 16]))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ReferenceSequenceContext;

    #[test]
    fn test_write_header() -> io::Result<()> {
        let header = Header {
            content_type: ContentType::MappedSlice,
            reference_sequence_context: ReferenceSequenceContext::some(2, 3, 5),
            record_count: 8,
            record_counter: 13,
            block_count: 1,
            block_content_ids: vec![1],
            embedded_reference_bases_block_content_id: None,
            reference_md5: None,
        };

        let mut buf = Vec::new();
        write_header(&mut buf, &header, Version::V2_0)?;

        let mut expected = vec![
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
        expected.extend([0; 16]); // reference MD5

        assert_eq!(buf, expected);

        Ok(())
    }

    #[test]
    fn test_write_header_with_legacy_unmapped_slice() -> io::Result<()> {
        let header = Header {
            content_type: ContentType::UnmappedSlice,
            reference_sequence_context: ReferenceSequenceContext::None,
            record_count: 2,
            record_counter: 5,
            block_count: 2,
            block_content_ids: vec![0, 12],
            embedded_reference_bases_block_content_id: None,
            reference_md5: Some([0xff; 16]),
        };

        let mut buf = Vec::new();
        write_header(&mut buf, &header, Version::V1_0)?;

        let expected = [
            0xff, 0xff, 0xff, 0xff, 0x0f, // reference sequence ID = -1
            0x00, // alignment start = 0
            0x00, // alignment span = 0
            0x02, // number of records = 2
            0x02, // number of blocks = 2
            0x02, // block content ID count = 2
            0x00, // block content IDs[0] = 0
            0x0c, // block content IDs[1] = 12
        ];

        assert_eq!(buf, expected);

        Ok(())
    }
}
