use std::{
    io::{self, Read},
    str,
};

use noodles_sam as sam;

use super::{
    container::{read_block, read_header as read_container_header},
    num::{read_i32_le, read_u8},
};
use crate::{
    FileDefinition, MAGIC_NUMBER,
    container::{self, block::ContentType},
    file_definition::{Dialect, FILE_ID_LEN, Version},
};

/// Reads a file definition.
///
/// The magic number and format version are validated.
pub fn read_file_definition<R>(reader: &mut R) -> io::Result<FileDefinition>
where
    R: Read,
{
    read_magic_number(reader)?;

    let version = read_format_version(reader)?;
    version.validate()?;

    let mut file_id = [0; FILE_ID_LEN];
    reader.read_exact(&mut file_id)?;

    Ok(FileDefinition::new(version, file_id))
}

fn read_magic_number<R>(reader: &mut R) -> io::Result<()>
where
    R: Read,
{
    let mut buf = [0; 4];
    reader.read_exact(&mut buf)?;

    if buf == MAGIC_NUMBER {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "invalid CRAM header",
        ))
    }
}

fn read_format_version<R>(reader: &mut R) -> io::Result<Version>
where
    R: Read,
{
    let major = read_u8(reader)?;
    let minor = read_u8(reader)?;
    Ok(Version::new(major, minor))
}

/// Reads the SAM header text that follows the file definition.
pub fn read_file_header<R>(reader: &mut R, version: Version) -> io::Result<sam::Header>
where
    R: Read,
{
    let text = match version.dialect() {
        Dialect::Legacy => read_raw_header_text(reader)?,
        Dialect::Modern => read_header_container(reader, version)?,
    };

    parse_header(&text)
}

fn parse_header(src: &[u8]) -> io::Result<sam::Header> {
    str::from_utf8(src)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
        .parse()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Reads exactly `len` bytes without trusting `len` for the allocation size.
fn read_buf<R>(reader: &mut R, len: usize, name: &str) -> io::Result<Vec<u8>>
where
    R: Read,
{
    let mut buf = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;

    if buf.len() == len {
        Ok(buf)
    } else {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("truncated {name}: expected {len} bytes, got {}", buf.len()),
        ))
    }
}

fn read_raw_header_text<R>(reader: &mut R) -> io::Result<Vec<u8>>
where
    R: Read,
{
    let len = read_i32_le(reader).and_then(|n| {
        usize::try_from(n).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    })?;

    read_buf(reader, len, "SAM header")
}

fn read_header_container<R>(reader: &mut R, version: Version) -> io::Result<Vec<u8>>
where
    R: Read,
{
    let mut header = container::Header::default();

    let len = read_container_header(reader, &mut header, version)?.ok_or_else(|| {
        io::Error::new(io::ErrorKind::UnexpectedEof, "missing header container")
    })?;

    let mut block = if len == 0 {
        // Some writers record a zero length and follow the header with its blocks.
        if header.block_count() == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "header container has no blocks",
            ));
        }

        let block = read_block(reader)?;

        for _ in 1..header.block_count() {
            read_block(reader)?;
        }

        block
    } else {
        let buf = read_buf(reader, len, "header container")?;
        read_block(&mut &buf[..])?
    };

    if block.content_type() != ContentType::FileHeader {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "invalid header block content type: expected {}, got {}",
                ContentType::FileHeader,
                block.content_type()
            ),
        ));
    }

    block.decompress()?;

    let data = block.data();

    let (len_buf, text) = data.split_first_chunk::<4>().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidData, "invalid header block length")
    })?;

    let text_len = usize::try_from(i32::from_le_bytes(*len_buf))
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    text.get(..text_len).map(|buf| buf.to_vec()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "invalid SAM header length: expected at most {}, got {text_len}",
                text.len()
            ),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &[u8] = b"@SQ\tSN:sq0\tLN:8\n";

    fn assert_header(header: &sam::Header) {
        let reference_sequences = header.reference_sequences();
        assert_eq!(reference_sequences.len(), 1);
        assert_eq!(
            reference_sequences
                .get(&b"sq0"[..])
                .map(|reference_sequence| usize::from(reference_sequence.length())),
            Some(8)
        );
    }

    #[test]
    fn test_read_file_definition() -> io::Result<()> {
        let mut src = vec![
            b'C', b'R', b'A', b'M', // magic number
            0x02, 0x00, // format version = 2.0
        ];
        src.extend(b"out.cram");
        src.resize(src.len() + 12, 0); // file ID padding

        let file_definition = read_file_definition(&mut &src[..])?;

        assert_eq!(file_definition.version(), Version::V2_0);
        assert_eq!(&file_definition.file_id()[..8], b"out.cram");

        Ok(())
    }

    #[test]
    fn test_read_file_definition_with_invalid_magic_number() {
        let src = [b'B', b'A', b'M', 0x01, 0x02, 0x00];

        assert!(matches!(
            read_file_definition(&mut &src[..]),
            Err(e) if e.kind() == io::ErrorKind::InvalidData
        ));
    }

    #[test]
    fn test_read_file_definition_with_unsupported_version() {
        let mut src = vec![b'C', b'R', b'A', b'M', 0x03, 0x00];
        src.resize(src.len() + FILE_ID_LEN, 0);

        assert!(matches!(
            read_file_definition(&mut &src[..]),
            Err(e) if e.kind() == io::ErrorKind::InvalidData
        ));
    }

    #[test]
    fn test_read_file_header_with_legacy_dialect() -> io::Result<()> {
        let mut src = vec![0x10, 0x00, 0x00, 0x00]; // header length = 16
        src.extend(TEXT);

        let header = read_file_header(&mut &src[..], Version::V1_0)?;
        assert_header(&header);

        Ok(())
    }

    fn header_block() -> Vec<u8> {
        let mut data = vec![0x10, 0x00, 0x00, 0x00]; // header length = 16
        data.extend(TEXT);
        data.resize(data.len() + 4, 0); // padding

        let mut block = vec![
            0x00, // compression method = none
            0x00, // content type = file header
            0x00, // content ID = 0
            0x18, // compressed size = 24
            0x18, // uncompressed size = 24
        ];
        block.extend(data);

        block
    }

    #[test]
    fn test_read_file_header_with_modern_dialect() -> io::Result<()> {
        let block = header_block();

        let mut src = vec![
            0x1d, 0x00, 0x00, 0x00, // length = 29
            0x00, 0x00, 0x00, // reference sequence context = (0, 0, 0)
            0x00, // number of records = 0
            0x00, // record counter = 0
            0x00, // bases = 0
            0x01, // number of blocks = 1
            0x01, // landmark count = 1
            0x00, // landmarks[0] = 0
        ];
        src.extend(&block);

        let header = read_file_header(&mut &src[..], Version::V2_0)?;
        assert_header(&header);

        Ok(())
    }

    #[test]
    fn test_read_file_header_with_zero_length_container() -> io::Result<()> {
        let mut src = vec![
            0x00, 0x00, 0x00, 0x00, // length = 0
            0x00, 0x00, 0x00, // reference sequence context = (0, 0, 0)
            0x00, 0x00, 0x00, // number of records, record counter, bases
            0x01, // number of blocks = 1
            0x01, 0x00, // landmarks = [0]
        ];
        src.extend(header_block());

        let header = read_file_header(&mut &src[..], Version::V2_0)?;
        assert_header(&header);

        Ok(())
    }

    #[test]
    fn test_read_file_header_with_invalid_length() {
        let mut block = header_block();
        block[5] = 0x40; // header length = 64

        let mut src = vec![
            0x1d, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, 0x00,
        ];
        src.extend(block);

        assert!(matches!(
            read_file_header(&mut &src[..], Version::V2_0),
            Err(e) if e.kind() == io::ErrorKind::InvalidData
        ));
    }

    #[test]
    fn test_read_file_header_with_oversized_length() {
        let src = [
            0xff, 0xff, 0xff, 0x7f, // header length = 2147483647
            b'@', b'S', b'Q',
        ];

        assert!(matches!(
            read_file_header(&mut &src[..], Version::V1_0),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof
        ));

        let src = [
            0xff, 0xff, 0xff, 0x7f, // length = 2147483647
            0x00, 0x00, 0x00, // reference sequence context = (0, 0, 0)
            0x00, 0x00, 0x00, // number of records, record counter, bases
            0x01, // number of blocks = 1
            0x01, 0x00, // landmarks = [0]
            0x00, 0x00, 0x00, // (truncated)
        ];

        assert!(matches!(
            read_file_header(&mut &src[..], Version::V2_0),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof
        ));
    }

    #[test]
    fn test_read_file_header_with_invalid_text() {
        let src = [
            0x04, 0x00, 0x00, 0x00, // header length = 4
            b'@', b'S', b'Q', b'\n',
        ];

        assert!(matches!(
            read_file_header(&mut &src[..], Version::V1_0),
            Err(e) if e.kind() == io::ErrorKind::InvalidData
        ));
    }
}
