use std::io::{self, Read};

use crate::{
    container::{
        Block,
        block::{CompressionMethod, ContentType},
    },
    io::reader::num::{read_itf8, read_itf8_as, read_u8},
};

pub fn read_block<R>(reader: &mut R) -> io::Result<Block>
where
    R: Read,
{
    let compression_method = read_compression_method(reader)?;
    let content_type = read_content_type(reader)?;
    let content_id = read_itf8(reader)?;
    let compressed_size: usize = read_itf8_as(reader)?;
    let uncompressed_size: usize = read_itf8_as(reader)?;

    let len = if compression_method == CompressionMethod::None {
        uncompressed_size
    } else {
        compressed_size
    };

    let mut data = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut data)?;

    if data.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "truncated block (content ID {content_id}): expected {len} bytes, got {}",
                data.len()
            ),
        ));
    }

    Ok(Block {
        compression_method,
        content_type,
        content_id,
        uncompressed_size,
        data,
    })
}

pub fn read_block_as<R>(reader: &mut R, content_type: ContentType) -> io::Result<Block>
where
    R: Read,
{
    let block = read_block(reader)?;

    if block.content_type() == content_type {
        Ok(block)
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "invalid block content type: expected {content_type}, got {}",
                block.content_type()
            ),
        ))
    }
}

fn read_compression_method<R>(reader: &mut R) -> io::Result<CompressionMethod>
where
    R: Read,
{
    read_u8(reader).and_then(|n| {
        CompressionMethod::try_from(n).map_err(|n| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid block compression method: {n}"),
            )
        })
    })
}

fn read_content_type<R>(reader: &mut R) -> io::Result<ContentType>
where
    R: Read,
{
    read_u8(reader).and_then(|n| {
        ContentType::try_from(n).map_err(|n| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid block content type: {n}"),
            )
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_block() -> io::Result<()> {
        let data = [
            0x00, // compression method = none
            0x04, // content type = external data
            0x01, // content ID = 1
            0x03, // compressed size = 3
            0x03, // uncompressed size = 3
            b'A', b'B', b'C', // data
        ];

        let block = read_block(&mut &data[..])?;

        assert_eq!(block.compression_method(), CompressionMethod::None);
        assert_eq!(block.content_type(), ContentType::ExternalData);
        assert_eq!(block.content_id(), 1);
        assert_eq!(block.uncompressed_size(), 3);
        assert_eq!(block.data(), b"ABC");

        Ok(())
    }

    #[test]
    fn test_read_block_with_compressed_data() -> io::Result<()> {
        let data = [
            0x01, // compression method = gzip
            0x05, // content type = core data
            0x00, // content ID = 0
            0x02, // compressed size = 2
            0x08, // uncompressed size = 8
            0x1f, 0x8b, // data
        ];

        let block = read_block(&mut &data[..])?;

        assert_eq!(block.compression_method(), CompressionMethod::Gzip);
        assert_eq!(block.uncompressed_size(), 8);
        assert_eq!(block.data(), [0x1f, 0x8b]);

        Ok(())
    }

    #[test]
    fn test_read_block_with_truncated_data() {
        let data = [0x00, 0x04, 0x01, 0x03, 0x03, b'A'];

        assert!(matches!(
            read_block(&mut &data[..]),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof
        ));
    }

    #[test]
    fn test_read_block_with_invalid_fields() {
        let data = [0x07, 0x04, 0x01, 0x00, 0x00];
        assert!(matches!(
            read_block(&mut &data[..]),
            Err(e) if e.kind() == io::ErrorKind::InvalidData
        ));

        let data = [0x00, 0x09, 0x01, 0x00, 0x00];
        assert!(matches!(
            read_block(&mut &data[..]),
            Err(e) if e.kind() == io::ErrorKind::InvalidData
        ));
    }

    #[test]
    fn test_read_block_as() -> io::Result<()> {
        let data = [0x00, 0x01, 0x00, 0x00, 0x00];
        let block = read_block_as(&mut &data[..], ContentType::CompressionHeader)?;
        assert!(block.data().is_empty());

        assert!(matches!(
            read_block_as(&mut &data[..], ContentType::MappedSlice),
            Err(e) if e.kind() == io::ErrorKind::InvalidData
        ));

        Ok(())
    }
}
