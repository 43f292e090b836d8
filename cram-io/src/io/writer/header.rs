use std::io::{self, Write};

use noodles_sam as sam;

use super::{
    container::{block_size, write_block, write_header as write_container_header},
    num::{write_i32_le, write_u8},
};
use crate::{
    FileDefinition, MAGIC_NUMBER,
    container::{self, Block, ReferenceSequenceContext, block::ContentType},
    file_definition::{Dialect, Version},
};

/// Writes a file definition.
pub fn write_file_definition<W>(writer: &mut W, file_definition: &FileDefinition) -> io::Result<()>
where
    W: Write,
{
    writer.write_all(&MAGIC_NUMBER)?;

    let version = file_definition.version();
    write_u8(writer, version.major())?;
    write_u8(writer, version.minor())?;

    writer.write_all(file_definition.file_id())?;

    Ok(())
}

/// Writes a SAM header.
///
/// In the modern dialect, the header text is stored in a raw block inside a container with no
/// records.
pub fn write_file_header<W>(writer: &mut W, header: &sam::Header, version: Version) -> io::Result<()>
where
    W: Write,
{
    let text = serialize_header(header)?;
    write_file_header_text(writer, &text, version)
}

fn serialize_header(header: &sam::Header) -> io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    sam::io::Writer::new(&mut buf).write_header(header)?;
    Ok(buf)
}

fn write_file_header_text<W>(writer: &mut W, text: &[u8], version: Version) -> io::Result<()>
where
    W: Write,
{
    let len =
        i32::try_from(text.len()).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    match version.dialect() {
        Dialect::Legacy => {
            write_i32_le(writer, len)?;
            writer.write_all(text)?;
        }
        Dialect::Modern => {
            let mut data = Vec::with_capacity(4 + text.len());
            write_i32_le(&mut data, len)?;
            data.extend_from_slice(text);

            let block = Block::new(ContentType::FileHeader, 0, data);

            let header = container::Header {
                length: block_size(&block)?,
                reference_sequence_context: ReferenceSequenceContext::some(0, 0, 0),
                block_count: 1,
                landmarks: vec![0],
                ..Default::default()
            };

            write_container_header(writer, &header, version)?;
            write_block(writer, &block)?;
        }
    }

    Ok(())
}
