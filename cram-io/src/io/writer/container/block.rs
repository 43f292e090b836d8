use std::{
    io::{self, Write},
    mem,
};

use crate::{
    container::Block,
    io::writer::num::{itf8_size_of, write_itf8, write_u8},
};

pub fn write_block<W>(writer: &mut W, block: &Block) -> io::Result<()>
where
    W: Write,
{
    if block.is_raw() && block.data().len() != block.uncompressed_size() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "raw block (content ID {}) size mismatch: {} != {}",
                block.content_id(),
                block.data().len(),
                block.uncompressed_size()
            ),
        ));
    }

    write_u8(writer, u8::from(block.compression_method()))?;
    write_u8(writer, u8::from(block.content_type()))?;
    write_itf8(writer, block.content_id())?;
    write_size(writer, block.compressed_size())?;
    write_size(writer, block.uncompressed_size())?;

    writer.write_all(block.data())?;

    Ok(())
}

/// Returns the number of bytes a block takes when written.
pub(crate) fn block_size(block: &Block) -> io::Result<usize> {
    let compressed_size = to_i32(block.compressed_size())?;
    let uncompressed_size = to_i32(block.uncompressed_size())?;

    Ok(mem::size_of::<u8>() // method
        + mem::size_of::<u8>() // block content type ID
        + itf8_size_of(block.content_id())
        + itf8_size_of(compressed_size)
        + itf8_size_of(uncompressed_size)
        + block.data().len())
}

fn write_size<W>(writer: &mut W, size: usize) -> io::Result<()>
where
    W: Write,
{
    let n = to_i32(size)?;
    write_itf8(writer, n)?;
    Ok(())
}

fn to_i32(n: usize) -> io::Result<i32> {
    i32::try_from(n).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}
