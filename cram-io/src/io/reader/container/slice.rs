mod header;

use std::io;

use self::header::read_header;
use super::block::read_block;
use crate::{
    container::{Slice, block::ContentType},
    file_definition::Version,
};

/// Reads a slice: a header block followed by the data blocks it declares.
pub fn read_slice(src: &mut &[u8], version: Version) -> io::Result<Slice> {
    let mut header_block = read_block(src)?;

    if !header_block.content_type().is_slice_header() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "invalid slice header block content type: expected {} or {}, got {}",
                ContentType::MappedSlice,
                ContentType::UnmappedSlice,
                header_block.content_type()
            ),
        ));
    }

    header_block.decompress()?;

    let header = read_header(
        &mut header_block.data(),
        header_block.content_type(),
        version,
    )?;

    let blocks = (0..header.block_count())
        .map(|_| read_block(src))
        .collect::<io::Result<_>>()?;

    Ok(Slice::new(header, blocks))
}
