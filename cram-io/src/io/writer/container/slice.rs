mod header;

use std::io;

use self::header::write_header;
use crate::{
    container::{Block, Slice},
    file_definition::Version,
};

/// Builds the block that carries a slice header.
pub(crate) fn build_slice_header_block(slice: &Slice, version: Version) -> io::Result<Block> {
    let header = slice.header();

    let mut buf = Vec::new();
    write_header(&mut buf, header, version)?;

    Ok(Block::new(header.content_type(), 0, buf))
}
