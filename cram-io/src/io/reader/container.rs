mod block;
mod header;
mod slice;

use std::io::{self, Read};

pub use self::{
    block::{read_block, read_block_as},
    slice::read_slice,
};
pub(crate) use self::header::read_header;
use crate::{
    container::{Container, block::ContentType},
    file_definition::Version,
};

/// Reads a container.
///
/// This returns the length of the container body, or 0 at end of stream.
pub fn read_container<R>(
    reader: &mut R,
    container: &mut Container,
    version: Version,
) -> io::Result<usize>
where
    R: Read,
{
    match read_header(reader, &mut container.header, version)? {
        Some(len) => {
            read_body(reader, container, len, version)?;
            Ok(len)
        }
        None => Ok(0),
    }
}

pub(crate) fn read_body<R>(
    reader: &mut R,
    container: &mut Container,
    len: usize,
    version: Version,
) -> io::Result<()>
where
    R: Read,
{
    let mut buf = Vec::new();
    reader.by_ref().take(len as u64).read_to_end(&mut buf)?;

    if buf.len() != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!(
                "truncated container: expected {len} bytes, got {}",
                buf.len()
            ),
        ));
    }

    let mut src = &buf[..];
    container.compression_header = read_block_as(&mut src, ContentType::CompressionHeader)?;
    let compression_header_end = buf.len() - src.len();

    let landmarks = container.header.landmarks();
    validate_landmarks(landmarks, compression_header_end, buf.len())?;

    container.slices.clear();

    for (i, &start) in landmarks.iter().enumerate() {
        let end = landmarks.get(i + 1).copied().unwrap_or(buf.len());
        let mut src = &buf[start..end];
        let slice = read_slice(&mut src, version)?;
        container.slices.push(slice);
    }

    let block_count = 1 + container
        .slices
        .iter()
        .map(|slice| 1 + slice.blocks().len())
        .sum::<usize>();

    if block_count != container.header.block_count() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "container block count mismatch: expected {}, got {block_count}",
                container.header.block_count()
            ),
        ));
    }

    container.statistics.clear();

    Ok(())
}

fn validate_landmarks(landmarks: &[usize], min: usize, len: usize) -> io::Result<()> {
    let mut prev = min;

    for &landmark in landmarks {
        if landmark < prev || landmark >= len {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("invalid landmark: {landmark} (expected {prev}..{len})"),
            ));
        }

        prev = landmark;
    }

    Ok(())
}
