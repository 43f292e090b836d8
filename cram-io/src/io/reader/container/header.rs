use std::io::{self, Read};

use crate::{
    container::{Header, ReferenceSequenceContext},
    file_definition::{Dialect, Version},
    io::reader::num::{
        read_first_byte, read_itf8, read_itf8_as, read_itf8_with_first_byte, read_ltf8_as,
    },
};

/// Reads a container header.
///
/// This returns the length of the container body, or `None` if the stream ends before the first
/// byte of the header.
pub(crate) fn read_header<R>(
    reader: &mut R,
    header: &mut Header,
    version: Version,
) -> io::Result<Option<usize>>
where
    R: Read,
{
    let Some(b0) = read_first_byte(reader)? else {
        return Ok(None);
    };

    let len = match version.dialect() {
        Dialect::Legacy => read_itf8_with_first_byte(reader, b0)?,
        Dialect::Modern => {
            let mut buf = [b0, 0, 0, 0];
            reader.read_exact(&mut buf[1..])?;
            i32::from_le_bytes(buf)
        }
    };

    let len =
        usize::try_from(len).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    header.length = len;
    header.reference_sequence_context = read_reference_sequence_context(reader)?;
    header.record_count = read_itf8_as(reader)?;

    match version.dialect() {
        Dialect::Legacy => {
            header.record_counter = 0;
            header.base_count = 0;
        }
        Dialect::Modern => {
            header.record_counter = read_itf8_as(reader)?;
            header.base_count = read_ltf8_as(reader)?;
        }
    }

    header.block_count = read_itf8_as(reader)?;
    read_landmarks(reader, &mut header.landmarks)?;

    Ok(Some(len))
}

fn read_reference_sequence_context<R>(reader: &mut R) -> io::Result<ReferenceSequenceContext>
where
    R: Read,
{
    let reference_sequence_id = read_itf8(reader)?;
    let alignment_start = read_itf8(reader)?;
    let alignment_span = read_itf8(reader)?;

    ReferenceSequenceContext::try_from((reference_sequence_id, alignment_start, alignment_span))
}

fn read_landmarks<R>(reader: &mut R, landmarks: &mut Vec<usize>) -> io::Result<()>
where
    R: Read,
{
    let len: usize = read_itf8_as(reader)?;

    landmarks.clear();

    for _ in 0..len {
        let pos = read_itf8_as(reader)?;
        landmarks.push(pos);
    }

    Ok(())
}
