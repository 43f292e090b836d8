use std::io::{self, Write};

use crate::{
    container::{Header, ReferenceSequenceContext},
    file_definition::{Dialect, Version},
    io::writer::num::{write_i32_le, write_itf8, write_ltf8},
};

pub fn write_header<W>(writer: &mut W, header: &Header, version: Version) -> io::Result<()>
where
    W: Write,
{
    let length = i32::try_from(header.length())
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    match version.dialect() {
        Dialect::Legacy => {
            write_itf8(writer, length)?;
        }
        Dialect::Modern => write_i32_le(writer, length)?,
    }

    write_reference_sequence_context(writer, header.reference_sequence_context())?;
    write_count(writer, header.record_count())?;

    if version.dialect() == Dialect::Modern {
        let record_counter = i32::try_from(header.record_counter())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        write_itf8(writer, record_counter)?;

        let base_count = i64::try_from(header.base_count())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        write_ltf8(writer, base_count)?;
    }

    write_count(writer, header.block_count())?;
    write_landmarks(writer, header.landmarks())?;

    Ok(())
}

pub(super) fn write_reference_sequence_context<W>(
    writer: &mut W,
    reference_sequence_context: ReferenceSequenceContext,
) -> io::Result<()>
where
    W: Write,
{
    let (reference_sequence_id, alignment_start, alignment_span) =
        reference_sequence_context.to_triplet()?;

    write_itf8(writer, reference_sequence_id)?;
    write_itf8(writer, alignment_start)?;
    write_itf8(writer, alignment_span)?;

    Ok(())
}

pub(super) fn write_count<W>(writer: &mut W, n: usize) -> io::Result<()>
where
    W: Write,
{
    let n = i32::try_from(n).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    write_itf8(writer, n)?;
    Ok(())
}

fn write_landmarks<W>(writer: &mut W, landmarks: &[usize]) -> io::Result<()>
where
    W: Write,
{
    write_count(writer, landmarks.len())?;

    for &pos in landmarks {
        write_count(writer, pos)?;
    }

    Ok(())
}
