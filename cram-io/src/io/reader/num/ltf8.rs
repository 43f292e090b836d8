use std::io::{self, Read};

use super::read_u8;

/// Reads an LTF8-encoded integer.
///
/// LTF8 stores a 64-bit integer in 1 to 9 bytes. As with ITF8, the count of leading set bits in the
/// first byte gives the number of bytes that follow it. A first byte of `0xff` is followed by the
/// full 8-byte value.
pub fn read_ltf8<R>(reader: &mut R) -> io::Result<i64>
where
    R: Read,
{
    let b0 = read_u8(reader)?;

    let len = b0.leading_ones() as usize + 1;
    let mask = 0xffu8.checked_shr(len as u32).unwrap_or(0);
    let mut n = u64::from(b0 & mask);

    for _ in 1..len {
        let b = read_u8(reader).map(u64::from)?;
        n = n << 8 | b;
    }

    Ok(n as i64)
}

pub fn read_ltf8_as<R, N>(reader: &mut R) -> io::Result<N>
where
    R: Read,
    N: TryFrom<i64, Error = std::num::TryFromIntError>,
{
    read_ltf8(reader).and_then(|n| {
        N::try_from(n).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    })
}

/// Decodes an LTF8-encoded integer from the start of a buffer.
///
/// This returns the value and the number of bytes consumed.
pub fn get_ltf8(src: &[u8]) -> io::Result<(i64, usize)> {
    let mut reader = src;
    let n = read_ltf8(&mut reader)?;
    Ok((n, src.len() - reader.len()))
}
