use std::io::{self, Read};

use super::read_u8;

/// Reads an ITF8-encoded integer.
///
/// ITF8 stores a 32-bit integer in 1 to 5 bytes. The count of leading set bits in the first byte
/// gives the number of bytes that follow it. In the 5-byte form, only the low 4 bits of the last
/// byte are significant.
pub fn read_itf8<R>(reader: &mut R) -> io::Result<i32>
where
    R: Read,
{
    let b0 = read_u8(reader)?;
    read_itf8_with_first_byte(reader, b0)
}

pub(crate) fn read_itf8_with_first_byte<R>(reader: &mut R, b0: u8) -> io::Result<i32>
where
    R: Read,
{
    let b0 = u32::from(b0);

    let n = if b0 & 0x80 == 0 {
        b0
    } else if b0 & 0x40 == 0 {
        let b1 = read_u8(reader).map(u32::from)?;
        (b0 & 0x3f) << 8 | b1
    } else if b0 & 0x20 == 0 {
        let b1 = read_u8(reader).map(u32::from)?;
        let b2 = read_u8(reader).map(u32::from)?;
        (b0 & 0x1f) << 16 | b1 << 8 | b2
    } else if b0 & 0x10 == 0 {
        let b1 = read_u8(reader).map(u32::from)?;
        let b2 = read_u8(reader).map(u32::from)?;
        let b3 = read_u8(reader).map(u32::from)?;
        (b0 & 0x0f) << 24 | b1 << 16 | b2 << 8 | b3
    } else {
        let b1 = read_u8(reader).map(u32::from)?;
        let b2 = read_u8(reader).map(u32::from)?;
        let b3 = read_u8(reader).map(u32::from)?;
        let b4 = read_u8(reader).map(u32::from)?;
        (b0 & 0x0f) << 28 | b1 << 20 | b2 << 12 | b3 << 4 | (b4 & 0x0f)
    };

    Ok(n as i32)
}

pub fn read_itf8_as<R, N>(reader: &mut R) -> io::Result<N>
where
    R: Read,
    N: TryFrom<i32, Error = std::num::TryFromIntError>,
{
    read_itf8(reader).and_then(|n| {
        N::try_from(n).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    })
}

/// Decodes an ITF8-encoded integer from the start of a buffer.
///
/// This returns the value and the number of bytes consumed.
///
/// # Examples
///
/// ```
/// use cram_io::io::reader::num::get_itf8;
/// assert_eq!(get_itf8(&[0x87, 0x00, 0xff])?, (1792, 2));
/// # Ok::<_, std::io::Error>(())
/// ```
pub fn get_itf8(src: &[u8]) -> io::Result<(i32, usize)> {
    let mut reader = src;
    let n = read_itf8(&mut reader)?;
    Ok((n, src.len() - reader.len()))
}
