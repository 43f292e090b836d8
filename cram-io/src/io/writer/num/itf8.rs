use std::io::{self, Write};

const MAX_LEN: usize = 5;

/// Writes an ITF8-encoded integer.
///
/// This returns the number of bytes written.
pub fn write_itf8<W>(writer: &mut W, n: i32) -> io::Result<usize>
where
    W: Write,
{
    let mut buf = [0; MAX_LEN];
    let len = encode(&mut buf, n);
    writer.write_all(&buf[..len])?;
    Ok(len)
}

/// Appends an ITF8-encoded integer to a buffer.
///
/// This returns the number of bytes appended.
///
/// # Examples
///
/// ```
/// use cram_io::io::writer::num::put_itf8;
///
/// let mut buf = Vec::new();
/// assert_eq!(put_itf8(&mut buf, 1792), 2);
/// assert_eq!(buf, [0x87, 0x00]);
/// ```
pub fn put_itf8(dst: &mut Vec<u8>, n: i32) -> usize {
    let mut buf = [0; MAX_LEN];
    let len = encode(&mut buf, n);
    dst.extend_from_slice(&buf[..len]);
    len
}

/// Returns the number of bytes needed to ITF8-encode the given integer.
pub fn itf8_size_of(n: i32) -> usize {
    let n = n as u32;

    if n < 1 << 7 {
        1
    } else if n < 1 << 14 {
        2
    } else if n < 1 << 21 {
        3
    } else if n < 1 << 28 {
        4
    } else {
        5
    }
}

fn encode(buf: &mut [u8; MAX_LEN], n: i32) -> usize {
    let len = itf8_size_of(n);
    let n = n as u32;

    if len < MAX_LEN {
        let bytes = n.to_be_bytes();
        buf[..len].copy_from_slice(&bytes[bytes.len() - len..]);
        // 0x00, 0x80, 0xc0, 0xe0
        buf[0] |= !(0xff >> (len - 1));
    } else {
        buf[0] = 0xf0 | ((n >> 28) as u8 & 0x0f);
        buf[1] = (n >> 20) as u8;
        buf[2] = (n >> 12) as u8;
        buf[3] = (n >> 4) as u8;
        buf[4] = n as u8 & 0x0f;
    }

    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_itf8() -> io::Result<()> {
        fn t(buf: &mut Vec<u8>, value: i32, expected: &[u8]) -> io::Result<()> {
            buf.clear();
            let len = write_itf8(buf, value)?;
            assert_eq!(&buf[..], expected);
            assert_eq!(len, expected.len());
            assert_eq!(itf8_size_of(value), expected.len());
            Ok(())
        }

        let mut buf = Vec::new();

        t(&mut buf, 0, &[0x00])?;
        t(&mut buf, 127, &[0x7f])?;
        t(&mut buf, 128, &[0x80, 0x80])?;
        t(&mut buf, 1792, &[0x87, 0x00])?;
        t(&mut buf, 16383, &[0xbf, 0xff])?;
        t(&mut buf, 16384, &[0xc0, 0x40, 0x00])?;
        t(&mut buf, 2097151, &[0xdf, 0xff, 0xff])?;
        t(&mut buf, 2097152, &[0xe0, 0x20, 0x00, 0x00])?;
        t(&mut buf, 268435455, &[0xef, 0xff, 0xff, 0xff])?;
        t(&mut buf, 268435456, &[0xf1, 0x00, 0x00, 0x00, 0x00])?;
        t(&mut buf, i32::MAX, &[0xf7, 0xff, 0xff, 0xff, 0x0f])?;
        t(&mut buf, -1, &[0xff, 0xff, 0xff, 0xff, 0x0f])?;
        t(&mut buf, -2, &[0xff, 0xff, 0xff, 0xff, 0x0e])?;

        Ok(())
    }

    #[test]
    fn test_put_itf8_decodes_to_the_same_value() -> io::Result<()> {
        use crate::io::reader::num::get_itf8;

        for n in [0, 1, 0x7f, 0x80, 0x3fff, 0x4000, 0x1f_ffff, 0x20_0000, 0x0fff_ffff] {
            let mut buf = Vec::new();
            let len = put_itf8(&mut buf, n);
            assert_eq!(get_itf8(&buf)?, (n, len));
        }

        Ok(())
    }
}
