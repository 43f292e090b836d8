use std::io::{self, Write};

const MAX_LEN: usize = 9;

/// Writes an LTF8-encoded integer.
///
/// This returns the number of bytes written.
pub fn write_ltf8<W>(writer: &mut W, n: i64) -> io::Result<usize>
where
    W: Write,
{
    let mut buf = [0; MAX_LEN];
    let len = encode(&mut buf, n);
    writer.write_all(&buf[..len])?;
    Ok(len)
}

/// Appends an LTF8-encoded integer to a buffer.
///
/// This returns the number of bytes appended.
pub fn put_ltf8(dst: &mut Vec<u8>, n: i64) -> usize {
    let mut buf = [0; MAX_LEN];
    let len = encode(&mut buf, n);
    dst.extend_from_slice(&buf[..len]);
    len
}

/// Returns the number of bytes needed to LTF8-encode the given integer.
pub fn ltf8_size_of(n: i64) -> usize {
    let n = n as u64;

    (1..MAX_LEN)
        .find(|&len| n < 1 << (7 * len))
        .unwrap_or(MAX_LEN)
}

fn encode(buf: &mut [u8; MAX_LEN], n: i64) -> usize {
    let len = ltf8_size_of(n);
    let bytes = (n as u64).to_be_bytes();

    if len < MAX_LEN {
        buf[..len].copy_from_slice(&bytes[bytes.len() - len..]);
        buf[0] |= !(0xffu8.checked_shr(len as u32 - 1).unwrap_or(0));
    } else {
        buf[0] = 0xff;
        buf[1..].copy_from_slice(&bytes);
    }

    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_ltf8() -> io::Result<()> {
        fn t(buf: &mut Vec<u8>, value: i64, expected: &[u8]) -> io::Result<()> {
            buf.clear();
            let len = write_ltf8(buf, value)?;
            assert_eq!(&buf[..], expected);
            assert_eq!(len, expected.len());
            Ok(())
        }

        let mut buf = Vec::new();

        t(&mut buf, 0, &[0x00])?;
        t(&mut buf, 85, &[0x55])?;
        t(&mut buf, 170, &[0x80, 0xaa])?;
        t(&mut buf, 21930, &[0xc0, 0x55, 0xaa])?;
        t(&mut buf, 5614284, &[0xe0, 0x55, 0xaa, 0xcc])?;
        t(&mut buf, 1437256755, &[0xf0, 0x55, 0xaa, 0xcc, 0x33])?;
        t(&mut buf, 367937729507, &[0xf8, 0x55, 0xaa, 0xcc, 0x33, 0xe3])?;
        t(
            &mut buf,
            94192058753820,
            &[0xfc, 0x55, 0xaa, 0xcc, 0x33, 0xe3, 0x1c],
        )?;
        t(
            &mut buf,
            24113167040978160,
            &[0xfe, 0x55, 0xaa, 0xcc, 0x33, 0xe3, 0x1c, 0xf0],
        )?;
        t(
            &mut buf,
            6172970762490408975,
            &[0xff, 0x55, 0xaa, 0xcc, 0x33, 0xe3, 0x1c, 0xf0, 0x0f],
        )?;
        t(
            &mut buf,
            -1,
            &[0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff],
        )?;

        Ok(())
    }

    #[test]
    fn test_ltf8_size_of() {
        assert_eq!(ltf8_size_of(0), 1);
        assert_eq!(ltf8_size_of((1 << 7) - 1), 1);
        assert_eq!(ltf8_size_of(1 << 7), 2);
        assert_eq!(ltf8_size_of(1 << 14), 3);
        assert_eq!(ltf8_size_of(1 << 21), 4);
        assert_eq!(ltf8_size_of(1 << 28), 5);
        assert_eq!(ltf8_size_of(1 << 35), 6);
        assert_eq!(ltf8_size_of(1 << 42), 7);
        assert_eq!(ltf8_size_of(1 << 49), 8);
        assert_eq!(ltf8_size_of(1 << 56), 9);
        assert_eq!(ltf8_size_of(i64::MIN), 9);
    }
}
