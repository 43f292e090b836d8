mod itf8;
mod ltf8;

use std::io::{self, Read};

pub use self::{
    itf8::{get_itf8, read_itf8, read_itf8_as},
    ltf8::{get_ltf8, read_ltf8, read_ltf8_as},
};

pub(crate) use self::itf8::read_itf8_with_first_byte;

pub fn read_u8<R>(reader: &mut R) -> io::Result<u8>
where
    R: Read,
{
    let mut buf = [0; 1];
    reader.read_exact(&mut buf)?;
    Ok(buf[0])
}

pub fn read_i32_le<R>(reader: &mut R) -> io::Result<i32>
where
    R: Read,
{
    let mut buf = [0; 4];
    reader.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Reads the first byte of a structure, returning `None` at a clean end of stream.
pub(crate) fn read_first_byte<R>(reader: &mut R) -> io::Result<Option<u8>>
where
    R: Read,
{
    let mut buf = [0; 1];

    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_i32_le() -> io::Result<()> {
        let src = [0x00, 0x01, 0x00, 0x00];
        assert_eq!(read_i32_le(&mut &src[..])?, 256);

        let src = [0xff, 0xff, 0xff];
        assert!(matches!(
            read_i32_le(&mut &src[..]),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof
        ));

        Ok(())
    }

    #[test]
    fn test_read_first_byte() -> io::Result<()> {
        assert_eq!(read_first_byte(&mut &[][..])?, None);
        assert_eq!(read_first_byte(&mut &[0x08, 0x0d][..])?, Some(0x08));
        Ok(())
    }
}
