mod itf8;
mod ltf8;

use std::io::{self, Write};

pub use self::{
    itf8::{itf8_size_of, put_itf8, write_itf8},
    ltf8::{ltf8_size_of, put_ltf8, write_ltf8},
};

pub fn write_u8<W>(writer: &mut W, n: u8) -> io::Result<()>
where
    W: Write,
{
    writer.write_all(&[n])
}

pub fn write_i32_le<W>(writer: &mut W, n: i32) -> io::Result<()>
where
    W: Write,
{
    writer.write_all(&n.to_le_bytes())
}
