//! bzip2 codec.
//!
//! The codec is available with the `bzip2` feature. Without it, both directions fail with
//! [`std::io::ErrorKind::Unsupported`].

use std::io;

#[cfg(feature = "bzip2")]
pub(crate) fn decode(src: &[u8], uncompressed_size: usize) -> io::Result<Vec<u8>> {
    use std::io::Read;

    use ::bzip2::read::BzDecoder;

    let mut dst = Vec::with_capacity(super::initial_capacity(uncompressed_size));
    let mut decoder = BzDecoder::new(src);
    decoder.read_to_end(&mut dst)?;

    Ok(dst)
}

#[cfg(not(feature = "bzip2"))]
pub(crate) fn decode(_: &[u8], _: usize) -> io::Result<Vec<u8>> {
    Err(unsupported())
}

/// Compresses data as a bzip2 stream.
#[cfg(feature = "bzip2")]
pub fn encode(compression_level: u32, src: &[u8]) -> io::Result<Vec<u8>> {
    use std::io::Write;

    use ::bzip2::{Compression, write::BzEncoder};

    let level = compression_level.clamp(1, 9);
    let mut encoder = BzEncoder::new(Vec::new(), Compression::new(level));
    encoder.write_all(src)?;
    encoder.finish()
}

/// Compresses data as a bzip2 stream.
#[cfg(not(feature = "bzip2"))]
pub fn encode(_: u32, _: &[u8]) -> io::Result<Vec<u8>> {
    Err(unsupported())
}

#[cfg(not(feature = "bzip2"))]
fn unsupported() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "bzip2 support is not enabled (build with the `bzip2` feature)",
    )
}
