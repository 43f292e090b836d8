//! gzip codec.

use std::io;

#[cfg(not(feature = "libdeflate"))]
pub(crate) fn decode(src: &[u8], uncompressed_size: usize) -> io::Result<Vec<u8>> {
    use std::io::Read;

    use flate2::read::MultiGzDecoder;

    let mut dst = Vec::with_capacity(super::initial_capacity(uncompressed_size));
    let mut decoder = MultiGzDecoder::new(src);
    decoder.read_to_end(&mut dst)?;

    Ok(dst)
}

// The maximum compression ratio of a deflate stream.
#[cfg(feature = "libdeflate")]
const MAX_DEFLATE_RATIO: usize = 1032;

#[cfg(feature = "libdeflate")]
pub(crate) fn decode(src: &[u8], uncompressed_size: usize) -> io::Result<Vec<u8>> {
    use libdeflater::Decompressor;

    if uncompressed_size > src.len().saturating_mul(MAX_DEFLATE_RATIO) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "invalid uncompressed size: {uncompressed_size} bytes from {} compressed bytes",
                src.len()
            ),
        ));
    }

    let mut dst = vec![0; uncompressed_size];
    let mut decoder = Decompressor::new();

    let len = decoder
        .gzip_decompress(src, &mut dst)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{e:?}")))?;

    dst.truncate(len);

    Ok(dst)
}

/// Compresses data as a gzip stream.
#[cfg(not(feature = "libdeflate"))]
pub fn encode(compression_level: flate2::Compression, src: &[u8]) -> io::Result<Vec<u8>> {
    use std::io::Write;

    use flate2::write::GzEncoder;

    let mut encoder = GzEncoder::new(Vec::new(), compression_level);
    encoder.write_all(src)?;
    encoder.finish()
}

/// Compresses data as a gzip stream.
#[cfg(feature = "libdeflate")]
pub fn encode(compression_level: flate2::Compression, src: &[u8]) -> io::Result<Vec<u8>> {
    use libdeflater::{CompressionLvl, Compressor};

    let level = CompressionLvl::new(compression_level.level() as i32).map_err(|_| {
        io::Error::new(io::ErrorKind::InvalidInput, "invalid compression level")
    })?;

    let mut encoder = Compressor::new(level);

    let max_len = encoder.gzip_compress_bound(src.len());
    let mut dst = vec![0; max_len];

    let len = encoder
        .gzip_compress(src, &mut dst)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{e:?}")))?;

    dst.truncate(len);

    Ok(dst)
}
