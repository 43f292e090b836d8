//! CRAM block codecs.

pub mod bzip2;
pub mod gzip;

use std::io;

use crate::container::block::CompressionMethod;

// Declared sizes are untrusted, so decoders only reserve up to this much up front.
#[cfg(any(not(feature = "libdeflate"), feature = "bzip2"))]
const MAX_INITIAL_CAPACITY: usize = 1 << 20;

#[cfg(any(not(feature = "libdeflate"), feature = "bzip2"))]
fn initial_capacity(uncompressed_size: usize) -> usize {
    uncompressed_size.min(MAX_INITIAL_CAPACITY)
}

/// A block encoder.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Encoder {
    /// gzip.
    Gzip(flate2::Compression),
    /// bzip2, with a block size level from 1 to 9.
    Bzip2(u32),
}

impl Encoder {
    /// Returns the compression method this encoder produces.
    pub fn compression_method(&self) -> CompressionMethod {
        match self {
            Self::Gzip(_) => CompressionMethod::Gzip,
            Self::Bzip2(_) => CompressionMethod::Bzip2,
        }
    }

    /// Compresses the given data.
    pub fn encode(&self, src: &[u8]) -> io::Result<Vec<u8>> {
        match self {
            Self::Gzip(compression_level) => gzip::encode(*compression_level, src),
            Self::Bzip2(compression_level) => bzip2::encode(*compression_level, src),
        }
    }
}
