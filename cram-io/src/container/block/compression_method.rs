use std::fmt;

/// A block compression method.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum CompressionMethod {
    /// Uncompressed (`RAW`).
    #[default]
    None,
    /// gzip.
    Gzip,
    /// bzip2.
    Bzip2,
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "RAW",
            Self::Gzip => "GZIP",
            Self::Bzip2 => "BZIP2",
        })
    }
}

impl TryFrom<u8> for CompressionMethod {
    type Error = u8;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            0 => Ok(Self::None),
            1 => Ok(Self::Gzip),
            2 => Ok(Self::Bzip2),
            _ => Err(n),
        }
    }
}

impl From<CompressionMethod> for u8 {
    fn from(compression_method: CompressionMethod) -> Self {
        match compression_method {
            CompressionMethod::None => 0,
            CompressionMethod::Gzip => 1,
            CompressionMethod::Bzip2 => 2,
        }
    }
}
