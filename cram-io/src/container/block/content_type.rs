use std::fmt;

/// A block content type.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ContentType {
    /// SAM header.
    FileHeader,
    /// Compression header.
    CompressionHeader,
    /// Header of a slice of mapped records.
    MappedSlice,
    /// Header of a slice of unmapped records.
    UnmappedSlice,
    /// External data.
    ExternalData,
    /// Core data.
    CoreData,
}

impl ContentType {
    /// Returns whether this content type holds a slice header.
    pub fn is_slice_header(&self) -> bool {
        matches!(self, Self::MappedSlice | Self::UnmappedSlice)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FileHeader => "FILE_HEADER",
            Self::CompressionHeader => "COMPRESSION_HEADER",
            Self::MappedSlice => "MAPPED_SLICE",
            Self::UnmappedSlice => "UNMAPPED_SLICE",
            Self::ExternalData => "EXTERNAL",
            Self::CoreData => "CORE",
        })
    }
}

impl TryFrom<u8> for ContentType {
    type Error = u8;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            0 => Ok(Self::FileHeader),
            1 => Ok(Self::CompressionHeader),
            2 => Ok(Self::MappedSlice),
            3 => Ok(Self::UnmappedSlice),
            4 => Ok(Self::ExternalData),
            5 => Ok(Self::CoreData),
            _ => Err(n),
        }
    }
}

impl From<ContentType> for u8 {
    fn from(content_type: ContentType) -> Self {
        match content_type {
            ContentType::FileHeader => 0,
            ContentType::CompressionHeader => 1,
            ContentType::MappedSlice => 2,
            ContentType::UnmappedSlice => 3,
            ContentType::ExternalData => 4,
            ContentType::CoreData => 5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt() {
        assert_eq!(ContentType::FileHeader.to_string(), "FILE_HEADER");
        assert_eq!(ContentType::ExternalData.to_string(), "EXTERNAL");
        assert_eq!(ContentType::CoreData.to_string(), "CORE");
    }

    #[test]
    fn test_try_from_u8_for_content_type() {
        assert_eq!(ContentType::try_from(2), Ok(ContentType::MappedSlice));
        assert_eq!(ContentType::try_from(5), Ok(ContentType::CoreData));
        assert_eq!(ContentType::try_from(6), Err(6));
    }

    #[test]
    fn test_from_content_type_for_u8() {
        assert_eq!(u8::from(ContentType::FileHeader), 0);
        assert_eq!(u8::from(ContentType::UnmappedSlice), 3);
    }
}
