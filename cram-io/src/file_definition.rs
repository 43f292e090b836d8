//! CRAM file definition.

mod version;

pub use self::version::{Dialect, ParseError, Version};

/// The length of a file ID.
pub const FILE_ID_LEN: usize = 20;

/// A CRAM file definition.
///
/// This is the fixed-size preamble at the start of every CRAM file: the magic number, the format
/// version, and a 20-byte file ID.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FileDefinition {
    version: Version,
    file_id: [u8; FILE_ID_LEN],
}

impl FileDefinition {
    /// Creates a file definition.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::{file_definition::Version, FileDefinition};
    /// let file_definition = FileDefinition::new(Version::V2_0, [0; 20]);
    /// ```
    pub fn new(version: Version, file_id: [u8; FILE_ID_LEN]) -> Self {
        Self { version, file_id }
    }

    /// Creates a file definition with a file ID derived from a file name.
    ///
    /// The name is truncated to 20 bytes and zero-padded.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::{file_definition::Version, FileDefinition};
    /// let file_definition = FileDefinition::with_name(Version::V2_0, b"out.cram");
    /// assert_eq!(&file_definition.file_id()[..8], b"out.cram");
    /// assert_eq!(&file_definition.file_id()[8..], &[0; 12]);
    /// ```
    pub fn with_name(version: Version, name: &[u8]) -> Self {
        let mut file_id = [0; FILE_ID_LEN];
        let len = name.len().min(FILE_ID_LEN);
        file_id[..len].copy_from_slice(&name[..len]);
        Self::new(version, file_id)
    }

    /// Returns the format version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the file ID.
    pub fn file_id(&self) -> &[u8; FILE_ID_LEN] {
        &self.file_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_name() {
        let file_definition =
            FileDefinition::with_name(Version::V1_0, b"a_rather_long_file_name.cram");
        assert_eq!(file_definition.version(), Version::V1_0);
        assert_eq!(file_definition.file_id(), b"a_rather_long_file_n");
    }
}
