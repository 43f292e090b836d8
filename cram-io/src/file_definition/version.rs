use std::{cmp::Ordering, error, fmt, io, num, str::FromStr};

/// A CRAM file definition version.
///
/// This is also called the format number.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Version {
    major: u8,
    minor: u8,
}

/// The on-disk layout family of a version.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Dialect {
    /// CRAM 1.0.
    ///
    /// Container lengths are ITF8, record and base counters are absent, the SAM header is stored
    /// bare, and slice headers carry no reference MD5.
    Legacy,
    /// CRAM 1.1 and 2.0.
    Modern,
}

impl Version {
    /// CRAM 1.0
    pub const V1_0: Self = Self::new(1, 0);

    /// CRAM 1.1
    pub const V1_1: Self = Self::new(1, 1);

    /// CRAM 2.0
    pub const V2_0: Self = Self::new(2, 0);

    /// Creates a file definition version.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::file_definition::Version;
    /// let version = Version::new(2, 0);
    /// ```
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Returns the major version.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::file_definition::Version;
    /// let version = Version::new(2, 0);
    /// assert_eq!(version.major(), 2);
    /// ```
    pub fn major(&self) -> u8 {
        self.major
    }

    /// Returns the minor version.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::file_definition::Version;
    /// let version = Version::new(2, 0);
    /// assert_eq!(version.minor(), 0);
    /// ```
    pub fn minor(&self) -> u8 {
        self.minor
    }

    /// Returns the layout family of this version.
    ///
    /// # Examples
    ///
    /// ```
    /// use cram_io::file_definition::{Dialect, Version};
    /// assert_eq!(Version::V1_0.dialect(), Dialect::Legacy);
    /// assert_eq!(Version::V2_0.dialect(), Dialect::Modern);
    /// ```
    pub fn dialect(&self) -> Dialect {
        if *self == Self::V1_0 {
            Dialect::Legacy
        } else {
            Dialect::Modern
        }
    }

    /// Returns `true` if this version uses the CRAM 1.0 layout.
    pub fn is_legacy(&self) -> bool {
        self.dialect() == Dialect::Legacy
    }

    /// Validates that the version is a supported CRAM version.
    pub fn validate(&self) -> io::Result<()> {
        match *self {
            Self::V1_0 | Self::V1_1 | Self::V2_0 => Ok(()),
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported CRAM version: {self}"),
            )),
        }
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::V2_0
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// An error returned when a version fails to parse.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The input is not of the form `<major>.<minor>`.
    Invalid,
    /// The major version is invalid.
    InvalidMajor(num::ParseIntError),
    /// The minor version is invalid.
    InvalidMinor(num::ParseIntError),
}

impl error::Error for ParseError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Invalid => None,
            Self::InvalidMajor(e) | Self::InvalidMinor(e) => Some(e),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => write!(f, "invalid input"),
            Self::InvalidMajor(_) => write!(f, "invalid major version"),
            Self::InvalidMinor(_) => write!(f, "invalid minor version"),
        }
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s.split_once('.').ok_or(ParseError::Invalid)?;
        let major = major.parse().map_err(ParseError::InvalidMajor)?;
        let minor = minor.parse().map_err(ParseError::InvalidMinor)?;
        Ok(Self::new(major, minor))
    }
}
