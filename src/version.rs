//! RINEX revision description
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{columns::slice, error::ParsingError};

/// Revision of the RINEX standard a file was written in.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Version {
    /// Version major number
    pub major: u8,
    /// Version minor number
    pub minor: u8,
}

impl Default for Version {
    fn default() -> Self {
        Self { major: 3, minor: 5 }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}.{:02}", self.major, self.minor)
    }
}

impl Version {
    /// Builds a new [Version]
    pub fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }
    /// Only the 3.xx column layout is decoded
    pub fn is_supported(&self) -> bool {
        self.major == 3
    }
}

impl FromStr for Version {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParsingError::VersionParsing(trimmed.to_string());
        match trimmed.split_once('.') {
            Some((major, minor)) => {
                let major = major.parse::<u8>().map_err(|_| err())?;
                let minor = if minor.is_empty() {
                    0
                } else {
                    minor.parse::<u8>().map_err(|_| err())?
                };
                Ok(Self { major, minor })
            },
            None => {
                let major = trimmed.parse::<u8>().map_err(|_| err())?;
                Ok(Self { major, minor: 0 })
            },
        }
    }
}

/// Decodes the "RINEX VERSION / TYPE" header content, returning
/// the revision, file type and system descriptors.
pub(crate) fn parse_version_type(
    content: &str,
    expected_type: char,
    description: &'static str,
) -> Result<(Version, Option<char>), ParsingError> {
    let version = Version::from_str(slice(content, 0, 9))?;
    if !version.is_supported() {
        return Err(ParsingError::NonSupportedRevision(version.to_string()));
    }
    let file_type = slice(content, 20, 21).chars().next().unwrap_or(' ');
    if file_type != expected_type {
        return Err(ParsingError::FileType {
            expected: description,
            found: file_type,
        });
    }
    let system = slice(content, 40, 41).chars().next().filter(|c| !c.is_whitespace());
    Ok((version, system))
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn version_parsing() {
        assert_eq!(Version::from_str("     3.05"), Ok(Version::new(3, 5)));
        assert_eq!(Version::from_str("3.04"), Ok(Version::new(3, 4)));
        assert_eq!(Version::from_str("2.11"), Ok(Version::new(2, 11)));
        assert_eq!(Version::from_str("4"), Ok(Version::new(4, 0)));
        assert!(Version::from_str("a.b").is_err());
        assert_eq!(Version::new(3, 5).to_string(), "3.05");
        assert!(Version::new(3, 2).is_supported());
        assert!(!Version::new(2, 11).is_supported());
        assert!(!Version::new(4, 0).is_supported());
    }
    #[test]
    fn version_type_line() {
        let content = "     3.05           N: GNSS NAV DATA    G: GPS              ";
        let (version, system) = parse_version_type(content, 'N', "NAVIGATION").unwrap();
        assert_eq!(version, Version::new(3, 5));
        assert_eq!(system, Some('G'));

        assert_eq!(
            parse_version_type(content, 'O', "OBSERVATION"),
            Err(ParsingError::FileType {
                expected: "OBSERVATION",
                found: 'N'
            })
        );

        let content = "     2.11           N: GPS NAV DATA                         ";
        assert_eq!(
            parse_version_type(content, 'N', "NAVIGATION"),
            Err(ParsingError::NonSupportedRevision("2.11".to_string()))
        );
    }
}
