use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParsingError;

/// Signal strength indicator attached to an observation,
/// mapped to the receiver C/N0 range.
#[derive(PartialOrd, Ord, PartialEq, Eq, Copy, Clone, Debug, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SNR {
    /// Unknown or not tracked
    DbHz0,
    /// SNR < 12 dB-Hz
    DbHz12,
    /// 12 dB-Hz <= SNR < 17 dB-Hz
    DbHz12_17,
    /// 18 dB-Hz <= SNR < 23 dB-Hz
    DbHz18_23,
    /// 24 dB-Hz <= SNR < 29 dB-Hz
    DbHz24_29,
    /// 30 dB-Hz <= SNR < 35 dB-Hz
    DbHz30_35,
    /// 36 dB-Hz <= SNR < 41 dB-Hz
    DbHz36_41,
    /// 42 dB-Hz <= SNR < 47 dB-Hz
    DbHz42_47,
    /// 48 dB-Hz <= SNR < 53 dB-Hz
    DbHz48_53,
    /// SNR >= 54 dB-Hz
    DbHz54,
}

impl std::fmt::Display for SNR {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let descriptor = match self {
            Self::DbHz0 => "0",
            Self::DbHz12 => "1",
            Self::DbHz12_17 => "2",
            Self::DbHz18_23 => "3",
            Self::DbHz24_29 => "4",
            Self::DbHz30_35 => "5",
            Self::DbHz36_41 => "6",
            Self::DbHz42_47 => "7",
            Self::DbHz48_53 => "8",
            Self::DbHz54 => "9",
        };
        f.write_str(descriptor)
    }
}

impl FromStr for SNR {
    type Err = ParsingError;
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code.trim() {
            "0" => Ok(Self::DbHz0),
            "1" => Ok(Self::DbHz12),
            "2" => Ok(Self::DbHz12_17),
            "3" => Ok(Self::DbHz18_23),
            "4" => Ok(Self::DbHz24_29),
            "5" => Ok(Self::DbHz30_35),
            "6" => Ok(Self::DbHz36_41),
            "7" => Ok(Self::DbHz42_47),
            "8" => Ok(Self::DbHz48_53),
            "9" => Ok(Self::DbHz54),
            other => Err(ParsingError::SnrParsing(other.to_string())),
        }
    }
}

impl SNR {
    /// Returns true if self describes a bad signal level
    pub fn bad(self) -> bool {
        self <= Self::DbHz18_23
    }
    /// Returns true if self describes a strong signal level
    pub fn strong(self) -> bool {
        self >= Self::DbHz30_35
    }
}
