use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParsingError;

/// `EpochFlag` validates an epoch,
/// or describes possible events that occurred
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EpochFlag {
    /// Epoch is sane
    #[default]
    Ok,
    /// Power failure since previous epoch
    PowerFailure,
    /// Antenna is being moved at current epoch
    AntennaBeingMoved,
    /// Site has changed, receiver has moved since last epoch
    NewSiteOccupation,
    /// Header information follows
    HeaderInformationFollows,
    /// External event, significant event in this epoch
    ExternalEvent,
    /// Cycle slip at this epoch
    CycleSlip,
}

impl EpochFlag {
    /// Returns true if self is a valid epoch
    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
    /// Returns true when satellite observation lines follow
    /// the epoch descriptor. Other flags introduce special records.
    pub fn has_observations(self) -> bool {
        matches!(self, Self::Ok | Self::PowerFailure | Self::CycleSlip)
    }
}

impl FromStr for EpochFlag {
    type Err = ParsingError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(Self::Ok),
            "1" => Ok(Self::PowerFailure),
            "2" => Ok(Self::AntennaBeingMoved),
            "3" => Ok(Self::NewSiteOccupation),
            "4" => Ok(Self::HeaderInformationFollows),
            "5" => Ok(Self::ExternalEvent),
            "6" => Ok(Self::CycleSlip),
            other => Err(ParsingError::EpochFlagParsing(other.to_string())),
        }
    }
}

impl std::fmt::Display for EpochFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Ok => "0".fmt(f),
            Self::PowerFailure => "1".fmt(f),
            Self::AntennaBeingMoved => "2".fmt(f),
            Self::NewSiteOccupation => "3".fmt(f),
            Self::HeaderInformationFollows => "4".fmt(f),
            Self::ExternalEvent => "5".fmt(f),
            Self::CycleSlip => "6".fmt(f),
        }
    }
}
