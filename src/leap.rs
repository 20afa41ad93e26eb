//! Leap second description, as found in header sections
use std::str::FromStr;

use hifitime::TimeScale;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    columns::{parse_int, slice},
    epoch::parse_timescale,
    error::ParsingError,
};

/// Leap seconds information.
/// GPS = UTC + ΔtLS
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Leap {
    /// Current number of leap seconds
    pub leap: u32,
    /// ΔtLS: future or past leap seconds
    pub delta_tls: Option<u32>,
    /// Week number of the future leap second
    pub week: Option<u32>,
    /// Day number of the future leap second
    pub day: Option<u32>,
    /// Timescale the week counter refers to
    pub timescale: Option<TimeScale>,
}

impl FromStr for Leap {
    type Err = ParsingError;
    /// Decodes "LEAP SECONDS" header content: 4I6 followed by A3
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let leap = parse_int::<u32>(slice(content, 0, 6))?
            .ok_or_else(|| ParsingError::NumericField(content.trim().to_string()))?;
        let system = slice(content, 24, 27).trim();
        let timescale = if system.is_empty() {
            None
        } else {
            Some(parse_timescale(system)?)
        };
        Ok(Self {
            leap,
            delta_tls: parse_int::<u32>(slice(content, 6, 12))?,
            week: parse_int::<u32>(slice(content, 12, 18))?,
            day: parse_int::<u32>(slice(content, 18, 24))?,
            timescale,
        })
    }
}
