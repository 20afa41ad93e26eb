//! Observation codes
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::ParsingError;

/// Physical measurement an observation code refers to.
/// Each variant wraps the complete code, like "C1C".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum Observable {
    /// Carrier phase range [cycles]
    Phase(String),
    /// Doppler shift [Hz]
    Doppler(String),
    /// Signal strength [dB-Hz]
    SSI(String),
    /// Code range [m]
    PseudoRange(String),
    /// Receiver channel number
    ChannelNumber(String),
}

impl Default for Observable {
    fn default() -> Self {
        Self::PseudoRange("C1C".to_string())
    }
}

impl Observable {
    /// Complete observation code
    pub fn code(&self) -> &str {
        match self {
            Self::Phase(code)
            | Self::Doppler(code)
            | Self::SSI(code)
            | Self::PseudoRange(code)
            | Self::ChannelNumber(code) => code,
        }
    }
    pub fn is_pseudorange_observable(&self) -> bool {
        matches!(self, Self::PseudoRange(_))
    }
    pub fn is_phase_observable(&self) -> bool {
        matches!(self, Self::Phase(_))
    }
}

impl std::fmt::Display for Observable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Observable {
    type Err = ParsingError;
    fn from_str(content: &str) -> Result<Self, Self::Err> {
        let code = content.trim();
        let err = || ParsingError::ObservableParsing(code.to_string());
        if !(2..=3).contains(&code.len()) || !code.is_ascii() {
            return Err(err());
        }
        match &code[..1] {
            "C" | "P" => Ok(Self::PseudoRange(code.to_string())),
            "L" => Ok(Self::Phase(code.to_string())),
            "D" => Ok(Self::Doppler(code.to_string())),
            "S" => Ok(Self::SSI(code.to_string())),
            "X" => Ok(Self::ChannelNumber(code.to_string())),
            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Observable {
    type Error = ParsingError;
    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::from_str(&code)
    }
}

impl From<Observable> for String {
    fn from(observable: Observable) -> Self {
        observable.code().to_string()
    }
}
