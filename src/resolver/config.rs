use gnss::prelude::Constellation;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::observable::Observable;

fn default_pseudorange() -> Observable {
    Observable::PseudoRange("C1C".to_string())
}

fn default_constellation() -> Constellation {
    Constellation::GPS
}

/// Picks the ephemeris used for one satellite, among those it broadcast
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum EphemerisSelection {
    /// First record of that satellite, in file order
    #[default]
    FirstInFile,
    /// Record whose toe is the closest to the reception time
    NearestToe,
}

/// [Resolver](crate::resolver::Resolver) configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Pseudo range observable used to estimate the signal travel time
    #[cfg_attr(feature = "serde", serde(default = "default_pseudorange"))]
    pub pseudorange: Observable,
    /// Ephemeris selection policy
    #[cfg_attr(feature = "serde", serde(default))]
    pub selection: EphemerisSelection,
    /// Satellites of other systems are not resolved
    #[cfg_attr(feature = "serde", serde(default = "default_constellation"))]
    pub constellation: Constellation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pseudorange: default_pseudorange(),
            selection: EphemerisSelection::default(),
            constellation: default_constellation(),
        }
    }
}

impl Config {
    /// Copies and returns [Self] with desired pseudo range observable
    pub fn with_pseudorange(&self, pseudorange: Observable) -> Self {
        let mut s = self.clone();
        s.pseudorange = pseudorange;
        s
    }
    /// Copies and returns [Self] with desired selection policy
    pub fn with_selection(&self, selection: EphemerisSelection) -> Self {
        let mut s = self.clone();
        s.selection = selection;
        s
    }
}
