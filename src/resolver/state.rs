use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use gnss::prelude::SV;
use hifitime::Epoch;
use log::warn;
use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::navigation::KeplerConvergence;

/// Satellite state at signal emission, expressed in the ECEF frame
/// at reception time.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SatelliteState {
    pub sv: SV,
    /// Earth rotation corrected ECEF position [m]
    pub position: Vector3<f64>,
    /// Satellite clock bias at emission time [s]
    pub clock_bias: f64,
    /// Pseudo range the travel time was derived from [m]
    pub pseudorange: f64,
    /// Emission time [s of GPS week]
    pub emission_time: f64,
    /// Satellite minus receiver position, prior to Earth rotation correction [m]
    pub line_of_sight: Vector3<f64>,
    /// Geometric signal travel time [s]
    pub light_time: f64,
    /// Kepler solver diagnostics of the final propagation
    pub kepler: KeplerConvergence,
}

/// Receives resolved states, in epoch order
pub trait StateSink {
    /// Latches a new epoch, prior to any of its states
    fn new_epoch(&mut self, _index: usize, _epoch: Epoch) {}
    /// Latches a resolved state
    fn insert(&mut self, index: usize, state: SatelliteState);
}

/// Resolved states, indexed by epoch index then satellite
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StateTable {
    inner: BTreeMap<usize, BTreeMap<SV, SatelliteState>>,
}

impl StateTable {
    /// Number of epochs
    pub fn len(&self) -> usize {
        self.inner.len()
    }
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
    /// Returns all states of this epoch
    pub fn epoch(&self, index: usize) -> Option<&BTreeMap<SV, SatelliteState>> {
        self.inner.get(&index)
    }
    /// Returns state of this satellite at this epoch
    pub fn state(&self, index: usize, sv: SV) -> Option<&SatelliteState> {
        self.inner.get(&index)?.get(&sv)
    }
    /// Iterates (epoch index, states) in epoch order
    pub fn iter(&self) -> impl Iterator<Item = (&usize, &BTreeMap<SV, SatelliteState>)> + '_ {
        self.inner.iter()
    }
    /// Total number of states
    pub fn nb_states(&self) -> usize {
        self.inner.values().map(|states| states.len()).sum()
    }
}

impl StateSink for StateTable {
    fn new_epoch(&mut self, index: usize, _epoch: Epoch) {
        self.inner.entry(index).or_default();
    }
    fn insert(&mut self, index: usize, state: SatelliteState) {
        match self.inner.entry(index).or_default().entry(state.sv) {
            Entry::Vacant(entry) => {
                entry.insert(state);
            },
            Entry::Occupied(_) => {
                warn!("epoch #{}: {} state already latched", index, state.sv);
            },
        }
    }
}
