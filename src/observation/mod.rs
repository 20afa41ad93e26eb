//! Observation files
mod header;
mod lli;
mod parsing;
mod snr;

pub use header::{Antenna, Compensation, Header, PhaseShift, Rcvr, ScaleFactor};
pub use lli::LliFlags;
pub use snr::SNR;

use std::io::BufRead;
use std::path::Path;

use gnss::prelude::SV;
use hifitime::Epoch;
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    epoch::EpochFlag,
    error::Error,
    observable::Observable,
    reader::{open, Lines},
};

use parsing::is_new_epoch;

/// Single measurement
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SignalObservation {
    pub observable: Observable,
    /// Measured value, absent when the slot was blank or malformed
    pub value: Option<f64>,
    /// Loss of lock indicator
    pub lli: Option<LliFlags>,
    /// Signal strength indicator
    pub snr: Option<SNR>,
}

/// All measurements of one satellite at one epoch,
/// in header declaration order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SatelliteObservation {
    pub sv: SV,
    pub signals: Vec<SignalObservation>,
}

impl SatelliteObservation {
    /// Returns measurement of this observable
    pub fn signal(&self, observable: &Observable) -> Option<&SignalObservation> {
        self.signals.iter().find(|sig| &sig.observable == observable)
    }
    /// Returns pseudo range measurement by code, like "C1C"
    pub fn pseudo_range(&self, code: &str) -> Option<&SignalObservation> {
        self.signals
            .iter()
            .find(|sig| sig.observable.is_pseudorange_observable() && sig.observable.code() == code)
    }
}

/// Observation epoch
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationEpoch {
    /// Sampling instant, receiver time expressed in the
    /// TIME OF FIRST OBS time system (GPST when undeclared)
    pub epoch: Epoch,
    pub flag: EpochFlag,
    /// Number of satellites, or special records, declared by the epoch line
    pub num_sat: usize,
    /// Receiver clock offset [s]
    pub clock_offset: Option<f64>,
    /// GPS observations, in file order
    pub satellites: Vec<SatelliteObservation>,
}

/// Decoded observation file
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Observation {
    pub header: Header,
    /// Epochs in file order
    pub epochs: Vec<ObservationEpoch>,
}

impl Observation {
    /// Decodes an observation stream
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut lines = Lines::new(reader);
        let header = Header::parse(&mut lines)?;
        let mut epochs = Vec::new();
        while let Some(line) = lines.next_line()? {
            if is_new_epoch(&line) {
                epochs.push(ObservationEpoch::parse(&line, &header, &mut lines)?);
            } else if !line.trim().is_empty() {
                debug!("line {}: unexpected content", lines.line_number());
            }
        }
        debug!("decoded {} epochs", epochs.len());
        Ok(Self { header, epochs })
    }

    /// Decodes a local observation file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let reader = open(path)?;
        Self::parse(reader).map_err(|e| e.with_path(path))
    }

    /// Iterates epochs that carry satellite observations
    pub fn observation_epochs(&self) -> impl Iterator<Item = &ObservationEpoch> + '_ {
        self.epochs.iter().filter(|epoch| epoch.flag.has_observations())
    }
}
