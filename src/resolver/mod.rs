//! Satellite states at signal emission time, per observation epoch
mod config;
mod state;

pub use config::{Config, EphemerisSelection};
pub use state::{SatelliteState, StateSink, StateTable};

use std::collections::BTreeMap;

use gnss::prelude::SV;
use log::debug;
use nalgebra::Vector3;

use crate::{
    constants::Constants,
    earth_rotation,
    error::{Error, ResolutionError},
    gnss_time::gps_week_sow,
    navigation::{wrap_half_week, Ephemeris},
    observation::{Header, ObservationEpoch, SatelliteObservation},
};

/// Resolves satellite positions and clock biases at signal emission,
/// from one set of ephemerides and a static receiver.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    cfg: Config,
    ephemerides: &'a [Ephemeris],
    rx_position: Vector3<f64>,
}

impl<'a> Resolver<'a> {
    /// Builds a [Resolver] for the receiver described by this observation [Header].
    /// Fails if the header does not define the receiver position.
    pub fn new(cfg: Config, header: &Header, ephemerides: &'a [Ephemeris]) -> Result<Self, Error> {
        let (x, y, z) = header.rx_position.ok_or(Error::MissingApproxPosition)?;
        Ok(Self::with_rx_position(
            cfg,
            Vector3::new(x, y, z),
            ephemerides,
        ))
    }

    /// Builds a [Resolver] for a receiver at this ECEF position [m]
    pub fn with_rx_position(
        cfg: Config,
        rx_position: Vector3<f64>,
        ephemerides: &'a [Ephemeris],
    ) -> Self {
        Self {
            cfg,
            ephemerides,
            rx_position,
        }
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Receiver ECEF position [m]
    pub fn rx_position(&self) -> Vector3<f64> {
        self.rx_position
    }

    /// Selects the ephemeris for this satellite, at reception time `t_rx` [s of week]
    pub fn select_ephemeris(&self, sv: SV, t_rx: f64) -> Option<&'a Ephemeris> {
        let mut candidates = self.ephemerides.iter().filter(move |eph| eph.sv == sv);
        match self.cfg.selection {
            EphemerisSelection::FirstInFile => candidates.next(),
            EphemerisSelection::NearestToe => candidates
                .filter_map(|eph| Some((eph, wrap_half_week(t_rx - eph.toe()?).abs())))
                .min_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(eph, _)| eph),
        }
    }

    /// Resolves one satellite observed at reception time `t_rx` [s of week].
    /// The emission time is refined in exactly two passes: first from the
    /// pseudo range alone, then corrected by the satellite clock bias.
    pub fn resolve_sv(
        &self,
        t_rx: f64,
        observation: &SatelliteObservation,
    ) -> Result<SatelliteState, ResolutionError> {
        let sv = observation.sv;

        let pseudorange = observation
            .signal(&self.cfg.pseudorange)
            .and_then(|sig| sig.value)
            .ok_or_else(|| ResolutionError::MissingMeasurement {
                sv,
                observable: self.cfg.pseudorange.clone(),
            })?;

        let ephemeris = self
            .select_ephemeris(sv, t_rx)
            .ok_or(ResolutionError::MissingEphemeris(sv))?;

        let orbit = ephemeris
            .broadcast_orbit()
            .ok_or(ResolutionError::IncompleteEphemeris(sv))?;

        let dt_prop = pseudorange / Constants::SPEED_OF_LIGHT;

        let first_pass = orbit.position_at(t_rx - dt_prop);

        let emission_time = t_rx - dt_prop - first_pass.clock_bias;
        let second_pass = orbit.position_at(emission_time);

        let line_of_sight = second_pass.position - self.rx_position;
        let light_time = line_of_sight.norm() / Constants::SPEED_OF_LIGHT;

        Ok(SatelliteState {
            sv,
            position: earth_rotation::rotate(light_time, second_pass.position),
            clock_bias: second_pass.clock_bias,
            pseudorange,
            emission_time,
            line_of_sight,
            light_time,
            kepler: second_pass.kepler,
        })
    }

    /// Resolves all satellites of this epoch. Satellites that cannot
    /// be resolved are omitted. First occurrence of a satellite wins.
    pub fn resolve_epoch(&self, epoch: &ObservationEpoch) -> BTreeMap<SV, SatelliteState> {
        let mut states = BTreeMap::new();
        if !epoch.flag.has_observations() {
            return states;
        }
        let (_, t_rx) = gps_week_sow(epoch.epoch);
        for observation in epoch.satellites.iter() {
            let sv = observation.sv;
            if sv.constellation != self.cfg.constellation {
                continue;
            }
            if states.contains_key(&sv) {
                debug!("{}: {} observed twice", epoch.epoch, sv);
                continue;
            }
            match self.resolve_sv(t_rx, observation) {
                Ok(state) => {
                    states.insert(sv, state);
                },
                Err(e) => debug!("{}: {}", epoch.epoch, e),
            }
        }
        states
    }

    /// Resolves all epochs, in order, into this [StateSink]
    pub fn resolve<S: StateSink>(&self, epochs: &[ObservationEpoch], sink: &mut S) {
        for (index, epoch) in epochs.iter().enumerate() {
            sink.new_epoch(index, epoch.epoch);
            for (_, state) in self.resolve_epoch(epoch) {
                sink.insert(index, state);
            }
        }
    }

    /// Resolves all epochs
    pub fn resolve_all(&self, epochs: &[ObservationEpoch]) -> StateTable {
        let mut table = StateTable::default();
        self.resolve(epochs, &mut table);
        table
    }

    /// Resolves all epochs on the rayon thread pool
    #[cfg(feature = "parallel")]
    #[cfg_attr(docsrs, doc(cfg(feature = "parallel")))]
    pub fn par_resolve_all(&self, epochs: &[ObservationEpoch]) -> StateTable {
        use rayon::prelude::*;
        let resolved: Vec<BTreeMap<SV, SatelliteState>> = epochs
            .par_iter()
            .map(|epoch| self.resolve_epoch(epoch))
            .collect();
        let mut table = StateTable::default();
        for (index, (epoch, states)) in epochs.iter().zip(resolved).enumerate() {
            table.new_epoch(index, epoch.epoch);
            for (_, state) in states {
                table.insert(index, state);
            }
        }
        table
    }
}
