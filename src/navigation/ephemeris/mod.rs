mod kepler;
mod parsing;

pub use kepler::{
    wrap_half_week, BroadcastOrbit, Kepler, KeplerConvergence, Perturbations, SatellitePosition,
};

use std::collections::HashMap;

use gnss::prelude::SV;
use hifitime::{Duration, Epoch};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Broadcast orbit parameters of a GPS LNAV frame, as they appear
/// on the second to eighth line of a record, in file order.
pub(crate) const GPS_LNAV_ORBITS: [&str; 28] = [
    "iode",
    "crs",
    "deltaN",
    "m0",
    "cuc",
    "e",
    "cus",
    "sqrta",
    "toe",
    "cic",
    "omega0",
    "cis",
    "i0",
    "crc",
    "omega",
    "omegaDot",
    "idot",
    "l2Codes",
    "week",
    "l2pDataFlag",
    "accuracy",
    "health",
    "tgd",
    "iodc",
    "t_tm",
    "fitInt",
    "spare1",
    "spare2",
];

/// Ephemeris frame, one per navigation record.
/// Blank fields of the record are absent, which differs from zero.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ephemeris {
    /// Satellite this frame was broadcast by
    pub sv: SV,
    /// Time of clock
    pub toc: Epoch,
    /// Clock bias a0 [s]
    pub clock_bias: Option<f64>,
    /// Clock drift a1 [s.s⁻¹]
    pub clock_drift: Option<f64>,
    /// Clock drift rate a2 [s.s⁻²]
    pub clock_drift_rate: Option<f64>,
    /// Orbital parameters, by name
    pub orbits: HashMap<String, f64>,
}

impl Ephemeris {
    /// Builds an [Ephemeris] without any orbital parameter
    pub fn new(sv: SV, toc: Epoch) -> Self {
        Self {
            sv,
            toc,
            clock_bias: None,
            clock_drift: None,
            clock_drift_rate: None,
            orbits: HashMap::with_capacity(GPS_LNAV_ORBITS.len()),
        }
    }

    /// Returns (bias [s], drift [s.s⁻¹], drift rate [s.s⁻²]),
    /// if all three coefficients were broadcast.
    pub fn sv_clock(&self) -> Option<(f64, f64, f64)> {
        Some((
            self.clock_bias?,
            self.clock_drift?,
            self.clock_drift_rate?,
        ))
    }

    /// Returns orbital parameter by name, like "sqrta" or "omegaDot"
    pub fn get_orbit_f64(&self, field: &str) -> Option<f64> {
        self.orbits.get(field).copied()
    }

    /// Defines an orbital parameter
    pub fn set_orbit_f64(&mut self, field: &str, value: f64) {
        self.orbits.insert(field.to_string(), value);
    }

    /// Copies and returns [Self] with desired orbital parameter
    pub fn with_orbit(&self, field: &str, value: f64) -> Self {
        let mut s = self.clone();
        s.set_orbit_f64(field, value);
        s
    }

    /// Copies and returns [Self] with desired clock coefficients
    pub fn with_sv_clock(&self, bias: f64, drift: f64, drift_rate: f64) -> Self {
        let mut s = self.clone();
        s.clock_bias = Some(bias);
        s.clock_drift = Some(drift);
        s.clock_drift_rate = Some(drift_rate);
        s
    }

    /// Time of ephemeris [s of GPS week]
    pub fn toe(&self) -> Option<f64> {
        self.get_orbit_f64("toe")
    }

    /// GPS week counter, continuous (not mod 1024).
    pub fn week(&self) -> Option<u32> {
        let week = self.get_orbit_f64("week")?;
        if week.is_sign_negative() {
            None
        } else {
            Some(week as u32)
        }
    }

    /// SV health, where 0 means all signals OK
    pub fn health(&self) -> Option<f64> {
        self.get_orbit_f64("health")
    }

    /// Returns true if this frame declares a healthy satellite
    pub fn is_healthy(&self) -> bool {
        self.health() == Some(0.0)
    }

    /// SV accuracy [m]
    pub fn accuracy(&self) -> Option<f64> {
        self.get_orbit_f64("accuracy")
    }

    /// Returns TGD as [Duration]
    pub fn tgd(&self) -> Option<Duration> {
        let tgd_s = self.get_orbit_f64("tgd")?;
        Some(Duration::from_seconds(tgd_s))
    }

    /// Issue of data (ephemeris)
    pub fn iode(&self) -> Option<f64> {
        self.get_orbit_f64("iode")
    }

    /// Issue of data (clock)
    pub fn iodc(&self) -> Option<f64> {
        self.get_orbit_f64("iodc")
    }

    /// Transmission time of message [s of GPS week]
    pub fn transmission_time(&self) -> Option<f64> {
        self.get_orbit_f64("t_tm")
    }

    /// Fit interval [hours]
    pub fn fit_interval(&self) -> Option<f64> {
        self.get_orbit_f64("fitInt")
    }
}
