#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

#[macro_use]
extern crate lazy_static;

pub mod converter;
pub mod earth_rotation;
pub mod gnss_time;
pub mod navigation;
pub mod observation;
pub mod resolver;

mod columns;
mod constants;
mod epoch;
mod error;
mod leap;
mod observable;
mod reader;
mod version;

#[cfg(test)]
mod tests;

pub mod prelude {
    // export
    pub use crate::{
        constants::Constants,
        converter::{Converter, Gfzrnx},
        epoch::EpochFlag,
        error::{Error, FormatError, ParsingError, ResolutionError},
        gnss_time::{gps_week_sow, gps_week_sow_from_calendar},
        leap::Leap,
        navigation::{
            BroadcastOrbit, Ephemeris, Kepler, KeplerConvergence, Navigation, Perturbations,
            SatellitePosition,
        },
        observable::Observable,
        observation::{
            LliFlags, Observation, ObservationEpoch, SatelliteObservation, SignalObservation,
            SNR,
        },
        resolver::{Config, EphemerisSelection, Resolver, SatelliteState, StateSink, StateTable},
        version::Version,
    };

    pub use crate::navigation::Header as NavigationHeader;
    pub use crate::observation::Header as ObservationHeader;

    // pub re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch, TimeScale};
    pub use nalgebra::Vector3;
}
