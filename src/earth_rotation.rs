//! Earth rotation during signal propagation (Sagnac effect)
use nalgebra::{Rotation3, Vector3};

use crate::constants::Constants;

/// Returns the rotation that brings an ECEF position at emission time
/// into the ECEF frame at reception time, for this signal travel time [s].
pub fn rotation(travel_time: f64) -> Rotation3<f64> {
    let omega_tau = Constants::OMEGA_GPS * (travel_time + Constants::LIGHT_TIME_BIAS);
    Rotation3::from_axis_angle(&Vector3::z_axis(), -omega_tau)
}

/// Rotates the satellite `position` [m] by the Earth rotation angle
/// accumulated during `travel_time` [s].
pub fn rotate(travel_time: f64, position: Vector3<f64>) -> Vector3<f64> {
    rotation(travel_time) * position
}
