use log::warn;
use nalgebra::{Rotation3, Vector3};

use gnss::prelude::SV;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::Ephemeris;
use crate::constants::Constants;

/// [Kepler] stores all keplerian parameters
#[derive(Default, Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Kepler {
    /// Semi major axis [m]
    pub a: f64,
    /// Eccentricity (n.a)
    pub e: f64,
    /// Inclination angle at reference time [rad]
    pub i_0: f64,
    /// Longitude of ascending node at week epoch [rad]
    pub omega_0: f64,
    /// Mean anomaly at reference time [rad]
    pub m_0: f64,
    /// Argument of perigee [rad]
    pub omega: f64,
    /// Time of ephemeris [s of GPS week]
    pub toe: f64,
}

/// Orbit [Perturbations]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Perturbations {
    /// Mean motion difference from computed value [rad.s⁻¹]
    pub dn: f64,
    /// Inclination rate of change [rad.s⁻¹]
    pub i_dot: f64,
    /// Right ascension rate of change [rad.s⁻¹]
    pub omega_dot: f64,
    /// Amplitude of sine harmonic correction term of the argument
    /// of latitude [rad]
    pub cus: f64,
    /// Amplitude of cosine harmonic correction term of the argument
    /// of latitude [rad]
    pub cuc: f64,
    /// Amplitude of sine harmonic correction term of the angle of inclination [rad]
    pub cis: f64,
    /// Amplitude of cosine harmonic correction term of the angle of inclination [rad]
    pub cic: f64,
    /// Amplitude of sine harmonic correction term of the orbit radius [m]
    pub crs: f64,
    /// Amplitude of cosine harmonic correction term of the orbit radius [m]
    pub crc: f64,
}

/// Kepler solver diagnostics
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeplerConvergence {
    /// Number of iterations performed
    pub iterations: u8,
    /// False when the iteration cap was reached before
    /// the tolerance was met. The last iterate is used anyway.
    pub converged: bool,
}

/// Satellite state predicted by the broadcast orbit model
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SatellitePosition {
    /// ECEF position [m]
    pub position: Vector3<f64>,
    /// Satellite clock bias [s], relativistic term and TGD not included
    pub clock_bias: f64,
    /// Time from ephemeris reference epoch [s], within ±half a week
    pub t_k: f64,
    /// Kepler solver diagnostics
    pub kepler: KeplerConvergence,
}

/// Complete parameter set required by the orbit propagator
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BroadcastOrbit {
    pub sv: SV,
    pub kepler: Kepler,
    pub perturbations: Perturbations,
    /// (a0 [s], a1 [s.s⁻¹], a2 [s.s⁻²])
    pub clock: (f64, f64, f64),
}

/// Brings a time difference [s] into [-302400, 302400],
/// accounting for the beginning or end of week crossovers.
pub fn wrap_half_week(dt: f64) -> f64 {
    if !dt.is_finite() {
        return dt;
    }
    let half_week = Constants::HALF_WEEK_SECONDS;
    if (-half_week..=half_week).contains(&dt) {
        return dt;
    }
    // rem_euclid may round up to the week itself
    ((dt + half_week).rem_euclid(Constants::WEEK_SECONDS) - half_week).min(half_week)
}

/// Solves E = M + e.sin(E) by fixed point iteration, seeded with E = M.
pub(crate) fn eccentric_anomaly(m_k: f64, e: f64) -> (f64, KeplerConvergence) {
    let mut e_k = m_k;
    let mut convergence = KeplerConvergence::default();
    for i in 0..Constants::MAX_KEPLER_ITER {
        let e_k_lst = e_k;
        e_k = m_k + e * e_k_lst.sin();
        convergence.iterations = i + 1;
        if (e_k - e_k_lst).abs() < Constants::KEPLER_TOLERANCE {
            convergence.converged = true;
            break;
        }
    }
    (e_k, convergence)
}

impl Ephemeris {
    /// Retrieves Orbit Keplerian parameters
    pub fn kepler(&self) -> Option<Kepler> {
        Some(Kepler {
            a: self.get_orbit_f64("sqrta")?.powi(2),
            e: self.get_orbit_f64("e")?,
            i_0: self.get_orbit_f64("i0")?,
            omega: self.get_orbit_f64("omega")?,
            omega_0: self.get_orbit_f64("omega0")?,
            m_0: self.get_orbit_f64("m0")?,
            toe: self.get_orbit_f64("toe")?,
        })
    }

    /// Creates new [Ephemeris] frame from [Kepler]ian parameters
    pub fn with_kepler(&self, kepler: Kepler) -> Self {
        let mut s = self.clone();
        s.set_orbit_f64("sqrta", kepler.a.sqrt());
        s.set_orbit_f64("e", kepler.e);
        s.set_orbit_f64("i0", kepler.i_0);
        s.set_orbit_f64("omega", kepler.omega);
        s.set_orbit_f64("omega0", kepler.omega_0);
        s.set_orbit_f64("m0", kepler.m_0);
        s.set_orbit_f64("toe", kepler.toe);
        s
    }

    /// Retrieves Orbit [Perturbations]
    pub fn perturbations(&self) -> Option<Perturbations> {
        Some(Perturbations {
            cuc: self.get_orbit_f64("cuc")?,
            cus: self.get_orbit_f64("cus")?,
            cic: self.get_orbit_f64("cic")?,
            cis: self.get_orbit_f64("cis")?,
            crc: self.get_orbit_f64("crc")?,
            crs: self.get_orbit_f64("crs")?,
            dn: self.get_orbit_f64("deltaN")?,
            i_dot: self.get_orbit_f64("idot")?,
            omega_dot: self.get_orbit_f64("omegaDot")?,
        })
    }

    /// Creates new [Ephemeris] with desired Orbit [Perturbations]
    pub fn with_perturbations(&self, perturbations: Perturbations) -> Self {
        let mut s = self.clone();
        s.set_orbit_f64("cuc", perturbations.cuc);
        s.set_orbit_f64("cus", perturbations.cus);
        s.set_orbit_f64("cic", perturbations.cic);
        s.set_orbit_f64("cis", perturbations.cis);
        s.set_orbit_f64("crc", perturbations.crc);
        s.set_orbit_f64("crs", perturbations.crs);
        s.set_orbit_f64("deltaN", perturbations.dn);
        s.set_orbit_f64("idot", perturbations.i_dot);
        s.set_orbit_f64("omegaDot", perturbations.omega_dot);
        s
    }

    /// Gathers all parameters the propagator needs.
    /// Returns None if any of them was not broadcast.
    pub fn broadcast_orbit(&self) -> Option<BroadcastOrbit> {
        Some(BroadcastOrbit {
            sv: self.sv,
            kepler: self.kepler()?,
            perturbations: self.perturbations()?,
            clock: self.sv_clock()?,
        })
    }
}

impl BroadcastOrbit {
    /// Predicts satellite position and clock bias at `t` [s of GPS week].
    /// This does not account for the signal travel time, nor Earth rotation
    /// during that time.
    pub fn position_at(&self, t: f64) -> SatellitePosition {
        let (kepler, perturbations) = (&self.kepler, &self.perturbations);

        let n0 = (Constants::GM_GPS / kepler.a.powi(3)).sqrt();
        let n = n0 + perturbations.dn;
        let t_k = wrap_half_week(t - kepler.toe);

        let (a0, a1, a2) = self.clock;
        let clock_bias = a0 + a1 * t_k + a2 * t_k.powi(2);

        let m_k = kepler.m_0 + n * t_k;
        let (e_k, convergence) = eccentric_anomaly(m_k, kepler.e);
        if !convergence.converged {
            warn!(
                "{}: kepler solver did not converge within {} iterations (t_k={})",
                self.sv,
                Constants::MAX_KEPLER_ITER,
                t_k
            );
        }

        let (sin_e_k, cos_e_k) = e_k.sin_cos();
        let v_k = ((1.0 - kepler.e.powi(2)).sqrt() * sin_e_k).atan2(cos_e_k - kepler.e);

        let phi_k = v_k + kepler.omega;
        let (x2_sin_phi_k, x2_cos_phi_k) = (2.0 * phi_k).sin_cos();

        // second harmonic perturbations
        let du_k = perturbations.cus * x2_sin_phi_k + perturbations.cuc * x2_cos_phi_k;
        let dr_k = perturbations.crs * x2_sin_phi_k + perturbations.crc * x2_cos_phi_k;
        let di_k = perturbations.cis * x2_sin_phi_k + perturbations.cic * x2_cos_phi_k;

        let u_k = phi_k + du_k;
        let r_k = kepler.a * (1.0 - kepler.e * cos_e_k) + dr_k;
        let i_k = kepler.i_0 + perturbations.i_dot * t_k + di_k;

        let omega_k = kepler.omega_0 + (perturbations.omega_dot - Constants::OMEGA_GPS) * t_k
            - Constants::OMEGA_GPS * kepler.toe;

        let (sin_u_k, cos_u_k) = u_k.sin_cos();
        let orbit_xy = Vector3::new(r_k * cos_u_k, r_k * sin_u_k, 0.0);

        // Positive angles mean counterclockwise rotation
        let rotation_x = Rotation3::from_axis_angle(&Vector3::x_axis(), i_k);
        let rotation_z = Rotation3::from_axis_angle(&Vector3::z_axis(), omega_k);

        SatellitePosition {
            position: rotation_z * rotation_x * orbit_xy,
            clock_bias,
            t_k,
            kepler: convergence,
        }
    }
}
