//! Physical constants of the GPS broadcast orbit model

/// Constants shared by the orbit propagator and the resolver
pub struct Constants;

impl Constants {
    /// Speed of light in vacuum [m.s⁻¹]
    pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
    /// WGS84 Earth gravitational constant [m³.s⁻²]
    pub const GM_GPS: f64 = 3.986004418E14;
    /// WGS84 Earth rotation rate [rad.s⁻¹]
    pub const OMEGA_GPS: f64 = 7.2921151467E-5;
    /// Seconds in one GPS week
    pub const WEEK_SECONDS: f64 = 604_800.0;
    /// Half a GPS week [s]
    pub const HALF_WEEK_SECONDS: f64 = 302_400.0;
    /// Maximal number of Kepler solver iterations
    pub const MAX_KEPLER_ITER: u8 = 10;
    /// Kepler solver convergence threshold [rad]
    pub const KEPLER_TOLERANCE: f64 = 1.0E-12;
    /// Fixed bias added to the signal travel time
    /// when rotating into the reception frame [s]
    pub const LIGHT_TIME_BIAS: f64 = 0.00173454;
}
