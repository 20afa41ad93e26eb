//! GPS week and seconds of week
use hifitime::{Epoch, TimeScale};

use crate::{epoch::from_calendar, error::ParsingError};

const NANOSECONDS_PER_SECOND: u64 = 1_000_000_000;

/// Returns the (GPS week, seconds of week) of this [Epoch].
/// Epochs expressed in another timescale are first converted to GPST.
pub fn gps_week_sow(epoch: Epoch) -> (u32, f64) {
    let (week, nanos) = epoch.to_time_scale(TimeScale::GPST).to_time_of_week();
    let seconds = (nanos / NANOSECONDS_PER_SECOND) as f64
        + (nanos % NANOSECONDS_PER_SECOND) as f64 * 1.0E-9;
    (week, seconds)
}

/// Returns the (GPS week, seconds of week) of calendar fields
/// directly expressed in GPST. No leap second is applied.
pub fn gps_week_sow_from_calendar(
    year: i32,
    month: u8,
    day: u8,
    hours: u8,
    minutes: u8,
    seconds: f64,
) -> Result<(u32, f64), ParsingError> {
    let epoch = from_calendar(year, month, day, hours, minutes, seconds, TimeScale::GPST)?;
    Ok(gps_week_sow(epoch))
}
