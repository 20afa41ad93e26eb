//! Datetime decoding helpers
use hifitime::{Epoch, TimeScale};

use crate::error::ParsingError;

mod flag;
pub use flag::EpochFlag;

/// Decodes a timescale descriptor, like "GPS" or "GAL"
pub(crate) fn parse_timescale(s: &str) -> Result<TimeScale, ParsingError> {
    match s.trim() {
        "GPS" | "GPST" => Ok(TimeScale::GPST),
        "GAL" | "GST" => Ok(TimeScale::GST),
        "BDS" | "BDT" => Ok(TimeScale::BDT),
        "QZS" | "QZSST" => Ok(TimeScale::QZSST),
        "GLO" | "UTC" => Ok(TimeScale::UTC),
        "TAI" => Ok(TimeScale::TAI),
        other => Err(ParsingError::TimescaleParsing(other.to_string())),
    }
}

/// Builds an [Epoch] from calendar fields expressed in `ts`.
/// Fractional seconds are preserved down to the nanosecond.
pub(crate) fn from_calendar(
    year: i32,
    month: u8,
    day: u8,
    hours: u8,
    minutes: u8,
    seconds: f64,
    ts: TimeScale,
) -> Result<Epoch, ParsingError> {
    let err = || {
        ParsingError::DatetimeParsing(format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{}",
            year, month, day, hours, minutes, seconds
        ))
    };
    if !(0.0..61.0).contains(&seconds) {
        return Err(err());
    }
    let whole = seconds.trunc();
    let nanos = (((seconds - whole) * 1.0E9).round() as u32).min(999_999_999);
    Epoch::maybe_from_gregorian(year, month, day, hours, minutes, whole as u8, nanos, ts)
        .map_err(|_| err())
}

/// Parses whitespace separated "yyyy mm dd hh mm ss[.sss]" content
pub(crate) fn parse_in_timescale(content: &str, ts: TimeScale) -> Result<Epoch, ParsingError> {
    let err = || ParsingError::DatetimeParsing(content.trim().to_string());
    let items: Vec<&str> = content.split_ascii_whitespace().collect();
    if items.len() != 6 {
        return Err(err());
    }
    let year = items[0].parse::<i32>().map_err(|_| err())?;
    let month = items[1].parse::<u8>().map_err(|_| err())?;
    let day = items[2].parse::<u8>().map_err(|_| err())?;
    let hours = items[3].parse::<u8>().map_err(|_| err())?;
    let minutes = items[4].parse::<u8>().map_err(|_| err())?;
    let seconds = items[5].parse::<f64>().map_err(|_| err())?;
    from_calendar(year, month, day, hours, minutes, seconds, ts)
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn calendar_decoding() {
        let epoch = parse_in_timescale("2024 05 02 00 00 00", TimeScale::GPST).unwrap();
        assert_eq!(epoch.time_scale, TimeScale::GPST);
        assert_eq!(
            epoch,
            Epoch::from_gregorian(2024, 5, 2, 0, 0, 0, 0, TimeScale::GPST)
        );

        let epoch = parse_in_timescale("2022 03 04 12 30 15.5000000", TimeScale::GPST).unwrap();
        assert_eq!(
            epoch,
            Epoch::from_gregorian(2022, 3, 4, 12, 30, 15, 500_000_000, TimeScale::GPST)
        );

        assert!(parse_in_timescale("2024 13 02 00 00 00", TimeScale::GPST).is_err());
        assert!(parse_in_timescale("2024 05 02 00 00", TimeScale::GPST).is_err());
        assert!(from_calendar(2024, 5, 2, 0, 0, -1.0, TimeScale::GPST).is_err());
    }
    #[test]
    fn timescales() {
        assert_eq!(parse_timescale("GPS"), Ok(TimeScale::GPST));
        assert_eq!(parse_timescale("GAL"), Ok(TimeScale::GST));
        assert_eq!(parse_timescale("BDT"), Ok(TimeScale::BDT));
        assert_eq!(parse_timescale("QZS"), Ok(TimeScale::QZSST));
        assert_eq!(parse_timescale("GLO"), Ok(TimeScale::UTC));
        assert!(parse_timescale("XYZ").is_err());
    }
}
