use std::io::BufRead;
use std::str::FromStr;

use gnss::prelude::{Constellation, SV};
use hifitime::TimeScale;
use log::debug;

use super::{Header, LliFlags, ObservationEpoch, SatelliteObservation, SignalObservation, SNR};

use crate::{
    columns::{parse_f64, parse_f64_lenient, parse_int, slice},
    epoch::{from_calendar, EpochFlag},
    error::{Error, FormatError, ParsingError},
    observable::Observable,
    reader::Lines,
};

/// Shortest valid epoch descriptor: up to the number of satellites
const EPOCH_DESCRIPTOR_WIDTH: usize = 35;

/// Receiver clock offset is F15.12 after 6X
const CLOCK_OFFSET_COLUMN: usize = 41;

/// A3 satellite identifier
const SVNN_WIDTH: usize = 3;

/// F14.3,I1,I1
const OBSERVABLE_WIDTH: usize = 16;

/// Returns true if this line opens a new epoch
pub(crate) fn is_new_epoch(line: &str) -> bool {
    line.starts_with('>')
}

/// Decodes "> yyyy mm dd hh mm ss.sssssss  f nnn      clock",
/// the calendar being expressed in `ts`
fn parse_epoch_descriptor(
    line: &str,
    ts: TimeScale,
) -> Result<(hifitime::Epoch, EpochFlag, usize, Option<f64>), ParsingError> {
    if line.len() < EPOCH_DESCRIPTOR_WIDTH {
        return Err(ParsingError::LineTooShort {
            expected: EPOCH_DESCRIPTOR_WIDTH,
            found: line.len(),
        });
    }
    let err = || ParsingError::DatetimeParsing(slice(line, 2, 29).trim().to_string());
    let year = parse_int::<i32>(slice(line, 2, 6))?.ok_or_else(err)?;
    let month = parse_int::<u8>(slice(line, 7, 9))?.ok_or_else(err)?;
    let day = parse_int::<u8>(slice(line, 10, 12))?.ok_or_else(err)?;
    let hours = parse_int::<u8>(slice(line, 13, 15))?.ok_or_else(err)?;
    let minutes = parse_int::<u8>(slice(line, 16, 18))?.ok_or_else(err)?;
    let seconds = parse_f64(slice(line, 18, 29))?.ok_or_else(err)?;
    let epoch = from_calendar(year, month, day, hours, minutes, seconds, ts)?;

    let flag = EpochFlag::from_str(slice(line, 31, 32))?;

    let num_sat = parse_int::<usize>(slice(line, 32, 35))?
        .ok_or_else(|| ParsingError::NumericField(slice(line, 32, 35).to_string()))?;

    let clock_offset = if line.len() > CLOCK_OFFSET_COLUMN {
        parse_f64(slice(line, CLOCK_OFFSET_COLUMN, CLOCK_OFFSET_COLUMN + 15))?
    } else {
        None
    };

    Ok((epoch, flag, num_sat, clock_offset))
}

/// Decodes one 16 byte slot per declared observable.
/// Slots past the end of line are absent.
fn parse_signals(line: &str, observables: &[Observable]) -> Vec<SignalObservation> {
    observables
        .iter()
        .enumerate()
        .map(|(nth, observable)| {
            let start = SVNN_WIDTH + nth * OBSERVABLE_WIDTH;
            let content = slice(line, start, start + OBSERVABLE_WIDTH);
            SignalObservation {
                observable: observable.clone(),
                value: parse_f64_lenient(slice(content, 0, 14)),
                lli: LliFlags::from_field(slice(content, 14, 15)),
                snr: SNR::from_str(slice(content, 15, 16)).ok(),
            }
        })
        .collect()
}

impl ObservationEpoch {
    /// Decodes an epoch, `descriptor` being its already consumed epoch line.
    /// Satellite (or special record) lines are pulled from `lines`.
    pub(crate) fn parse<R: BufRead>(
        descriptor: &str,
        header: &Header,
        lines: &mut Lines<R>,
    ) -> Result<Self, Error> {
        let line_no = lines.line_number();
        let ts = header
            .timeof_first_obs
            .map(|t| t.time_scale)
            .unwrap_or(TimeScale::GPST);
        let (epoch, flag, num_sat, clock_offset) =
            parse_epoch_descriptor(descriptor, ts).map_err(|e| FormatError::new(line_no, e))?;

        let mut satellites = Vec::with_capacity(num_sat);
        let missing = |line_no, found| {
            FormatError::new(
                line_no,
                ParsingError::MissingSatellites {
                    expected: num_sat,
                    found,
                },
            )
        };

        if flag.has_observations() {
            let observables = header.observables(Constellation::GPS);
            let mut found = 0;
            while found < num_sat {
                let line = lines
                    .next_line()?
                    .ok_or_else(|| missing(lines.line_number(), found))?;
                let line_no = lines.line_number();
                if line.trim().is_empty() {
                    continue;
                }
                if is_new_epoch(&line) {
                    return Err(missing(line_no, found).into());
                }
                found += 1;

                let svnn = slice(&line, 0, SVNN_WIDTH).trim();
                let sv = SV::from_str(svnn).map_err(|_| {
                    FormatError::new(line_no, ParsingError::SvParsing(svnn.to_string()))
                })?;
                if sv.constellation != Constellation::GPS {
                    continue;
                }
                satellites.push(SatelliteObservation {
                    sv,
                    signals: parse_signals(&line, observables),
                });
            }
        } else {
            // special records
            for found in 0..num_sat {
                if lines.next_line()?.is_none() {
                    return Err(missing(lines.line_number(), found).into());
                }
            }
            debug!("{}: event flag {}, {} special records", epoch, flag, num_sat);
        }

        Ok(Self {
            epoch,
            flag,
            num_sat,
            clock_offset,
            satellites,
        })
    }
}
