//! Observation header section
use std::collections::{BTreeMap, HashMap};
use std::io::BufRead;
use std::str::FromStr;

use gnss::prelude::{Constellation, SV};
use hifitime::{Duration, Epoch, TimeScale};
use log::debug;
use num_integer::div_ceil;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    columns::{header_label, parse_f64, parse_int, slice},
    epoch::{from_calendar, parse_timescale},
    error::{Error, FormatError, ParsingError},
    leap::Leap,
    observable::Observable,
    reader::Lines,
    version::{parse_version_type, Version},
};

const OBS_TYPES: &str = "SYS / # / OBS TYPES";
const SCALE_FACTOR: &str = "SYS / SCALE FACTOR";
const PHASE_SHIFT: &str = "SYS / PHASE SHIFT";
const GLONASS_SLOTS: &str = "GLONASS SLOT / FRQ #";
const PRN_OBS: &str = "PRN / # OF OBS";

/// Receiver description
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rcvr {
    /// Serial number
    pub sn: String,
    /// Receiver model
    pub model: String,
    /// Firmware version
    pub firmware: String,
}

/// Receiver antenna description
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Antenna {
    /// Serial number
    pub sn: String,
    /// Antenna model and radome
    pub model: String,
}

/// Corrections applied to the observations, by a third party program
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Compensation {
    pub constellation: Constellation,
    /// Program used to apply the corrections
    pub program: String,
    /// Source of corrections
    pub url: String,
}

/// Scaling applied to some observations, prior to formatting
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScaleFactor {
    pub constellation: Constellation,
    /// Observations were multiplied by this factor
    pub factor: u16,
    /// Affected observables, all of them when empty
    pub observables: Vec<Observable>,
}

/// Phase shift correction applied to a carrier phase observable
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PhaseShift {
    pub constellation: Constellation,
    pub observable: Option<Observable>,
    /// Correction [cycles]
    pub correction: Option<f64>,
    /// Affected satellites, all of them when empty
    pub satellites: Vec<SV>,
}

/// Observation file header
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Header {
    /// Revision
    pub version: Version,
    /// Satellite system(s) of this file
    pub constellation: Option<Constellation>,
    /// Program that generated this file
    pub program: Option<String>,
    /// Agency that generated this file
    pub run_by: Option<String>,
    /// Creation date, as written
    pub date: Option<String>,
    pub comments: Vec<String>,
    pub marker_name: Option<String>,
    pub marker_number: Option<String>,
    pub marker_type: Option<String>,
    pub observer: Option<String>,
    pub agency: Option<String>,
    pub rcvr: Option<Rcvr>,
    pub antenna: Option<Antenna>,
    /// Approximate receiver position, ECEF [m]
    pub rx_position: Option<(f64, f64, f64)>,
    /// Antenna (height, eastern, northern) eccentricities [m]
    pub antenna_delta: Option<(f64, f64, f64)>,
    /// Observables declared per constellation, in column order
    pub codes: HashMap<Constellation, Vec<Observable>>,
    pub signal_strength_unit: Option<String>,
    pub sampling_interval: Option<Duration>,
    pub timeof_first_obs: Option<Epoch>,
    pub timeof_last_obs: Option<Epoch>,
    /// True when observations are corrected by the receiver clock offset
    pub clock_offset_applied: bool,
    pub dcb_compensations: Vec<Compensation>,
    pub pcv_compensations: Vec<Compensation>,
    pub scaling: Vec<ScaleFactor>,
    pub phase_shifts: Vec<PhaseShift>,
    /// Glonass frequency channels
    pub glonass_channels: HashMap<SV, i8>,
    pub leap: Option<Leap>,
    /// Number of satellites in this file
    pub nb_sat: Option<u32>,
    /// Number of observations per satellite and observable
    pub prn_obs: BTreeMap<SV, Vec<Option<u32>>>,
}

impl Header {
    /// Returns observables declared for this constellation
    pub fn observables(&self, constellation: Constellation) -> &[Observable] {
        self.codes
            .get(&constellation)
            .map(|codes| codes.as_slice())
            .unwrap_or(&[])
    }

    /// Decodes the header section, up to and including END OF HEADER
    pub(crate) fn parse<R: BufRead>(lines: &mut Lines<R>) -> Result<Self, Error> {
        let mut header = Self::default();
        let mut version: Option<Version> = None;
        loop {
            let line = lines.next_line()?.ok_or_else(|| {
                FormatError::new(lines.line_number(), ParsingError::MissingHeaderDelimiter)
            })?;
            let line_no = lines.line_number();
            let at = |kind| FormatError::new(line_no, kind);

            if line.contains("END OF HEADER") {
                break;
            }
            let Some((content, marker)) = header_label(&line) else {
                continue;
            };

            if marker == "COMMENT" {
                header.comments.push(content.trim_end().to_string());
            } else if marker.contains("RINEX VERSION / TYPE") {
                let (v, system) = parse_version_type(content, 'O', "OBSERVATION").map_err(at)?;
                version = Some(v);
                header.constellation = match system {
                    Some(c) => Some(parse_constellation(&c.to_string()).map_err(at)?),
                    None => Some(Constellation::GPS),
                };
            } else if marker.contains("PGM / RUN BY / DATE") {
                header.program = non_empty(slice(content, 0, 20));
                header.run_by = non_empty(slice(content, 20, 40));
                header.date = non_empty(slice(content, 40, 60));
            } else if marker.contains("MARKER NAME") {
                header.marker_name = non_empty(content);
            } else if marker.contains("MARKER NUMBER") {
                header.marker_number = non_empty(slice(content, 0, 20));
            } else if marker.contains("MARKER TYPE") {
                header.marker_type = non_empty(slice(content, 0, 20));
            } else if marker.contains("OBSERVER / AGENCY") {
                header.observer = non_empty(slice(content, 0, 20));
                header.agency = non_empty(slice(content, 20, 60));
            } else if marker.contains("REC # / TYPE / VERS") {
                header.rcvr = Some(Rcvr {
                    sn: slice(content, 0, 20).trim().to_string(),
                    model: slice(content, 20, 40).trim().to_string(),
                    firmware: slice(content, 40, 60).trim().to_string(),
                });
            } else if marker.contains("ANT # / TYPE") {
                header.antenna = Some(Antenna {
                    sn: slice(content, 0, 20).trim().to_string(),
                    model: slice(content, 20, 40).trim().to_string(),
                });
            } else if marker.contains("APPROX POSITION XYZ") {
                header.rx_position = parse_xyz(content).map_err(at)?;
            } else if marker.contains("ANTENNA: DELTA H/E/N") {
                header.antenna_delta = parse_xyz(content).map_err(at)?;
            } else if marker.contains(OBS_TYPES) {
                let (constellation, codes) = parse_obs_types(content, line_no, lines)?;
                header.codes.insert(constellation, codes);
            } else if marker.contains("SIGNAL STRENGTH UNIT") {
                header.signal_strength_unit = non_empty(slice(content, 0, 20));
            } else if marker.contains("INTERVAL") {
                header.sampling_interval =
                    parse_f64(slice(content, 0, 10)).map_err(at)?.map(Duration::from_seconds);
            } else if marker.contains("TIME OF FIRST OBS") {
                header.timeof_first_obs = Some(parse_time_of_obs(content).map_err(at)?);
            } else if marker.contains("TIME OF LAST OBS") {
                header.timeof_last_obs = Some(parse_time_of_obs(content).map_err(at)?);
            } else if marker.contains("RCV CLOCK OFFS APPL") {
                header.clock_offset_applied =
                    parse_int::<u8>(slice(content, 0, 6)).map_err(at)? == Some(1);
            } else if marker.contains("SYS / DCBS APPLIED") {
                if let Some(compensation) = parse_compensation(content).map_err(at)? {
                    header.dcb_compensations.push(compensation);
                }
            } else if marker.contains("SYS / PCVS APPLIED") {
                if let Some(compensation) = parse_compensation(content).map_err(at)? {
                    header.pcv_compensations.push(compensation);
                }
            } else if marker.contains(SCALE_FACTOR) {
                header.scaling.push(parse_scale_factor(content, line_no, lines)?);
            } else if marker.contains(PHASE_SHIFT) {
                header.phase_shifts.push(parse_phase_shift(content, line_no, lines)?);
            } else if marker.contains(GLONASS_SLOTS) {
                parse_glonass_slots(content, line_no, lines, &mut header.glonass_channels)?;
            } else if marker.contains("LEAP SECONDS") {
                header.leap = Some(Leap::from_str(content).map_err(at)?);
            } else if marker.contains("# OF SATELLITES") {
                header.nb_sat = parse_int::<u32>(slice(content, 0, 6)).map_err(at)?;
            } else if marker.contains(PRN_OBS) {
                let (sv, counts) = parse_prn_obs(content, line_no, lines, &header.codes)?;
                header.prn_obs.insert(sv, counts);
            } else {
                debug!("line {}: ignoring \"{}\"", line_no, marker);
            }
        }
        header.version = version
            .ok_or_else(|| FormatError::new(lines.line_number(), ParsingError::MissingVersion))?;
        Ok(header)
    }
}

fn non_empty(field: &str) -> Option<String> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_constellation(field: &str) -> Result<Constellation, ParsingError> {
    let trimmed = field.trim();
    Constellation::from_str(trimmed)
        .map_err(|_| ParsingError::ConstellationParsing(trimmed.to_string()))
}

fn parse_sv(field: &str) -> Result<SV, ParsingError> {
    let trimmed = field.trim();
    SV::from_str(trimmed).map_err(|_| ParsingError::SvParsing(trimmed.to_string()))
}

/// 3F14.4 triplet, absent if any coordinate is blank
fn parse_xyz(content: &str) -> Result<Option<(f64, f64, f64)>, ParsingError> {
    let x = parse_f64(slice(content, 0, 14))?;
    let y = parse_f64(slice(content, 14, 28))?;
    let z = parse_f64(slice(content, 28, 42))?;
    match (x, y, z) {
        (Some(x), Some(y), Some(z)) => Ok(Some((x, y, z))),
        _ => Ok(None),
    }
}

/// 5I6,F13.7,5X,A3
fn parse_time_of_obs(content: &str) -> Result<Epoch, ParsingError> {
    let err = || ParsingError::DatetimeParsing(content.trim().to_string());
    let year = parse_int::<i32>(slice(content, 0, 6))?.ok_or_else(err)?;
    let month = parse_int::<u8>(slice(content, 6, 12))?.ok_or_else(err)?;
    let day = parse_int::<u8>(slice(content, 12, 18))?.ok_or_else(err)?;
    let hours = parse_int::<u8>(slice(content, 18, 24))?.ok_or_else(err)?;
    let minutes = parse_int::<u8>(slice(content, 24, 30))?.ok_or_else(err)?;
    let seconds = parse_f64(slice(content, 30, 43))?.ok_or_else(err)?;
    let system = slice(content, 48, 51).trim();
    let ts = if system.is_empty() {
        TimeScale::GPST
    } else {
        parse_timescale(system)?
    };
    from_calendar(year, month, day, hours, minutes, seconds, ts)
}

/// A1,1X,A17,1X,A40
fn parse_compensation(content: &str) -> Result<Option<Compensation>, ParsingError> {
    let system = slice(content, 0, 1).trim();
    if system.is_empty() {
        return Ok(None);
    }
    Ok(Some(Compensation {
        constellation: parse_constellation(system)?,
        program: slice(content, 2, 19).trim().to_string(),
        url: slice(content, 20, 60).trim().to_string(),
    }))
}

/// Pulls the next line of a multi line record, which must carry the same label
fn continuation<R: BufRead>(
    lines: &mut Lines<R>,
    label: &'static str,
    expected: usize,
    found: usize,
) -> Result<String, Error> {
    let mismatch = |line_no| {
        FormatError::new(
            line_no,
            ParsingError::CountMismatch {
                label,
                expected,
                found,
            },
        )
    };
    match lines.next_line()? {
        Some(line) => {
            let same_label = header_label(&line).map_or(false, |(_, marker)| marker.contains(label));
            if same_label {
                Ok(line)
            } else {
                Err(mismatch(lines.line_number()).into())
            }
        },
        None => Err(mismatch(lines.line_number()).into()),
    }
}

/// Collects 4 byte wide items starting at `offset`, up to `max` items or `expected` total.
/// Stops on the first blank item.
fn collect_items<'a>(
    line: &'a str,
    offset: usize,
    max: usize,
    expected: usize,
    collected: usize,
) -> Vec<&'a str> {
    let mut items = Vec::with_capacity(max);
    for nth in 0..max {
        if collected + items.len() == expected {
            break;
        }
        let start = offset + nth * 4;
        let item = slice(line, start, start + 4).trim();
        if item.is_empty() {
            break;
        }
        items.push(item);
    }
    items
}

/// A1,2X,I3,13(1X,A3) then 6X,13(1X,A3) continuations
fn parse_obs_types<R: BufRead>(
    content: &str,
    line_no: usize,
    lines: &mut Lines<R>,
) -> Result<(Constellation, Vec<Observable>), Error> {
    const PER_LINE: usize = 13;
    let at = |line_no, kind| FormatError::new(line_no, kind);

    let constellation = parse_constellation(slice(content, 0, 1)).map_err(|e| at(line_no, e))?;
    let expected = parse_int::<usize>(slice(content, 3, 6))
        .map_err(|e| at(line_no, e))?
        .unwrap_or(0);

    let mut codes = Vec::with_capacity(expected);
    for item in collect_items(content, 6, PER_LINE, expected, 0) {
        codes.push(Observable::from_str(item).map_err(|e| at(line_no, e))?);
    }
    while codes.len() < expected {
        let line = continuation(lines, OBS_TYPES, expected, codes.len())?;
        let line_no = lines.line_number();
        for item in collect_items(&line, 6, PER_LINE, expected, codes.len()) {
            codes.push(Observable::from_str(item).map_err(|e| at(line_no, e))?);
        }
    }
    Ok((constellation, codes))
}

/// A1,1X,I4,2X,I2,12(1X,A3) then 10X,12(1X,A3) continuations
fn parse_scale_factor<R: BufRead>(
    content: &str,
    line_no: usize,
    lines: &mut Lines<R>,
) -> Result<ScaleFactor, Error> {
    const PER_LINE: usize = 12;
    let at = |line_no, kind| FormatError::new(line_no, kind);

    let constellation = parse_constellation(slice(content, 0, 1)).map_err(|e| at(line_no, e))?;
    let factor = parse_int::<u16>(slice(content, 2, 6))
        .map_err(|e| at(line_no, e))?
        .unwrap_or(1);
    let expected = parse_int::<usize>(slice(content, 8, 10))
        .map_err(|e| at(line_no, e))?
        .unwrap_or(0);

    let mut observables = Vec::with_capacity(expected);
    for item in collect_items(content, 10, PER_LINE, expected, 0) {
        observables.push(Observable::from_str(item).map_err(|e| at(line_no, e))?);
    }
    while observables.len() < expected {
        let line = continuation(lines, SCALE_FACTOR, expected, observables.len())?;
        let line_no = lines.line_number();
        for item in collect_items(&line, 10, PER_LINE, expected, observables.len()) {
            observables.push(Observable::from_str(item).map_err(|e| at(line_no, e))?);
        }
    }
    Ok(ScaleFactor {
        constellation,
        factor,
        observables,
    })
}

/// A1,1X,A3,1X,F8.5,2X,I2.2,10(1X,A3) then 18X,10(1X,A3) continuations
fn parse_phase_shift<R: BufRead>(
    content: &str,
    line_no: usize,
    lines: &mut Lines<R>,
) -> Result<PhaseShift, Error> {
    const PER_LINE: usize = 10;
    let at = |line_no, kind| FormatError::new(line_no, kind);

    let constellation = parse_constellation(slice(content, 0, 1)).map_err(|e| at(line_no, e))?;
    let code = slice(content, 2, 5).trim();
    let observable = if code.is_empty() {
        None
    } else {
        Some(Observable::from_str(code).map_err(|e| at(line_no, e))?)
    };
    let correction = parse_f64(slice(content, 6, 14)).map_err(|e| at(line_no, e))?;
    let expected = parse_int::<usize>(slice(content, 16, 18))
        .map_err(|e| at(line_no, e))?
        .unwrap_or(0);

    let mut satellites = Vec::with_capacity(expected);
    for item in collect_items(content, 18, PER_LINE, expected, 0) {
        satellites.push(parse_sv(item).map_err(|e| at(line_no, e))?);
    }
    while satellites.len() < expected {
        let line = continuation(lines, PHASE_SHIFT, expected, satellites.len())?;
        let line_no = lines.line_number();
        for item in collect_items(&line, 18, PER_LINE, expected, satellites.len()) {
            satellites.push(parse_sv(item).map_err(|e| at(line_no, e))?);
        }
    }
    Ok(PhaseShift {
        constellation,
        observable,
        correction,
        satellites,
    })
}

/// I3,1X,8(A1,I2.2,1X,I2,1X) then 4X,8(A1,I2.2,1X,I2,1X) continuations
fn parse_glonass_slots<R: BufRead>(
    content: &str,
    line_no: usize,
    lines: &mut Lines<R>,
    channels: &mut HashMap<SV, i8>,
) -> Result<(), Error> {
    const PER_LINE: usize = 8;
    const WIDTH: usize = 7;
    let at = |line_no, kind| FormatError::new(line_no, kind);

    let expected = parse_int::<usize>(slice(content, 0, 3))
        .map_err(|e| at(line_no, e))?
        .unwrap_or(0);

    let mut found = 0;
    let mut line = content.to_string();
    let mut line_no = line_no;
    loop {
        for nth in 0..PER_LINE {
            if found == expected {
                break;
            }
            let start = 4 + nth * WIDTH;
            let svnn = slice(&line, start, start + 3).trim();
            if svnn.is_empty() {
                break;
            }
            let sv = parse_sv(svnn).map_err(|e| at(line_no, e))?;
            let channel = parse_int::<i8>(slice(&line, start + 4, start + 6))
                .map_err(|e| at(line_no, e))?
                .ok_or_else(|| at(line_no, ParsingError::NumericField(slice(&line, start, start + 6).to_string())))?;
            channels.insert(sv, channel);
            found += 1;
        }
        if found >= expected {
            return Ok(());
        }
        line = continuation(lines, GLONASS_SLOTS, expected, found)?;
        line_no = lines.line_number();
    }
}

/// 3X,A1,I2.2,9I6 then 6X,9I6 continuations.
/// One count per observable declared for that constellation.
fn parse_prn_obs<R: BufRead>(
    content: &str,
    line_no: usize,
    lines: &mut Lines<R>,
    codes: &HashMap<Constellation, Vec<Observable>>,
) -> Result<(SV, Vec<Option<u32>>), Error> {
    const PER_LINE: usize = 9;
    let at = |line_no, kind| FormatError::new(line_no, kind);

    let sv = parse_sv(slice(content, 3, 6)).map_err(|e| at(line_no, e))?;
    let expected = codes
        .get(&sv.constellation)
        .map(|codes| codes.len())
        .unwrap_or(PER_LINE);

    let mut counts = Vec::with_capacity(expected);
    let nb_lines = div_ceil(expected, PER_LINE);
    let mut line = content.to_string();
    let mut line_no = line_no;
    for nth in 0..nb_lines {
        if nth > 0 {
            line = continuation(lines, PRN_OBS, expected, counts.len())?;
            line_no = lines.line_number();
            if !slice(&line, 3, 6).trim().is_empty() {
                return Err(at(
                    line_no,
                    ParsingError::CountMismatch {
                        label: PRN_OBS,
                        expected,
                        found: counts.len(),
                    },
                )
                .into());
            }
        }
        let on_this_line = PER_LINE.min(expected - counts.len());
        for i in 0..on_this_line {
            let start = 6 + i * 6;
            counts.push(parse_int::<u32>(slice(&line, start, start + 6)).map_err(|e| at(line_no, e))?);
        }
    }
    Ok((sv, counts))
}
