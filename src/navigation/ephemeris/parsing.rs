use std::io::BufRead;
use std::str::FromStr;

use gnss::prelude::SV;
use hifitime::TimeScale;

use super::{Ephemeris, GPS_LNAV_ORBITS};

use crate::{
    columns::{parse_f64, slice},
    epoch::parse_in_timescale,
    error::{Error, FormatError, ParsingError},
    reader::Lines,
};

/// SV identifier and epoch span the first 23 bytes of each record line
pub(crate) const RECORD_PREFIX_WIDTH: usize = 23;

/// 4X offset of continuation lines
const CONTINUATION_OFFSET: usize = 4;

/// D19.12 fields
const FIELD_WIDTH: usize = 19;

const FIELDS_PER_LINE: usize = 4;

fn check_length(line: &str, line_no: usize) -> Result<(), FormatError> {
    if line.len() < RECORD_PREFIX_WIDTH {
        Err(FormatError::new(
            line_no,
            ParsingError::LineTooShort {
                expected: RECORD_PREFIX_WIDTH,
                found: line.len(),
            },
        ))
    } else {
        Ok(())
    }
}

impl Ephemeris {
    /// Decodes a GPS LNAV record, `first` being its already
    /// consumed SV / epoch / clock line. The seven orbit lines
    /// are pulled from `lines`.
    pub(crate) fn parse_gps_lnav<R: BufRead>(
        first: &str,
        lines: &mut Lines<R>,
    ) -> Result<Self, Error> {
        let line_no = lines.line_number();
        let at = |kind| FormatError::new(line_no, kind);

        check_length(first, line_no)?;

        let svnn = slice(first, 0, 3).trim();
        let sv = SV::from_str(svnn).map_err(|_| at(ParsingError::SvParsing(svnn.to_string())))?;

        let toc = parse_in_timescale(slice(first, 4, 23), TimeScale::GPST).map_err(at)?;

        let mut ephemeris = Self::new(sv, toc);
        ephemeris.clock_bias = parse_f64(slice(first, 23, 42)).map_err(at)?;
        ephemeris.clock_drift = parse_f64(slice(first, 42, 61)).map_err(at)?;
        ephemeris.clock_drift_rate = parse_f64(slice(first, 61, 80)).map_err(at)?;

        for fields in GPS_LNAV_ORBITS.chunks(FIELDS_PER_LINE) {
            let line = lines
                .next_line()?
                .ok_or_else(|| FormatError::new(lines.line_number(), ParsingError::UnexpectedEof))?;
            let line_no = lines.line_number();
            let at = |kind| FormatError::new(line_no, kind);

            if !line.starts_with(' ') {
                return Err(at(ParsingError::TruncatedRecord).into());
            }
            check_length(&line, line_no)?;

            for (nth, field) in fields.iter().enumerate() {
                let start = CONTINUATION_OFFSET + nth * FIELD_WIDTH;
                let content = slice(&line, start, start + FIELD_WIDTH);
                if let Some(value) = parse_f64(content).map_err(at)? {
                    ephemeris.set_orbit_f64(field, value);
                }
            }
        }
        Ok(ephemeris)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tests::toolkit::G01_RECORD;
    use hifitime::Epoch;

    fn parse_record(content: &str) -> Result<Ephemeris, Error> {
        let mut lines = Lines::new(content.as_bytes());
        let first = lines.next_line().unwrap().unwrap();
        Ephemeris::parse_gps_lnav(&first, &mut lines)
    }

    #[test]
    fn gps_lnav_record() {
        let eph = parse_record(G01_RECORD).unwrap();
        assert_eq!(eph.sv, SV::from_str("G01").unwrap());
        assert_eq!(
            eph.toc,
            Epoch::from_gregorian(2024, 5, 2, 0, 0, 0, 0, TimeScale::GPST)
        );
        assert_eq!(
            eph.sv_clock(),
            Some((2.300604246557E-04, -8.526512829121E-12, 0.0))
        );
        for (field, value) in [
            ("iode", 16.0),
            ("crs", -91.4375),
            ("deltaN", 4.136600592510E-09),
            ("m0", 2.495136982937),
            ("cuc", -4.818290472031E-06),
            ("e", 1.181444176473E-02),
            ("cus", 1.040473580360E-05),
            ("sqrta", 5.153595649719E+03),
            ("toe", 345600.0),
            ("cic", 2.980232238770E-08),
            ("omega0", -1.047452380611),
            ("cis", -1.210719347000E-07),
            ("i0", 9.879990110923E-01),
            ("crc", 189.65625),
            ("omega", 9.383782009393E-01),
            ("omegaDot", -7.824254250041E-09),
            ("idot", 1.882935871394E-10),
            ("l2Codes", 1.0),
            ("week", 2312.0),
            ("l2pDataFlag", 0.0),
            ("accuracy", 2.0),
            ("health", 0.0),
            ("tgd", 4.656612873077E-09),
            ("iodc", 16.0),
            ("t_tm", 338418.0),
            ("fitInt", 4.0),
        ] {
            assert_eq!(eph.get_orbit_f64(field), Some(value), "bad \"{}\" value", field);
        }
        // blank trailing fields are absent
        assert_eq!(eph.get_orbit_f64("spare1"), None);
        assert_eq!(eph.get_orbit_f64("spare2"), None);
        assert_eq!(eph.week(), Some(2312));
        assert!(eph.is_healthy());
    }

    #[test]
    fn truncated_records() {
        let lines: Vec<&str> = G01_RECORD.lines().collect();

        // end of file in the middle of a record
        let content = lines[..5].join("\n");
        match parse_record(&content) {
            Err(Error::Format(e)) => {
                assert_eq!(e.kind, ParsingError::UnexpectedEof);
                assert_eq!(e.line, 5);
            },
            other => panic!("expecting format error, got {:?}", other),
        }

        // record interrupted by a new record
        let mut content = lines[..4].join("\n");
        content.push('\n');
        content.push_str(lines[0]);
        match parse_record(&content) {
            Err(Error::Format(e)) => {
                assert_eq!(e.kind, ParsingError::TruncatedRecord);
                assert_eq!(e.line, 5);
            },
            other => panic!("expecting format error, got {:?}", other),
        }

        // orbit line shorter than its first field
        let mut content = lines[..3].join("\n");
        content.push_str("\n     1.0\n");
        content.push_str(&lines[4..].join("\n"));
        match parse_record(&content) {
            Err(Error::Format(e)) => {
                assert_eq!(
                    e.kind,
                    ParsingError::LineTooShort {
                        expected: 23,
                        found: 8
                    }
                );
                assert_eq!(e.line, 4);
            },
            other => panic!("expecting format error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_fields() {
        let content = G01_RECORD.replacen("-9.143750000000D+01", "-9.14375000000XD+01", 1);
        match parse_record(&content) {
            Err(Error::Format(e)) => {
                assert_eq!(e.line, 2);
                assert!(matches!(e.kind, ParsingError::NumericField(_)));
            },
            other => panic!("expecting format error, got {:?}", other),
        }
        let content = G01_RECORD.replacen("G01", "Z01", 1);
        assert!(parse_record(&content).is_err());
    }
}
