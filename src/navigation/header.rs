//! Navigation header section
use std::io::BufRead;
use std::str::FromStr;

use regex::Regex;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    columns::{header_label, parse_f64, parse_int, slice},
    error::{Error, FormatError, ParsingError},
    leap::Leap,
    reader::Lines,
    version::{parse_version_type, Version},
};

lazy_static! {
    /// Floating point values of a DELTA-UTC: A0,A1,T,W line
    static ref DELTA_UTC_VALUES: Regex = Regex::new(r"[-+]?\d*\.\d+E[-+]?\d+").unwrap();
}

/// GPS to UTC offset model: A0 + A1 (t - t_ref)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct UtcPolynomial {
    /// Offset [s]
    pub a0: f64,
    /// Drift [s.s⁻¹]
    pub a1: f64,
    /// Reference time [s of GPS week]
    pub t_ref: Option<u32>,
    /// Reference week
    pub week: Option<u32>,
}

/// Navigation file header
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Header {
    /// Revision
    pub version: Version,
    /// Program that generated this file
    pub program: Option<String>,
    /// Agency that generated this file
    pub run_by: Option<String>,
    /// Creation date, as written
    pub date: Option<String>,
    /// GPS Klobuchar alpha coefficients
    pub ion_alpha: Option<[f64; 4]>,
    /// GPS Klobuchar beta coefficients
    pub ion_beta: Option<[f64; 4]>,
    /// GPS to UTC offset model
    pub utc: Option<UtcPolynomial>,
    pub leap: Option<Leap>,
    pub comments: Vec<String>,
}

/// Klobuchar coefficients of an IONOSPHERIC CORR line
fn parse_klobuchar(content: &str, offset: usize) -> Result<Option<[f64; 4]>, ParsingError> {
    let mut coefs = [0.0_f64; 4];
    for (nth, coef) in coefs.iter_mut().enumerate() {
        let start = offset + nth * 12;
        match parse_f64(slice(content, start, start + 12))? {
            Some(value) => *coef = value,
            None => return Ok(None),
        }
    }
    Ok(Some(coefs))
}

/// "GPUT" TIME SYSTEM CORR content: A4,1X,D17.10,D16.9,1X,I6,1X,I4
fn parse_time_system_corr(content: &str) -> Result<Option<UtcPolynomial>, ParsingError> {
    let a0 = parse_f64(slice(content, 5, 22))?;
    let a1 = parse_f64(slice(content, 22, 38))?;
    match (a0, a1) {
        (Some(a0), Some(a1)) => Ok(Some(UtcPolynomial {
            a0,
            a1,
            t_ref: parse_int::<u32>(slice(content, 38, 45))?,
            week: parse_int::<u32>(slice(content, 45, 50))?,
        })),
        _ => Ok(None),
    }
}

/// DELTA-UTC: A0,A1,T,W content: 3X,2D19.12,2I9
fn parse_delta_utc(content: &str) -> Result<Option<UtcPolynomial>, ParsingError> {
    let normalized = slice(content, 3, 41).replace(&['D', 'd'][..], "E");
    let values: Vec<&str> = DELTA_UTC_VALUES
        .find_iter(&normalized)
        .map(|m| m.as_str())
        .collect();
    if values.len() != 2 {
        return Ok(None);
    }
    let a0 = f64::from_str(values[0]).map_err(|_| ParsingError::NumericField(values[0].to_string()))?;
    let a1 = f64::from_str(values[1]).map_err(|_| ParsingError::NumericField(values[1].to_string()))?;
    Ok(Some(UtcPolynomial {
        a0,
        a1,
        t_ref: parse_int::<u32>(slice(content, 41, 50))?,
        week: parse_int::<u32>(slice(content, 50, 59))?,
    }))
}

impl Header {
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
                let (v, _) = parse_version_type(content, 'N', "NAVIGATION").map_err(at)?;
                version = Some(v);
            } else if marker.contains("PGM / RUN BY / DATE") {
                header.program = non_empty(slice(content, 0, 20));
                header.run_by = non_empty(slice(content, 20, 40));
                header.date = non_empty(slice(content, 40, 60));
            } else if marker.contains("IONOSPHERIC CORR") {
                match slice(content, 0, 4) {
                    "GPSA" => header.ion_alpha = parse_klobuchar(content, 5).map_err(at)?,
                    "GPSB" => header.ion_beta = parse_klobuchar(content, 5).map_err(at)?,
                    _ => {},
                }
            } else if marker.contains("ION ALPHA") {
                header.ion_alpha = parse_klobuchar(content, 2).map_err(at)?;
            } else if marker.contains("ION BETA") {
                header.ion_beta = parse_klobuchar(content, 2).map_err(at)?;
            } else if marker.contains("TIME SYSTEM CORR") {
                if slice(content, 0, 4) == "GPUT" {
                    header.utc = parse_time_system_corr(content).map_err(at)?;
                }
            } else if marker.contains("DELTA-UTC") {
                header.utc = parse_delta_utc(content).map_err(at)?;
            } else if marker.contains("LEAP SECONDS") {
                header.leap = Some(Leap::from_str(content).map_err(at)?);
            }
        }
        header.version =
            version.ok_or_else(|| FormatError::new(lines.line_number(), ParsingError::MissingVersion))?;
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

#[cfg(test)]
mod test {
    use super::*;
    use crate::tests::toolkit::NAV_HEADER;

    fn parse(content: &str) -> Result<Header, Error> {
        let mut lines = Lines::new(content.as_bytes());
        Header::parse(&mut lines)
    }

    #[test]
    fn navigation_header() {
        let header = parse(NAV_HEADER).unwrap();
        assert_eq!(header.version, Version::new(3, 5));
        assert_eq!(header.program.as_deref(), Some("gfzrnx-2.1.0"));
        assert_eq!(header.run_by.as_deref(), Some("FILE MERGE"));
        assert_eq!(header.date.as_deref(), Some("20240503 000535 UTC"));
        assert_eq!(
            header.ion_alpha,
            Some([1.1176E-08, 7.4506E-09, -5.9605E-08, -5.9605E-08])
        );
        assert_eq!(
            header.ion_beta,
            Some([9.0112E+04, 1.6384E+04, -1.9661E+05, -6.5536E+04])
        );
        assert_eq!(
            header.utc,
            Some(UtcPolynomial {
                a0: 0.9313225746E-09,
                a1: -0.222044605E-15,
                t_ref: Some(233472),
                week: Some(2312),
            })
        );
        assert_eq!(
            header.leap,
            Some(Leap {
                leap: 18,
                delta_tls: Some(18),
                week: Some(2185),
                day: Some(7),
                timescale: None,
            })
        );
    }

    #[test]
    fn delta_utc() {
        let line = format!(
            "{:<60}{}",
            "    0.133179128170D-06 0.107469588780D-12   552960     2060", "DELTA-UTC: A0,A1,T,W"
        );
        let utc = parse_delta_utc(&line[..60]).unwrap().unwrap();
        assert_eq!(utc.a0, 0.133179128170E-06);
        assert_eq!(utc.a1, 0.107469588780E-12);
        assert_eq!(utc.t_ref, Some(552960));
        assert_eq!(utc.week, Some(2060));
    }

    #[test]
    fn header_errors() {
        // missing delimiter
        let content: String = NAV_HEADER
            .lines()
            .filter(|l| !l.contains("END OF HEADER"))
            .map(|l| format!("{}\n", l))
            .collect();
        match parse(&content) {
            Err(Error::Format(e)) => assert_eq!(e.kind, ParsingError::MissingHeaderDelimiter),
            other => panic!("expecting format error, got {:?}", other),
        }

        // missing version
        let content: String = NAV_HEADER
            .lines()
            .filter(|l| !l.contains("RINEX VERSION / TYPE"))
            .map(|l| format!("{}\n", l))
            .collect();
        match parse(&content) {
            Err(Error::Format(e)) => {
                assert_eq!(e.kind, ParsingError::MissingVersion);
                assert_eq!(e.line, 7);
            },
            other => panic!("expecting format error, got {:?}", other),
        }

        // observation file
        let content = NAV_HEADER.replacen("N: GNSS NAV DATA", "O: OBSERVATION  ", 1);
        match parse(&content) {
            Err(Error::Format(e)) => {
                assert_eq!(e.line, 1);
                assert!(matches!(e.kind, ParsingError::FileType { found: 'O', .. }));
            },
            other => panic!("expecting format error, got {:?}", other),
        }
    }
}
