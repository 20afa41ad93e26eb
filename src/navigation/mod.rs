//! Navigation (broadcast ephemeris) files
mod ephemeris;
mod header;

pub use ephemeris::{
    wrap_half_week, BroadcastOrbit, Ephemeris, Kepler, KeplerConvergence, Perturbations,
    SatellitePosition,
};
pub use header::{Header, UtcPolynomial};

use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use gnss::prelude::{Constellation, SV};
use log::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    reader::{open, Lines},
};

/// Record first characters we know how to skip
const KNOWN_SYSTEMS: &str = "GRECJIS";

/// Decoded navigation file
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Navigation {
    pub header: Header,
    /// GPS ephemerides, in file order
    pub ephemerides: Vec<Ephemeris>,
}

/// Identifies the first line of a navigation record
fn record_constellation(line: &str) -> Option<Constellation> {
    let first = line.get(..1)?;
    if KNOWN_SYSTEMS.contains(first) {
        Constellation::from_str(first).ok()
    } else {
        None
    }
}

impl Navigation {
    /// Decodes a navigation stream. Only GPS records are retained,
    /// other constellations are consumed and discarded.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut lines = Lines::new(reader);
        let header = Header::parse(&mut lines)?;
        let mut ephemerides = Vec::new();

        while let Some(line) = lines.next_line()? {
            let Some(constellation) = record_constellation(&line) else {
                continue;
            };
            if constellation == Constellation::GPS {
                ephemerides.push(Ephemeris::parse_gps_lnav(&line, &mut lines)?);
            } else {
                debug!(
                    "line {}: skipping {} record",
                    lines.line_number(),
                    constellation
                );
                skip_continuations(&mut lines)?;
            }
        }

        debug!("decoded {} gps ephemerides", ephemerides.len());
        Ok(Self {
            header,
            ephemerides,
        })
    }

    /// Decodes a local navigation file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let reader = open(path)?;
        Self::parse(reader).map_err(|e| e.with_path(path))
    }

    /// Returns all ephemerides broadcast by this satellite, in file order
    pub fn ephemerides_for(&self, sv: SV) -> impl Iterator<Item = &Ephemeris> + '_ {
        self.ephemerides.iter().filter(move |eph| eph.sv == sv)
    }

    /// Returns the first ephemeris broadcast by this satellite
    pub fn first_ephemeris(&self, sv: SV) -> Option<&Ephemeris> {
        self.ephemerides_for(sv).next()
    }

    /// Returns the satellites described in this file, sorted
    pub fn sv(&self) -> Vec<SV> {
        let mut sv: Vec<SV> = self.ephemerides.iter().map(|eph| eph.sv).collect();
        sv.sort();
        sv.dedup();
        sv
    }
}

/// Consumes the indented lines that follow a record first line
fn skip_continuations<R: BufRead>(lines: &mut Lines<R>) -> std::io::Result<()> {
    loop {
        let is_continuation = matches!(lines.peek()?, Some(line) if line.starts_with(' '));
        if !is_continuation {
            return Ok(());
        }
        lines.next_line()?;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ParsingError;
    use crate::tests::toolkit::{navigation, E01_RECORD, G01_RECORD, G07_RECORD, NAV_HEADER, R03_RECORD};

    #[test]
    fn gps_records_only() {
        let nav = navigation(&[G01_RECORD, E01_RECORD, R03_RECORD, G07_RECORD]);
        assert_eq!(nav.ephemerides.len(), 2);
        let g01 = SV::from_str("G01").unwrap();
        let g07 = SV::from_str("G07").unwrap();
        assert_eq!(nav.sv(), vec![g01, g07]);
        assert_eq!(nav.ephemerides[0].sv, g01);
        assert_eq!(nav.ephemerides[1].sv, g07);
        assert_eq!(nav.ephemerides[1].toe(), Some(352800.0));
        assert_eq!(nav.ephemerides_for(g07).count(), 1);
        assert_eq!(nav.ephemerides_for(SV::from_str("G02").unwrap()).count(), 0);
    }

    #[test]
    fn file_order_is_preserved() {
        let second = G01_RECORD.replacen("2024 05 02 00 00 00", "2024 05 02 02 00 00", 1);
        let nav = navigation(&[G01_RECORD, second.as_str()]);
        let g01 = SV::from_str("G01").unwrap();
        let toc: Vec<_> = nav.ephemerides_for(g01).map(|eph| eph.toc).collect();
        assert_eq!(toc.len(), 2);
        assert!(toc[0] < toc[1]);
        assert_eq!(nav.first_ephemeris(g01).map(|eph| eph.toc), Some(toc[0]));
    }

    #[test]
    fn blank_lines_between_records() {
        let nav = navigation(&[G01_RECORD, "\n\n", G07_RECORD, "\n"]);
        assert_eq!(nav.ephemerides.len(), 2);
    }

    #[test]
    fn header_only() {
        let nav = navigation(&[]);
        assert!(nav.ephemerides.is_empty());
    }

    #[test]
    fn error_location() {
        let truncated: String = G07_RECORD.lines().take(4).map(|l| format!("{}\n", l)).collect();
        let content = format!("{}{}{}", NAV_HEADER, G01_RECORD, truncated);
        match Navigation::parse(content.as_bytes()) {
            Err(Error::Format(e)) => {
                assert_eq!(e.kind, ParsingError::UnexpectedEof);
                // 8 header lines, 8 G01 lines, 4 G07 lines
                assert_eq!(e.line, 20);
                assert!(e.path.is_none());
            },
            other => panic!("expecting format error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file() {
        match Navigation::from_file("/not/a/path/brdc0010.24n") {
            Err(Error::Io(_)) => {},
            other => panic!("expecting i/o error, got {:?}", other),
        }
    }
}
