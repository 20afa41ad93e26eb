use std::path::{Path, PathBuf};
use thiserror::Error;

use gnss::prelude::SV;

use crate::observable::Observable;

/// Errors that may rise when decoding a single RINEX line or record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParsingError {
    #[error("missing END OF HEADER delimiter")]
    MissingHeaderDelimiter,
    #[error("header does not define RINEX VERSION / TYPE")]
    MissingVersion,
    #[error("invalid revision \"{0}\"")]
    VersionParsing(String),
    #[error("non supported revision {0}: expecting 3.xx layout")]
    NonSupportedRevision(String),
    #[error("expecting {expected} RINEX, found type '{found}'")]
    FileType { expected: &'static str, found: char },
    #[error("line is {found} bytes long, expecting at least {expected}")]
    LineTooShort { expected: usize, found: usize },
    #[error("unexpected end of file")]
    UnexpectedEof,
    #[error("record ended prematurely")]
    TruncatedRecord,
    #[error("invalid numeric field \"{0}\"")]
    NumericField(String),
    #[error("invalid satellite \"{0}\"")]
    SvParsing(String),
    #[error("invalid constellation \"{0}\"")]
    ConstellationParsing(String),
    #[error("invalid observable \"{0}\"")]
    ObservableParsing(String),
    #[error("invalid datetime \"{0}\"")]
    DatetimeParsing(String),
    #[error("invalid epoch flag \"{0}\"")]
    EpochFlagParsing(String),
    #[error("invalid timescale \"{0}\"")]
    TimescaleParsing(String),
    #[error("invalid SNR code \"{0}\"")]
    SnrParsing(String),
    #[error("{label}: declared {expected} entries, found {found}")]
    CountMismatch {
        label: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("epoch declares {expected} satellites, found {found}")]
    MissingSatellites { expected: usize, found: usize },
}

/// Decoding failure, located in the input stream.
/// `line` is the 1-based number of the faulty line.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatError {
    pub path: Option<PathBuf>,
    pub line: usize,
    pub kind: ParsingError,
}

impl FormatError {
    pub(crate) fn new(line: usize, kind: ParsingError) -> Self {
        Self {
            path: None,
            line,
            kind,
        }
    }
    pub(crate) fn with_path(mut self, path: &Path) -> Self {
        self.path = Some(path.to_path_buf());
        self
    }
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}:{}: {}", path.display(), self.line, self.kind),
            None => write!(f, "line {}: {}", self.line, self.kind),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Errors returned by this library
#[derive(Error, Debug)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("observation header does not define APPROX POSITION XYZ")]
    MissingApproxPosition,
    #[error("rinex conversion failed: {0}")]
    Conversion(String),
}

impl Error {
    /// Attaches file path to decoding errors
    pub(crate) fn with_path(self, path: &Path) -> Self {
        match self {
            Self::Format(e) => Self::Format(e.with_path(path)),
            e => e,
        }
    }
}

/// Reasons for a satellite to be omitted from a resolved epoch
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    #[error("{0}: no ephemeris available")]
    MissingEphemeris(SV),
    #[error("{sv}: missing {observable} measurement")]
    MissingMeasurement { sv: SV, observable: Observable },
    #[error("{0}: ephemeris lacks orbital parameters")]
    IncompleteEphemeris(SV),
}
