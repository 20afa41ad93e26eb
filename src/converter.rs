//! Conversion of older RINEX revisions, prior to decoding
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, error};

use crate::error::Error;

/// Converts a RINEX file into a revision 3.05 file
pub trait Converter {
    /// Converts this file and returns the path of the converted file
    fn convert(&self, input: &Path) -> Result<PathBuf, Error>;
}

/// Invokes the `gfzrnx` toolbox
#[derive(Debug, Clone, PartialEq)]
pub struct Gfzrnx {
    /// Program to invoke
    pub program: PathBuf,
}

impl Default for Gfzrnx {
    fn default() -> Self {
        Self {
            program: PathBuf::from("gfzrnx"),
        }
    }
}

impl Gfzrnx {
    /// Uses this `gfzrnx` binary
    pub fn new<P: AsRef<Path>>(program: P) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
        }
    }

    /// Converted file name, next to the input file:
    /// `brdc0010.24n` is converted into `brdc0010_3.05.24n`
    pub fn output_path(input: &Path) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = match input.extension() {
            Some(ext) => format!("{}_3.05.{}", stem, ext.to_string_lossy()),
            None => format!("{}_3.05", stem),
        };
        input.with_file_name(name)
    }
}

impl Converter for Gfzrnx {
    fn convert(&self, input: &Path) -> Result<PathBuf, Error> {
        let output = Self::output_path(input);
        debug!("{} -> {}", input.display(), output.display());
        let status = Command::new(&self.program)
            .arg("-finp")
            .arg(input)
            .arg("-fout")
            .arg(&output)
            .arg("-vo")
            .arg("3.05")
            .arg("-f")
            .status()
            .map_err(|e| {
                error!("failed to invoke {}: {}", self.program.display(), e);
                Error::Conversion(format!("{}: {}", self.program.display(), e))
            })?;
        if status.success() {
            Ok(output)
        } else {
            Err(Error::Conversion(format!(
                "{} exited with {}",
                input.display(),
                status
            )))
        }
    }
}
