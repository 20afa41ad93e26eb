//! Line oriented reader, keeping track of line numbers
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[cfg(feature = "flate2")]
use flate2::read::GzDecoder;

/// Iterates lines of a RINEX stream, stripped from their line terminator.
pub(crate) struct Lines<R: BufRead> {
    inner: R,
    line: usize,
    peeked: Option<String>,
}

impl<R: BufRead> Lines<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            peeked: None,
        }
    }
    /// Number (1-based) of the last line returned by [Self::next_line]
    pub fn line_number(&self) -> usize {
        self.line
    }
    fn read_one(&mut self) -> std::io::Result<Option<String>> {
        let mut buf = String::new();
        if self.inner.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        while buf.ends_with('\n') || buf.ends_with('\r') {
            buf.pop();
        }
        Ok(Some(buf))
    }
    pub fn next_line(&mut self) -> std::io::Result<Option<String>> {
        let line = match self.peeked.take() {
            Some(line) => Some(line),
            None => self.read_one()?,
        };
        if line.is_some() {
            self.line += 1;
        }
        Ok(line)
    }
    /// Returns the upcoming line without consuming it
    pub fn peek(&mut self) -> std::io::Result<Option<&str>> {
        if self.peeked.is_none() {
            self.peeked = self.read_one()?;
        }
        Ok(self.peeked.as_deref())
    }
}

fn is_gzip_compressed(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "gz")
}

#[cfg(feature = "flate2")]
fn gzip_reader(fd: File) -> std::io::Result<Box<dyn BufRead>> {
    Ok(Box::new(BufReader::new(GzDecoder::new(fd))))
}

#[cfg(not(feature = "flate2"))]
fn gzip_reader(_fd: File) -> std::io::Result<Box<dyn BufRead>> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "gzip compressed files require the flate2 feature",
    ))
}

/// Opens a local file, .gz files are decompressed on the fly
pub(crate) fn open(path: &Path) -> std::io::Result<Box<dyn BufRead>> {
    let fd = File::open(path)?;
    if is_gzip_compressed(path) {
        gzip_reader(fd)
    } else {
        Ok(Box::new(BufReader::new(fd)))
    }
}
