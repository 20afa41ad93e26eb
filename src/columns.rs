//! Fixed column field extraction, shared by all decoders
use std::borrow::Cow;
use std::str::FromStr;

use crate::error::ParsingError;

/// Width of a header line content, labels start right after
pub(crate) const HEADER_CONTENT_WIDTH: usize = 60;

/// Returns `line[start..end]`, clamped to the line length.
/// Out of range or non char aligned ranges return an empty field.
pub(crate) fn slice(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("")
}

/// Converts Fortran double precision exponents ("D", "d") to "E"
pub(crate) fn normalize_exponent(field: &str) -> Cow<'_, str> {
    if field.contains(&['D', 'd'][..]) {
        Cow::Owned(field.replace(&['D', 'd'][..], "E"))
    } else {
        Cow::Borrowed(field)
    }
}

/// Parses a floating point field.
/// Blank fields are absent, which differs from zero.
/// Non finite content ("NaN", "inf", overflowing exponents) is malformed.
pub(crate) fn parse_f64(field: &str) -> Result<Option<f64>, ParsingError> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match normalize_exponent(trimmed).parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(ParsingError::NumericField(trimmed.to_string())),
    }
}

/// Parses a floating point field, malformed content is decoded as absent
pub(crate) fn parse_f64_lenient(field: &str) -> Option<f64> {
    parse_f64(field).ok().flatten()
}

/// Parses an integer field, blank fields are absent
pub(crate) fn parse_int<T: FromStr>(field: &str) -> Result<Option<T>, ParsingError> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| ParsingError::NumericField(trimmed.to_string()))
}

/// Splits a header line into (content, label)
pub(crate) fn header_label(line: &str) -> Option<(&str, &str)> {
    let content = line.get(..HEADER_CONTENT_WIDTH)?;
    let label = line.get(HEADER_CONTENT_WIDTH..)?.trim();
    Some((content, label))
}
