//! Device line decoding.
//!
//! A device line is `expected` comma-separated signed decimals, e.g.
//! `12.3,-4.0,0.5,1,2,3`. Each field may carry one leading `-` and at most one
//! `.`; anything else (exponents, `+`, whitespace inside the line, empty
//! fields) is rejected. Values are rounded to one decimal place here, so every
//! downstream comparison works on the rounded readings.

use crate::error::DecodeError;
use crate::util::round_tenth;

/// One decoded reading per channel. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample(Box<[f64]>);

impl Sample {
    /// Build a sample from already-decoded values (no rounding applied).
    pub fn from_values(values: Vec<f64>) -> Self {
        Self(values.into_boxed_slice())
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[f64]> for Sample {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

/// Stateless decoder bound to a channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleDecoder {
    expected_channels: usize,
}

impl SampleDecoder {
    pub fn new(expected_channels: usize) -> Self {
        Self { expected_channels }
    }

    pub fn expected_channels(&self) -> usize {
        self.expected_channels
    }

    pub fn decode(&self, line: &str) -> Result<Sample, DecodeError> {
        decode(line, self.expected_channels)
    }
}

/// Largest reading magnitude accepted. Differences and per-test score sums
/// over readings this size stay finite and keep their tenths.
pub const MAX_READING: f64 = 1.0e15;

/// Decode one newline-delimited chunk into a `Sample` of `expected_channels` values.
///
/// Surrounding whitespace (including a trailing `\r`) is trimmed from the line as
/// a whole; fields themselves must not contain whitespace.
pub fn decode(line: &str, expected_channels: usize) -> Result<Sample, DecodeError> {
    let line = line.trim();
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() != expected_channels {
        return Err(malformed(format!(
            "expected {expected_channels} fields, got {}",
            fields.len()
        )));
    }

    let mut values = Vec::with_capacity(expected_channels);
    for (idx, field) in fields.iter().enumerate() {
        if !is_signed_decimal(field) {
            return Err(malformed(format!("field {idx} is not a decimal: {field:?}")));
        }
        let v: f64 = field
            .parse()
            .map_err(|_| malformed(format!("field {idx} is not a decimal: {field:?}")))?;
        if !v.is_finite() || v.abs() > MAX_READING {
            return Err(malformed(format!(
                "field {idx} is out of range (|value| > {MAX_READING:e})"
            )));
        }
        values.push(round_tenth(v));
    }
    Ok(Sample::from_values(values))
}

fn malformed(reason: String) -> DecodeError {
    DecodeError::MalformedLine { reason }
}

/// `-?` followed by ASCII digits with at most one `.`, at least one digit overall.
fn is_signed_decimal(field: &str) -> bool {
    let body = field.strip_prefix('-').unwrap_or(field);
    let mut digits = 0usize;
    let mut dots = 0usize;
    for b in body.bytes() {
        match b {
            b'0'..=b'9' => digits += 1,
            b'.' => dots += 1,
            _ => return false,
        }
    }
    digits > 0 && dots <= 1
}
