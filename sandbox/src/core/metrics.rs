//! Candidate size measurement and length bounds.

use serde::Serialize;

use crate::core::types::{Failure, Metrics};

impl Metrics {
    /// Measure stringified candidate source.
    pub fn of(source: &str) -> Self {
        Self {
            length: source.encode_utf16().count(),
            lines: count_lines(source),
        }
    }
}

/// Number of lines: newline count plus one.
pub fn count_lines(source: &str) -> usize {
    source.bytes().filter(|byte| *byte == b'\n').count() + 1
}

/// Inclusive `[min, max]` range for the candidate length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LengthBounds {
    pub min: f64,
    pub max: f64,
}

impl LengthBounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Upper bound is checked first; equality with either bound passes.
    pub fn check(&self, length: usize) -> Result<(), Failure> {
        let measured = length as f64;
        if measured > self.max {
            return Err(Failure::TooLong {
                length,
                max: self.max,
            });
        }
        if measured < self.min {
            return Err(Failure::TooShort {
                length,
                min: self.min,
            });
        }
        Ok(())
    }
}
