// ==============================================================================
// frequency.rs - Variant Frequency Classification
// ==============================================================================
// Description: Maps a raw variant frequency onto the 0 / 0.5 / 1 zygosity grid
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Algorithm:
//   1. Take the text form of the raw value
//   2. Text starting with "1" is frequency 1 (covers "1,000", "1.0", ...)
//      unless strict mode is enabled
//   3. Replace ',' with '.', parse as an exact decimal
//   4. Reject values outside [0, 1]
//   5. Round to the nearest multiple of 0.5, halves rounding up
//      (0.25 → 0.5, 0.75 → 1)
// ==============================================================================

use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::models::CellValue;

/// Canonical frequency after rounding to the 0.5 grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrequencyClass {
    /// Rounds to 0: no variant reads
    Zero,
    /// Rounds to 0.5: heterozygous
    Half,
    /// Rounds to 1: homozygous variant
    One,
}

impl FrequencyClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FrequencyClass::Zero => "0",
            FrequencyClass::Half => "0.5",
            FrequencyClass::One => "1",
        }
    }
}

impl fmt::Display for FrequencyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-cell frequency problems; rendered in place of the affected cell
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrequencyError {
    #[error("ERROR: missing variant frequency")]
    Missing,

    #[error("ERROR: cannot parse frequency '{value}' ({reason})")]
    Unparseable { value: String, reason: String },

    #[error("ERROR (Invalid frequency: {0})")]
    OutOfRange(Decimal),
}

/// Frequency classifier
///
/// The default classifier treats any value whose text starts with "1" as
/// frequency 1, so "19" or "1.5" classify as 1. `strict()` turns that
/// shortcut off and parses every value, so those become range errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrequencyClassifier {
    strict_unity: bool,
}

impl FrequencyClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self { strict_unity: true }
    }

    pub fn is_strict(&self) -> bool {
        self.strict_unity
    }

    /// Classify a raw spreadsheet cell
    pub fn classify(&self, raw: &CellValue) -> Result<FrequencyClass, FrequencyError> {
        if raw.is_empty() {
            return Err(FrequencyError::Missing);
        }
        self.classify_str(&raw.as_text())
    }

    /// Classify the text form of a frequency
    pub fn classify_str(&self, raw: &str) -> Result<FrequencyClass, FrequencyError> {
        if !self.strict_unity && raw.starts_with('1') {
            return Ok(FrequencyClass::One);
        }

        let normalized = raw.replace(',', ".");
        let value = parse_decimal(normalized.trim()).map_err(|reason| {
            FrequencyError::Unparseable {
                value: raw.to_string(),
                reason,
            }
        })?;

        if value < Decimal::ZERO || value > Decimal::ONE {
            return Err(FrequencyError::OutOfRange(value));
        }

        let doubled = (value * Decimal::TWO)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        Ok(if doubled == Decimal::ZERO {
            FrequencyClass::Zero
        } else if doubled == Decimal::ONE {
            FrequencyClass::Half
        } else {
            FrequencyClass::One
        })
    }
}

/// Classify with the default (shortcut-preserving) classifier
pub fn classify(raw: &CellValue) -> Result<FrequencyClass, FrequencyError> {
    FrequencyClassifier::default().classify(raw)
}

fn parse_decimal(text: &str) -> Result<Decimal, String> {
    match Decimal::from_str(text) {
        Ok(value) => Ok(value),
        Err(e) if text.contains(|c: char| c == 'e' || c == 'E') => {
            Decimal::from_scientific(text).map_err(|_| e.to_string())
        }
        Err(e) => Err(e.to_string()),
    }
}
