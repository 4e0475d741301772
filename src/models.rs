// ==============================================================================
// models.rs - Marker Table Data Models
// ==============================================================================
// Description: Typed values shared by the catalog, records, resolver and tables
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell read from an uploaded spreadsheet
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Blank cell (or empty string)
    Empty,
    /// Numeric cell (integers are widened to f64)
    Number(f64),
    /// Anything else, kept as text
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Text form used for lookups and classification ("" for blank cells)
    pub fn as_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value.to_string())
        }
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

/// Integer form of a numeric-looking value ("1", "1.0", 2.0), if it has one
pub fn as_integer(text: &str) -> Option<i64> {
    let value: f64 = text.trim().parse().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        Some(value as i64)
    } else {
        None
    }
}

/// Allele code from the reference catalog (e.g. "0", "1", or an opaque token)
///
/// Numeric-looking codes are stored in integer form ("1.0" becomes "1");
/// anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlleleCode(String);

impl AlleleCode {
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        match as_integer(&code) {
            Some(n) => Self(n.to_string()),
            None => Self(code),
        }
    }

    pub fn from_cell(cell: &CellValue) -> Self {
        Self::new(cell.as_text())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlleleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which of the two alleles of a diploid genotype is being rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AllelePosition {
    First,
    Second,
}

impl AllelePosition {
    pub const BOTH: [AllelePosition; 2] = [AllelePosition::First, AllelePosition::Second];

    pub fn index(&self) -> usize {
        match self {
            AllelePosition::First => 0,
            AllelePosition::Second => 1,
        }
    }
}

impl TryFrom<usize> for AllelePosition {
    type Error = usize;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AllelePosition::First),
            1 => Ok(AllelePosition::Second),
            other => Err(other),
        }
    }
}

/// Case used to colour a marker cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SequenceCase {
    /// Frequency = 1: two copies of the variant allele
    Homozygous,
    /// Frequency = 0.5: one reference and one variant allele
    Heterozygous,
    /// Marker not found, frequency rounding to 0, or unreadable frequency
    Reference,
}

impl SequenceCase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceCase::Homozygous => "HOMOZYGOUS",
            SequenceCase::Heterozygous => "HETEROZYGOUS",
            SequenceCase::Reference => "REFERENCE",
        }
    }
}

/// Whether a rendered code equals the marker's reference code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeType {
    Reference,
    Variant,
}

impl CodeType {
    pub fn is_reference(&self) -> bool {
        matches!(self, CodeType::Reference)
    }
}

/// Diploid genotype at one marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Zygosity {
    HomozygousReference,
    Heterozygous,
    HomozygousVariant,
}

impl Zygosity {
    /// Which allele (reference or variant) sits at `position`
    ///
    /// Heterozygous genotypes always list the reference allele first.
    pub fn allele_at(&self, position: AllelePosition) -> CodeType {
        match (self, position) {
            (Zygosity::HomozygousReference, _) => CodeType::Reference,
            (Zygosity::HomozygousVariant, _) => CodeType::Variant,
            (Zygosity::Heterozygous, AllelePosition::First) => CodeType::Reference,
            (Zygosity::Heterozygous, AllelePosition::Second) => CodeType::Variant,
        }
    }

    pub fn case(&self) -> SequenceCase {
        match self {
            Zygosity::HomozygousReference => SequenceCase::Reference,
            Zygosity::Heterozygous => SequenceCase::Heterozygous,
            Zygosity::HomozygousVariant => SequenceCase::Homozygous,
        }
    }
}

/// A rendered cell: either a value or the error message that replaced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rendered<T> {
    Value(T),
    Error(String),
}

impl<T> Rendered<T> {
    pub fn is_error(&self) -> bool {
        matches!(self, Rendered::Error(_))
    }
}

impl<T: fmt::Display> fmt::Display for Rendered<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rendered::Value(v) => fmt::Display::fmt(v, f),
            Rendered::Error(msg) => f.write_str(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allele_code_integer_form() {
        assert_eq!(AlleleCode::new("1.0").as_str(), "1");
        assert_eq!(AlleleCode::new("0").as_str(), "0");
        assert_eq!(AlleleCode::from_cell(&CellValue::Number(2.0)).as_str(), "2");
        assert_eq!(AlleleCode::from_cell(&CellValue::Number(1.5)).as_str(), "1.5");
        assert_eq!(AlleleCode::new("A1").as_str(), "A1");
    }

    #[test]
    fn test_cell_value_text() {
        assert_eq!(CellValue::Number(0.5).as_text(), "0.5");
        assert_eq!(CellValue::Number(1.0).as_text(), "1");
        assert_eq!(CellValue::Empty.as_text(), "");
        assert_eq!(CellValue::from(""), CellValue::Empty);
        assert_eq!(CellValue::from("0,50"), CellValue::Text("0,50".to_string()));
    }

    #[test]
    fn test_zygosity_alleles() {
        let het = Zygosity::Heterozygous;
        assert_eq!(het.allele_at(AllelePosition::First), CodeType::Reference);
        assert_eq!(het.allele_at(AllelePosition::Second), CodeType::Variant);

        for position in AllelePosition::BOTH {
            assert_eq!(Zygosity::HomozygousReference.allele_at(position), CodeType::Reference);
            assert_eq!(Zygosity::HomozygousVariant.allele_at(position), CodeType::Variant);
        }
    }

    #[test]
    fn test_sequence_case_str() {
        assert_eq!(SequenceCase::Homozygous.as_str(), "HOMOZYGOUS");
        assert_eq!(SequenceCase::Heterozygous.as_str(), "HETEROZYGOUS");
        assert_eq!(SequenceCase::Reference.as_str(), "REFERENCE");
        assert_eq!(
            serde_json::to_string(&SequenceCase::Heterozygous).unwrap(),
            "\"HETEROZYGOUS\""
        );
    }

    #[test]
    fn test_position_from_index() {
        assert_eq!(AllelePosition::try_from(0), Ok(AllelePosition::First));
        assert_eq!(AllelePosition::try_from(1), Ok(AllelePosition::Second));
        assert_eq!(AllelePosition::try_from(2), Err(2));
    }
}
