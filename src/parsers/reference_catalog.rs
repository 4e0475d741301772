// ==============================================================================
// reference_catalog.rs - RS Totales (Reference Catalog) Parser
// ==============================================================================
// Description: Parses the reference spreadsheet of dbSNP marker definitions
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: spreadsheet with a header row
// Example:
//   dbSNP ID | Reference Allele | Variant Allele | Codigo reference allele | Codigo variant allele
//   rs1      | A                | G              | 0                       | 1
//   rs2      | C                | T              | 0                       | 1
// ==============================================================================

use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

use super::sheet::{cell, SchemaError, Sheet, SheetError};
use crate::models::{AlleleCode, CellValue};

pub const COL_DBSNP_ID: &str = "dbSNP ID";
pub const COL_REFERENCE_ALLELE: &str = "Reference Allele";
pub const COL_VARIANT_ALLELE: &str = "Variant Allele";
pub const COL_REFERENCE_CODE: &str = "Codigo reference allele";
pub const COL_VARIANT_CODE: &str = "Codigo variant allele";

/// Columns the reference spreadsheet must carry
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COL_DBSNP_ID,
    COL_REFERENCE_ALLELE,
    COL_VARIANT_ALLELE,
    COL_REFERENCE_CODE,
    COL_VARIANT_CODE,
];

const FILE_LABEL: &str = "RS totales file";

/// Errors that can occur while loading the reference catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Invalid RS values found in the RS totales file: {}", .0.join(", "))]
    InvalidIdentifiers(Vec<String>),
}

/// One marker of the reference catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerDefinition {
    /// dbSNP identifier (e.g. "rs12345"), whitespace-trimmed
    pub id: String,
    pub ref_code: AlleleCode,
    pub var_code: AlleleCode,
    /// Reference nucleotide (e.g. "A")
    pub ref_allele: String,
    /// Variant nucleotide (e.g. "G")
    pub var_allele: String,
}

impl MarkerDefinition {
    pub fn new(
        id: impl Into<String>,
        ref_code: AlleleCode,
        var_code: AlleleCode,
        ref_allele: impl Into<String>,
        var_allele: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            ref_code,
            var_code,
            ref_allele: ref_allele.into(),
            var_allele: var_allele.into(),
        }
    }
}

/// Ordered, immutable mapping from marker identifier to its definition
#[derive(Debug, Clone, Default)]
pub struct ReferenceCatalog {
    markers: IndexMap<String, MarkerDefinition>,
    rows_parsed: usize,
}

impl ReferenceCatalog {
    /// Load the catalog from a spreadsheet file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let sheet = Sheet::from_path(path)?;
        Self::from_sheet(&sheet)
    }

    /// Build the catalog from an already-parsed sheet
    ///
    /// A single identifier without the "rs" prefix rejects the whole
    /// catalog. A marker listed twice keeps its first position but takes
    /// the fields of its last row.
    pub fn from_sheet(sheet: &Sheet) -> Result<Self, CatalogError> {
        let columns = sheet.require_columns(FILE_LABEL, &REQUIRED_COLUMNS)?;
        let (id_col, ref_allele_col, var_allele_col, ref_code_col, var_code_col) =
            (columns[0], columns[1], columns[2], columns[3], columns[4]);

        let identified: Vec<(String, &[CellValue])> = sheet
            .rows()
            .iter()
            .filter(|row| !cell(row, id_col).is_empty())
            .map(|row| (cell(row, id_col).as_text().trim().to_string(), row.as_slice()))
            .collect();

        let invalid: Vec<String> = identified
            .iter()
            .filter(|(id, _)| !id.to_lowercase().starts_with("rs"))
            .map(|(id, _)| id.clone())
            .collect();

        if !invalid.is_empty() {
            return Err(CatalogError::InvalidIdentifiers(invalid));
        }

        let mut markers = IndexMap::with_capacity(identified.len());
        for (id, row) in identified {
            let marker = MarkerDefinition {
                id: id.clone(),
                ref_code: AlleleCode::from_cell(cell(row, ref_code_col)),
                var_code: AlleleCode::from_cell(cell(row, var_code_col)),
                ref_allele: cell(row, ref_allele_col).as_text(),
                var_allele: cell(row, var_allele_col).as_text(),
            };
            if markers.insert(id, marker).is_some() {
                debug!("Duplicate marker in reference catalog, last row wins");
            }
        }

        info!("Loaded {} markers from {}", markers.len(), sheet.name());

        Ok(Self {
            markers,
            rows_parsed: sheet.len(),
        })
    }

    /// Build a catalog directly from marker definitions
    pub fn from_markers(markers: impl IntoIterator<Item = MarkerDefinition>) -> Self {
        let markers: IndexMap<_, _> = markers
            .into_iter()
            .map(|marker| (marker.id.clone(), marker))
            .collect();
        let rows_parsed = markers.len();
        Self { markers, rows_parsed }
    }

    pub fn get(&self, id: &str) -> Option<&MarkerDefinition> {
        self.markers.get(id)
    }

    /// Markers in catalog order
    pub fn markers(&self) -> impl Iterator<Item = &MarkerDefinition> {
        self.markers.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Data rows read from the source spreadsheet
    pub fn rows_parsed(&self) -> usize {
        self.rows_parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(contents: &str) -> Result<ReferenceCatalog, CatalogError> {
        let sheet = Sheet::from_csv_reader("rs_totales.csv", contents.as_bytes()).unwrap();
        ReferenceCatalog::from_sheet(&sheet)
    }

    const HEADER: &str =
        "dbSNP ID,Reference Allele,Variant Allele,Codigo reference allele,Codigo variant allele\n";

    #[test]
    fn test_parse_valid_catalog() {
        let contents = format!("{HEADER}rs1,A,G,0,1\n  RS2  ,C,T,0.0,1.0\nrs3,G,A,X,Y\n");
        let catalog = parse(&contents).unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["rs1", "RS2", "rs3"]);

        let rs1 = catalog.get("rs1").unwrap();
        assert_eq!(rs1.ref_code.as_str(), "0");
        assert_eq!(rs1.var_code.as_str(), "1");
        assert_eq!(rs1.ref_allele, "A");
        assert_eq!(rs1.var_allele, "G");

        // numeric codes in integer form, opaque codes untouched
        assert_eq!(catalog.get("RS2").unwrap().var_code.as_str(), "1");
        assert_eq!(catalog.get("rs3").unwrap().ref_code.as_str(), "X");
    }

    #[test]
    fn test_missing_column_named() {
        let contents = "dbSNP ID,Reference Allele,Variant Allele,Codigo reference allele\nrs1,A,G,0\n";
        match parse(contents).unwrap_err() {
            CatalogError::Schema(err) => {
                assert_eq!(err.missing, vec!["Codigo variant allele".to_string()]);
            }
            other => panic!("Expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_columns_all_named() {
        let contents = "dbSNP ID\nrs1\n";
        match parse(contents).unwrap_err() {
            CatalogError::Schema(err) => assert_eq!(err.missing.len(), 4),
            other => panic!("Expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_identifiers_rejected() {
        let contents = format!("{HEADER}rs1,A,G,0,1\nchr1,C,T,0,1\n12345,G,A,0,1\n");
        match parse(&contents).unwrap_err() {
            CatalogError::InvalidIdentifiers(values) => {
                assert_eq!(values, vec!["chr1".to_string(), "12345".to_string()]);
            }
            other => panic!("Expected InvalidIdentifiers, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_identifiers_dropped() {
        let contents = format!("{HEADER}rs1,A,G,0,1\n,C,T,0,1\n");
        let catalog = parse(&contents).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.rows_parsed(), 2);
    }

    #[test]
    fn test_fully_blank_row_counted() {
        let contents = format!("{HEADER}rs1,A,G,0,1\n,,,,\nrs2,C,T,0,1\n");
        let catalog = parse(&contents).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.rows_parsed(), 3);
    }

    #[test]
    fn test_duplicate_last_row_wins() {
        let contents = format!("{HEADER}rs1,A,G,0,1\nrs2,C,T,0,1\nrs1,T,C,2,3\n");
        let catalog = parse(&contents).unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.ids().collect::<Vec<_>>(), vec!["rs1", "rs2"]);
        let rs1 = catalog.get("rs1").unwrap();
        assert_eq!(rs1.ref_allele, "T");
        assert_eq!(rs1.ref_code.as_str(), "2");
    }
}
