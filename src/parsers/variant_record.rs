// ==============================================================================
// variant_record.rs - Individual Variant Table Parser
// ==============================================================================
// Description: Parses one individual's variant spreadsheet
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: spreadsheet with a header row, one measured variant per row
// Example (file "73_panel.xlsx" → individual "73"):
//   dbSNP ID | Variant Frequency | Reference Allele | Variant Allele
//   rs1      | 0,50              | A                | G
//   rs2      | 1                 | C                | T
// ==============================================================================

use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use super::reference_catalog::MarkerDefinition;
use super::sheet::{cell, is_blank_row, SchemaError, Sheet, SheetError};
use crate::genotype_resolver::MarkerResolver;
use crate::models::{AlleleCode, AllelePosition, CellValue, Rendered};

pub const COL_DBSNP_ID: &str = "dbSNP ID";
pub const COL_VARIANT_FREQUENCY: &str = "Variant Frequency";
pub const COL_REFERENCE_ALLELE: &str = "Reference Allele";
pub const COL_VARIANT_ALLELE: &str = "Variant Allele";

/// Columns every variant spreadsheet must carry
pub const REQUIRED_COLUMNS: [&str; 4] = [
    COL_VARIANT_FREQUENCY,
    COL_REFERENCE_ALLELE,
    COL_VARIANT_ALLELE,
    COL_DBSNP_ID,
];

/// Errors that can occur while loading a variant spreadsheet
#[derive(Error, Debug)]
pub enum RecordError {
    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// One measured variant row
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRow {
    /// dbSNP identifier as written in the sheet
    pub marker_id: String,
    /// Raw, unnormalized variant frequency
    pub frequency: CellValue,
    pub reference_allele: String,
    pub variant_allele: String,
}

/// One individual's variant table
#[derive(Debug, Clone)]
pub struct VariantRecord {
    file_name: String,
    individual_id: String,
    rows: Vec<VariantRow>,
    /// Data rows in the source sheet, blank ones included
    rows_parsed: usize,
    /// Lowercased marker id → index of its first row
    first_row: HashMap<String, usize>,
}

impl VariantRecord {
    /// Load a variant spreadsheet; the individual id comes from its filename
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let sheet = Sheet::from_path(path)?;
        let file_name = sheet.name().to_string();
        Ok(Self::from_sheet(&sheet, &file_name)?)
    }

    /// Build a record from an already-parsed sheet
    pub fn from_sheet(sheet: &Sheet, file_name: &str) -> Result<Self, SchemaError> {
        let label = format!("variant file '{}'", file_name);
        let columns = sheet.require_columns(&label, &REQUIRED_COLUMNS)?;
        let (freq_col, ref_col, var_col, id_col) = (columns[0], columns[1], columns[2], columns[3]);

        let rows = sheet
            .rows()
            .iter()
            .filter(|row| !is_blank_row(row))
            .map(|row| VariantRow {
                marker_id: cell(row, id_col).as_text(),
                frequency: cell(row, freq_col).clone(),
                reference_allele: cell(row, ref_col).as_text(),
                variant_allele: cell(row, var_col).as_text(),
            })
            .collect();

        let mut record = Self::from_rows(file_name, rows);
        record.rows_parsed = sheet.len();
        info!(
            "Loaded {} variant rows for individual {} from {}",
            record.len(),
            record.individual_id,
            file_name
        );
        Ok(record)
    }

    /// Build a record from typed rows
    pub fn from_rows(file_name: &str, rows: Vec<VariantRow>) -> Self {
        let mut first_row = HashMap::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.marker_id.is_empty() {
                continue;
            }
            first_row.entry(row.marker_id.to_lowercase()).or_insert(index);
        }

        Self {
            file_name: file_name.to_string(),
            individual_id: individual_id_from_filename(file_name),
            rows_parsed: rows.len(),
            rows,
            first_row,
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn individual_id(&self) -> &str {
        &self.individual_id
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Data rows read from the sheet, including fully blank ones
    pub fn rows_parsed(&self) -> usize {
        self.rows_parsed
    }

    /// First row whose marker id matches, ignoring case
    pub fn find_marker(&self, marker_id: &str) -> Option<&VariantRow> {
        self.first_row
            .get(&marker_id.to_lowercase())
            .map(|&index| &self.rows[index])
    }

    /// Allele code at `position` for a catalog marker
    pub fn resolve(
        &self,
        marker: &MarkerDefinition,
        position: AllelePosition,
        resolver: &MarkerResolver,
    ) -> Rendered<AlleleCode> {
        resolver.resolve(self, marker, position)
    }
}

/// Individual id: the leading run of digits of the filename, or the whole
/// filename when it does not start with a digit
pub fn individual_id_from_filename(file_name: &str) -> String {
    let digits: String = file_name
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();

    if digits.is_empty() {
        file_name.to_string()
    } else {
        digits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(file_name: &str, contents: &str) -> Result<VariantRecord, SchemaError> {
        let sheet = Sheet::from_csv_reader(file_name, contents.as_bytes()).unwrap();
        VariantRecord::from_sheet(&sheet, file_name)
    }

    #[test]
    fn test_individual_id_from_filename() {
        assert_eq!(individual_id_from_filename("73_variants.xlsx"), "73");
        assert_eq!(individual_id_from_filename("0012-run2.xlsx"), "0012");
        assert_eq!(individual_id_from_filename("sample_73.xlsx"), "sample_73.xlsx");
        assert_eq!(individual_id_from_filename(""), "");
    }

    #[test]
    fn test_find_marker_case_insensitive_first_wins() {
        let contents = "\
dbSNP ID,Variant Frequency,Reference Allele,Variant Allele
RS1,\"0,50\",A,G
rs2,1,C,T
rs1,1,A,G
";
        let record = parse("73_variants.csv", contents).unwrap();

        assert_eq!(record.individual_id(), "73");
        assert_eq!(record.len(), 3);

        let row = record.find_marker("rs1").unwrap();
        assert_eq!(row.marker_id, "RS1");
        assert_eq!(row.frequency, CellValue::Text("0,50".to_string()));

        assert!(record.find_marker("Rs2").is_some());
        assert!(record.find_marker("rs3").is_none());
    }

    #[test]
    fn test_blank_rows_counted_not_kept() {
        let contents = "\
dbSNP ID,Variant Frequency,Reference Allele,Variant Allele
rs1,0.5,A,G
,,,
rs2,1,C,T
";
        let record = parse("9.csv", contents).unwrap();

        assert_eq!(record.len(), 2);
        assert_eq!(record.rows_parsed(), 3);
        assert!(record.find_marker("rs2").is_some());
    }

    #[test]
    fn test_exact_match_only() {
        let contents = "\
dbSNP ID,Variant Frequency,Reference Allele,Variant Allele
rs10,0.5,A,G
";
        let record = parse("1.csv", contents).unwrap();
        assert!(record.find_marker("rs1").is_none());
        assert!(record.find_marker("rs100").is_none());
        assert!(record.find_marker("rs10").is_some());
    }

    #[test]
    fn test_missing_columns() {
        let contents = "dbSNP ID,Reference Allele\nrs1,A\n";
        let err = parse("12.csv", contents).unwrap_err();

        assert_eq!(err.missing, vec!["Variant Frequency", "Variant Allele"]);
        assert_eq!(
            err.to_string(),
            "Missing required columns in variant file '12.csv': Variant Frequency, Variant Allele"
        );
    }

    #[test]
    fn test_load_from_path_uses_filename() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("42_panel.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "dbSNP ID,Variant Frequency,Reference Allele,Variant Allele").unwrap();
        writeln!(file, "rs5,0.5,A,C").unwrap();
        drop(file);

        let record = VariantRecord::load(&path).unwrap();
        assert_eq!(record.individual_id(), "42");
        assert_eq!(record.file_name(), "42_panel.csv");
    }
}
