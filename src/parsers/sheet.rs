// ==============================================================================
// sheet.rs - Tabular Spreadsheet Reader
// ==============================================================================
// Description: Reads the first worksheet of an uploaded file into typed cells
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: first row is the header, every following row is data
//   .xlsx / .xlsm / .xls / .ods  - first worksheet (calamine)
//   .csv                         - comma-separated text (csv)
// Fully blank rows are kept so row totals match the file; loaders skip them.
// ==============================================================================

use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::models::CellValue;

/// Spreadsheet extensions read through calamine
pub const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];

/// Errors that can occur while reading a spreadsheet
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Workbook error: {0}")]
    WorkbookError(#[from] calamine::Error),

    #[error("Workbook '{0}' contains no worksheet")]
    NoWorksheet(String),

    #[error("File '{0}' has no header row")]
    EmptyFile(String),

    #[error("Unsupported spreadsheet type: '{0}'")]
    UnsupportedType(String),
}

/// Required columns absent from an uploaded spreadsheet
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Missing required columns in {file}: {}", .missing.join(", "))]
pub struct SchemaError {
    /// Label of the offending file (e.g. "RS totales file")
    pub file: String,
    /// Every missing column, in the order they were required
    pub missing: Vec<String>,
}

/// First worksheet of an uploaded spreadsheet
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Build a sheet from rows that were parsed elsewhere
    pub fn from_rows(
        name: impl Into<String>,
        headers: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Read a spreadsheet, dispatching on the file extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SheetError> {
        let path = path.as_ref();
        let name = file_name(path);
        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        debug!("Reading spreadsheet {} as .{}", name, extension);

        match extension.as_str() {
            "csv" => Self::from_csv_reader(name, File::open(path)?),
            ext if WORKBOOK_EXTENSIONS.contains(&ext) => Self::from_workbook(name, path),
            other => Err(SheetError::UnsupportedType(other.to_string())),
        }
    }

    /// Read comma-separated text
    pub fn from_csv_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<Self, SheetError> {
        let name = name.into();
        let mut csv_reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = csv_reader.records();
        let headers = match records.next() {
            Some(record) => record?.iter().map(str::to_string).collect(),
            None => return Err(SheetError::EmptyFile(name)),
        };

        let mut rows = Vec::new();
        for record in records {
            rows.push(record?.iter().map(CellValue::from).collect());
        }

        Ok(Self::from_rows(name, headers, rows))
    }

    fn from_workbook(name: String, path: &Path) -> Result<Self, SheetError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| SheetError::NoWorksheet(name.clone()))??;

        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header) => header.iter().map(|cell| cell.to_string()).collect(),
            None => return Err(SheetError::EmptyFile(name)),
        };

        let rows = rows
            .map(|row| row.iter().map(cell_from_data).collect())
            .collect();

        Ok(Self::from_rows(name, headers, rows))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of data rows (header excluded)
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == column)
    }

    /// Resolve every required column to its index
    ///
    /// Fails with all missing columns listed, not just the first one.
    pub fn require_columns(&self, file: &str, required: &[&str]) -> Result<Vec<usize>, SchemaError> {
        let mut indices = Vec::with_capacity(required.len());
        let mut missing = Vec::new();

        for column in required {
            match self.column_index(column) {
                Some(index) => indices.push(index),
                None => missing.push(column.to_string()),
            }
        }

        if missing.is_empty() {
            Ok(indices)
        } else {
            Err(SchemaError {
                file: file.to_string(),
                missing,
            })
        }
    }
}

/// True when every cell of the row is empty
pub fn is_blank_row(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_empty)
}

static EMPTY_CELL: CellValue = CellValue::Empty;

/// Cell at `column`, blank when the row is shorter than the header
pub fn cell(row: &[CellValue], column: usize) -> &CellValue {
    row.get(column).unwrap_or(&EMPTY_CELL)
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Float(n) => CellValue::Number(*n),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}
