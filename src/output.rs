// ==============================================================================
// output.rs - Multi-Format Table Export
// ==============================================================================
// Description: Writes the codes and nucleotides tables as CSV, XLSX and JSON
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// CSV and XLSX exports carry a header row and no row index. The case and
// code-type matrices only reach the XLSX export as styling (when enabled)
// and the JSON report, which is meant for a presentation layer.
// ==============================================================================

use anyhow::{Context, Result};
use rust_xlsxwriter::{Color, Format, Workbook, Worksheet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use crate::processor::ProcessorConfig;
use crate::styling::{self, CellStyle, LegendEntry};
use crate::tables::{AssembledTables, Table, TableCell};

/// Download name of the codes table
pub const CODES_FILE_STEM: &str = "variant_files_statistics";
/// Download name of the nucleotides table
pub const NUCLEOTIDES_FILE_STEM: &str = "nucleotides";

pub const CODES_SHEET: &str = "Codes";
pub const NUCLEOTIDES_SHEET: &str = "Nucleotides";

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated text, one file per table
    Csv,
    /// Excel workbook, one sheet per table
    Xlsx,
    /// Tables, matrices, legend and run metadata
    Json,
}

impl OutputFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Json => "json",
        }
    }
}

/// Uploaded file as recorded in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFingerprint {
    pub file_name: String,
    pub size: u64,
    pub hash_sha256: String,
}

/// Run metadata
#[derive(Debug, Clone, Serialize)]
pub struct OutputMetadata {
    pub request_id: String,
    pub processing_date: String,
    pub reference_file: Option<InputFingerprint>,
    pub variant_files: Vec<InputFingerprint>,
    pub individuals: usize,
    pub markers: usize,
    /// Data rows across the reference and all variant spreadsheets
    pub total_rows_parsed: usize,
    pub cell_errors: usize,
    pub config: ProcessorConfig,
}

/// JSON report handed to the presentation layer
#[derive(Debug, Serialize)]
pub struct TablesReport<'a> {
    pub metadata: &'a OutputMetadata,
    pub legend: Vec<LegendEntry>,
    #[serde(flatten)]
    pub tables: &'a AssembledTables,
}

/// Multi-format output generator
pub struct OutputGenerator {
    output_dir: PathBuf,
    styled: bool,
}

impl OutputGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            styled: false,
        }
    }

    /// Colour XLSX cells by case and code type
    pub fn with_styling(mut self, styled: bool) -> Self {
        self.styled = styled;
        self
    }

    /// Generate output in specified formats
    ///
    /// # Returns
    /// * HashMap of format -> written file paths
    pub fn generate(
        &self,
        formats: &[OutputFormat],
        tables: &AssembledTables,
        metadata: &OutputMetadata,
    ) -> Result<HashMap<OutputFormat, Vec<PathBuf>>> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!("Failed to create output directory {:?}", self.output_dir)
        })?;

        let mut result = HashMap::new();
        for format in formats {
            if result.contains_key(format) {
                continue;
            }
            let paths = match format {
                OutputFormat::Csv => self.generate_csv(tables)?,
                OutputFormat::Xlsx => vec![self.generate_xlsx(tables)?],
                OutputFormat::Json => vec![self.generate_json(tables, metadata)?],
            };
            result.insert(*format, paths);
        }

        Ok(result)
    }

    fn path_for(&self, stem: &str, format: OutputFormat) -> PathBuf {
        self.output_dir.join(format!("{}.{}", stem, format.extension()))
    }

    fn generate_csv(&self, tables: &AssembledTables) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(2);

        for (stem, table) in [
            (CODES_FILE_STEM, &tables.codes),
            (NUCLEOTIDES_FILE_STEM, &tables.nucleotides),
        ] {
            let path = self.path_for(stem, OutputFormat::Csv);
            info!("Generating CSV output: {:?}", path);

            let file = std::fs::File::create(&path)
                .with_context(|| format!("Failed to create CSV output file {:?}", path))?;
            write_csv(table, file)?;
            paths.push(path);
        }

        Ok(paths)
    }

    fn generate_xlsx(&self, tables: &AssembledTables) -> Result<PathBuf> {
        let path = self.path_for(CODES_FILE_STEM, OutputFormat::Xlsx);
        info!("Generating XLSX output: {:?} (styled: {})", path, self.styled);

        let mut workbook = build_workbook(tables, self.styled)?;
        workbook
            .save(&path)
            .with_context(|| format!("Failed to write XLSX output {:?}", path))?;

        Ok(path)
    }

    fn generate_json(&self, tables: &AssembledTables, metadata: &OutputMetadata) -> Result<PathBuf> {
        let path = self.path_for(CODES_FILE_STEM, OutputFormat::Json);
        info!("Generating JSON output: {:?}", path);

        let file = std::fs::File::create(&path)
            .context("Failed to create JSON output file")?;

        let report = TablesReport {
            metadata,
            legend: styling::legend(),
            tables,
        };
        serde_json::to_writer_pretty(file, &report)
            .context("Failed to write JSON output")?;

        info!(
            "JSON output complete: {} individuals, {} markers",
            metadata.individuals, metadata.markers
        );

        Ok(path)
    }
}

/// Write a table as CSV: header row, then one record per row, no index
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(table.headers())?;

    for row in &table.rows {
        let record = std::iter::once(row.individual.clone())
            .chain(row.cells.iter().map(TableCell::to_string));
        csv_writer.write_record(record)?;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// CSV text of a table
pub fn table_to_csv_string(table: &Table) -> Result<String> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Workbook with the codes and nucleotides tables as separate sheets
pub fn build_workbook(tables: &AssembledTables, styled: bool) -> Result<Workbook> {
    let mut workbook = Workbook::new();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(CODES_SHEET)?;
    write_sheet(worksheet, &tables.codes, |row, column| {
        if styled {
            styling::code_cell_style(tables, row, column)
        } else {
            None
        }
    })?;

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(NUCLEOTIDES_SHEET)?;
    write_sheet(worksheet, &tables.nucleotides, |row, column| {
        if styled {
            styling::nucleotide_cell_style(tables, row, column)
        } else {
            None
        }
    })?;

    Ok(workbook)
}

fn write_sheet<F>(worksheet: &mut Worksheet, table: &Table, style_for: F) -> Result<()>
where
    F: Fn(usize, usize) -> Option<CellStyle>,
{
    let header_format = Format::new().set_bold();
    for (column, header) in table.headers().iter().enumerate() {
        worksheet.write_string_with_format(0, u16::try_from(column)?, header, &header_format)?;
    }

    for (index, row) in table.rows.iter().enumerate() {
        let row_num = u32::try_from(index + 1)?;
        worksheet.write_string(row_num, 0, &row.individual)?;

        for (column, cell) in row.cells.iter().enumerate() {
            let col_num = u16::try_from(column + 1)?;
            let format = style_for(index, column).map(cell_format).unwrap_or_else(Format::new);

            match cell {
                TableCell::Integer(n) => {
                    worksheet.write_number_with_format(row_num, col_num, *n as f64, &format)?;
                }
                TableCell::Text(text) | TableCell::Error { error: text } => {
                    worksheet.write_string_with_format(row_num, col_num, text, &format)?;
                }
            }
        }
    }

    Ok(())
}

fn cell_format(style: CellStyle) -> Format {
    let format = Format::new().set_font_color(Color::RGB(style.text));
    match style.background {
        Some(background) => format.set_background_color(Color::RGB(background)),
        None => format,
    }
}
