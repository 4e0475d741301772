// ==============================================================================
// tables.rs - Individual × Marker Table Assembly
// ==============================================================================
// Description: Builds the codes and nucleotides tables plus the case and
//              code-type matrices used for styling
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Layout:
//   codes        - two rows per individual (one per allele position)
//   nucleotides  - one row per individual
//   case_matrix, code_type_matrix - same shape as codes (marker columns only)
//   columns      - "Individual" + one column per catalog marker, catalog order
// ==============================================================================

use serde::Serialize;
use std::fmt;
use tracing::{debug, info, warn};

use crate::genotype_resolver::{code_type, MarkerResolver};
use crate::models::{as_integer, AllelePosition, CodeType, Rendered, SequenceCase};
use crate::parsers::{ReferenceCatalog, VariantRecord};

/// Header of the leading identifier column
pub const INDIVIDUAL_COLUMN: &str = "Individual";

/// One table cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TableCell {
    Integer(i64),
    Text(String),
    /// Frequency error shown in place of the value
    Error { error: String },
}

impl TableCell {
    pub fn from_rendered<T: fmt::Display>(rendered: &Rendered<T>) -> Self {
        match rendered {
            Rendered::Value(value) => TableCell::Text(value.to_string()),
            Rendered::Error(msg) => TableCell::Error { error: msg.clone() },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, TableCell::Error { .. })
    }

    fn integer_form(&self) -> Option<i64> {
        match self {
            TableCell::Integer(n) => Some(*n),
            TableCell::Text(s) => as_integer(s),
            TableCell::Error { .. } => None,
        }
    }
}

impl fmt::Display for TableCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableCell::Integer(n) => write!(f, "{}", n),
            TableCell::Text(s) => f.write_str(s),
            TableCell::Error { error } => f.write_str(error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub individual: String,
    pub cells: Vec<TableCell>,
}

/// Output table: individual id column followed by one column per marker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    /// Marker columns, in catalog order
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Full header row, identifier column first
    pub fn headers(&self) -> Vec<String> {
        std::iter::once(INDIVIDUAL_COLUMN.to_string())
            .chain(self.columns.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&TableCell> {
        self.rows.get(row)?.cells.get(column)
    }

    /// Turn marker columns whose every cell is integer-like into integers
    pub fn coerce_integer_columns(&mut self) {
        for column in 0..self.columns.len() {
            let integers: Option<Vec<i64>> = self
                .rows
                .iter()
                .map(|row| row.cells.get(column).and_then(TableCell::integer_form))
                .collect();

            if let Some(integers) = integers {
                for (row, value) in self.rows.iter_mut().zip(integers) {
                    row.cells[column] = TableCell::Integer(value);
                }
            }
        }
    }
}

/// Annotation matrix parallel to a table's marker columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Matrix<T> {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<T>>,
}

impl<T> Matrix<T> {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn get(&self, row: usize, column: usize) -> Option<&T> {
        self.rows.get(row)?.get(column)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything one request produces for the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct AssembledTables {
    pub codes: Table,
    pub nucleotides: Table,
    pub case_matrix: Matrix<SequenceCase>,
    pub code_type_matrix: Matrix<CodeType>,
    /// (individual, marker) cells whose frequency could not be classified
    pub cell_errors: usize,
}

impl AssembledTables {
    /// Case of an individual (nucleotides-table row) at a marker column
    pub fn case_for_individual(&self, individual: usize, column: usize) -> Option<SequenceCase> {
        self.case_matrix.get(individual * 2, column).copied()
    }
}

/// Assembles the output tables from all records and the catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct TableAssembler {
    resolver: MarkerResolver,
}

impl TableAssembler {
    pub fn new(resolver: MarkerResolver) -> Self {
        Self { resolver }
    }

    pub fn build(&self, records: &[VariantRecord], catalog: &ReferenceCatalog) -> AssembledTables {
        info!(
            "Assembling tables for {} individuals x {} markers",
            records.len(),
            catalog.len()
        );

        let columns: Vec<String> = catalog.ids().map(str::to_string).collect();
        let mut codes = Table::new(columns.clone());
        let mut nucleotides = Table::new(columns.clone());
        let mut case_matrix = Matrix::new(columns.clone());
        let mut code_type_matrix = Matrix::new(columns);
        let mut cell_errors = 0;

        for record in records {
            let individual = record.individual_id().to_string();
            let mut code_rows = [Vec::new(), Vec::new()];
            let mut code_types = [Vec::new(), Vec::new()];
            let mut cases = Vec::with_capacity(catalog.len());
            let mut pairs = Vec::with_capacity(catalog.len());

            for marker in catalog.markers() {
                for position in AllelePosition::BOTH {
                    let rendered = self.resolver.resolve(record, marker, position);
                    code_types[position.index()].push(code_type(&rendered, marker));
                    code_rows[position.index()].push(TableCell::from_rendered(&rendered));
                }

                let case = self.resolver.get_case(record, marker);
                cases.push(case);

                let pair = self.resolver.nucleotide_pair(record, marker);
                if let Rendered::Error(msg) = &pair {
                    cell_errors += 1;
                    warn!("Individual {} at {}: {}", individual, marker.id, msg);
                }
                pairs.push(TableCell::from_rendered(&pair));
            }

            for (cells, types) in code_rows.into_iter().zip(code_types) {
                codes.rows.push(TableRow {
                    individual: individual.clone(),
                    cells,
                });
                case_matrix.rows.push(cases.clone());
                code_type_matrix.rows.push(types);
            }

            nucleotides.rows.push(TableRow {
                individual,
                cells: pairs,
            });
        }

        codes.coerce_integer_columns();
        debug!("Codes table: {} rows, {} cell errors", codes.len(), cell_errors);

        AssembledTables {
            codes,
            nucleotides,
            case_matrix,
            code_type_matrix,
            cell_errors,
        }
    }
}
