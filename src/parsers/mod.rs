// ==============================================================================
// parsers/mod.rs - Spreadsheet parser modules
// ==============================================================================
// Description: Parsers for the reference catalog and per-individual variant tables
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod sheet;
pub mod reference_catalog;
pub mod variant_record;

pub use sheet::{Sheet, SheetError, SchemaError};
pub use reference_catalog::{ReferenceCatalog, MarkerDefinition, CatalogError};
pub use variant_record::{VariantRecord, VariantRow, RecordError, individual_id_from_filename};
