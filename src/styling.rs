// ==============================================================================
// styling.rs - Cell Styling Hints
// ==============================================================================
// Description: Background and text colours derived from the case and
//              code-type matrices, plus the colour legend
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Legend:
//   HOMOZYGOUS   → light blue background (#ADD8E6)
//   HETEROZYGOUS → orange background     (#FFA500)
//   REFERENCE    → no background
//   reference code text → black, variant code text → dark red (#C00000)
// ==============================================================================

use serde::Serialize;

use crate::models::{CodeType, SequenceCase};
use crate::tables::AssembledTables;

pub const HOMOZYGOUS_BACKGROUND: u32 = 0xADD8E6;
pub const HETEROZYGOUS_BACKGROUND: u32 = 0xFFA500;
pub const REFERENCE_TEXT: u32 = 0x000000;
pub const VARIANT_TEXT: u32 = 0xC00000;

/// Style of one rendered cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CellStyle {
    /// RGB background, `None` for uncoloured cells
    pub background: Option<u32>,
    /// RGB text colour
    pub text: u32,
}

pub fn background_for(case: SequenceCase) -> Option<u32> {
    match case {
        SequenceCase::Homozygous => Some(HOMOZYGOUS_BACKGROUND),
        SequenceCase::Heterozygous => Some(HETEROZYGOUS_BACKGROUND),
        SequenceCase::Reference => None,
    }
}

pub fn text_color_for(code_type: CodeType) -> u32 {
    match code_type {
        CodeType::Reference => REFERENCE_TEXT,
        CodeType::Variant => VARIANT_TEXT,
    }
}

/// `#RRGGBB` form of an RGB value
pub fn hex(rgb: u32) -> String {
    format!("#{:06X}", rgb)
}

/// Style of a codes-table cell (marker column index, identifier excluded)
pub fn code_cell_style(tables: &AssembledTables, row: usize, column: usize) -> Option<CellStyle> {
    let case = tables.case_matrix.get(row, column)?;
    let code_type = tables.code_type_matrix.get(row, column)?;
    Some(CellStyle {
        background: background_for(*case),
        text: text_color_for(*code_type),
    })
}

/// Style of a nucleotides-table cell; text colour is not varied
pub fn nucleotide_cell_style(tables: &AssembledTables, individual: usize, column: usize) -> Option<CellStyle> {
    let case = tables.case_for_individual(individual, column)?;
    Some(CellStyle {
        background: background_for(case),
        text: REFERENCE_TEXT,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    pub case: SequenceCase,
    pub color: Option<String>,
    pub label: &'static str,
}

pub fn legend() -> Vec<LegendEntry> {
    [
        (SequenceCase::Homozygous, "Homozygous variant (frequency = 1)"),
        (SequenceCase::Heterozygous, "Heterozygous (frequency = 0.5)"),
        (SequenceCase::Reference, "Reference only (RS not found in variant file)"),
    ]
    .into_iter()
    .map(|(case, label)| LegendEntry {
        case,
        color: background_for(case).map(hex),
        label,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlleleCode;
    use crate::parsers::{MarkerDefinition, ReferenceCatalog, VariantRecord, VariantRow};
    use crate::models::CellValue;
    use crate::tables::TableAssembler;

    #[test]
    fn test_hex() {
        assert_eq!(hex(HOMOZYGOUS_BACKGROUND), "#ADD8E6");
        assert_eq!(hex(REFERENCE_TEXT), "#000000");
        assert_eq!(hex(VARIANT_TEXT), "#C00000");
    }

    #[test]
    fn test_legend() {
        let legend = legend();
        assert_eq!(legend.len(), 3);
        assert_eq!(legend[0].color.as_deref(), Some("#ADD8E6"));
        assert_eq!(legend[1].color.as_deref(), Some("#FFA500"));
        assert_eq!(legend[2].color, None);
    }

    #[test]
    fn test_cell_styles_follow_matrices() {
        let catalog = ReferenceCatalog::from_markers(vec![MarkerDefinition::new(
            "rs1",
            AlleleCode::new("0"),
            AlleleCode::new("1"),
            "A",
            "G",
        )]);
        let record = VariantRecord::from_rows(
            "73.xlsx",
            vec![VariantRow {
                marker_id: "rs1".to_string(),
                frequency: CellValue::Number(0.5),
                reference_allele: "A".to_string(),
                variant_allele: "G".to_string(),
            }],
        );
        let tables = TableAssembler::default().build(&[record], &catalog);

        let first = code_cell_style(&tables, 0, 0).unwrap();
        assert_eq!(first.background, Some(HETEROZYGOUS_BACKGROUND));
        assert_eq!(first.text, REFERENCE_TEXT);

        let second = code_cell_style(&tables, 1, 0).unwrap();
        assert_eq!(second.text, VARIANT_TEXT);

        let pair = nucleotide_cell_style(&tables, 0, 0).unwrap();
        assert_eq!(pair.background, Some(HETEROZYGOUS_BACKGROUND));

        assert!(code_cell_style(&tables, 2, 0).is_none());
    }
}
