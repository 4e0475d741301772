// ==============================================================================
// genotype_resolver.rs - Marker Genotype Resolution
// ==============================================================================
// Description: Turns an individual's variant frequency at a catalog marker into
//              a zygosity call, an allele-code pair and a nucleotide pair
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Algorithm:
//   Given REF/ALT codes and nucleotides from the reference catalog:
//   - marker absent from the individual's table → REF/REF  (e.g. 0 0, "AA")
//   - frequency rounds to 0                      → REF/REF
//   - frequency rounds to 0.5                    → REF/ALT  (e.g. 0 1, "AG")
//   - frequency rounds to 1                      → ALT/ALT  (e.g. 1 1, "GG")
//   - unreadable frequency → error text at both positions, REFERENCE case
// ==============================================================================

use crate::frequency::{FrequencyClass, FrequencyClassifier, FrequencyError};
use crate::models::{AlleleCode, AllelePosition, CodeType, Rendered, SequenceCase, Zygosity};
use crate::parsers::{MarkerDefinition, VariantRecord};

/// Resolves (individual, marker) pairs using a frequency classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerResolver {
    classifier: FrequencyClassifier,
}

impl MarkerResolver {
    pub fn new(classifier: FrequencyClassifier) -> Self {
        Self { classifier }
    }

    /// Zygosity call for a marker
    ///
    /// # Returns
    /// * `Ok(HomozygousReference)` - marker not in the record, or frequency ≈ 0
    /// * `Ok(Heterozygous)` - frequency ≈ 0.5
    /// * `Ok(HomozygousVariant)` - frequency ≈ 1
    /// * `Err(FrequencyError)` - the record's frequency cannot be classified
    pub fn zygosity(
        &self,
        record: &VariantRecord,
        marker: &MarkerDefinition,
    ) -> Result<Zygosity, FrequencyError> {
        let row = match record.find_marker(&marker.id) {
            Some(row) => row,
            None => return Ok(Zygosity::HomozygousReference),
        };

        Ok(match self.classifier.classify(&row.frequency)? {
            FrequencyClass::Zero => Zygosity::HomozygousReference,
            FrequencyClass::Half => Zygosity::Heterozygous,
            FrequencyClass::One => Zygosity::HomozygousVariant,
        })
    }

    /// Case used for cell styling
    ///
    /// Unreadable frequencies report `Reference`, same as a missing marker.
    pub fn get_case(&self, record: &VariantRecord, marker: &MarkerDefinition) -> SequenceCase {
        self.zygosity(record, marker)
            .map(|zygosity| zygosity.case())
            .unwrap_or(SequenceCase::Reference)
    }

    /// Allele code at `position`
    ///
    /// # Examples
    /// ```
    /// use genotype_tables::genotype_resolver::MarkerResolver;
    /// use genotype_tables::models::{AlleleCode, AllelePosition, CellValue, Rendered};
    /// use genotype_tables::parsers::{MarkerDefinition, VariantRecord, VariantRow};
    ///
    /// let marker = MarkerDefinition::new("rs1", AlleleCode::new("0"), AlleleCode::new("1"), "A", "G");
    /// let record = VariantRecord::from_rows("73.xlsx", vec![VariantRow {
    ///     marker_id: "rs1".to_string(),
    ///     frequency: CellValue::Text("0,50".to_string()),
    ///     reference_allele: "A".to_string(),
    ///     variant_allele: "G".to_string(),
    /// }]);
    ///
    /// let resolver = MarkerResolver::default();
    /// assert_eq!(resolver.resolve(&record, &marker, AllelePosition::First), Rendered::Value(AlleleCode::new("0")));
    /// assert_eq!(resolver.resolve(&record, &marker, AllelePosition::Second), Rendered::Value(AlleleCode::new("1")));
    /// ```
    pub fn resolve(
        &self,
        record: &VariantRecord,
        marker: &MarkerDefinition,
        position: AllelePosition,
    ) -> Rendered<AlleleCode> {
        match self.zygosity(record, marker) {
            Ok(zygosity) => Rendered::Value(match zygosity.allele_at(position) {
                CodeType::Reference => marker.ref_code.clone(),
                CodeType::Variant => marker.var_code.clone(),
            }),
            Err(e) => Rendered::Error(e.to_string()),
        }
    }

    /// Both nucleotides concatenated, reference first ("AA", "AG", "GG")
    pub fn nucleotide_pair(&self, record: &VariantRecord, marker: &MarkerDefinition) -> Rendered<String> {
        match self.zygosity(record, marker) {
            Ok(zygosity) => {
                let pair: String = AllelePosition::BOTH
                    .iter()
                    .map(|&position| match zygosity.allele_at(position) {
                        CodeType::Reference => marker.ref_allele.as_str(),
                        CodeType::Variant => marker.var_allele.as_str(),
                    })
                    .collect();
                Rendered::Value(pair)
            }
            Err(e) => Rendered::Error(e.to_string()),
        }
    }
}

/// Reference/variant classification of a rendered code
pub fn code_type(rendered: &Rendered<AlleleCode>, marker: &MarkerDefinition) -> CodeType {
    match rendered {
        Rendered::Value(code) if *code == marker.ref_code => CodeType::Reference,
        _ => CodeType::Variant,
    }
}
