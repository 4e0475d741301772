// ==============================================================================
// processor.rs - Genotype Table Request Pipeline
// ==============================================================================
// Description: Validates the uploaded spreadsheets, loads the reference catalog
//              and variant records, assembles the tables and writes the exports
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::frequency::FrequencyClassifier;
use crate::genotype_resolver::MarkerResolver;
use crate::output::{OutputFormat, OutputGenerator, OutputMetadata};
use crate::parsers::{ReferenceCatalog, VariantRecord};
use crate::tables::{AssembledTables, TableAssembler};
use crate::validator::{FileValidator, ValidatedFile, DEFAULT_MAX_FILE_SIZE};

/// Message returned when a request lacks the reference or any variant file
pub const MISSING_UPLOADS: &str = "Please upload all required files";

/// Run options, echoed in the JSON report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    pub output_dir: PathBuf,
    pub formats: Vec<OutputFormat>,
    /// Colour XLSX cells by case and code type
    pub styled: bool,
    /// Parse frequencies starting with "1" instead of short-circuiting them
    pub strict_frequency: bool,
    pub max_file_size: u64,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            formats: vec![OutputFormat::Csv, OutputFormat::Xlsx],
            styled: false,
            strict_frequency: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl ProcessorConfig {
    pub fn classifier(&self) -> FrequencyClassifier {
        if self.strict_frequency {
            FrequencyClassifier::strict()
        } else {
            FrequencyClassifier::new()
        }
    }
}

/// Files submitted with one request
#[derive(Debug, Clone, Default)]
pub struct InputFiles {
    pub reference: Option<PathBuf>,
    pub variants: Vec<PathBuf>,
}

/// Outcome of one request
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub metadata: OutputMetadata,
    pub tables: AssembledTables,
    pub outputs: HashMap<OutputFormat, Vec<PathBuf>>,
}

impl RunSummary {
    pub fn total_rows_parsed(&self) -> usize {
        self.metadata.total_rows_parsed
    }
}

/// Variant files named explicitly plus the spreadsheets directly inside
/// `dirs`, each directory listed in filename order
pub fn collect_variant_files(
    paths: &[PathBuf],
    dirs: &[PathBuf],
    validator: &FileValidator,
) -> Result<Vec<PathBuf>> {
    let mut files = paths.to_vec();

    for dir in dirs {
        debug!("Collecting variant files in {:?}", dir);

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| format!("Failed to read directory {:?}", dir))?;
            if !entry.file_type().is_file() {
                continue;
            }
            if validator.is_allowed(entry.path()) {
                files.push(entry.into_path());
            } else {
                debug!("Skipping non-spreadsheet file {:?}", entry.path());
            }
        }
    }

    Ok(files)
}

pub struct TableProcessor {
    request_id: Uuid,
    config: ProcessorConfig,
}

impl TableProcessor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self::with_request_id(Uuid::new_v4(), config)
    }

    pub fn with_request_id(request_id: Uuid, config: ProcessorConfig) -> Self {
        Self { request_id, config }
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    /// Main processing pipeline
    pub fn process(&self, inputs: &InputFiles) -> Result<RunSummary> {
        let span = info_span!("request", id = %self.request_id);
        let _guard = span.enter();

        info!(
            "Starting genotype table request with {} variant file(s)",
            inputs.variants.len()
        );
        debug!("Config: {:?}", self.config);

        // 1. All uploads present
        let reference_path = match &inputs.reference {
            Some(path) if !inputs.variants.is_empty() => path,
            _ => anyhow::bail!(MISSING_UPLOADS),
        };

        // 2. Validate uploads
        let validator = FileValidator::with_max_file_size(self.config.max_file_size);
        let reference_file = validator
            .validate_upload(reference_path)
            .context("Reference file validation failed")?;
        let variant_files = self.validate_variants(&validator, &inputs.variants)?;

        // 3. Load reference catalog
        info!("Loading RS totales file: {:?}", reference_path);
        let catalog = ReferenceCatalog::load(reference_path)
            .context("Failed to load RS totales file")?;
        if catalog.is_empty() {
            warn!("RS totales file defines no markers");
        }

        // 4. Load variant records
        let records = self.load_records(&inputs.variants)?;

        // 5. Assemble tables
        let assembler = TableAssembler::new(MarkerResolver::new(self.config.classifier()));
        let tables = assembler.build(&records, &catalog);

        let total_rows_parsed =
            catalog.rows_parsed() + records.iter().map(VariantRecord::rows_parsed).sum::<usize>();
        info!("Total rows parsed: {}", total_rows_parsed);

        let metadata = OutputMetadata {
            request_id: self.request_id.to_string(),
            processing_date: chrono::Utc::now().to_rfc3339(),
            reference_file: Some(reference_file.fingerprint()),
            variant_files: variant_files.iter().map(ValidatedFile::fingerprint).collect(),
            individuals: records.len(),
            markers: catalog.len(),
            total_rows_parsed,
            cell_errors: tables.cell_errors,
            config: self.config.clone(),
        };

        // 6. Write exports
        let outputs = OutputGenerator::new(self.config.output_dir.clone())
            .with_styling(self.config.styled)
            .generate(&self.config.formats, &tables, &metadata)
            .context("Failed to write output files")?;

        info!(
            "Request complete: {} individuals x {} markers, {} cell error(s)",
            metadata.individuals, metadata.markers, metadata.cell_errors
        );

        Ok(RunSummary {
            metadata,
            tables,
            outputs,
        })
    }

    fn validate_variants(&self, validator: &FileValidator, paths: &[PathBuf]) -> Result<Vec<ValidatedFile>> {
        paths
            .iter()
            .map(|path| {
                validator
                    .validate_upload(path)
                    .with_context(|| format!("Variant file validation failed: {:?}", path))
            })
            .collect()
    }

    fn load_records(&self, paths: &[PathBuf]) -> Result<Vec<VariantRecord>> {
        let mut records = Vec::with_capacity(paths.len());

        for path in paths {
            let record = VariantRecord::load(path)
                .with_context(|| format!("Failed to load variant file {}", display_name(path)))?;
            records.push(record);
        }

        info!("Loaded {} variant file(s)", records.len());
        Ok(records)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::TableCell;

    const REFERENCE: &str = "\
dbSNP ID,Reference Allele,Variant Allele,Codigo reference allele,Codigo variant allele
rs1,A,G,0,1
rs2,C,T,0,1
";

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn config(output_dir: &Path) -> ProcessorConfig {
        ProcessorConfig {
            output_dir: output_dir.to_path_buf(),
            formats: vec![OutputFormat::Csv, OutputFormat::Json],
            ..ProcessorConfig::default()
        }
    }

    #[test]
    fn test_missing_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let processor = TableProcessor::new(config(dir.path()));

        let err = processor.process(&InputFiles::default()).unwrap_err();
        assert_eq!(err.to_string(), MISSING_UPLOADS);

        let reference = write(dir.path(), "rs.csv", REFERENCE);
        let inputs = InputFiles {
            reference: Some(reference),
            variants: Vec::new(),
        };
        let err = processor.process(&inputs).unwrap_err();
        assert_eq!(err.to_string(), MISSING_UPLOADS);
    }

    #[test]
    fn test_end_to_end() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let reference = write(input.path(), "rs_totales.csv", REFERENCE);
        let variants = vec![
            write(
                input.path(),
                "73_variants.csv",
                "dbSNP ID,Variant Frequency,Reference Allele,Variant Allele\nrs1,\"0,50\",A,G\n",
            ),
            write(
                input.path(),
                "12_variants.csv",
                "dbSNP ID,Variant Frequency,Reference Allele,Variant Allele\nrs9,1,G,T\n,,,\nrs2,1,C,T\n",
            ),
        ];

        let processor = TableProcessor::new(config(output.path()));
        let summary = processor
            .process(&InputFiles {
                reference: Some(reference),
                variants,
            })
            .unwrap();

        // blank row in 12_variants.csv still counts
        assert_eq!(summary.total_rows_parsed(), 6);
        assert_eq!(summary.metadata.individuals, 2);
        assert_eq!(summary.metadata.markers, 2);
        assert_eq!(summary.metadata.cell_errors, 0);
        assert_eq!(summary.metadata.variant_files.len(), 2);
        assert_eq!(summary.metadata.request_id, processor.request_id().to_string());

        let codes = &summary.tables.codes;
        assert_eq!(codes.rows[0].individual, "73");
        assert_eq!(codes.cell(1, 0), Some(&TableCell::Integer(1)));
        assert_eq!(codes.cell(2, 1), Some(&TableCell::Integer(1)));

        let nucleotides = std::fs::read_to_string(output.path().join("nucleotides.csv")).unwrap();
        assert_eq!(nucleotides, "Individual,rs1,rs2\n73,AG,CC\n12,AA,TT\n");

        assert_eq!(summary.outputs[&OutputFormat::Csv].len(), 2);
        assert!(summary.outputs[&OutputFormat::Json][0].exists());
        assert!(!summary.outputs.contains_key(&OutputFormat::Xlsx));
    }

    #[test]
    fn test_strict_frequency() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let reference = write(input.path(), "rs.csv", REFERENCE);
        let variant = write(
            input.path(),
            "5.csv",
            "dbSNP ID,Variant Frequency,Reference Allele,Variant Allele\nrs1,1.5,A,G\n",
        );
        let inputs = InputFiles {
            reference: Some(reference),
            variants: vec![variant],
        };

        let lenient = TableProcessor::new(config(output.path())).process(&inputs).unwrap();
        assert_eq!(lenient.metadata.cell_errors, 0);
        assert_eq!(lenient.tables.nucleotides.rows[0].cells[0].to_string(), "GG");

        let strict_config = ProcessorConfig {
            strict_frequency: true,
            ..config(output.path())
        };
        let strict = TableProcessor::new(strict_config).process(&inputs).unwrap();
        assert_eq!(strict.metadata.cell_errors, 1);
        assert_eq!(
            strict.tables.nucleotides.rows[0].cells[0].to_string(),
            "ERROR (Invalid frequency: 1.5)"
        );
    }

    #[test]
    fn test_schema_error_names_columns() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let reference = write(input.path(), "rs.csv", "dbSNP ID,Reference Allele\nrs1,A\n");
        let variant = write(
            input.path(),
            "5.csv",
            "dbSNP ID,Variant Frequency,Reference Allele,Variant Allele\nrs1,1,A,G\n",
        );

        let err = TableProcessor::new(config(output.path()))
            .process(&InputFiles {
                reference: Some(reference),
                variants: vec![variant],
            })
            .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("Variant Allele"));
        assert!(message.contains("Codigo reference allele"));
        assert!(message.contains("Codigo variant allele"));
    }

    #[test]
    fn test_collect_variant_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b.csv", "");
        write(dir.path(), "a.xlsx", "");
        write(dir.path(), "notes.txt", "");
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        write(&dir.path().join("nested"), "c.csv", "");

        let explicit = PathBuf::from("/tmp/explicit.csv");
        let files = collect_variant_files(
            &[explicit.clone()],
            &[dir.path().to_path_buf()],
            &FileValidator::new(),
        )
        .unwrap();

        assert_eq!(
            files,
            vec![explicit, dir.path().join("a.xlsx"), dir.path().join("b.csv")]
        );
    }
}
