// ==============================================================================
// main.rs - Genotype Tables Entry Point
// ==============================================================================
// Description: Command-line entry point building genotype tables from an RS
//              totales file and per-individual variant spreadsheets
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genotype_tables::output::OutputFormat;
use genotype_tables::processor::{collect_variant_files, InputFiles, ProcessorConfig, TableProcessor};
use genotype_tables::validator::{FileValidator, DEFAULT_MAX_FILE_SIZE};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// RS totales (reference catalog) spreadsheet
    #[arg(short, long, env = "GT_REFERENCE")]
    reference: Option<PathBuf>,

    /// Variant spreadsheet, one per individual (repeatable)
    #[arg(short, long = "variants", num_args = 1..)]
    variants: Vec<PathBuf>,

    /// Directory whose spreadsheets are all variant files
    #[arg(long, env = "GT_VARIANTS_DIR")]
    variants_dir: Vec<PathBuf>,

    /// Directory receiving the exports
    #[arg(short, long, env = "GT_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Export format (repeatable)
    #[arg(short, long, value_enum, default_values_t = [OutputFormat::Csv, OutputFormat::Xlsx])]
    format: Vec<OutputFormat>,

    /// Colour XLSX cells by zygosity and code type
    #[arg(long)]
    styled: bool,

    /// Parse frequencies starting with "1" instead of reading them as 1
    #[arg(long)]
    strict_frequency: bool,

    /// Maximum accepted upload size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_FILE_SIZE)]
    max_file_size: u64,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genotype_tables=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Genotype Tables starting...");

    // Parse command line arguments
    let args = Args::parse();

    let validator = FileValidator::with_max_file_size(args.max_file_size);
    let variants = collect_variant_files(&args.variants, &args.variants_dir, &validator)?;

    let config = ProcessorConfig {
        output_dir: args.output_dir,
        formats: args.format,
        styled: args.styled,
        strict_frequency: args.strict_frequency,
        max_file_size: args.max_file_size,
    };

    let processor = TableProcessor::new(config);
    let inputs = InputFiles {
        reference: args.reference,
        variants,
    };

    match processor.process(&inputs) {
        Ok(summary) => {
            info!(
                "Processing completed successfully: {} rows parsed",
                summary.total_rows_parsed()
            );
            let mut outputs: Vec<_> = summary.outputs.values().flatten().collect();
            outputs.sort();
            for path in outputs {
                info!("Wrote {:?}", path);
            }
            Ok(())
        }
        Err(e) => {
            error!("Processing failed: {:#}", e);
            Err(e)
        }
    }
}
