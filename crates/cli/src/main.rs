//! CLI tool for extracting assessment text from PowerPoint decks.

use anyhow::{Context, Result};
use assess_core::{has_pptx_extension, AssessmentExtractor, AssessmentRecord};
use assess_pptx::PptxParser;
use assess_xlsx::ReportWriter;
use clap::Parser;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Extract assessment text boxes from PowerPoint decks into Excel reports.
#[derive(Parser, Debug)]
#[command(name = "assess-extract")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input PowerPoint file(s) (.pptx)
    #[arg(required = true)]
    input: Vec<PathBuf>,

    /// Output directory (default: same as input file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print slide/text pairs to stdout instead of writing a workbook
    #[arg(short, long)]
    print: bool,

    /// Literal prefix a text box must start with
    #[arg(long, default_value = assess_core::DEFAULT_PREFIX)]
    prefix: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    let extractor = AssessmentExtractor::with_prefix(args.prefix.as_str());

    for input_path in &args.input {
        if args.verbose {
            eprintln!("Processing: {}", input_path.display());
        }

        match process_file(input_path, &args, &extractor) {
            Ok(records) => {
                if records.is_empty() {
                    eprintln!(
                        "{}: no assessments found; nothing written",
                        input_path.display()
                    );
                } else if args.print {
                    for record in &records {
                        println!("{}\t{}", record.slide, record.text);
                    }
                } else {
                    let output_path = get_output_path(input_path, args.output.as_ref())?;
                    ReportWriter::new(&output_path)
                        .write(&records)
                        .with_context(|| format!("Failed to write {}", output_path.display()))?;
                    if args.verbose {
                        eprintln!("Written to: {}", output_path.display());
                    }
                }
            }
            Err(e) => {
                eprintln!("Error processing {}: {}", input_path.display(), e);
            }
        }
    }

    Ok(())
}

/// Parse one presentation and collect its assessment records.
fn process_file(
    input_path: &Path,
    args: &Args,
    extractor: &AssessmentExtractor,
) -> Result<Vec<AssessmentRecord>> {
    if !has_pptx_extension(input_path) {
        anyhow::bail!("not a .pptx file");
    }

    let file = File::open(input_path)
        .with_context(|| format!("Failed to open {}", input_path.display()))?;
    let reader = BufReader::new(file);

    let filename = input_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    log::debug!("Parsing {}", filename);
    let deck = PptxParser::new()
        .parse(reader, filename)
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    if args.verbose {
        eprintln!("  Found {} slides", deck.slides.len());
    }

    let records = extractor.extract(&deck);

    if args.verbose {
        eprintln!("  Matched {} assessment(s)", records.len());
    }

    Ok(records)
}

/// Determine the output path for a processed file.
fn get_output_path(input_path: &Path, output_dir: Option<&PathBuf>) -> Result<PathBuf> {
    let stem = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let output_filename = format!("{}.xlsx", stem);

    let output_path = match output_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
            dir.join(output_filename)
        }
        None => {
            if let Some(parent) = input_path.parent() {
                parent.join(output_filename)
            } else {
                PathBuf::from(output_filename)
            }
        }
    };

    Ok(output_path)
}
