//! Process command - extract fields from one PDF page or page image.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use mailslice_core::{ExtractionResult, PageProcessor};

use super::output::{format_result, OutputFormat};
use super::{build_processor, load_config};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or page image)
    #[arg(required = true)]
    input: PathBuf,

    /// Page holding the emails (default from config, normally 2)
    #[arg(short, long)]
    page: Option<u32>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also save the sectioned text for review
    #[arg(long)]
    sections_out: Option<PathBuf>,

    /// Also save the raw page text
    #[arg(long)]
    raw_out: Option<PathBuf>,

    /// Prefer the PDF's embedded text layer over OCR
    #[arg(long)]
    text_layer: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(page) = args.page {
        config.pdf.page_number = page;
    }
    if args.text_layer {
        config.pdf.prefer_text_layer = true;
    }

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );

    pb.set_message("Loading OCR models...");
    pb.set_position(10);
    let page_number = config.pdf.page_number;
    let ocr_required = extension != "pdf" || !config.pdf.prefer_text_layer;
    let processor = build_processor(config, args.model_dir.as_deref(), ocr_required)?;

    let result = match extension.as_str() {
        "pdf" => process_pdf(&args.input, &processor, page_number, &pb)?,
        "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" => {
            process_image(&args.input, &processor, page_number, &pb)?
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    pb.finish_and_clear();

    write_outputs(&result, &args, &mut io::stdout().lock())?;

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn process_pdf(
    path: &Path,
    processor: &PageProcessor,
    page_number: u32,
    pb: &ProgressBar,
) -> anyhow::Result<ExtractionResult> {
    pb.set_message("Loading PDF...");
    pb.set_position(20);
    let data = fs::read(path)?;

    pb.set_message(format!("Reading page {}...", page_number));
    pb.set_position(40);
    let result = processor.process_pdf(&data, page_number)?;

    pb.set_position(100);
    Ok(result)
}

fn process_image(
    path: &Path,
    processor: &PageProcessor,
    page_number: u32,
    pb: &ProgressBar,
) -> anyhow::Result<ExtractionResult> {
    pb.set_message("Loading image...");
    pb.set_position(20);
    let image = image::open(path)?;

    pb.set_message("Running OCR...");
    pb.set_position(40);
    let result = processor.process_image(&image, page_number)?;

    pb.set_position(100);
    Ok(result)
}

/// Write the requested files and the formatted result. The result goes to
/// `out` when no output file is given, so notices about side files go to
/// stderr to keep `out` parseable.
fn write_outputs(
    result: &ExtractionResult,
    args: &ProcessArgs,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    if let Some(path) = &args.raw_out {
        fs::write(path, &result.raw_text)?;
        eprintln!("{} Raw text written to {}", style("✓").green(), path.display());
    }

    if let Some(path) = &args.sections_out {
        fs::write(path, result.sectioned_text())?;
        eprintln!("{} Sections written to {}", style("✓").green(), path.display());
    }

    let output = format_result(result, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        writeln!(
            out,
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        )?;
    } else {
        writeln!(out, "{}", output)?;
    }

    Ok(())
}
