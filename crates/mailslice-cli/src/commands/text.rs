//! Text command - run extraction on saved OCR text.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::info;

use mailslice_core::{PageProcessor, SplitStrategy};

use super::load_config;
use super::output::{format_result, OutputFormat};

/// Arguments for the text command.
#[derive(Args)]
pub struct TextArgs {
    /// OCR text file, or `-` for stdin
    #[arg(required = true)]
    input: PathBuf,

    /// Page number the text came from
    #[arg(short, long)]
    page: Option<u32>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Section splitting strategy (default from config)
    #[arg(short, long, value_enum)]
    strategy: Option<Strategy>,

    /// Marker for the unsubscribe strategy
    #[arg(long)]
    split_marker: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum Strategy {
    /// Split after each "unsubscribe" notice
    Unsubscribe,
    /// Split on "Section 1/2/3" labels
    Labels,
}

impl From<Strategy> for SplitStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Unsubscribe => SplitStrategy::Unsubscribe,
            Strategy::Labels => SplitStrategy::Labels,
        }
    }
}

pub async fn run(args: TextArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(strategy) = args.strategy {
        config.extraction.split_strategy = strategy.into();
    }
    if let Some(marker) = &args.split_marker {
        config.extraction.split_marker = marker.clone();
    }
    let page_number = args.page.unwrap_or(config.pdf.page_number);

    let text = if args.input.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        if !args.input.exists() {
            anyhow::bail!("Input file not found: {}", args.input.display());
        }
        fs::read_to_string(&args.input)?
    };

    info!("Extracting from {} characters of text", text.len());

    let result = PageProcessor::new(config).process_text(&text, page_number);
    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    for warning in &result.warnings {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    Ok(())
}
