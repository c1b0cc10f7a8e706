//! Output formatting shared by the process, text and batch commands.

use mailslice_core::{ExtractionResult, FieldRecord, PageResult};

/// Longest value shown per field in the text summary.
const PREVIEW_CHARS: usize = 60;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per slice
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension for written outputs.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&result.page)?),
        OutputFormat::Csv => format_csv(&result.page),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(page: &PageResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let template = FieldRecord::default();
    let mut header = vec!["page", "slice"];
    header.extend(template.columns().iter().map(|(name, _)| *name));
    wtr.write_record(&header)?;

    let page_key = page.key();
    for (slice, record) in page.named_slices() {
        let mut row = vec![page_key.as_str(), slice.as_str()];
        let columns = record.columns();
        row.extend(columns.iter().map(|(_, value)| *value));
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} ({} sections, source: {}, {}ms)\n",
        result.page.key(),
        result.sections.len(),
        result.source.as_str(),
        result.processing_time_ms
    ));

    for (slice, record) in result.page.named_slices() {
        output.push('\n');
        output.push_str(&format!("{}: {} fields\n", slice, record.filled_count()));
        for (column, value) in record.columns() {
            if !value.is_empty() {
                output.push_str(&format!("  {}: {}\n", column, preview(value)));
            }
        }
    }

    output
}

/// First line of `value`, shortened to [`PREVIEW_CHARS`].
fn preview(value: &str) -> String {
    let first_line = value.lines().next().unwrap_or("");
    let mut shown: String = first_line.chars().take(PREVIEW_CHARS).collect();
    if shown.len() < value.len() {
        shown.push('…');
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;
    use mailslice_core::models::config::MailsliceConfig;
    use mailslice_core::PageProcessor;

    fn sample() -> ExtractionResult {
        PageProcessor::new(MailsliceConfig::default())
            .process_text("Subject Line: Hello\nunsubscribe\nSubject Line: Hi, again", 2)
    }

    #[test]
    fn test_csv_has_row_per_slice() {
        let csv = format_result(&sample(), OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("page,slice,to_email_address"));
        assert!(lines[0].ends_with("stemline.name,stemline.phone,stemline.email"));
        assert!(lines[2].contains("\"Hi, again\""));
    }

    #[test]
    fn test_text_summary_lists_filled_fields() {
        let text = format_result(&sample(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("page2 (2 sections"));
        assert!(text.contains("slice1: 1 fields\n  subject_line: Hello\n"));
        assert!(text.contains("slice3: 0 fields"));
    }

    #[test]
    fn test_preview_truncates() {
        assert_eq!(preview("short"), "short");
        assert_eq!(preview("first\nsecond"), "first…");
        assert_eq!(preview(&"x".repeat(80)).chars().count(), PREVIEW_CHARS + 1);
    }
}
