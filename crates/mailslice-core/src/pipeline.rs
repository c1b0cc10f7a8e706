//! Page pipeline: PDF page or OCR text in, page result out.

use std::time::Instant;

use chrono::{DateTime, Utc};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{MailsliceError, OcrError, PdfError, Result};
use crate::extract::assemble_page;
use crate::models::config::MailsliceConfig;
use crate::models::record::PageResult;
use crate::ocr::{ImageEnhancer, OcrBackend};
use crate::pdf::{PdfExtractor, PdfProcessor};
use crate::sections::{SectionSplitter, Sections, MAX_SECTIONS};

/// Where the page text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextSource {
    /// Recognized from the page image.
    Ocr,
    /// Read from the PDF's embedded text layer.
    TextLayer,
    /// Supplied by the caller, e.g. a saved OCR dump.
    Provided,
}

impl TextSource {
    pub fn as_str(self) -> &'static str {
        match self {
            TextSource::Ocr => "ocr",
            TextSource::TextLayer => "text_layer",
            TextSource::Provided => "provided",
        }
    }
}

/// Result of processing one page.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Three field records for the page.
    pub page: PageResult,
    /// Sections the text was split into.
    pub sections: Sections,
    /// Text the sections were cut from.
    pub raw_text: String,
    /// Origin of `raw_text`.
    pub source: TextSource,
    /// Non-fatal observations (missing sections, empty slices).
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
    /// When extraction finished.
    pub processed_at: DateTime<Utc>,
}

impl ExtractionResult {
    /// Sections rendered as the `Section N` review document.
    pub fn sectioned_text(&self) -> String {
        self.sections.to_labeled_text()
    }
}

/// Drives PDF access, OCR, splitting and extraction for single pages.
pub struct PageProcessor {
    config: MailsliceConfig,
    ocr: Option<Box<dyn OcrBackend>>,
}

impl PageProcessor {
    /// Create a processor without an OCR backend. Only text input and text-layer
    /// PDFs can be processed until one is attached.
    pub fn new(config: MailsliceConfig) -> Self {
        Self { config, ocr: None }
    }

    /// Attach the OCR backend used for scanned pages.
    pub fn with_ocr(mut self, backend: Box<dyn OcrBackend>) -> Self {
        self.ocr = Some(backend);
        self
    }

    pub fn config(&self) -> &MailsliceConfig {
        &self.config
    }

    fn splitter(&self) -> Box<dyn SectionSplitter> {
        let extraction = &self.config.extraction;
        extraction.split_strategy.splitter(&extraction.split_marker)
    }

    /// Split and extract already-recognized page text. Never fails.
    pub fn process_text(&self, text: &str, page_number: u32) -> ExtractionResult {
        self.finish(text.to_string(), page_number, TextSource::Provided, Instant::now())
    }

    /// Enhance and OCR a page image, then extract.
    pub fn process_image(&self, image: &DynamicImage, page_number: u32) -> Result<ExtractionResult> {
        let start = Instant::now();
        let text = self.recognize(image)?;
        Ok(self.finish(text, page_number, TextSource::Ocr, start))
    }

    /// Process one page of a PDF.
    ///
    /// With `prefer_text_layer` set, the embedded text is used when it is at
    /// least `min_text_length` characters long; otherwise the page image is
    /// OCR'd.
    pub fn process_pdf(&self, data: &[u8], page_number: u32) -> Result<ExtractionResult> {
        let start = Instant::now();
        let mut pdf = PdfExtractor::new();
        pdf.load(data)?;

        let page_count = pdf.page_count();
        if page_number == 0 || page_number > page_count {
            return Err(PdfError::InvalidPage(page_number).into());
        }
        info!("Processing page {} of {}", page_number, page_count);

        let pdf_config = &self.config.pdf;
        if pdf_config.prefer_text_layer {
            match pdf.page_text(page_number) {
                Ok(text) if text.trim().chars().count() >= pdf_config.min_text_length => {
                    debug!("Using text layer ({} chars)", text.len());
                    return Ok(self.finish(text, page_number, TextSource::TextLayer, start));
                }
                Ok(text) => debug!(
                    "Text layer too short ({} < {}), falling back to OCR",
                    text.trim().chars().count(),
                    pdf_config.min_text_length
                ),
                Err(e) => warn!("Text layer unavailable, falling back to OCR: {}", e),
            }
        }

        let image = pdf.render_page(page_number, pdf_config.render_dpi)?;
        let text = self.recognize(&image)?;
        Ok(self.finish(text, page_number, TextSource::Ocr, start))
    }

    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let backend = self.ocr.as_ref().ok_or_else(|| {
            MailsliceError::Ocr(OcrError::ModelLoad("no OCR backend configured".to_string()))
        })?;
        let enhanced = ImageEnhancer::new(self.config.preprocess.clone())
            .with_max_size(self.config.ocr.max_image_size)
            .enhance(image);
        let result = backend.recognize(&enhanced)?;
        info!(
            "Recognized {} text boxes ({} chars)",
            result.boxes.len(),
            result.text.len()
        );
        Ok(result.text)
    }

    fn finish(&self, text: String, page_number: u32, source: TextSource, start: Instant) -> ExtractionResult {
        let sections = self.splitter().split(&text);
        let page = assemble_page(page_number, &sections);

        let mut warnings = Vec::new();
        if sections.len() < MAX_SECTIONS {
            warnings.push(format!("Found {} of {} sections", sections.len(), MAX_SECTIONS));
        }
        for (name, slice) in page.named_slices() {
            if slice.filled_count() == 0 {
                warnings.push(format!("{} has no extracted fields", name));
            }
        }
        for warning in &warnings {
            debug!("{}", warning);
        }

        ExtractionResult {
            page,
            sections,
            raw_text: text,
            source,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
            processed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{OcrResult, TextBox};
    use crate::sections::SplitStrategy;
    use image::GrayImage;

    struct CannedOcr(&'static str);

    impl OcrBackend for CannedOcr {
        fn recognize(&self, image: &DynamicImage) -> std::result::Result<OcrResult, OcrError> {
            let boxes = vec![TextBox {
                bbox: [0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 0.0, 10.0],
                text: self.0.to_string(),
                confidence: 0.99,
            }];
            Ok(OcrResult::from_boxes(boxes, (image.width(), image.height()), 0))
        }
    }

    const PAGE: &str = "\
Subject Line: First
Click to unsubscribe
Subject Line: Second
Click to unsubscribe
Subject Line: Third";

    #[test]
    fn test_process_text_fills_three_slices() {
        let processor = PageProcessor::new(MailsliceConfig::default());
        let result = processor.process_text(PAGE, 2);

        assert_eq!(result.source, TextSource::Provided);
        assert_eq!(result.sections.len(), 3);
        assert_eq!(result.page.slices[0].subject_line, "First");
        assert_eq!(result.page.slices[1].subject_line, "Second");
        assert_eq!(result.page.slices[2].subject_line, "Third");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_process_text_warns_on_missing_sections() {
        let processor = PageProcessor::new(MailsliceConfig::default());
        let result = processor.process_text("Subject Line: Only", 2);

        assert_eq!(result.sections.len(), 1);
        assert!(result.warnings.contains(&"Found 1 of 3 sections".to_string()));
        assert!(result.warnings.contains(&"slice2 has no extracted fields".to_string()));
    }

    #[test]
    fn test_label_strategy_from_config() {
        let mut config = MailsliceConfig::default();
        config.extraction.split_strategy = SplitStrategy::Labels;
        let processor = PageProcessor::new(config);

        let text = "Section 1\nSubject Line: A\nSection 2\nSubject Line: B";
        let result = processor.process_text(text, 2);
        assert_eq!(result.page.slices[0].subject_line, "A");
        assert_eq!(result.page.slices[1].subject_line, "B");
        assert_eq!(result.sectioned_text(), "Section 1\nSubject Line: A\n\nSection 2\nSubject Line: B");
    }

    #[test]
    fn test_process_image_uses_backend() {
        let processor =
            PageProcessor::new(MailsliceConfig::default()).with_ocr(Box::new(CannedOcr("Subject Line: Scanned")));
        let image = DynamicImage::ImageLuma8(GrayImage::new(8, 8));

        let result = processor.process_image(&image, 2).unwrap();
        assert_eq!(result.source, TextSource::Ocr);
        assert_eq!(result.raw_text, "Subject Line: Scanned");
        assert_eq!(result.page.slices[0].subject_line, "Scanned");
    }

    #[test]
    fn test_process_image_without_backend_fails() {
        let processor = PageProcessor::new(MailsliceConfig::default());
        let image = DynamicImage::ImageLuma8(GrayImage::new(8, 8));
        assert!(matches!(
            processor.process_image(&image, 2),
            Err(MailsliceError::Ocr(OcrError::ModelLoad(_)))
        ));
    }

    #[test]
    fn test_process_pdf_rejects_garbage() {
        let processor = PageProcessor::new(MailsliceConfig::default());
        assert!(matches!(
            processor.process_pdf(b"%PDF-garbage", 2),
            Err(MailsliceError::Pdf(PdfError::Parse(_)))
        ));
    }
}
