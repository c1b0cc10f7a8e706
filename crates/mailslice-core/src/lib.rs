//! Core library for marketing-email field extraction.
//!
//! This crate provides:
//! - Marker location and index slicing over OCR text
//! - Section splitting (repeated-marker and fixed-label strategies)
//! - Field extraction driven by a declarative marker table
//! - PDF page access and an OCR pipeline using `pure-onnx-ocr`

pub mod error;
pub mod extract;
pub mod models;
pub mod ocr;
pub mod pdf;
pub mod pipeline;
pub mod sections;
pub mod text;

pub use error::{MailsliceError, Result};
pub use extract::{assemble_page, FieldExtractor};
pub use models::record::{ContactInfo, FieldRecord, PageResult, SafetyInfo};
pub use ocr::{OcrBackend, OcrResult, TextBox};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pdf::{PdfExtractor, PdfProcessor};
pub use pipeline::{ExtractionResult, PageProcessor, TextSource};
pub use sections::{SectionSplitter, Sections, SplitStrategy};
