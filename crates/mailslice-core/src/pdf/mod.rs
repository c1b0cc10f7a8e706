//! PDF page access.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;
use image::DynamicImage;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
///
/// Page numbers are 1-indexed throughout.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract the embedded text layer of one page.
    fn page_text(&self, page: u32) -> Result<String>;

    /// Produce the page as an image at roughly `dpi` dots per inch.
    fn render_page(&self, page: u32, dpi: u32) -> Result<DynamicImage>;

    /// Decode the images placed on a page.
    fn page_images(&self, page: u32) -> Result<Vec<DynamicImage>>;
}
