//! OCR collaborator: turns a page image into one string of text.

mod preprocessing;
#[cfg(feature = "native")]
mod pure_engine;

pub use preprocessing::ImageEnhancer;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Rows closer than this many pixels are read as one line.
const ROW_TOLERANCE: f32 = 20.0;

/// A recognized text box with its coordinates and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBox {
    /// Bounding box coordinates (x1, y1, x2, y2, x3, y3, x4, y4) for quadrilateral.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence score (0.0 - 1.0).
    pub confidence: f32,
}

impl TextBox {
    /// Axis-aligned bounding rectangle `(min_x, min_y, max_x, max_y)`.
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }
}

/// Result of OCR processing on one image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrResult {
    /// Recognized text boxes in reading order.
    pub boxes: Vec<TextBox>,

    /// Full text: boxes on one visual row joined with spaces, rows with newlines.
    pub text: String,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Image dimensions (width, height).
    pub image_size: (u32, u32),
}

impl OcrResult {
    /// Build a result from unordered boxes, sorting them into reading order
    /// and rebuilding the text.
    pub fn from_boxes(mut boxes: Vec<TextBox>, image_size: (u32, u32), processing_time_ms: u64) -> Self {
        sort_by_reading_order(&mut boxes);
        let text = join_rows(&boxes);
        Self {
            boxes,
            text,
            processing_time_ms,
            image_size,
        }
    }
}

fn row_of(text_box: &TextBox) -> i32 {
    let (_, y, _, _) = text_box.rect();
    (y / ROW_TOLERANCE) as i32
}

/// Sort boxes top-to-bottom, then left-to-right within a row.
fn sort_by_reading_order(boxes: &mut [TextBox]) {
    boxes.sort_by(|a, b| {
        let (row_a, row_b) = (row_of(a), row_of(b));
        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            let (ax, _, _, _) = a.rect();
            let (bx, _, _, _) = b.rect();
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}

/// Join sorted boxes into lines, so that labels such as `Subject Line:` stay
/// on the same line as their value.
fn join_rows(boxes: &[TextBox]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current_row = None;

    for text_box in boxes {
        let row = row_of(text_box);
        match lines.last_mut() {
            Some(line) if current_row == Some(row) => {
                line.push(' ');
                line.push_str(&text_box.text);
            }
            _ => lines.push(text_box.text.clone()),
        }
        current_row = Some(row);
    }

    lines.join("\n")
}

/// Trait for OCR engines.
pub trait OcrBackend {
    /// Recognize text in an already-enhanced page image.
    fn recognize(&self, image: &DynamicImage) -> Result<OcrResult, OcrError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_box(x: f32, y: f32, text: &str) -> TextBox {
        TextBox {
            bbox: [x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_reading_order_and_row_joining() {
        let boxes = vec![
            text_box(200.0, 42.0, "Hello World"),
            text_box(10.0, 5.0, "To: hcp@example.org"),
            text_box(10.0, 41.0, "Subject Line:"),
        ];
        let result = OcrResult::from_boxes(boxes, (800, 600), 12);
        assert_eq!(result.text, "To: hcp@example.org\nSubject Line: Hello World");
        assert_eq!(result.boxes[0].text, "To: hcp@example.org");
    }

    #[test]
    fn test_rect() {
        let b = text_box(10.0, 20.0, "x");
        assert_eq!(b.rect(), (10.0, 20.0, 60.0, 30.0));
    }

    #[test]
    fn test_empty_boxes() {
        let result = OcrResult::from_boxes(Vec::new(), (1, 1), 0);
        assert!(result.text.is_empty());
    }
}
