//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MailsliceError, Result};
use crate::sections::{SplitStrategy, DEFAULT_SPLIT_MARKER};

/// Main configuration for the mailslice pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MailsliceConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,

    /// Image enhancement applied before OCR.
    pub preprocess: PreprocessConfig,

    /// Section splitting and field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// OCR engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Keep `[UNK]` tokens emitted by the recognizer instead of blanking them.
    pub keep_unk: bool,

    /// Drop recognized boxes below this confidence (0.0 keeps everything).
    pub min_confidence: f32,

    /// Maximum image dimension (longer side) handed to the engine.
    pub max_image_size: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            keep_unk: false,
            min_confidence: 0.0,
            max_image_size: 4096,
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Page holding the email layouts (1-indexed).
    pub page_number: u32,

    /// Nominal DPI of the rendered page.
    pub render_dpi: u32,

    /// Use the embedded text layer instead of OCR when it is long enough.
    pub prefer_text_layer: bool,

    /// Minimum text-layer length to accept it over OCR.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            page_number: 2,
            render_dpi: 400,
            prefer_text_layer: false,
            min_text_length: 50,
        }
    }
}

/// Image enhancement configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Convert to grayscale before enhancing.
    pub grayscale: bool,

    /// Contrast factor (1.0 leaves the image unchanged).
    pub contrast: f32,

    /// Sharpness factor (1.0 leaves the image unchanged).
    pub sharpness: f32,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            grayscale: true,
            contrast: 2.0,
            sharpness: 2.0,
        }
    }
}

/// Section splitting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// How the page text is partitioned into sections.
    pub split_strategy: SplitStrategy,

    /// Marker used by the repeated-marker strategy.
    pub split_marker: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            split_strategy: SplitStrategy::Unsubscribe,
            split_marker: DEFAULT_SPLIT_MARKER.to_string(),
        }
    }
}

/// Model file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
        }
    }
}

impl ModelConfig {
    /// Full paths of (detection, recognition, dictionary) under `dir`.
    pub fn paths_in(&self, dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
        (
            dir.join(&self.detection_model),
            dir.join(&self.recognition_model),
            dir.join(&self.dictionary),
        )
    }

    /// Whether every model file exists under `dir`.
    pub fn present_in(&self, dir: &Path) -> bool {
        let (det, rec, dict) = self.paths_in(dir);
        det.exists() && rec.exists() && dict.exists()
    }
}

impl MailsliceConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| MailsliceError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| MailsliceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MailsliceConfig::default();
        assert_eq!(config.pdf.page_number, 2);
        assert_eq!(config.pdf.render_dpi, 400);
        assert_eq!(config.preprocess.contrast, 2.0);
        assert_eq!(config.extraction.split_marker, "unsubscribe");
        assert_eq!(config.extraction.split_strategy, SplitStrategy::Unsubscribe);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: MailsliceConfig =
            serde_json::from_str(r#"{"pdf": {"page_number": 1}, "extraction": {"split_strategy": "labels"}}"#)
                .unwrap();
        assert_eq!(config.pdf.page_number, 1);
        assert_eq!(config.pdf.render_dpi, 400);
        assert_eq!(config.extraction.split_strategy, SplitStrategy::Labels);
        assert_eq!(config.extraction.split_marker, "unsubscribe");
    }

    #[test]
    fn test_model_paths() {
        let models = ModelConfig::default();
        let (det, _, dict) = models.paths_in(Path::new("/opt/models"));
        assert_eq!(det, PathBuf::from("/opt/models/det.onnx"));
        assert_eq!(dict, PathBuf::from("/opt/models/latin_dict.txt"));
        assert!(!models.present_in(Path::new("/nonexistent/mailslice")));
    }
}
