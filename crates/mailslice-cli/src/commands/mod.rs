//! CLI subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod models;
pub mod output;
pub mod process;
pub mod text;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use mailslice_core::models::config::MailsliceConfig;
use mailslice_core::{PageProcessor, PureOcrEngine};

/// Default configuration file location.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailslice")
        .join("config.json")
}

/// Default location for OCR model files.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mailslice")
        .join("models")
}

/// Load the configuration named on the command line, else the default file
/// if it exists, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<MailsliceConfig> {
    if let Some(path) = config_path {
        return Ok(MailsliceConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config file {}", default_path.display());
        Ok(MailsliceConfig::from_file(&default_path)?)
    } else {
        Ok(MailsliceConfig::default())
    }
}

/// Model directory to use: the explicit argument, then the configured
/// directory when it holds the models, then the per-user data directory.
pub fn resolve_model_dir(arg: Option<&Path>, config: &MailsliceConfig) -> PathBuf {
    if let Some(dir) = arg {
        return dir.to_path_buf();
    }
    if config.models.present_in(&config.models.model_dir) {
        return config.models.model_dir.clone();
    }
    default_model_dir()
}

/// Build a page processor, attaching an OCR engine when the models are found.
///
/// With `ocr_required` set, missing models are an error; otherwise the
/// processor runs text-only.
pub fn build_processor(
    config: MailsliceConfig,
    model_dir: Option<&Path>,
    ocr_required: bool,
) -> anyhow::Result<PageProcessor> {
    let model_dir = resolve_model_dir(model_dir, &config);

    if !config.models.present_in(&model_dir) {
        if ocr_required {
            anyhow::bail!(
                "OCR models not found at {}.\n\n\
                 Place {}, {} and {} there or pass --model-dir.\n\
                 Run 'mailslice models status' to check.",
                model_dir.display(),
                config.models.detection_model,
                config.models.recognition_model,
                config.models.dictionary
            );
        }
        warn!(
            "OCR models not found at {}, only text layers can be used",
            model_dir.display()
        );
        return Ok(PageProcessor::new(config));
    }

    debug!("Using models from {}", model_dir.display());
    let engine = PureOcrEngine::from_dir(&model_dir, &config.models, config.ocr.clone())
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;
    Ok(PageProcessor::new(config).with_ocr(Box::new(engine)))
}
