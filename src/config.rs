//! Application configuration
//!
//! Optional settings stored in TOML format. Every section falls back to its
//! defaults, so a file only needs the keys it wants to change.

use crate::parsers::plaque::ParserRules;

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_FILE: &str = "config.toml";

/// Page segmentation modes tesseract accepts for a single image.
pub const PSM_RANGE: std::ops::RangeInclusive<u8> = 3..=13;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ocr: OcrSettings,
    pub translation: TranslationSettings,
    pub parser: ParserRules,
    pub output: OutputSettings,
}

/// Tesseract invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract binary, looked up on PATH when not absolute
    pub tesseract_path: PathBuf,
    /// Page segmentation mode (3-13)
    pub psm: u8,
    /// Where debug mode writes intermediate images
    pub debug_dir: PathBuf,
    pub preprocess: PreprocessSettings,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_path: PathBuf::from("tesseract"),
            psm: 6,
            debug_dir: PathBuf::from("Debug_Files"),
            preprocess: PreprocessSettings::default(),
        }
    }
}

/// Image cleanup applied before OCR
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessSettings {
    pub enabled: bool,
    /// Gaussian blur sigma; 0 disables the blur
    pub blur_sigma: f32,
    /// Binarize with an Otsu threshold
    pub threshold: bool,
}

impl Default for PreprocessSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            blur_sigma: 0.8,
            threshold: true,
        }
    }
}

/// Translation backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// libretranslate, openai or deepseek
    pub provider: String,
    /// Overrides the provider's default endpoint
    pub endpoint: Option<String>,
    /// Chat model name (chat-completion providers only)
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub max_retries: usize,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            provider: "libretranslate".to_string(),
            endpoint: None,
            model: "gpt-4o-mini".to_string(),
            api_key_env: "PLAQUE_API_KEY".to_string(),
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub output_dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("Output"),
        }
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("invalid config {}", path.display()))?;
    config
        .validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(config)
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        if !PSM_RANGE.contains(&self.ocr.psm) {
            bail!(
                "ocr.psm must be between {} and {}, got {}",
                PSM_RANGE.start(),
                PSM_RANGE.end(),
                self.ocr.psm
            );
        }
        Ok(())
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "plaque", "plaque-translator")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

/// An explicit path must exist; the per-user file is optional.
pub fn resolve_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        debug!("loading config from {}", path.display());
        return load_config(path);
    }

    match default_config_path() {
        Some(path) if path.exists() => {
            debug!("loading config from {}", path.display());
            load_config(&path)
        }
        _ => Ok(AppConfig::default()),
    }
}
