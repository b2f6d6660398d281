//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::language::{Language, LanguageSet};
use crate::pipeline::{BaseNameMode, ListingOrder};

/// Main configuration for textgrab.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextgrabConfig {
    /// Which image to pick from the folder.
    pub input: InputConfig,

    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Where and how the text file is written.
    pub output: OutputConfig,

    /// Model configuration.
    pub models: ModelConfig,
}

/// Image selection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// 1-based position of the image in the folder listing.
    pub image_number: usize,

    /// Order in which folder entries are enumerated.
    pub order: ListingOrder,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            image_number: 1,
            order: ListingOrder::Filesystem,
        }
    }
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Recognition language when not multilingual.
    pub language: Language,

    /// Recognize English and Russian together.
    pub multilingual: bool,

    /// Minimum confidence (0.0 - 1.0) for a line to be kept.
    pub threshold: f32,

    /// Merge neighbouring lines into paragraphs.
    pub paragraph: bool,

    /// Keep `[UNK]` tokens emitted by the recognizer.
    pub keep_unk: bool,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: Language::En,
            multilingual: false,
            threshold: 0.25,
            paragraph: false,
            keep_unk: false,
        }
    }
}

impl OcrConfig {
    /// Language set described by this configuration.
    pub fn language_set(&self) -> LanguageSet {
        LanguageSet::new(self.language, self.multilingual)
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the text file.
    pub dir: PathBuf,

    /// How the image file name is turned into the text file name.
    pub base_name: BaseNameMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            base_name: BaseNameMode::FirstDot,
        }
    }
}

/// Model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Directory containing model files (default: per-user data dir).
    pub model_dir: Option<PathBuf>,

    /// Text detection model file name.
    pub detection_model: String,

    /// Base URL model files are downloaded from.
    pub download_url: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_dir: None,
            detection_model: "det.onnx".to_string(),
            download_url: None,
        }
    }
}

impl TextgrabConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
