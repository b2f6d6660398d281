//! Error types for the textgrab-core library.

use thiserror::Error;

/// Main error type for the textgrab library.
#[derive(Error, Debug)]
pub enum Error {
    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised at the OCR engine boundary.
#[derive(Error, Debug)]
pub enum OcrError {
    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// The engine failed while reading text.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// The file could not be decoded as an image.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Unknown language code.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),
}

/// Result type alias using the textgrab error type.
pub type Result<T> = std::result::Result<T, Error>;
