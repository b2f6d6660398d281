//! Core library for textgrab.
//!
//! This crate provides:
//! - Selection of the Nth entry of an image folder
//! - OCR through a [`Recognizer`] (a `pure-onnx-ocr` engine with the
//!   `native` feature)
//! - Confidence filtering of recognized lines
//! - Writing the kept lines, or a placeholder, to `<image name>.txt`

pub mod error;
pub mod models;
pub mod ocr;
pub mod pipeline;

pub use error::{Error, OcrError, Result};
pub use models::config::TextgrabConfig;
pub use models::language::{Language, LanguageSet, Script};
pub use models::request::ExtractionRequest;
pub use ocr::{RecognizedLine, Recognizer};
#[cfg(feature = "native")]
pub use ocr::PureOcrEngine;
pub use pipeline::{ExtractionResult, ImageTextExtractor, Outcome};
