//! The immutable description of a single extraction run.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::config::TextgrabConfig;
use crate::models::language::LanguageSet;
use crate::pipeline::{BaseNameMode, ListingOrder};

/// Everything a run needs to know: which image, which languages, which
/// threshold, and where to write.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    folder: PathBuf,
    image_number: usize,
    languages: LanguageSet,
    threshold: f32,
    paragraph: bool,
    order: ListingOrder,
    base_name: BaseNameMode,
    output_dir: PathBuf,
}

impl ExtractionRequest {
    /// Request the first image of `folder` with default settings.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            image_number: 1,
            languages: LanguageSet::default(),
            threshold: 0.25,
            paragraph: false,
            order: ListingOrder::Filesystem,
            base_name: BaseNameMode::FirstDot,
            output_dir: PathBuf::from("."),
        }
    }

    /// Build a request for `folder` from a loaded configuration.
    pub fn from_config(folder: impl Into<PathBuf>, config: &TextgrabConfig) -> Self {
        Self::new(folder)
            .with_image_number(config.input.image_number)
            .with_order(config.input.order)
            .with_languages(config.ocr.language_set())
            .with_threshold(config.ocr.threshold)
            .with_paragraph(config.ocr.paragraph)
            .with_base_name(config.output.base_name)
            .with_output_dir(config.output.dir.clone())
    }

    /// Set the 1-based image position.
    pub fn with_image_number(mut self, image_number: usize) -> Self {
        self.image_number = image_number;
        self
    }

    /// Set the recognition languages.
    pub fn with_languages(mut self, languages: LanguageSet) -> Self {
        self.languages = languages;
        self
    }

    /// Set the confidence threshold.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Enable paragraph grouping.
    pub fn with_paragraph(mut self, paragraph: bool) -> Self {
        self.paragraph = paragraph;
        self
    }

    /// Set the folder listing order.
    pub fn with_order(mut self, order: ListingOrder) -> Self {
        self.order = order;
        self
    }

    /// Set how the output file name is derived.
    pub fn with_base_name(mut self, base_name: BaseNameMode) -> Self {
        self.base_name = base_name;
        self
    }

    /// Set the directory the text file is written to.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    /// Check the request before running it.
    pub fn validate(&self) -> Result<()> {
        if self.image_number == 0 {
            return Err(Error::Config(
                "image number is 1-based and must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::Config(format!(
                "threshold must be within 0.0..=1.0, got {}",
                self.threshold
            )));
        }
        Ok(())
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn image_number(&self) -> usize {
        self.image_number
    }

    pub fn languages(&self) -> LanguageSet {
        self.languages
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn paragraph(&self) -> bool {
        self.paragraph
    }

    pub fn order(&self) -> ListingOrder {
        self.order
    }

    pub fn base_name(&self) -> BaseNameMode {
        self.base_name
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::language::Language;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let request = ExtractionRequest::new("test_images");
        assert_eq!(request.folder(), Path::new("test_images"));
        assert_eq!(request.image_number(), 1);
        assert_eq!(request.languages(), LanguageSet::Single(Language::En));
        assert_eq!(request.threshold(), 0.25);
        assert!(!request.paragraph());
        assert_eq!(request.output_dir(), Path::new("."));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_from_config() {
        let mut config = TextgrabConfig::default();
        config.input.image_number = 6;
        config.ocr.multilingual = true;
        config.ocr.threshold = 0.5;
        config.output.base_name = BaseNameMode::StripExtension;

        let request = ExtractionRequest::from_config("imgs", &config);
        assert_eq!(request.image_number(), 6);
        assert_eq!(request.languages(), LanguageSet::Multilingual);
        assert_eq!(request.threshold(), 0.5);
        assert_eq!(request.base_name(), BaseNameMode::StripExtension);
    }

    #[test]
    fn test_validate_rejects_zero_ordinal() {
        let request = ExtractionRequest::new("imgs").with_image_number(0);
        assert!(matches!(request.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_threshold_out_of_range() {
        assert!(ExtractionRequest::new("imgs").with_threshold(1.5).validate().is_err());
        assert!(ExtractionRequest::new("imgs").with_threshold(-0.1).validate().is_err());
        assert!(ExtractionRequest::new("imgs").with_threshold(0.0).validate().is_ok());
        assert!(ExtractionRequest::new("imgs").with_threshold(1.0).validate().is_ok());
    }
}
