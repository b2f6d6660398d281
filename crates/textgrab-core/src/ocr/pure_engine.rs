//! Recognizer backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).

use std::path::Path;
use std::time::Instant;

use image::GenericImageView;
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;
use crate::models::language::{LanguageSet, Script};

use super::{group_paragraphs, sort_by_reading_order, RecognizedLine, Recognizer};

/// OCR engine loaded once for a language set and reused across images.
pub struct PureOcrEngine {
    engine: pure_onnx_ocr::engine::OcrEngine,
    languages: LanguageSet,
    keep_unk: bool,
}

impl PureOcrEngine {
    /// Model files needed to recognize `languages`, relative to a model dir.
    pub fn required_files(detection_model: &str, languages: LanguageSet) -> Vec<String> {
        let script = languages.script();
        vec![
            detection_model.to_string(),
            script.recognition_model().to_string(),
            script.dictionary().to_string(),
        ]
    }

    /// Create an engine from model files in a directory.
    pub fn from_dir(
        model_dir: &Path,
        detection_model: &str,
        languages: LanguageSet,
        config: &OcrConfig,
    ) -> Result<Self, OcrError> {
        let script = languages.script();
        let det_path = model_dir.join(detection_model);
        let rec_path = model_dir.join(script.recognition_model());
        let dict_path = model_dir.join(script.dictionary());

        ensure_exists(&det_path)?;
        ensure_exists(&rec_path)?;
        ensure_exists(&dict_path)?;

        let start = Instant::now();
        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!(
            "Loaded {} OCR engine for {} from {} in {}ms",
            script,
            languages,
            model_dir.display(),
            start.elapsed().as_millis()
        );

        Ok(Self {
            engine,
            languages,
            keep_unk: config.keep_unk,
        })
    }

    /// Languages this engine was loaded for.
    pub fn languages(&self) -> LanguageSet {
        self.languages
    }

    /// Script of the loaded recognition model.
    pub fn script(&self) -> Script {
        self.languages.script()
    }
}

impl Recognizer for PureOcrEngine {
    fn recognize(&self, image: &Path, paragraph: bool) -> Result<Vec<RecognizedLine>, OcrError> {
        let start = Instant::now();

        let decoded = image::open(image)
            .map_err(|e| OcrError::InvalidImage(format!("{}: {}", image.display(), e)))?;
        let (width, height) = decoded.dimensions();

        info!("Processing image: {}x{}", width, height);

        let results = self
            .engine
            .run_from_image(&decoded)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let mut lines: Vec<RecognizedLine> = results
            .iter()
            .map(|r| {
                let text = if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                RecognizedLine::new(text, r.confidence).with_bbox(polygon_to_bbox(&r.bounding_box))
            })
            .collect();

        sort_by_reading_order(&mut lines);

        if paragraph {
            lines = group_paragraphs(lines);
        }

        info!(
            "OCR complete: {} detections in {}ms",
            lines.len(),
            start.elapsed().as_millis()
        );

        Ok(lines)
    }
}

fn ensure_exists(path: &Path) -> Result<(), OcrError> {
    if path.exists() {
        Ok(())
    } else {
        Err(OcrError::ModelLoad(format!(
            "model file not found: {}",
            path.display()
        )))
    }
}

/// Convert a `Polygon<f64>` to our `[f32; 8]` bbox format.
///
/// Extracts the first 4 exterior points (quadrilateral) as
/// `[x1, y1, x2, y2, x3, y3, x4, y4]`.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [f32; 8] {
    let mut bbox = [0.0f32; 8];
    for (i, coord) in polygon.exterior().coords().take(4).enumerate() {
        bbox[i * 2] = coord.x as f32;
        bbox[i * 2 + 1] = coord.y as f32;
    }
    bbox
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::language::Language;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_required_files_follow_script() {
        assert_eq!(
            PureOcrEngine::required_files("det.onnx", LanguageSet::Single(Language::En)),
            vec!["det.onnx", "latin_rec.onnx", "latin_dict.txt"]
        );
        assert_eq!(
            PureOcrEngine::required_files("det.onnx", LanguageSet::Multilingual),
            vec!["det.onnx", "cyrillic_rec.onnx", "cyrillic_dict.txt"]
        );
    }

    #[test]
    fn test_missing_models_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let result = PureOcrEngine::from_dir(
            dir.path(),
            "det.onnx",
            LanguageSet::default(),
            &OcrConfig::default(),
        );
        assert!(matches!(result, Err(OcrError::ModelLoad(msg)) if msg.contains("det.onnx")));
    }
}
