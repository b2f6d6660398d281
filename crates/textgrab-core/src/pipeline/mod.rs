//! The extraction pipeline: locate, recognize, filter, persist.

mod filter;
mod locate;
mod persist;

pub use filter::filter_by_confidence;
pub use locate::{locate, ListingOrder};
pub use persist::{base_name, placeholder_line, write_lines, BaseNameMode, NULL_LABEL};

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::request::ExtractionRequest;
use crate::ocr::{RecognizedLine, Recognizer};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// At least one line passed the threshold.
    Extracted,
    /// The folder has no entry at the requested position.
    ImageNotFound,
    /// The engine found no text at all.
    NoDetections,
    /// Text was found but every line scored below the threshold.
    BelowThreshold,
}

impl Outcome {
    /// Whether the placeholder was written instead of recognized text.
    pub fn is_placeholder(&self) -> bool {
        !matches!(self, Outcome::Extracted)
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Image the text came from, if one was found.
    pub image: Option<PathBuf>,

    /// Output base name (`None` when no image was found).
    pub label: OsString,

    /// Accepted lines, in recognition order.
    pub lines: Vec<String>,

    /// Number of detections before filtering.
    pub detections: usize,

    /// File the text was written to.
    pub output: PathBuf,

    pub outcome: Outcome,

    /// Wall time of the run in milliseconds.
    pub processing_time_ms: u64,
}

/// Runs a single [`ExtractionRequest`].
pub struct ImageTextExtractor {
    request: ExtractionRequest,
}

impl ImageTextExtractor {
    /// Create an extractor, rejecting invalid requests.
    pub fn new(request: ExtractionRequest) -> Result<Self> {
        request.validate()?;
        Ok(Self { request })
    }

    pub fn request(&self) -> &ExtractionRequest {
        &self.request
    }

    /// Find the requested image in the folder.
    pub fn locate(&self) -> Result<Option<PathBuf>> {
        locate(
            self.request.folder(),
            self.request.image_number(),
            self.request.order(),
        )
    }

    /// Run the engine on `image`.
    pub fn recognize<R: Recognizer + ?Sized>(
        &self,
        recognizer: &R,
        image: &Path,
    ) -> Result<Vec<RecognizedLine>> {
        Ok(recognizer.recognize(image, self.request.paragraph())?)
    }

    /// Run the full pipeline with an already loaded engine.
    pub fn run<R: Recognizer + ?Sized>(&self, recognizer: &R) -> Result<ExtractionResult> {
        self.run_with(|| Ok(recognizer))
    }

    /// Run the full pipeline, loading the engine only if an image is found.
    pub fn run_with<R, F>(&self, load: F) -> Result<ExtractionResult>
    where
        R: Recognizer,
        F: FnOnce() -> Result<R>,
    {
        let start = Instant::now();

        info!(
            "Looking for entry {} in {}",
            self.request.image_number(),
            self.request.folder().display()
        );

        let Some(image) = self.locate()? else {
            warn!(
                "No entry {} in {}",
                self.request.image_number(),
                self.request.folder().display()
            );
            return self.finish(
                None,
                OsString::from(NULL_LABEL),
                0,
                Vec::new(),
                Outcome::ImageNotFound,
                start,
            );
        };

        let label = base_name(&image, self.request.base_name());
        info!("Selected {} (output label {:?})", image.display(), label);

        let recognizer = load()?;
        let detections = self.recognize(&recognizer, &image)?;

        if detections.is_empty() {
            warn!("No text detected in {}", image.display());
            return self.finish(Some(image), label, 0, Vec::new(), Outcome::NoDetections, start);
        }

        let lines = filter_by_confidence(&detections, self.request.threshold());
        debug!(
            "{} of {} detections scored at least {}",
            lines.len(),
            detections.len(),
            self.request.threshold()
        );

        let outcome = if lines.is_empty() {
            warn!("All detections in {} fell below the threshold", image.display());
            Outcome::BelowThreshold
        } else {
            Outcome::Extracted
        };

        self.finish(Some(image), label, detections.len(), lines, outcome, start)
    }

    fn finish(
        &self,
        image: Option<PathBuf>,
        label: OsString,
        detections: usize,
        lines: Vec<String>,
        outcome: Outcome,
        start: Instant,
    ) -> Result<ExtractionResult> {
        let output = write_lines(self.request.output_dir(), OsStr::new(&label), &lines)?;

        info!("Wrote {} ({:?})", output.display(), outcome);

        Ok(ExtractionResult {
            image,
            label,
            lines,
            detections,
            output,
            outcome,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, OcrError};
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::fs;

    /// Recognizer returning canned detections.
    struct Canned {
        lines: Vec<RecognizedLine>,
        calls: Cell<usize>,
        paragraph: Cell<Option<bool>>,
    }

    impl Canned {
        fn new(pairs: &[(&str, f32)]) -> Self {
            Self {
                lines: pairs.iter().map(|(t, s)| RecognizedLine::new(*t, *s)).collect(),
                calls: Cell::new(0),
                paragraph: Cell::new(None),
            }
        }
    }

    impl Recognizer for Canned {
        fn recognize(&self, _image: &Path, paragraph: bool) -> std::result::Result<Vec<RecognizedLine>, OcrError> {
            self.calls.set(self.calls.get() + 1);
            self.paragraph.set(Some(paragraph));
            Ok(self.lines.clone())
        }
    }

    struct Broken;

    impl Recognizer for Broken {
        fn recognize(&self, image: &Path, _paragraph: bool) -> std::result::Result<Vec<RecognizedLine>, OcrError> {
            Err(OcrError::InvalidImage(image.display().to_string()))
        }
    }

    fn setup() -> (tempfile::TempDir, tempfile::TempDir) {
        let images = tempfile::tempdir().unwrap();
        for name in ["first.png", "second.jpg", "third.png"] {
            fs::write(images.path().join(name), b"").unwrap();
        }
        (images, tempfile::tempdir().unwrap())
    }

    fn extractor(images: &Path, out: &Path, number: usize) -> ImageTextExtractor {
        let request = ExtractionRequest::new(images)
            .with_image_number(number)
            .with_order(ListingOrder::Alphabetical)
            .with_output_dir(out);
        ImageTextExtractor::new(request).unwrap()
    }

    #[test]
    fn test_second_image_extracted() {
        let (images, out) = setup();
        let engine = Canned::new(&[("Hello", 0.9)]);

        let result = extractor(images.path(), out.path(), 2).run(&engine).unwrap();

        assert_eq!(result.outcome, Outcome::Extracted);
        assert_eq!(result.label, "second");
        assert_eq!(result.output, out.path().join("second.txt"));
        assert_eq!(fs::read_to_string(&result.output).unwrap(), "Hello\n");
    }

    #[test]
    fn test_paragraph_flag_reaches_recognizer() {
        let (images, out) = setup();
        let engine = Canned::new(&[("Hello world", 0.9)]);

        extractor(images.path(), out.path(), 1).run(&engine).unwrap();
        assert_eq!(engine.paragraph.get(), Some(false));

        let request = ExtractionRequest::new(images.path())
            .with_paragraph(true)
            .with_output_dir(out.path());
        ImageTextExtractor::new(request).unwrap().run(&engine).unwrap();
        assert_eq!(engine.paragraph.get(), Some(true));
    }

    #[test]
    fn test_missing_image_writes_null_label_without_loading_engine() {
        let (images, out) = setup();
        let loaded = Cell::new(false);

        let result = extractor(images.path(), out.path(), 6)
            .run_with(|| {
                loaded.set(true);
                Ok(Canned::new(&[]))
            })
            .unwrap();

        assert!(!loaded.get());
        assert_eq!(result.outcome, Outcome::ImageNotFound);
        assert_eq!(result.image, None);
        assert_eq!(
            fs::read_to_string(out.path().join("None.txt")).unwrap(),
            "In None - could not find or recognize text\n"
        );
    }

    #[test]
    fn test_below_threshold_writes_placeholder() {
        let (images, out) = setup();
        let engine = Canned::new(&[("xyz", 0.1)]);

        let result = extractor(images.path(), out.path(), 1).run(&engine).unwrap();

        assert_eq!(result.outcome, Outcome::BelowThreshold);
        assert_eq!(result.detections, 1);
        assert!(result.lines.is_empty());
        assert_eq!(
            fs::read_to_string(&result.output).unwrap(),
            "In first - could not find or recognize text\n"
        );
    }

    #[test]
    fn test_no_detections_writes_placeholder() {
        let (images, out) = setup();
        let engine = Canned::new(&[]);

        let result = extractor(images.path(), out.path(), 3).run(&engine).unwrap();

        assert_eq!(result.outcome, Outcome::NoDetections);
        assert!(result.outcome.is_placeholder());
        assert_eq!(
            fs::read_to_string(out.path().join("third.txt")).unwrap(),
            "In third - could not find or recognize text\n"
        );
    }

    #[test]
    fn test_rerun_overwrites_identically() {
        let (images, out) = setup();
        let engine = Canned::new(&[("Hello", 0.9), ("noise", 0.05), ("World", 0.3)]);
        let extractor = extractor(images.path(), out.path(), 1);

        let first = extractor.run(&engine).unwrap();
        let first_content = fs::read_to_string(&first.output).unwrap();
        let second = extractor.run(&engine).unwrap();

        assert_eq!(engine.calls.get(), 2);
        assert_eq!(first.output, second.output);
        assert_eq!(fs::read_to_string(&second.output).unwrap(), first_content);
        assert_eq!(first_content, "Hello\nWorld\n");
    }

    #[test]
    fn test_engine_failure_is_fatal() {
        let (images, out) = setup();

        let result = extractor(images.path(), out.path(), 1).run(&Broken);

        assert!(matches!(result, Err(Error::Ocr(OcrError::InvalidImage(_)))));
        assert!(!out.path().join("first.txt").exists());
    }

    #[test]
    fn test_missing_folder_is_fatal() {
        let out = tempfile::tempdir().unwrap();
        let engine = Canned::new(&[]);

        let result = extractor(&out.path().join("missing"), out.path(), 1).run(&engine);

        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_invalid_request_rejected() {
        let request = ExtractionRequest::new("imgs").with_threshold(2.0);
        assert!(matches!(ImageTextExtractor::new(request), Err(Error::Config(_))));
    }
}
