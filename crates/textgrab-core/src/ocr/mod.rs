//! OCR engine boundary.
//!
//! The pipeline never talks to a concrete engine: it sees a [`Recognizer`]
//! that turns an image path into [`RecognizedLine`]s.

mod paragraph;
#[cfg(feature = "native")]
mod pure_engine;

pub use paragraph::group_paragraphs;
#[cfg(feature = "native")]
pub use pure_engine::PureOcrEngine;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::OcrError;

/// Reading-order rows are bucketed by this many pixels.
const ROW_HEIGHT: f32 = 20.0;

/// One OCR detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedLine {
    /// Quadrilateral (x1, y1, x2, y2, x3, y3, x4, y4), clockwise from top-left.
    pub bbox: [f32; 8],

    /// Recognized text content.
    pub text: String,

    /// Recognition confidence (0.0 - 1.0).
    pub confidence: f32,
}

impl RecognizedLine {
    /// A detection with no geometry.
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            bbox: [0.0; 8],
            text: text.into(),
            confidence,
        }
    }

    /// Set the bounding quadrilateral.
    pub fn with_bbox(mut self, bbox: [f32; 8]) -> Self {
        self.bbox = bbox;
        self
    }

    /// Get the axis-aligned bounding rectangle (min_x, min_y, max_x, max_y).
    pub fn rect(&self) -> (f32, f32, f32, f32) {
        let xs = [self.bbox[0], self.bbox[2], self.bbox[4], self.bbox[6]];
        let ys = [self.bbox[1], self.bbox[3], self.bbox[5], self.bbox[7]];

        let min_x = xs.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_x = xs.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min_y = ys.iter().cloned().fold(f32::INFINITY, f32::min);
        let max_y = ys.iter().cloned().fold(f32::NEG_INFINITY, f32::max);

        (min_x, min_y, max_x, max_y)
    }

    /// Height of the bounding rectangle.
    pub fn height(&self) -> f32 {
        let (_, min_y, _, max_y) = self.rect();
        max_y - min_y
    }
}

/// An initialized OCR engine.
///
/// Implementations are configured with their language set up front and are
/// reused for every image they are handed.
pub trait Recognizer {
    /// Read the text in the image at `image`.
    ///
    /// An empty vector means the engine found nothing; it is not an error.
    /// With `paragraph` set, neighbouring lines come back merged.
    fn recognize(&self, image: &Path, paragraph: bool) -> Result<Vec<RecognizedLine>, OcrError>;
}

impl<T: Recognizer + ?Sized> Recognizer for &T {
    fn recognize(&self, image: &Path, paragraph: bool) -> Result<Vec<RecognizedLine>, OcrError> {
        (**self).recognize(image, paragraph)
    }
}

impl<T: Recognizer + ?Sized> Recognizer for Box<T> {
    fn recognize(&self, image: &Path, paragraph: bool) -> Result<Vec<RecognizedLine>, OcrError> {
        (**self).recognize(image, paragraph)
    }
}

/// Sort lines top-to-bottom, then left-to-right within a row.
pub fn sort_by_reading_order(lines: &mut [RecognizedLine]) {
    lines.sort_by(|a, b| {
        let (ax, ay, _, _) = a.rect();
        let (bx, by, _, _) = b.rect();

        let row_a = (ay / ROW_HEIGHT) as i32;
        let row_b = (by / ROW_HEIGHT) as i32;

        if row_a != row_b {
            row_a.cmp(&row_b)
        } else {
            ax.partial_cmp(&bx).unwrap_or(std::cmp::Ordering::Equal)
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rect_line(text: &str, x: f32, y: f32, w: f32, h: f32) -> RecognizedLine {
        RecognizedLine::new(text, 0.9).with_bbox([x, y, x + w, y, x + w, y + h, x, y + h])
    }

    #[test]
    fn test_rect() {
        let line = rect_line("a", 10.0, 5.0, 30.0, 12.0);
        assert_eq!(line.rect(), (10.0, 5.0, 40.0, 17.0));
        assert_eq!(line.height(), 12.0);
    }

    #[test]
    fn test_reading_order() {
        let mut lines = vec![
            rect_line("second row", 5.0, 60.0, 50.0, 10.0),
            rect_line("right", 100.0, 2.0, 50.0, 10.0),
            rect_line("left", 5.0, 8.0, 50.0, 10.0),
        ];

        sort_by_reading_order(&mut lines);

        let texts: Vec<&str> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["left", "right", "second row"]);
    }
}
