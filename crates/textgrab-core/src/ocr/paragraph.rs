//! Paragraph grouping of line-level detections.

use super::RecognizedLine;

/// A line joins the paragraph above it when the vertical gap is at most this
/// fraction of its own height.
const MAX_GAP_RATIO: f32 = 1.0;

/// Merge lines (already in reading order) into paragraphs.
///
/// Texts are joined with a single space, the confidence is the mean of the
/// merged lines and the geometry becomes the union rectangle.
pub fn group_paragraphs(lines: Vec<RecognizedLine>) -> Vec<RecognizedLine> {
    let mut paragraphs: Vec<Paragraph> = Vec::new();

    for line in lines {
        match paragraphs.last_mut() {
            Some(current) if current.accepts(&line) => current.push(line),
            _ => paragraphs.push(Paragraph::start(line)),
        }
    }

    paragraphs.into_iter().map(Paragraph::finish).collect()
}

struct Paragraph {
    texts: Vec<String>,
    confidence_sum: f32,
    rect: (f32, f32, f32, f32),
}

impl Paragraph {
    fn start(line: RecognizedLine) -> Self {
        Self {
            rect: line.rect(),
            confidence_sum: line.confidence,
            texts: vec![line.text],
        }
    }

    fn accepts(&self, line: &RecognizedLine) -> bool {
        let (_, top, _, _) = line.rect();
        let gap = top - self.rect.3;
        gap <= line.height() * MAX_GAP_RATIO
    }

    fn push(&mut self, line: RecognizedLine) {
        let (min_x, min_y, max_x, max_y) = line.rect();
        self.rect = (
            self.rect.0.min(min_x),
            self.rect.1.min(min_y),
            self.rect.2.max(max_x),
            self.rect.3.max(max_y),
        );
        self.confidence_sum += line.confidence;
        self.texts.push(line.text);
    }

    fn finish(self) -> RecognizedLine {
        let (x1, y1, x2, y2) = self.rect;
        let confidence = self.confidence_sum / self.texts.len() as f32;
        RecognizedLine::new(self.texts.join(" "), confidence)
            .with_bbox([x1, y1, x2, y1, x2, y2, x1, y2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line_at(text: &str, y: f32, confidence: f32) -> RecognizedLine {
        RecognizedLine::new(text, confidence)
            .with_bbox([10.0, y, 110.0, y, 110.0, y + 10.0, 10.0, y + 10.0])
    }

    #[test]
    fn test_adjacent_lines_merge() {
        let lines = vec![
            line_at("Hello", 0.0, 0.8),
            line_at("world", 14.0, 0.6),
            line_at("Far below", 100.0, 0.5),
        ];

        let paragraphs = group_paragraphs(lines);

        assert_eq!(paragraphs.len(), 2);
        assert_eq!(paragraphs[0].text, "Hello world");
        assert!((paragraphs[0].confidence - 0.7).abs() < 1e-6);
        assert_eq!(paragraphs[0].rect(), (10.0, 0.0, 110.0, 24.0));
        assert_eq!(paragraphs[1].text, "Far below");
    }

    #[test]
    fn test_empty_input() {
        assert!(group_paragraphs(Vec::new()).is_empty());
    }
}
