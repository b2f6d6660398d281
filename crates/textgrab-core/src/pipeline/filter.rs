//! Confidence filtering.

use crate::ocr::RecognizedLine;

/// Keep the text of every line scoring at least `threshold`, in order.
pub fn filter_by_confidence(lines: &[RecognizedLine], threshold: f32) -> Vec<String> {
    lines
        .iter()
        .filter(|line| line.confidence >= threshold)
        .map(|line| line.text.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(pairs: &[(&str, f32)]) -> Vec<RecognizedLine> {
        pairs
            .iter()
            .map(|(text, score)| RecognizedLine::new(*text, *score))
            .collect()
    }

    #[test]
    fn test_keeps_ordered_subsequence() {
        let input = lines(&[("one", 0.9), ("two", 0.1), ("three", 0.25), ("four", 0.5)]);
        assert_eq!(filter_by_confidence(&input, 0.25), vec!["one", "three", "four"]);
    }

    #[test]
    fn test_zero_threshold_keeps_everything() {
        let input = lines(&[("a", 0.0), ("b", 0.3), ("a", 1.0)]);
        assert_eq!(filter_by_confidence(&input, 0.0), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_all_below_threshold() {
        let input = lines(&[("xyz", 0.1)]);
        assert!(filter_by_confidence(&input, 0.25).is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(filter_by_confidence(&[], 0.25).is_empty());
    }
}
