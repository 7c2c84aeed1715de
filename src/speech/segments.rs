//! Paragraph segmentation
//!
//! Text is spoken one paragraph at a time. Each paragraph becomes a
//! separate engine request so progress can be tracked per paragraph.

/// One paragraph of source text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    /// Length in UTF-16 code units
    pub len: usize,
}

impl Segment {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            len: text.encode_utf16().count(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Split text into paragraphs on `'\n'`
///
/// Empty text has no paragraphs. Blank lines inside the text are kept as
/// empty segments so that offsets into the full text stay aligned.
pub fn split_paragraphs(text: &str) -> Vec<Segment> {
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n').map(Segment::new).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_two_paragraphs() {
        let segments = split_paragraphs("Hello\nWorld");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], Segment::new("Hello"));
        assert_eq!(segments[1].len, 5);
    }

    #[test]
    fn test_empty_text_has_no_segments() {
        assert!(split_paragraphs("").is_empty());
    }

    #[test]
    fn test_blank_lines_are_kept() {
        let segments = split_paragraphs("a\n\nb\n");
        let texts: Vec<_> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "", "b", ""]);
        assert!(segments[1].is_empty());
    }

    #[test]
    fn test_len_counts_utf16_units() {
        assert_eq!(Segment::new("café").len, 4);
        assert_eq!(Segment::new("🎤").len, 2);
        assert_eq!(Segment::new("世界").len, 2);
    }
}
