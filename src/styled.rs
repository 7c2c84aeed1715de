//! Styled text buffer
//!
//! A copy of the source text annotated with display attributes. The
//! attributes are kept as a list of runs that partition the whole text, so a
//! host can render it directly and tests can compare runs instead of poking
//! at opaque rich-text state.
//!
//! All offsets are UTF-16 code units, which is what speech engines report
//! word ranges in.

use log::debug;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// RGB text color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const ORANGE: Color = Color::rgb(0xff, 0xa5, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (the leading `#` is optional)
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Font attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    pub size: f32,
    pub bold: bool,
}

impl Font {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Font applied to the whole text when it is set
pub static BASE_FONT: Lazy<Font> = Lazy::new(|| Font::new("Arial", 18.0));

/// Font used when a range being restyled carries no font of its own
pub static FALLBACK_FONT: Lazy<Font> = Lazy::new(|| Font::new("system", 17.0).bold());

/// Attributes of a run. `None` means "host default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub color: Option<Color>,
    pub font: Option<Font>,
}

impl Style {
    pub fn new(color: Color, font: Font) -> Self {
        Self {
            color: Some(color),
            font: Some(font),
        }
    }
}

/// A contiguous range of text sharing one style
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRun {
    pub range: Range<usize>,
    pub style: Style,
}

/// Text plus the runs that style it
///
/// Runs are ordered, non-empty, cover `0..len()` without gaps, and no two
/// neighbours share a style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyledText {
    text: String,
    len: usize,
    runs: Vec<StyleRun>,
}

impl StyledText {
    /// Unstyled copy of `text`
    pub fn plain(text: &str) -> Self {
        Self::with_style(text, Style::default())
    }

    /// Copy of `text` with `font` over its full range
    pub fn with_font(text: &str, font: Font) -> Self {
        Self::with_style(
            text,
            Style {
                color: None,
                font: Some(font),
            },
        )
    }

    fn with_style(text: &str, style: Style) -> Self {
        let len = text.encode_utf16().count();
        let runs = if len == 0 {
            Vec::new()
        } else {
            vec![StyleRun { range: 0..len, style }]
        };
        Self {
            text: text.to_string(),
            len,
            runs,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in UTF-16 code units
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn runs(&self) -> &[StyleRun] {
        &self.runs
    }

    /// Text covered by `range`, clamped to the buffer
    ///
    /// A range that splits a surrogate pair yields a replacement character.
    pub fn substring(&self, range: Range<usize>) -> String {
        let range = self.clamp(range);
        let units: Vec<u16> = self
            .text
            .encode_utf16()
            .skip(range.start)
            .take(range.len())
            .collect();
        String::from_utf16_lossy(&units)
    }

    pub fn style_at(&self, offset: usize) -> Option<&Style> {
        self.runs
            .iter()
            .find(|run| run.range.contains(&offset))
            .map(|run| &run.style)
    }

    pub fn font_at(&self, offset: usize) -> Option<&Font> {
        self.style_at(offset).and_then(|style| style.font.as_ref())
    }

    /// Replace the attributes over `range`
    ///
    /// The range is clamped to the buffer; an empty result is a no-op.
    pub fn set_style(&mut self, range: Range<usize>, style: Style) {
        let requested = range.clone();
        let range = self.clamp(range);
        if range.is_empty() {
            debug!("Ignoring restyle of empty range {:?}", requested);
            return;
        }
        if range != requested {
            debug!("Clamped restyle range {:?} to {:?}", requested, range);
        }

        self.split_at(range.start);
        self.split_at(range.end);

        let first = self
            .runs
            .iter()
            .position(|run| run.range.start == range.start);
        let last = self.runs.iter().position(|run| run.range.end == range.end);
        if let (Some(first), Some(last)) = (first, last) {
            self.runs.drain(first..=last);
            self.runs.insert(first, StyleRun { range, style });
            self.coalesce();
        }
    }

    /// Ranges whose color is exactly `color`
    pub fn ranges_with_color(&self, color: Color) -> Vec<Range<usize>> {
        self.runs
            .iter()
            .filter(|run| run.style.color == Some(color))
            .map(|run| run.range.clone())
            .collect()
    }

    fn clamp(&self, range: Range<usize>) -> Range<usize> {
        let start = range.start.min(self.len);
        let end = range.end.min(self.len).max(start);
        start..end
    }

    /// Split the run containing `offset` so a run boundary falls there
    fn split_at(&mut self, offset: usize) {
        if let Some(idx) = self
            .runs
            .iter()
            .position(|run| run.range.start < offset && offset < run.range.end)
        {
            let tail = StyleRun {
                range: offset..self.runs[idx].range.end,
                style: self.runs[idx].style.clone(),
            };
            self.runs[idx].range.end = offset;
            self.runs.insert(idx + 1, tail);
        }
    }

    fn coalesce(&mut self) {
        self.runs.dedup_by(|next, prev| {
            if prev.style == next.style && prev.range.end == next.range.start {
                prev.range.end = next.range.end;
                true
            } else {
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn orange() -> Style {
        Style::new(Color::ORANGE, BASE_FONT.clone())
    }

    #[test]
    fn test_with_font_covers_whole_text() {
        let styled = StyledText::with_font("Hello World", BASE_FONT.clone());
        assert_eq!(styled.len(), 11);
        assert_eq!(styled.runs().len(), 1);
        assert_eq!(styled.runs()[0].range, 0..11);
        assert_eq!(styled.font_at(4), Some(&*BASE_FONT));
    }

    #[test]
    fn test_empty_text_has_no_runs() {
        let styled = StyledText::with_font("", BASE_FONT.clone());
        assert!(styled.is_empty());
        assert!(styled.runs().is_empty());
        assert_eq!(styled.font_at(0), None);
    }

    #[test]
    fn test_set_style_splits_runs() {
        let mut styled = StyledText::with_font("Hello World", BASE_FONT.clone());
        styled.set_style(6..11, orange());

        assert_eq!(styled.runs().len(), 2);
        assert_eq!(styled.runs()[0].range, 0..6);
        assert_eq!(styled.runs()[1].range, 6..11);
        assert_eq!(styled.ranges_with_color(Color::ORANGE), vec![6..11]);
        assert_eq!(styled.substring(6..11), "World");
    }

    #[test]
    fn test_set_style_in_middle_makes_three_runs() {
        let mut styled = StyledText::with_font("one two three", BASE_FONT.clone());
        styled.set_style(4..7, orange());

        let ranges: Vec<_> = styled.runs().iter().map(|r| r.range.clone()).collect();
        assert_eq!(ranges, vec![0..4, 4..7, 7..13]);
    }

    #[test]
    fn test_restoring_style_coalesces() {
        let mut styled = StyledText::with_font("one two three", BASE_FONT.clone());
        styled.set_style(4..7, orange());
        styled.set_style(
            4..7,
            Style {
                color: None,
                font: Some(BASE_FONT.clone()),
            },
        );

        assert_eq!(styled.runs().len(), 1);
        assert_eq!(styled.runs()[0].range, 0..13);
    }

    #[test]
    fn test_set_style_spanning_runs() {
        let mut styled = StyledText::with_font("abcdefghij", BASE_FONT.clone());
        styled.set_style(2..4, orange());
        styled.set_style(6..8, orange());
        styled.set_style(3..7, Style::new(Color::BLACK, BASE_FONT.clone()));

        let ranges: Vec<_> = styled.runs().iter().map(|r| r.range.clone()).collect();
        assert_eq!(ranges, vec![0..2, 2..3, 3..7, 7..8, 8..10]);
        assert_eq!(styled.ranges_with_color(Color::ORANGE), vec![2..3, 7..8]);
    }

    #[test]
    fn test_set_style_clamps_out_of_range() {
        let mut styled = StyledText::with_font("short", BASE_FONT.clone());
        styled.set_style(3..50, orange());
        assert_eq!(styled.ranges_with_color(Color::ORANGE), vec![3..5]);

        // Entirely past the end
        styled.set_style(10..12, Style::new(Color::BLACK, BASE_FONT.clone()));
        assert_eq!(styled.runs().len(), 2);
    }

    #[test]
    fn test_utf16_offsets() {
        // The emoji is two UTF-16 code units
        let mut styled = StyledText::plain("a🎤 b");
        assert_eq!(styled.len(), 5);

        styled.set_style(4..5, orange());
        assert_eq!(styled.substring(4..5), "b");
        assert_eq!(styled.substring(1..3), "🎤");
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::from_hex("#ffa500"), Some(Color::ORANGE));
        assert_eq!(Color::from_hex("000000"), Some(Color::BLACK));
        assert_eq!(Color::ORANGE.to_hex(), "#ffa500");
        assert_eq!(Color::from_hex("#fff"), None);
        assert_eq!(Color::from_hex("#gggggg"), None);
    }
}
