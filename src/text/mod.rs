//! # Text Layout
//!
//! Line breaking and height measurement for wrappable cell text.
//!
//! The layout engine never looks at glyphs. It asks a [`TextMeasurer`] how
//! tall a string becomes when wrapped into a box of a given width and
//! sizes rows from the answer. [`FontMeasurer`] is the built-in measurer;
//! the PDF sink wraps with the same [`TextLayout`] so drawn text occupies
//! exactly the measured height.

use unicode_linebreak::{linebreaks, BreakOpportunity};

use crate::error::MeasureError;
use crate::font::FontContext;
use crate::style::FontSpec;

/// Text-metrics capability consumed by the layout engine.
///
/// Implementations must be pure: the same input always yields the same
/// height, and measuring has no side effects.
pub trait TextMeasurer {
    /// Height in points of `text` set in `font` and wrapped at `max_width`.
    fn measure(&self, text: &str, font: &FontSpec, max_width: f64) -> Result<f64, MeasureError>;
}

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    pub text: String,
    /// Width without trailing whitespace.
    pub width: f64,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Entry `i` is the break opportunity *before* `chars[i]`. Index 0 is
/// always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    let mut byte_to_char = vec![0usize; text.len() + 1];
    let mut char_idx = 0;
    for (byte_idx, _) in text.char_indices() {
        byte_to_char[byte_idx] = char_idx;
        char_idx += 1;
    }
    byte_to_char[text.len()] = char_idx;

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

#[derive(Debug, Default)]
pub struct TextLayout;

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break a string into lines that fit within `max_width`.
    ///
    /// Greedy: each line takes as many words as fit, breaking at UAX#14
    /// opportunities. A word wider than the whole line is split between
    /// characters. Empty text produces no lines.
    pub fn break_into_lines(
        &self,
        fonts: &FontContext,
        text: &str,
        font: &FontSpec,
        max_width: f64,
    ) -> Vec<BrokenLine> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return Vec::new();
        }
        let widths: Vec<f64> = chars.iter().map(|&ch| fonts.char_width(ch, font)).collect();
        let break_opps = compute_break_opportunities(text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut last_break_point: Option<usize> = None;

        for (i, &ch) in chars.iter().enumerate() {
            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        let end = if is_newline(chars[i - 1]) { i - 1 } else { i };
                        lines.push(make_line(&chars[line_start..end], &widths[line_start..end]));
                        line_start = i;
                        line_width = 0.0;
                        last_break_point = None;
                    }
                    Some(BreakOpportunity::Allowed) => last_break_point = Some(i - 1),
                    None => {}
                }
            }

            if is_newline(ch) {
                continue;
            }

            let char_width = widths[i];
            if line_width + char_width > max_width && line_start < i {
                // Spaces may hang past the edge; they are trimmed from the line.
                if ch.is_whitespace() {
                    line_width += char_width;
                    continue;
                }
                if let Some(bp) = last_break_point.filter(|&bp| bp >= line_start) {
                    lines.push(make_line(&chars[line_start..=bp], &widths[line_start..=bp]));
                    line_start = bp + 1;
                    line_width = widths[line_start..=i].iter().sum();
                    last_break_point = None;
                    continue;
                }

                lines.push(make_line(&chars[line_start..i], &widths[line_start..i]));
                line_start = i;
                line_width = char_width;
                last_break_point = None;
                continue;
            }

            line_width += char_width;
        }

        let tail = &chars[line_start..];
        if !tail.is_empty() && !tail.iter().all(|c| is_newline(*c)) {
            let end = chars.len() - tail.iter().rev().take_while(|c| is_newline(**c)).count();
            lines.push(make_line(&chars[line_start..end], &widths[line_start..end]));
        }

        lines
    }

    /// Height of `text` wrapped at `max_width`: line count times line advance.
    pub fn measure_height(
        &self,
        fonts: &FontContext,
        text: &str,
        font: &FontSpec,
        max_width: f64,
    ) -> f64 {
        self.break_into_lines(fonts, text, font, max_width).len() as f64 * font.line_advance()
    }
}

fn make_line(chars: &[char], widths: &[f64]) -> BrokenLine {
    let trailing = chars.iter().rev().take_while(|c| c.is_whitespace()).count();
    let kept = chars.len() - trailing;
    BrokenLine {
        text: chars[..kept].iter().collect(),
        width: widths[..kept].iter().sum(),
    }
}

/// The built-in measurer: standard font metrics plus greedy wrapping.
#[derive(Default)]
pub struct FontMeasurer {
    fonts: FontContext,
    layout: TextLayout,
}

impl FontMeasurer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextMeasurer for FontMeasurer {
    fn measure(&self, text: &str, font: &FontSpec, max_width: f64) -> Result<f64, MeasureError> {
        if !max_width.is_finite() || max_width <= 0.0 {
            return Err(MeasureError::InvalidWidth(max_width));
        }
        if !font.size.is_finite() || font.size <= 0.0 {
            return Err(MeasureError::InvalidFontSize(font.size));
        }
        Ok(self.layout.measure_height(&self.fonts, text, font, max_width))
    }
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for &T {
    fn measure(&self, text: &str, font: &FontSpec, max_width: f64) -> Result<f64, MeasureError> {
        (**self).measure(text, font, max_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body() -> FontSpec {
        FontSpec::new("Helvetica", 400, 10.0)
    }

    fn lines(text: &str, width: f64) -> Vec<String> {
        TextLayout::new()
            .break_into_lines(&FontContext::new(), text, &body(), width)
            .into_iter()
            .map(|l| l.text)
            .collect()
    }

    #[test]
    fn test_short_text_is_one_line() {
        assert_eq!(lines("Door frame", 200.0), vec!["Door frame"]);
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        assert!(lines("", 200.0).is_empty());
    }

    #[test]
    fn test_wraps_at_word_boundary() {
        // "Scratched " is ~44pt at 10pt Helvetica.
        let out = lines("Scratched paint near window", 60.0);
        assert!(out.len() > 1, "{:?}", out);
        assert_eq!(out[0], "Scratched");
        for line in &out {
            assert!(!line.ends_with(' '));
        }
    }

    #[test]
    fn test_mandatory_break_on_newline() {
        assert_eq!(lines("first\nsecond", 500.0), vec!["first", "second"]);
    }

    #[test]
    fn test_overlong_word_is_split() {
        let out = lines("WWWWWWWWWWWWWWWWWWWW", 50.0);
        assert!(out.len() >= 3, "{:?}", out);
        assert_eq!(out.concat(), "WWWWWWWWWWWWWWWWWWWW");
    }

    #[test]
    fn test_lines_never_exceed_width() {
        let fonts = FontContext::new();
        let text = "The kitchen countertop shows water damage along the back edge behind the sink";
        for line in TextLayout::new().break_into_lines(&fonts, text, &body(), 80.0) {
            assert!(line.width <= 80.0 + 1e-9, "{:?}", line);
        }
    }

    #[test]
    fn test_height_is_lines_times_advance() {
        let measurer = FontMeasurer::new();
        let font = body();
        let one = measurer.measure("Wall", &font, 200.0).unwrap();
        assert!((one - 12.0).abs() < 1e-9);
        let many = measurer
            .measure("one two three four five six seven eight", &font, 40.0)
            .unwrap();
        assert!(many > one);
        assert_eq!(measurer.measure("", &font, 200.0).unwrap(), 0.0);
    }

    #[test]
    fn test_rejects_non_positive_width() {
        let measurer = FontMeasurer::new();
        assert_eq!(
            measurer.measure("x", &body(), 0.0),
            Err(MeasureError::InvalidWidth(0.0))
        );
    }
}
