//! Text measurement seam and word-wrap segmentation.
//!
//! The core never shapes text itself. Hosts implement [`TextLayout`] on top
//! of their font engine; [`MonospaceLayout`] is a cell-grid implementation
//! used headless and in tests.

mod wrap;

pub use wrap::{wrap_line, WrapCache, WrapSegment};

use crate::text::char_len;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

const WIDTH_EPSILON: f32 = 1e-3;

/// Text measurement and hit-testing provided by the host toolkit.
pub trait TextLayout {
    /// Pixel width of `text` laid out on one row.
    fn text_width(&self, text: &str) -> f32;

    /// Char index nearest to pixel offset `x` inside `text`.
    ///
    /// Offsets at or before a grapheme's midpoint resolve to its leading
    /// edge, offsets past it to its trailing edge.
    fn hit_test(&self, text: &str, x: f32) -> usize {
        if x <= 0.0 {
            return 0;
        }
        let mut left = 0.0f32;
        let mut col = 0usize;
        for grapheme in text.graphemes(true) {
            let width = self.text_width(grapheme);
            if x <= left + width / 2.0 {
                return col;
            }
            left += width;
            col += char_len(grapheme);
        }
        col
    }

    /// Height of one visual row in pixels.
    fn line_height(&self) -> f32;

    /// Approximate advance of one character, used for scroll steps and slack.
    fn char_width(&self) -> f32;

    /// Byte offsets where rows after the first begin when `text` is wrapped
    /// to `width` pixels.
    ///
    /// Breaks prefer word boundaries; a run wider than `width` falls back to
    /// grapheme breaks. Whitespace may hang past the right edge. Every row
    /// holds at least one grapheme.
    fn wrap_breaks(&self, text: &str, width: f32) -> Vec<usize> {
        let mut breaks = Vec::new();
        let mut row_start = 0usize;
        let mut row_width = 0.0f32;
        for (offset, token) in text.split_word_bound_indices() {
            let token_width = self.text_width(token);
            let is_space = token.chars().all(char::is_whitespace);
            if is_space || row_width + token_width <= width + WIDTH_EPSILON {
                row_width += token_width;
                continue;
            }
            if offset > row_start {
                breaks.push(offset);
                row_start = offset;
                row_width = 0.0;
                if token_width <= width + WIDTH_EPSILON {
                    row_width = token_width;
                    continue;
                }
            }
            for (inner, grapheme) in token.grapheme_indices(true) {
                let at = offset + inner;
                let grapheme_width = self.text_width(grapheme);
                if at > row_start && row_width + grapheme_width > width + WIDTH_EPSILON {
                    breaks.push(at);
                    row_start = at;
                    row_width = 0.0;
                }
                row_width += grapheme_width;
            }
        }
        breaks
    }
}

/// Fixed-cell layout: every terminal column is `cell_width` pixels wide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceLayout {
    pub cell_width: f32,
    pub line_height: f32,
}

impl MonospaceLayout {
    pub fn new(cell_width: f32, line_height: f32) -> Self {
        Self {
            cell_width,
            line_height,
        }
    }
}

impl Default for MonospaceLayout {
    fn default() -> Self {
        Self::new(8.0, 20.0)
    }
}

impl TextLayout for MonospaceLayout {
    fn text_width(&self, text: &str) -> f32 {
        UnicodeWidthStr::width(text) as f32 * self.cell_width
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn char_width(&self) -> f32 {
        self.cell_width
    }
}
