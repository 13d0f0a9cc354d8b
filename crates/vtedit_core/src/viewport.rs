//! Scroll position, visible range, and gutter geometry.
//!
//! The vertical scroll domain is logical lines times `line_height`: the top
//! visible logical line is `floor(scroll_y / line_height)`, and wrapped rows
//! of that line and the following ones fill the viewport downward. This
//! keeps every query O(1) in document size. Scroll offsets are `f64` so a
//! one-line step still registers tens of millions of lines down.

use crate::buffer::LineBuffer;
use crate::constants::{
    GUTTER_PADDING_PX, MAX_WIDTH_SAMPLE_AFTER, MAX_WIDTH_SAMPLE_BEFORE, MAX_WIDTH_SAMPLE_LINES,
    MAX_WIDTH_SLACK_CHARS, TEXT_INSET_PX, WRAP_RIGHT_PADDING_PX,
};
use crate::layout::TextLayout;
use std::ops::Range;

/// Pixel window into the document.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    scroll_y: f64,
    scroll_x: f64,
    width: f32,
    height: f32,
    line_height: f32,
    char_width: f32,
    max_line_width: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scroll_y: 0.0,
            scroll_x: 0.0,
            width: 800.0,
            height: 600.0,
            line_height: 20.0,
            char_width: 8.0,
            max_line_width: 0.0,
        }
    }
}

fn digits(value: usize) -> usize {
    let mut value = value;
    let mut count = 1;
    while value >= 10 {
        value /= 10;
        count += 1;
    }
    count
}

impl Viewport {
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn scroll_x(&self) -> f64 {
        self.scroll_x
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    pub fn char_width(&self) -> f32 {
        self.char_width
    }

    /// Sampled widest-line estimate including slack; 0 while wrapping.
    pub fn max_line_width(&self) -> f32 {
        self.max_line_width
    }

    /// Update the widget size. Returns whether it changed.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        let width = width.max(0.0);
        let height = height.max(0.0);
        let changed = width != self.width || height != self.height;
        self.width = width;
        self.height = height;
        changed
    }

    /// Adopt font metrics from the layout collaborator.
    pub fn set_metrics(&mut self, line_height: f32, char_width: f32) {
        self.line_height = line_height.max(1.0);
        self.char_width = char_width.max(1.0);
    }

    /// Rows that fit the viewport plus two partially visible ones.
    pub fn visible_lines(&self) -> usize {
        (self.height / self.line_height).floor() as usize + 2
    }

    /// Top logical line, not clamped to the document.
    pub fn first_visible_line(&self) -> usize {
        (self.scroll_y / f64::from(self.line_height)).floor() as usize
    }

    /// Pixel offset of the top line's first row relative to the viewport top.
    pub fn first_row_offset(&self) -> f32 {
        -(self.scroll_y % f64::from(self.line_height)) as f32
    }

    /// Logical lines to lay out: visible rows plus `margin`, clamped.
    pub fn visible_range(&self, total_lines: usize, margin: usize) -> Range<usize> {
        let last = total_lines.max(1) - 1;
        let start = self.first_visible_line().min(last);
        let end = start
            .saturating_add(self.visible_lines())
            .saturating_add(margin)
            .min(total_lines);
        start..end.max(start + 1).min(total_lines.max(1))
    }

    /// Width of the line-number gutter.
    pub fn gutter_width(&self, total_lines: usize) -> f32 {
        digits(total_lines) as f32 * self.char_width + GUTTER_PADDING_PX
    }

    /// Viewport x where column 0 of an unscrolled row is drawn.
    pub fn text_origin_x(&self, total_lines: usize) -> f32 {
        self.gutter_width(total_lines) + TEXT_INSET_PX - self.scroll_x as f32
    }

    /// Width available to text right of the gutter.
    pub fn available_width(&self, total_lines: usize) -> f32 {
        (self.width - self.gutter_width(total_lines)).max(0.0)
    }

    /// Effective wrap width; never below one pixel.
    pub fn wrap_width(&self, total_lines: usize) -> f32 {
        (self.width - self.gutter_width(total_lines) - WRAP_RIGHT_PADDING_PX).max(1.0)
    }

    pub fn max_scroll_y(&self, total_lines: usize) -> f64 {
        (total_lines as f64 * f64::from(self.line_height) - f64::from(self.height)).max(0.0)
    }

    pub fn max_scroll_x(&self, total_lines: usize, word_wrap: bool) -> f64 {
        if word_wrap {
            return 0.0;
        }
        f64::from((self.max_line_width - self.available_width(total_lines)).max(0.0))
    }

    fn apply(&mut self, scroll_y: f64, scroll_x: f64, total_lines: usize, word_wrap: bool) -> bool {
        let y = scroll_y.clamp(0.0, self.max_scroll_y(total_lines));
        let x = if word_wrap {
            0.0
        } else {
            scroll_x.clamp(0.0, self.max_scroll_x(total_lines, word_wrap))
        };
        let changed = y != self.scroll_y || x != self.scroll_x;
        self.scroll_y = y;
        self.scroll_x = x;
        changed
    }

    /// Clamp the current position after a resize, edit, or wrap toggle.
    pub fn clamp(&mut self, total_lines: usize, word_wrap: bool) -> bool {
        self.apply(self.scroll_y, self.scroll_x, total_lines, word_wrap)
    }

    /// Jump to an absolute position; `scroll_x` is ignored while wrapping.
    pub fn set_scroll_position(
        &mut self,
        scroll_y: f64,
        scroll_x: f64,
        total_lines: usize,
        word_wrap: bool,
    ) -> bool {
        self.apply(scroll_y, scroll_x, total_lines, word_wrap)
    }

    /// Scroll by `lines` logical lines (negative scrolls up).
    pub fn scroll_by_lines(&mut self, lines: isize, total_lines: usize, word_wrap: bool) -> bool {
        let target = self.scroll_y + lines as f64 * f64::from(self.line_height);
        self.apply(target, self.scroll_x, total_lines, word_wrap)
    }

    pub fn scroll_to_top(&mut self, total_lines: usize, word_wrap: bool) -> bool {
        self.apply(0.0, self.scroll_x, total_lines, word_wrap)
    }

    pub fn scroll_to_bottom(&mut self, total_lines: usize, word_wrap: bool) -> bool {
        let bottom = self.max_scroll_y(total_lines);
        self.apply(bottom, self.scroll_x, total_lines, word_wrap)
    }

    /// Apply wheel deltas in notches. Horizontal deltas only count with wrap off.
    pub fn scroll_wheel(
        &mut self,
        dx: f32,
        dy: f32,
        lines_per_notch: f32,
        chars_per_notch: f32,
        total_lines: usize,
        word_wrap: bool,
    ) -> bool {
        let y = self.scroll_y + f64::from(dy * self.line_height * lines_per_notch);
        let x = if word_wrap {
            self.scroll_x
        } else {
            self.scroll_x + f64::from(dx * self.char_width * chars_per_notch)
        };
        self.apply(y, x, total_lines, word_wrap)
    }

    /// Minimal scroll that brings a caret into view.
    ///
    /// `caret_y` is the caret row's top in document pixels and `caret_x` its
    /// offset from column 0 of the line. Horizontal adjustment keeps at least
    /// `margin` pixels between caret and edge and only happens with wrap off.
    /// Applying it twice without a state change is a no-op.
    pub fn ensure_visible(
        &mut self,
        caret_y: f64,
        caret_x: f32,
        margin: f32,
        total_lines: usize,
        word_wrap: bool,
    ) -> bool {
        let line_height = f64::from(self.line_height);
        let height = f64::from(self.height);
        let mut y = self.scroll_y;
        if caret_y < y {
            y = caret_y;
        } else if caret_y + line_height > y + height {
            y = caret_y + line_height - height;
        }

        let mut x = self.scroll_x;
        if !word_wrap {
            let available = self.available_width(total_lines);
            let margin = margin.min((available - self.char_width).max(0.0));
            let caret_x = f64::from(caret_x);
            if caret_x < x {
                x = (caret_x - f64::from(margin)).max(0.0);
            } else if caret_x > x + f64::from(available - self.char_width) {
                x = caret_x - f64::from(available - self.char_width - margin);
            }
        }
        self.apply(y, x, total_lines, word_wrap)
    }

    /// Grow the widest-line estimate after an edit, without rescanning.
    pub fn note_line_width(&mut self, text_width: f32) {
        let candidate = text_width + MAX_WIDTH_SLACK_CHARS * self.char_width;
        if candidate > self.max_line_width {
            self.max_line_width = candidate;
        }
    }

    /// Re-estimate the widest line from a bounded sample around the viewport.
    ///
    /// Samples about a hundred lines from a window reaching a hundred lines
    /// above and two hundred below the visible rows, plus `extra` (the line
    /// being edited). Cleared to 0 while wrapping.
    pub fn resample_max_line_width(
        &mut self,
        buffer: &LineBuffer,
        layout: &dyn TextLayout,
        word_wrap: bool,
        extra: Option<&str>,
    ) {
        if word_wrap {
            self.max_line_width = 0.0;
            return;
        }
        let total = buffer.total_lines();
        let start = self
            .first_visible_line()
            .saturating_sub(MAX_WIDTH_SAMPLE_BEFORE)
            .min(total);
        let end = (start + self.visible_lines() + MAX_WIDTH_SAMPLE_AFTER).min(total);
        let step = ((end - start) / MAX_WIDTH_SAMPLE_LINES).max(1);
        let mut widest = (start..end)
            .step_by(step)
            .map(|line| layout.text_width(&buffer.get_line(line)))
            .fold(0.0f32, f32::max);
        if let Some(text) = extra {
            widest = widest.max(layout.text_width(text));
        }
        self.max_line_width = widest + MAX_WIDTH_SLACK_CHARS * self.char_width;
    }
}
