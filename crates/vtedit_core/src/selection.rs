//! Caret, anchor, and normalized selection bounds.

use std::ops::Range;

/// A `(line, col)` document position; columns count chars.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextPosition {
    pub line: usize,
    pub col: usize,
}

impl TextPosition {
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Normalized selection with `start <= end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionRange {
    pub start: TextPosition,
    pub end: TextPosition,
}

impl SelectionRange {
    /// Build a range from two positions in either order.
    pub fn new(a: TextPosition, b: TextPosition) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    pub fn is_single_line(&self) -> bool {
        self.start.line == self.end.line
    }

    pub fn line_count(&self) -> usize {
        self.end.line - self.start.line + 1
    }

    /// Selected columns on `line`, given that line's char length.
    ///
    /// Lines strictly inside a multi-line selection report `0..len`; lines
    /// outside the selection report `None`.
    pub fn span_on_line(&self, line: usize, line_len: usize) -> Option<Range<usize>> {
        if line < self.start.line || line > self.end.line {
            return None;
        }
        let from = if line == self.start.line {
            self.start.col.min(line_len)
        } else {
            0
        };
        let to = if line == self.end.line {
            self.end.col.min(line_len)
        } else {
            line_len
        };
        Some(from..to.max(from))
    }

    /// Whether `pos` lies inside the half-open selection.
    pub fn contains(&self, pos: TextPosition) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// Caret plus optional anchor.
///
/// A selection exists only while the anchor is set and differs from the
/// cursor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CaretState {
    cursor: TextPosition,
    anchor: Option<TextPosition>,
}

impl CaretState {
    pub fn cursor(&self) -> TextPosition {
        self.cursor
    }

    pub fn anchor(&self) -> Option<TextPosition> {
        self.anchor
    }

    /// Place the caret and drop any selection.
    pub fn set_cursor(&mut self, pos: TextPosition) {
        self.cursor = pos;
        self.anchor = None;
    }

    /// Move the caret; with `select`, anchor at the old caret if not already
    /// selecting, otherwise clear the anchor.
    pub fn move_to(&mut self, pos: TextPosition, select: bool) {
        if select {
            if self.anchor.is_none() {
                self.anchor = Some(self.cursor);
            }
        } else {
            self.anchor = None;
        }
        self.cursor = pos;
    }

    /// Set anchor and caret explicitly.
    pub fn select_range(&mut self, anchor: TextPosition, cursor: TextPosition) {
        self.anchor = Some(anchor);
        self.cursor = cursor;
    }

    /// Move only the caret, keeping the anchor (drag-selection).
    pub fn drag_to(&mut self, pos: TextPosition) {
        self.cursor = pos;
    }

    pub fn clear_selection(&mut self) {
        self.anchor = None;
    }

    /// Drop an anchor that collapsed onto the caret.
    pub fn normalize(&mut self) {
        if self.anchor == Some(self.cursor) {
            self.anchor = None;
        }
    }

    pub fn has_selection(&self) -> bool {
        self.selection().is_some()
    }

    /// Normalized selection, if any.
    pub fn selection(&self) -> Option<SelectionRange> {
        let anchor = self.anchor?;
        if anchor == self.cursor {
            return None;
        }
        Some(SelectionRange::new(anchor, self.cursor))
    }

    /// Selected columns on `line`, if it intersects the selection.
    pub fn selection_for_line(&self, line: usize, line_len: usize) -> Option<Range<usize>> {
        self.selection()?.span_on_line(line, line_len)
    }

    pub fn selection_contains(&self, pos: TextPosition) -> bool {
        self.selection()
            .map(|range| range.contains(pos))
            .unwrap_or(false)
    }
}
