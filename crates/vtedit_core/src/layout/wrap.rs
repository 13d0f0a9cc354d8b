//! Word-wrap segmentation and the per-width segment cache.

use super::TextLayout;
use crate::buffer::LineBuffer;
use crate::text::char_col;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

/// Lines retained before the cache is dropped wholesale.
const MAX_CACHED_LINES: usize = 16_384;

/// One visual row produced by wrapping a logical line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrapSegment {
    pub line: usize,
    /// First char column (inclusive).
    pub start_col: usize,
    /// Last char column (exclusive).
    pub end_col: usize,
}

impl WrapSegment {
    pub fn len(&self) -> usize {
        self.end_col - self.start_col
    }

    pub fn is_empty(&self) -> bool {
        self.start_col == self.end_col
    }

    /// Whether `col` sits on this row; the shared edge between two rows
    /// belongs to the later one unless this is the line's last row.
    pub fn contains_col(&self, col: usize, is_last: bool) -> bool {
        col >= self.start_col && (col < self.end_col || (is_last && col == self.end_col))
    }
}

/// Split `text` (logical line `line`) into visual rows.
///
/// `wrap_width` of `None` disables wrapping. Empty lines and disabled wrap
/// yield one segment covering the whole line. The result always partitions
/// `[0, len)` into contiguous, increasing segments.
pub fn wrap_line(
    layout: &dyn TextLayout,
    line: usize,
    text: &str,
    wrap_width: Option<f32>,
) -> Vec<WrapSegment> {
    let len = text.chars().count();
    let width = match wrap_width {
        Some(width) if len > 0 => width.max(1.0),
        _ => {
            return vec![WrapSegment {
                line,
                start_col: 0,
                end_col: len,
            }]
        }
    };

    let mut segments = Vec::new();
    let mut start_col = 0usize;
    for byte in layout.wrap_breaks(text, width) {
        if byte == 0 || byte >= text.len() {
            continue;
        }
        let col = char_col(text, byte);
        if col <= start_col {
            continue;
        }
        segments.push(WrapSegment {
            line,
            start_col,
            end_col: col,
        });
        start_col = col;
    }
    segments.push(WrapSegment {
        line,
        start_col,
        end_col: len,
    });
    segments
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct CacheKey {
    revision: u64,
    wrap_width_bits: Option<u32>,
}

/// Segment cache keyed by buffer revision and effective wrap width.
///
/// Any key change (edit, resize, wrap toggle) drops every entry. Entries are
/// filled lazily for whatever range the view asks about, so cost stays
/// proportional to the visible window.
#[derive(Debug, Default)]
pub struct WrapCache {
    key: Option<CacheKey>,
    lines: HashMap<usize, Arc<[WrapSegment]>>,
}

impl WrapCache {
    /// Drop every cached entry.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.lines.clear();
    }

    /// Number of logical lines currently cached.
    pub fn cached_lines(&self) -> usize {
        self.lines.len()
    }

    fn sync_key(&mut self, buffer: &LineBuffer, wrap_width: Option<f32>) {
        let key = CacheKey {
            revision: buffer.revision(),
            wrap_width_bits: wrap_width.map(f32::to_bits),
        };
        if self.key != Some(key) || self.lines.len() > MAX_CACHED_LINES {
            self.lines.clear();
            self.key = Some(key);
        }
    }

    /// Segments for one logical line.
    pub fn segments(
        &mut self,
        buffer: &LineBuffer,
        layout: &dyn TextLayout,
        wrap_width: Option<f32>,
        line: usize,
    ) -> Arc<[WrapSegment]> {
        self.sync_key(buffer, wrap_width);
        self.lines
            .entry(line)
            .or_insert_with(|| wrap_line(layout, line, &buffer.get_line(line), wrap_width).into())
            .clone()
    }

    /// Segments for every logical line in `range`, clamped to the buffer.
    pub fn segments_for_range(
        &mut self,
        buffer: &LineBuffer,
        layout: &dyn TextLayout,
        wrap_width: Option<f32>,
        range: Range<usize>,
    ) -> Vec<Arc<[WrapSegment]>> {
        let end = range.end.min(buffer.total_lines());
        let start = range.start.min(end);
        (start..end)
            .map(|line| self.segments(buffer, layout, wrap_width, line))
            .collect()
    }
}
