//! Multi-click counting and pointer gesture state.

use crate::selection::TextPosition;
use std::time::{Duration, Instant};

/// Counts consecutive presses within a time and distance window.
///
/// The count cycles 1, 2, 3 and then starts over at 1.
#[derive(Clone, Debug)]
pub struct ClickTracker {
    window: Duration,
    max_distance: f32,
    last: Option<(Instant, f32, f32)>,
    count: u8,
}

impl ClickTracker {
    pub fn new(window: Duration, max_distance: f32) -> Self {
        Self {
            window,
            max_distance,
            last: None,
            count: 0,
        }
    }

    /// Register a press at `(x, y)` and return its click count.
    pub fn register(&mut self, x: f32, y: f32, now: Instant) -> u8 {
        let continues = self.last.is_some_and(|(at, last_x, last_y)| {
            now.saturating_duration_since(at) <= self.window
                && (x - last_x).abs() <= self.max_distance
                && (y - last_y).abs() <= self.max_distance
        });
        self.count = if continues && self.count < 3 {
            self.count + 1
        } else {
            1
        };
        self.last = Some((now, x, y));
        self.count
    }

    pub fn reset(&mut self) {
        self.last = None;
        self.count = 0;
    }
}

/// What the pointer is doing between press and release.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PointerGesture {
    #[default]
    Idle,
    /// Drag-selecting; `press` is the press position in viewport pixels and
    /// `extend` marks a shift-press that kept an existing anchor.
    Selecting { press: (f32, f32), extend: bool },
    /// Pressed inside an existing selection; a drag becomes a drag-and-drop
    /// source, a release without travel places the caret at `target`.
    DragSource {
        press: (f32, f32),
        target: TextPosition,
    },
}

impl PointerGesture {
    /// Whether the pointer travelled at least `threshold` from the press.
    pub fn moved_past(&self, x: f32, y: f32, threshold: f32) -> bool {
        let press = match self {
            Self::Idle => return false,
            Self::Selecting { press, .. } | Self::DragSource { press, .. } => *press,
        };
        (x - press.0).abs() >= threshold || (y - press.1).abs() >= threshold
    }
}
