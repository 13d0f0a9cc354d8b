//! Draw lists handed to the host painter, plus caret blink timing.
//!
//! The core decides what goes where; the host only strokes text and
//! rectangles. Colors arrive as a [`RenderTheme`] value on every paint call
//! instead of living in global state.

use std::time::{Duration, Instant};

/// Straight RGBA color.
pub type Rgba = [u8; 4];

/// Colors used by the host painter for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderTheme {
    pub background: Rgba,
    pub text: Rgba,
    pub gutter_background: Rgba,
    pub line_number: Rgba,
    pub selection: Rgba,
    pub caret: Rgba,
    pub preedit_underline: Rgba,
}

impl RenderTheme {
    pub const fn light() -> Self {
        Self {
            background: [255, 255, 255, 255],
            text: [0, 0, 0, 255],
            gutter_background: [240, 240, 240, 255],
            line_number: [128, 128, 128, 255],
            selection: [51, 153, 255, 96],
            caret: [0, 0, 0, 255],
            preedit_underline: [0, 0, 0, 255],
        }
    }

    pub const fn dark() -> Self {
        Self {
            background: [30, 30, 30, 255],
            text: [212, 212, 212, 255],
            gutter_background: [37, 37, 38, 255],
            line_number: [133, 133, 133, 255],
            selection: [38, 79, 120, 160],
            caret: [174, 175, 173, 255],
            preedit_underline: [212, 212, 212, 255],
        }
    }
}

impl Default for RenderTheme {
    fn default() -> Self {
        Self::light()
    }
}

/// One visual row.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderRow {
    /// Viewport y of the row top.
    pub y: f32,
    pub line: usize,
    /// 1-based number, only on a line's first row.
    pub line_number: Option<String>,
    pub start_col: usize,
    pub text: String,
    /// Highlight span in pixels, relative to the frame's text origin.
    pub selection: Option<(f32, f32)>,
}

/// Caret bar position in viewport pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaretDraw {
    pub x: f32,
    pub y: f32,
    pub height: f32,
}

/// Uncommitted IME text drawn at the caret.
#[derive(Clone, Debug, PartialEq)]
pub struct PreeditDraw {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Everything the host needs to paint the editor once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderFrame {
    pub gutter_width: f32,
    /// Viewport x of column 0, already shifted by horizontal scroll.
    pub text_origin_x: f32,
    pub line_height: f32,
    pub rows: Vec<RenderRow>,
    /// `None` when the caret is off screen or in the hidden blink phase.
    pub caret: Option<CaretDraw>,
    pub preedit: Option<PreeditDraw>,
}

/// Cooperative blink phase; restarting it never affects editor state.
#[derive(Clone, Copy, Debug)]
pub struct CaretBlink {
    epoch: Instant,
    period: Duration,
}

impl CaretBlink {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            epoch: now,
            period: period.max(Duration::from_millis(1)),
        }
    }

    /// Restart in the visible phase.
    pub fn reset(&mut self, now: Instant) {
        self.epoch = now;
    }

    pub fn visible(&self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.epoch);
        (elapsed.as_millis() / self.period.as_millis()) % 2 == 0
    }

    /// Time until the phase flips, for repaint scheduling.
    pub fn until_toggle(&self, now: Instant) -> Duration {
        let period = self.period.as_millis();
        let elapsed = now.saturating_duration_since(self.epoch).as_millis();
        Duration::from_millis((period - elapsed % period) as u64)
    }
}
