//! Shared defaults for the editor core.

use std::time::Duration;

/// Default number of columns (spaces) in one indent unit.
pub const DEFAULT_TAB_WIDTH: usize = 4;
/// Upper bound accepted for configured tab widths.
pub const MAX_TAB_WIDTH: usize = 16;

/// Default cap on retained undo commands.
pub const DEFAULT_UNDO_MAX_OPS: usize = 10_000;
/// Default cap on snapshot text retained by the undo stack.
pub const DEFAULT_UNDO_MAX_BYTES: usize = 64 * 1024 * 1024;
/// Longest pause between keystrokes that still extends one undo step.
pub const DEFAULT_COALESCE_WINDOW: Duration = Duration::from_millis(750);

/// Horizontal breathing room kept between the caret and the viewport edge.
pub const SCROLL_MARGIN_PX: f32 = 10.0;
/// Padding added after the digits of the line-number gutter.
pub const GUTTER_PADDING_PX: f32 = 10.0;
/// Gap between the gutter and the first text column.
pub const TEXT_INSET_PX: f32 = 5.0;
/// Space reserved to the right of wrapped text.
pub const WRAP_RIGHT_PADDING_PX: f32 = 10.0;

/// Maximum delay between presses counted as one multi-click.
pub const CLICK_WINDOW: Duration = Duration::from_millis(300);
/// Maximum pointer travel between presses counted as one multi-click.
pub const CLICK_DISTANCE_PX: f32 = 5.0;
/// Pointer travel below which a press/release pair is a click, not a drag.
pub const DRAG_THRESHOLD_PX: f32 = 5.0;

/// Lines scrolled per vertical wheel notch.
pub const WHEEL_LINES_PER_NOTCH: f32 = 3.0;
/// Character widths scrolled per horizontal wheel notch.
pub const WHEEL_CHARS_PER_NOTCH: f32 = 10.0;

/// Extra logical lines laid out below the viewport when rendering.
pub const RENDER_MARGIN_LINES: usize = 2;
/// Extra logical lines scanned below the viewport when hit-testing.
pub const HIT_TEST_LOOKAHEAD_LINES: usize = 50;

/// Target number of lines sampled when estimating the widest line.
pub const MAX_WIDTH_SAMPLE_LINES: usize = 100;
/// Lines above the viewport included in the width sample window.
pub const MAX_WIDTH_SAMPLE_BEFORE: usize = 100;
/// Lines past the visible rows included in the width sample window.
pub const MAX_WIDTH_SAMPLE_AFTER: usize = 200;
/// Slack, in character widths, added to the sampled widest line.
pub const MAX_WIDTH_SLACK_CHARS: f32 = 20.0;

/// Caret blink half-period.
pub const CURSOR_BLINK_PERIOD: Duration = Duration::from_millis(500);

/// Thread name for the paste/copy worker.
pub const EDIT_WORKER_THREAD_NAME: &str = "vtedit-edit-worker";
