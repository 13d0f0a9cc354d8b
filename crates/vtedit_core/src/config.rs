//! Editor configuration loaded from environment variables.

use crate::constants::{
    CLICK_DISTANCE_PX, CLICK_WINDOW, CURSOR_BLINK_PERIOD, DEFAULT_TAB_WIDTH,
    DEFAULT_UNDO_MAX_BYTES, DEFAULT_UNDO_MAX_OPS, DRAG_THRESHOLD_PX, EDIT_WORKER_THREAD_NAME,
    HIT_TEST_LOOKAHEAD_LINES, MAX_TAB_WIDTH, RENDER_MARGIN_LINES, SCROLL_MARGIN_PX,
    WHEEL_CHARS_PER_NOTCH, WHEEL_LINES_PER_NOTCH,
};
use std::env;
use std::time::Duration;

/// Env var holding the indent width in spaces.
pub const TAB_WIDTH_ENV: &str = "VTEDIT_TAB_WIDTH";
/// Env flag switching indentation from spaces to a tab character.
pub const INDENT_WITH_TABS_ENV: &str = "VTEDIT_INDENT_WITH_TABS";
/// Env flag enabling word wrap at startup.
pub const WORD_WRAP_ENV: &str = "VTEDIT_WORD_WRAP";
/// Env var bounding the number of retained undo commands.
pub const UNDO_MAX_OPS_ENV: &str = "VTEDIT_UNDO_MAX_OPS";
/// Env var bounding the bytes of snapshot text retained for undo.
pub const UNDO_MAX_BYTES_ENV: &str = "VTEDIT_UNDO_MAX_BYTES";

/// Runtime configuration for one editor instance.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Width of one indent unit in spaces.
    pub tab_width: usize,
    /// Indent with `tab_width` spaces when true, with one `\t` otherwise.
    pub indent_with_spaces: bool,
    /// Initial word-wrap mode.
    pub word_wrap: bool,
    pub undo_max_ops: usize,
    pub undo_max_bytes: usize,
    /// Minimum horizontal distance kept between caret and viewport edge.
    pub scroll_margin_px: f32,
    pub click_window: Duration,
    pub click_distance_px: f32,
    pub drag_threshold_px: f32,
    pub wheel_lines_per_notch: f32,
    pub wheel_chars_per_notch: f32,
    /// Extra logical lines laid out past the visible rows.
    pub render_margin_lines: usize,
    /// Extra logical lines scanned past the visible rows when hit-testing.
    pub hit_test_lookahead_lines: usize,
    pub cursor_blink_period: Duration,
    pub worker_thread_name: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            indent_with_spaces: true,
            word_wrap: false,
            undo_max_ops: DEFAULT_UNDO_MAX_OPS,
            undo_max_bytes: DEFAULT_UNDO_MAX_BYTES,
            scroll_margin_px: SCROLL_MARGIN_PX,
            click_window: CLICK_WINDOW,
            click_distance_px: CLICK_DISTANCE_PX,
            drag_threshold_px: DRAG_THRESHOLD_PX,
            wheel_lines_per_notch: WHEEL_LINES_PER_NOTCH,
            wheel_chars_per_notch: WHEEL_CHARS_PER_NOTCH,
            render_margin_lines: RENDER_MARGIN_LINES,
            hit_test_lookahead_lines: HIT_TEST_LOOKAHEAD_LINES,
            cursor_blink_period: CURSOR_BLINK_PERIOD,
            worker_thread_name: EDIT_WORKER_THREAD_NAME.to_string(),
        }
    }
}

/// Parse a boolean-like environment flag value.
///
/// # Supported Values
/// - Truthy: `1`, `true`, `yes`, `on`
/// - Falsy: `0`, `false`, `no`, `off`, empty string
///
/// Matching is case-insensitive and ignores surrounding whitespace.
///
/// # Returns
/// `Some(bool)` when the value is recognized, otherwise `None`.
pub fn parse_env_flag(value: &str) -> Option<bool> {
    let normalized = value.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Read a boolean flag from the environment.
///
/// Missing or unrecognized values are treated as `false`.
pub fn env_flag_enabled(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|value| parse_env_flag(&value))
        .unwrap_or(false)
}

fn parse_usize(raw: Option<String>) -> Option<usize> {
    raw.and_then(|value| value.trim().parse().ok())
}

impl EditorConfig {
    /// Load configuration from process environment variables.
    ///
    /// # Returns
    /// A populated [`EditorConfig`] with defaults for missing or malformed values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Arguments
    /// - `lookup`: Returns the raw value for an env key, if set.
    ///
    /// # Returns
    /// Configuration with recognized overrides applied on top of defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|value| parse_env_flag(&value))
                .unwrap_or(default)
        };

        Self {
            tab_width: parse_usize(lookup(TAB_WIDTH_ENV))
                .map(|width| width.clamp(1, MAX_TAB_WIDTH))
                .unwrap_or(defaults.tab_width),
            indent_with_spaces: !flag(INDENT_WITH_TABS_ENV, !defaults.indent_with_spaces),
            word_wrap: flag(WORD_WRAP_ENV, defaults.word_wrap),
            undo_max_ops: parse_usize(lookup(UNDO_MAX_OPS_ENV))
                .filter(|ops| *ops > 0)
                .unwrap_or(defaults.undo_max_ops),
            undo_max_bytes: parse_usize(lookup(UNDO_MAX_BYTES_ENV))
                .filter(|bytes| *bytes > 0)
                .unwrap_or(defaults.undo_max_bytes),
            ..defaults
        }
    }

    /// Text inserted or removed by one indent step.
    pub fn indent_unit(&self) -> String {
        if self.indent_with_spaces {
            " ".repeat(self.tab_width.max(1))
        } else {
            "\t".to_string()
        }
    }
}
