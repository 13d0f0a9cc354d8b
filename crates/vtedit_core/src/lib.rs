//! Virtual text buffer and editing engine (line store, history, wrap,
//! viewport, selection, hit-testing, edit pipeline).
//!
//! The crate is toolkit-independent: hosts supply a [`TextLayout`] for
//! measurement, feed [`EditorCommand`]s, and paint the [`RenderFrame`] the
//! editor produces.

/// Shadow of the line currently being typed into.
pub mod active_edit;
/// Line-indexed rope storage with the single mutation primitive.
pub mod buffer;
/// Editor configuration and environment overrides.
pub mod config;
/// Tunable defaults shared across modules.
pub mod constants;
/// Interactive edit engine.
pub mod edit;
/// Error types.
pub mod error;
/// Notifications for the host.
pub mod events;
/// Bounded undo/redo command log.
pub mod history;
/// Toolkit-independent input commands.
pub mod input;
/// Measurement seam and word-wrap segmentation.
pub mod layout;
pub mod pointer;
/// Draw lists and caret blink timing.
pub mod render;
/// Deterministic sample documents.
pub mod sample;
pub mod selection;
/// Char-column and grapheme helpers.
pub mod text;
pub mod viewport;
/// Background paste/copy worker.
pub mod worker;

pub use buffer::{LineBuffer, LineDelta};
pub use config::EditorConfig;
pub use edit::VirtualEditor;
pub use error::{EditorError, EditorResult};
pub use events::{ApplyResult, EditorEvent};
pub use input::EditorCommand;
pub use layout::{MonospaceLayout, TextLayout};
pub use render::{RenderFrame, RenderTheme};
pub use selection::{SelectionRange, TextPosition};
