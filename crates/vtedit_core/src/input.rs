//! Toolkit-independent commands consumed by the edit engine.
//!
//! Hosts translate their native key, pointer, and IME events into these
//! values; the engine never sees toolkit types.

/// Normalized editor intents in arrival order.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorCommand {
    MoveLeft { select: bool, word: bool },
    MoveRight { select: bool, word: bool },
    MoveUp { select: bool },
    MoveDown { select: bool },
    MoveHome { select: bool },
    MoveEnd { select: bool },
    DocumentStart { select: bool },
    DocumentEnd { select: bool },
    PageUp { select: bool },
    PageDown { select: bool },
    SelectAll,
    Backspace,
    DeleteForward,
    InsertText(String),
    InsertNewline,
    /// Tab: indent a selection, otherwise insert one indent unit.
    Indent,
    /// Shift+Tab: outdent the selection or the caret line.
    Outdent,
    Copy,
    Cut,
    Paste(String),
    Undo,
    Redo,
    /// Cancel the active edit shadow and any IME preedit.
    Escape,
    ImePreedit(String),
    ImeCommit(String),
    ImeDisabled,
    ToggleWordWrap,
    /// Wheel deltas in notches; positive `dy` scrolls down.
    Scroll { dx: f32, dy: f32 },
    PointerPress { x: f32, y: f32, shift: bool },
    PointerDrag { x: f32, y: f32 },
    PointerRelease { x: f32, y: f32 },
}

impl EditorCommand {
    /// Whether the command can change buffer content.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::Backspace
                | Self::DeleteForward
                | Self::InsertText(_)
                | Self::InsertNewline
                | Self::Indent
                | Self::Outdent
                | Self::Cut
                | Self::Paste(_)
                | Self::Undo
                | Self::Redo
                | Self::ImeCommit(_)
        )
    }
}
