//! Notifications drained by the host after each batch of input.

/// Something a collaborator may need to react to.
#[derive(Clone, Debug, PartialEq)]
pub enum EditorEvent {
    /// Buffer content changed (edit, undo/redo, load).
    BufferChanged,
    /// Scroll position changed.
    ScrollChanged { y: f64, x: f64 },
    /// The modified flag flipped.
    ModifiedChanged(bool),
    /// Selection text ready for the system clipboard.
    ClipboardText { text: String, cut: bool },
}

/// Aggregate flags describing what a batch of commands did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ApplyResult {
    pub changed: bool,
    pub moved: bool,
    pub scrolled: bool,
    pub copy_requested: bool,
    pub cut: bool,
    pub pasted: bool,
}
