//! Command log backing undo/redo for the line store.

use crate::constants::{DEFAULT_COALESCE_WINDOW, DEFAULT_UNDO_MAX_BYTES, DEFAULT_UNDO_MAX_OPS};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// One reversible range replacement.
///
/// Applying `new_lines` at `start_line` over `old_lines.len()` lines reaches
/// the post-edit state; applying `old_lines` over `new_lines.len()` lines
/// restores the pre-edit state. Both sides are owned snapshots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    pub start_line: usize,
    pub old_lines: Vec<String>,
    pub new_lines: Vec<String>,
}

impl Command {
    fn bytes(&self) -> usize {
        let sum = |lines: &[String]| lines.iter().map(String::len).sum::<usize>();
        sum(&self.old_lines).saturating_add(sum(&self.new_lines))
    }

    fn is_single_line(&self) -> bool {
        self.old_lines.len() == 1 && self.new_lines.len() == 1
    }
}

/// Mutation intent used for history coalescing rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditIntent {
    /// Typing into the active line.
    Insert,
    /// Backspace inside the active line.
    DeleteBackward,
    /// Forward delete inside the active line.
    DeleteForward,
    /// Anything else; never merged.
    Other,
}

impl EditIntent {
    fn coalesces(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Undo/redo stacks with bounded memory.
///
/// Redo is cleared by every recorded edit; there is no branching history.
#[derive(Debug)]
pub struct CommandLog {
    undo: VecDeque<Command>,
    redo: Vec<Command>,
    undo_bytes: usize,
    max_ops: usize,
    max_bytes: usize,
    coalesce_window: Duration,
    /// Intent of the newest undo entry while it may still absorb keystrokes.
    open_run: Option<EditIntent>,
    last_recorded: Option<Instant>,
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_MAX_OPS, DEFAULT_UNDO_MAX_BYTES)
    }
}

impl CommandLog {
    /// Create an empty log bounded by operation count and snapshot bytes.
    pub fn new(max_ops: usize, max_bytes: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            undo_bytes: 0,
            max_ops: max_ops.max(1),
            max_bytes: max_bytes.max(1),
            coalesce_window: DEFAULT_COALESCE_WINDOW,
            open_run: None,
            last_recorded: None,
        }
    }

    /// Override the pause that ends a typing run.
    pub fn with_coalesce_window(mut self, window: Duration) -> Self {
        self.coalesce_window = window;
        self
    }

    /// Record a new edit made now, clearing redo.
    pub fn record(&mut self, command: Command, intent: EditIntent) {
        self.record_at(command, intent, Instant::now());
    }

    /// Record a new edit made at `at`, clearing redo.
    ///
    /// Single-line replacements with a coalescing intent fold into the
    /// previous entry when it is an open run of the same intent on the same
    /// line and the pause since the previous edit is within the coalesce
    /// window; the merged entry keeps the oldest `old_lines` and the newest
    /// `new_lines`.
    pub fn record_at(&mut self, command: Command, intent: EditIntent, at: Instant) {
        self.redo.clear();
        let within_window = self
            .last_recorded
            .is_some_and(|last| at.saturating_duration_since(last) <= self.coalesce_window);
        self.last_recorded = Some(at);
        if intent.coalesces()
            && within_window
            && self.open_run == Some(intent)
            && command.is_single_line()
        {
            if let Some(last) = self.undo.back_mut() {
                if last.is_single_line() && last.start_line == command.start_line {
                    self.undo_bytes = self.undo_bytes.saturating_sub(last.bytes());
                    last.new_lines = command.new_lines;
                    self.undo_bytes = self.undo_bytes.saturating_add(last.bytes());
                    self.trim_undo();
                    return;
                }
            }
        }
        self.open_run = intent.coalesces().then_some(intent);
        self.push_undo(command);
    }

    /// Close the current typing run so the next edit starts a new entry.
    pub fn seal(&mut self) {
        self.open_run = None;
    }

    /// Pop the newest undo entry.
    pub fn pop_undo(&mut self) -> Option<Command> {
        self.open_run = None;
        let command = self.undo.pop_back()?;
        self.undo_bytes = self.undo_bytes.saturating_sub(command.bytes());
        Some(command)
    }

    /// Pop the newest redo entry.
    pub fn pop_redo(&mut self) -> Option<Command> {
        self.open_run = None;
        self.redo.pop()
    }

    /// Park an undone command on the redo stack.
    pub fn push_redo(&mut self, command: Command) {
        self.redo.push(command);
    }

    /// Return a redone command to the undo stack without clearing redo.
    pub fn push_undo(&mut self, command: Command) {
        self.undo_bytes = self.undo_bytes.saturating_add(command.bytes());
        self.undo.push_back(command);
        self.trim_undo();
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.undo_bytes = 0;
        self.open_run = None;
        self.last_recorded = None;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    // The newest entry always survives so the last edit stays undoable.
    fn trim_undo(&mut self) {
        while self.undo.len() > 1
            && (self.undo.len() > self.max_ops || self.undo_bytes > self.max_bytes)
        {
            let Some(removed) = self.undo.pop_front() else {
                break;
            };
            self.undo_bytes = self.undo_bytes.saturating_sub(removed.bytes());
        }
    }
}
