//! Shadow of the line currently being typed into.

use crate::text::{char_len, splice_chars};

/// Transient typing state for one logical line.
///
/// While `Editing`, `text` mirrors what the buffer holds for `line` (every
/// keystroke is reflected immediately) and `cursor` is the char offset of
/// the caret inside it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ActiveEdit {
    #[default]
    Idle,
    Editing {
        line: usize,
        text: String,
        cursor: usize,
    },
}

impl ActiveEdit {
    /// Start shadowing `line`, or keep the existing shadow if it is the same line.
    pub fn ensure(&mut self, line: usize, current: impl FnOnce() -> String, cursor: usize) {
        if self.line() == Some(line) {
            if let Self::Editing { cursor: at, text, .. } = self {
                *at = cursor.min(char_len(text));
            }
            return;
        }
        let text = current();
        let cursor = cursor.min(char_len(&text));
        *self = Self::Editing { line, text, cursor };
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Editing { .. })
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Editing { line, .. } => Some(*line),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Editing { text, .. } => Some(text),
        }
    }

    pub fn cursor(&self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Editing { cursor, .. } => Some(*cursor),
        }
    }

    /// Replace `start..end` (char offsets) in the shadow and move the caret
    /// to the end of the inserted text. Returns the updated line text.
    pub fn splice(&mut self, start: usize, end: usize, insert: &str) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Editing { text, cursor, .. } => {
                let len = char_len(text);
                let start = start.min(len);
                let end = end.clamp(start, len);
                *text = splice_chars(text, start..end, insert);
                *cursor = start + char_len(insert);
                Some(text.as_str())
            }
        }
    }

    /// Drop the shadow. The buffer already holds every reflected keystroke.
    pub fn finish(&mut self) -> bool {
        let was_active = self.is_active();
        *self = Self::Idle;
        was_active
    }
}
