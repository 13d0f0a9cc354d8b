//! Rope-backed line store.
//!
//! Logical lines are stored joined by `\n`, so rope line `i` is logical line
//! `i` and the document always has at least one (possibly empty) line.
//! Every mutation goes through [`LineBuffer::multi_replace`].

use crate::error::{EditorError, EditorResult};
use crate::history::{Command, CommandLog, EditIntent};
use ropey::{Rope, RopeBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, warn};

/// Shape summary of one applied range replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineDelta {
    /// First replaced line.
    pub start_line: usize,
    /// Lines removed from the pre-edit buffer.
    pub old_count: usize,
    /// Lines inserted into the post-edit buffer.
    pub new_count: usize,
}

impl LineDelta {
    /// Signed change in `total_lines`.
    pub fn line_delta(&self) -> isize {
        self.new_count as isize - self.old_count as isize
    }
}

/// Ordered sequence of lines with undo/redo and a modified flag.
#[derive(Debug)]
pub struct LineBuffer {
    rope: Rope,
    history: CommandLog,
    revision: u64,
    generation: u64,
    modified: bool,
    file_path: Option<PathBuf>,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::with_history(CommandLog::default())
    }
}

impl LineBuffer {
    /// Create an empty one-line buffer with a custom command log.
    pub fn with_history(history: CommandLog) -> Self {
        Self {
            rope: Rope::new(),
            history,
            revision: 0,
            generation: 0,
            modified: false,
            file_path: None,
        }
    }

    /// Create a buffer holding `lines` with clean history.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut buffer = Self::default();
        buffer.load_lines(lines);
        buffer
    }

    /// Number of logical lines; always at least 1.
    pub fn total_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Incremented on every content change, including undo/redo and loads.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Incremented on every bulk load; stale async results compare against it.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Path the buffer was loaded from or last saved to.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    /// Bind the buffer to a path without touching its content.
    pub fn set_file_path(&mut self, path: Option<PathBuf>) {
        self.file_path = path;
    }

    pub fn history(&self) -> &CommandLog {
        &self.history
    }

    /// Close the current typing run in the command log.
    pub fn seal_history(&mut self) {
        self.history.seal();
    }

    /// Cheap copy-on-write snapshot for off-thread readers.
    pub fn snapshot(&self) -> Rope {
        self.rope.clone()
    }

    /// Returns line `index` without its break, or an empty string when out of range.
    pub fn get_line(&self, index: usize) -> String {
        if index >= self.total_lines() {
            return String::new();
        }
        let (start, end) = self.line_char_bounds(index);
        self.rope.slice(start..end).to_string()
    }

    /// Character length of line `index`; 0 when out of range.
    pub fn line_len(&self, index: usize) -> usize {
        if index >= self.total_lines() {
            return 0;
        }
        let (start, end) = self.line_char_bounds(index);
        end - start
    }

    /// Returns lines `[start, end)`, clamped to the buffer.
    pub fn get_range(&self, start: usize, end: usize) -> Vec<String> {
        let end = end.min(self.total_lines());
        let start = start.min(end);
        (start..end).map(|line| self.get_line(line)).collect()
    }

    /// Whole document joined by `\n`.
    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    /// Text between two global char indices (clamped), breaks included.
    pub fn text_in(&self, range: Range<usize>) -> String {
        let end = range.end.min(self.rope.len_chars());
        let start = range.start.min(end);
        self.rope.slice(start..end).to_string()
    }

    /// Global char index of `(line, col)`, clamped to the buffer.
    pub fn char_index(&self, line: usize, col: usize) -> usize {
        if line >= self.total_lines() {
            return self.rope.len_chars();
        }
        let (start, end) = self.line_char_bounds(line);
        start + col.min(end - start)
    }

    /// Replace `count` lines starting at `start` with `new_lines`.
    ///
    /// `count == 0` inserts, an empty `new_lines` deletes. Deleting every
    /// line leaves a single empty line. Records one [`Command`] and clears
    /// redo; a replacement that changes nothing records nothing.
    ///
    /// # Errors
    /// [`EditorError::OutOfRange`] when `start > total_lines` or
    /// `start + count > total_lines`, [`EditorError::EmbeddedLineBreak`] when
    /// a replacement line contains `\n`.
    pub fn multi_replace(
        &mut self,
        start: usize,
        count: usize,
        new_lines: Vec<String>,
    ) -> EditorResult<LineDelta> {
        self.multi_replace_with(start, count, new_lines, EditIntent::Other)
    }

    /// [`Self::multi_replace`] with an explicit coalescing intent.
    pub fn multi_replace_with(
        &mut self,
        start: usize,
        count: usize,
        mut new_lines: Vec<String>,
        intent: EditIntent,
    ) -> EditorResult<LineDelta> {
        let total = self.total_lines();
        let in_range = start <= total
            && start
                .checked_add(count)
                .map(|end| end <= total)
                .unwrap_or(false);
        if !in_range {
            return Err(EditorError::OutOfRange {
                start,
                count,
                total,
            });
        }
        if let Some(index) = new_lines.iter().position(|line| line.contains('\n')) {
            return Err(EditorError::EmbeddedLineBreak { index });
        }
        if count == total && new_lines.is_empty() {
            new_lines.push(String::new());
        }
        if count == 0 && new_lines.is_empty() {
            return Ok(LineDelta {
                start_line: start,
                old_count: 0,
                new_count: 0,
            });
        }

        let old_lines = self.get_range(start, start + count);
        let delta = self.splice(start, count, &new_lines);
        self.history.record(
            Command {
                start_line: start,
                old_lines,
                new_lines,
            },
            intent,
        );
        self.modified = true;
        Ok(delta)
    }

    /// Revert the newest command.
    ///
    /// A command whose recorded range no longer fits the buffer is dropped
    /// and logged rather than replayed.
    pub fn undo(&mut self) -> Option<LineDelta> {
        let command = self.history.pop_undo()?;
        let current = command.new_lines.len();
        if command.start_line + current > self.total_lines() {
            warn!(
                target: "vtedit_core::buffer",
                start_line = command.start_line,
                lines = current,
                total_lines = self.total_lines(),
                "skipping undo that no longer fits the buffer"
            );
            return None;
        }
        let delta = self.splice(command.start_line, current, &command.old_lines);
        self.history.push_redo(command);
        self.modified = true;
        Some(delta)
    }

    /// Reapply the newest undone command.
    pub fn redo(&mut self) -> Option<LineDelta> {
        let command = self.history.pop_redo()?;
        let current = command.old_lines.len();
        if command.start_line + current > self.total_lines() {
            warn!(
                target: "vtedit_core::buffer",
                start_line = command.start_line,
                lines = current,
                total_lines = self.total_lines(),
                "skipping redo that no longer fits the buffer"
            );
            return None;
        }
        let delta = self.splice(command.start_line, current, &command.new_lines);
        self.history.push_undo(command);
        self.modified = true;
        Some(delta)
    }

    /// Replace the whole document, clearing history and the modified flag.
    ///
    /// Items containing `\n` are split so the no-embedded-break invariant
    /// holds; an empty sequence yields one empty line.
    pub fn load_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let started = Instant::now();
        let mut builder = RopeBuilder::new();
        let mut first = true;
        for line in lines {
            if !first {
                builder.append("\n");
            }
            builder.append(line.as_ref());
            first = false;
        }
        self.rope = builder.finish();
        self.history.clear();
        self.modified = false;
        self.revision = self.revision.wrapping_add(1);
        self.generation = self.generation.wrapping_add(1);
        info!(
            target: "vtedit_core::buffer",
            lines = self.total_lines(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded document"
        );
    }

    /// Load raw text, splitting on `\n` and dropping a trailing `\r` per line.
    pub fn load_text(&mut self, text: &str) {
        self.load_lines(text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line)));
    }

    /// Load a UTF-8 file (invalid sequences replaced) and bind its path.
    ///
    /// # Errors
    /// Returns [`EditorError::Io`] when the file cannot be read.
    pub fn load_file(&mut self, path: &Path) -> EditorResult<()> {
        let bytes = std::fs::read(path)?;
        self.load_text(&String::from_utf8_lossy(&bytes));
        self.file_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Write lines joined by `\n` to `path`, or to the bound path when `None`.
    ///
    /// On success the path becomes the bound path and the modified flag is
    /// cleared. On failure neither changes.
    ///
    /// # Errors
    /// [`EditorError::NoFilePath`] when no path is available,
    /// [`EditorError::Io`] when the write fails.
    pub fn save(&mut self, path: Option<&Path>) -> EditorResult<PathBuf> {
        let target = match path.or(self.file_path.as_deref()) {
            Some(target) => target.to_path_buf(),
            None => return Err(EditorError::NoFilePath),
        };
        if let Err(err) = self.write_to(&target) {
            error!(
                target: "vtedit_core::buffer",
                path = %target.display(),
                error = %err,
                "save failed"
            );
            return Err(err);
        }
        info!(
            target: "vtedit_core::buffer",
            path = %target.display(),
            lines = self.total_lines(),
            "saved document"
        );
        self.file_path = Some(target.clone());
        self.modified = false;
        Ok(target)
    }

    fn write_to(&self, path: &Path) -> EditorResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.rope.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Char range `[start, end)` of line `index`, excluding its break.
    fn line_char_bounds(&self, index: usize) -> (usize, usize) {
        let start = self.rope.line_to_char(index);
        let end = if index + 1 < self.total_lines() {
            self.rope.line_to_char(index + 1) - 1
        } else {
            self.rope.len_chars()
        };
        (start, end)
    }

    /// Raw rope edit without history; callers validate the range.
    fn splice(&mut self, start: usize, count: usize, new_lines: &[String]) -> LineDelta {
        let total = self.total_lines();
        let joined = new_lines.join("\n");
        if count == 0 {
            if start < total {
                let at = self.rope.line_to_char(start);
                self.rope.insert(at, &format!("{}\n", joined));
            } else {
                let at = self.rope.len_chars();
                self.rope.insert(at, &format!("\n{}", joined));
            }
        } else if !new_lines.is_empty() {
            let from = self.rope.line_to_char(start);
            let (_, to) = self.line_char_bounds(start + count - 1);
            self.rope.remove(from..to);
            self.rope.insert(from, &joined);
        } else if count >= total {
            self.rope = Rope::new();
        } else if start + count < total {
            let from = self.rope.line_to_char(start);
            let to = self.rope.line_to_char(start + count);
            self.rope.remove(from..to);
        } else {
            // Tail delete also drops the break ending the line before `start`.
            let (_, from) = self.line_char_bounds(start - 1);
            let to = self.rope.len_chars();
            self.rope.remove(from..to);
        }
        self.revision = self.revision.wrapping_add(1);
        LineDelta {
            start_line: start,
            old_count: count,
            new_count: if new_lines.is_empty() && count >= total {
                1
            } else {
                new_lines.len()
            },
        }
    }
}
