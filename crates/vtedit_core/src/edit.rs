//! Edit engine: turns input intents into line-store replacements and keeps
//! caret, viewport, wrap cache, and collaborators in sync.
//!
//! Every content change funnels through [`LineBuffer::multi_replace_with`].
//! After each mutation the engine clears the wrap cache, grows the widest-line
//! estimate, clamps scroll, brings the caret into view, and queues
//! [`EditorEvent`]s for the host.

use crate::active_edit::ActiveEdit;
use crate::buffer::{LineBuffer, LineDelta};
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::events::{ApplyResult, EditorEvent};
use crate::hit_test::HitTester;
use crate::history::{CommandLog, EditIntent};
use crate::input::EditorCommand;
use crate::layout::{TextLayout, WrapCache};
use crate::pointer::{ClickTracker, PointerGesture};
use crate::render::{CaretBlink, CaretDraw, PreeditDraw, RenderFrame, RenderRow};
use crate::selection::{CaretState, SelectionRange, TextPosition};
use crate::text::{
    char_len, next_grapheme_col, prev_grapheme_col, slice_chars, splice_chars, split_at_col,
    word_boundary_left, word_boundary_right, word_range_at,
};
use crate::viewport::Viewport;
use crate::worker::{handle_request, spawn_edit_worker, WorkerEvent, WorkerHandle, WorkerRequest};
use crossbeam_channel::RecvTimeoutError;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

/// Interactive editor over one [`LineBuffer`].
pub struct VirtualEditor {
    buffer: LineBuffer,
    caret: CaretState,
    active: ActiveEdit,
    preferred_col: Option<usize>,
    wrap_cache: WrapCache,
    viewport: Viewport,
    layout: Box<dyn TextLayout>,
    config: EditorConfig,
    word_wrap: bool,
    worker: Option<WorkerHandle>,
    /// Paste requests sent to the worker whose result has not come back.
    pending_pastes: usize,
    events: Vec<EditorEvent>,
    last_modified: bool,
    blink: CaretBlink,
    clicks: ClickTracker,
    gesture: PointerGesture,
    preedit: String,
    max_width_dirty: bool,
}

fn selected_lines(range: SelectionRange) -> RangeInclusive<usize> {
    // A selection ending at column 0 does not touch its last line.
    let last = if range.end.col == 0 && range.end.line > range.start.line {
        range.end.line - 1
    } else {
        range.end.line
    };
    range.start.line..=last
}

impl VirtualEditor {
    /// Create an editor with a background paste/copy worker.
    ///
    /// # Errors
    /// Returns [`EditorError::Io`] when the worker thread cannot be spawned.
    pub fn new(config: EditorConfig, layout: Box<dyn TextLayout>) -> EditorResult<Self> {
        let worker = spawn_edit_worker(&config.worker_thread_name)?;
        Ok(Self::build(config, layout, Some(worker)))
    }

    /// Create an editor that runs paste splitting and copy serialization inline.
    pub fn without_worker(config: EditorConfig, layout: Box<dyn TextLayout>) -> Self {
        Self::build(config, layout, None)
    }

    fn build(
        config: EditorConfig,
        layout: Box<dyn TextLayout>,
        worker: Option<WorkerHandle>,
    ) -> Self {
        let mut viewport = Viewport::default();
        viewport.set_metrics(layout.line_height(), layout.char_width());
        let now = Instant::now();
        Self {
            buffer: LineBuffer::with_history(CommandLog::new(
                config.undo_max_ops,
                config.undo_max_bytes,
            )),
            caret: CaretState::default(),
            active: ActiveEdit::default(),
            preferred_col: None,
            wrap_cache: WrapCache::default(),
            viewport,
            layout,
            word_wrap: config.word_wrap,
            worker,
            pending_pastes: 0,
            events: Vec::new(),
            last_modified: false,
            blink: CaretBlink::new(config.cursor_blink_period, now),
            clicks: ClickTracker::new(config.click_window, config.click_distance_px),
            gesture: PointerGesture::Idle,
            preedit: String::new(),
            max_width_dirty: true,
            config,
        }
    }

    pub fn buffer(&self) -> &LineBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn cursor(&self) -> TextPosition {
        self.caret.cursor()
    }

    pub fn selection(&self) -> Option<SelectionRange> {
        self.caret.selection()
    }

    pub fn active_edit(&self) -> &ActiveEdit {
        &self.active
    }

    pub fn word_wrap(&self) -> bool {
        self.word_wrap
    }

    pub fn is_modified(&self) -> bool {
        self.buffer.is_modified()
    }

    /// Whether a multi-line insert is waiting on the worker.
    pub fn paste_in_flight(&self) -> bool {
        self.pending_pastes > 0
    }

    pub fn preedit(&self) -> &str {
        &self.preedit
    }

    /// Drain queued notifications.
    pub fn take_events(&mut self) -> Vec<EditorEvent> {
        std::mem::take(&mut self.events)
    }

    /// Swap the measurement backend, e.g. after a font change.
    pub fn set_layout(&mut self, layout: Box<dyn TextLayout>) {
        self.viewport
            .set_metrics(layout.line_height(), layout.char_width());
        self.layout = layout;
        self.wrap_cache.invalidate();
        self.max_width_dirty = true;
        let total = self.buffer.total_lines();
        let clamped = self.viewport.clamp(total, self.word_wrap);
        self.note_scroll(clamped);
    }

    // ---- persistence ----------------------------------------------------

    /// Replace the document, clearing history, selection, and scroll.
    pub fn load_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.buffer.load_lines(lines);
        self.reset_after_load();
    }

    pub fn load_text(&mut self, text: &str) {
        self.buffer.load_text(text);
        self.reset_after_load();
    }

    /// # Errors
    /// Returns [`EditorError::Io`] when the file cannot be read; the current
    /// document is left untouched.
    pub fn load_file(&mut self, path: &Path) -> EditorResult<()> {
        self.buffer.load_file(path)?;
        self.reset_after_load();
        Ok(())
    }

    /// Save to `path`, or to the bound path when `None`.
    ///
    /// # Errors
    /// Propagates [`LineBuffer::save`] failures; the modified flag and bound
    /// path are unchanged on error.
    pub fn save(&mut self, path: Option<&Path>) -> EditorResult<PathBuf> {
        self.finish_edit();
        let saved = self.buffer.save(path)?;
        self.sync_modified();
        Ok(saved)
    }

    fn reset_after_load(&mut self) {
        self.active.finish();
        self.caret.set_cursor(TextPosition::default());
        self.preferred_col = None;
        self.preedit.clear();
        self.gesture = PointerGesture::Idle;
        self.wrap_cache.invalidate();
        self.max_width_dirty = true;
        let total = self.buffer.total_lines();
        let scrolled = self
            .viewport
            .set_scroll_position(0.0, 0.0, total, self.word_wrap);
        self.note_scroll(scrolled);
        self.events.push(EditorEvent::BufferChanged);
        self.sync_modified();
        self.blink.reset(Instant::now());
    }

    // ---- mutation plumbing ----------------------------------------------

    /// Apply a raw range replacement and run the post-edit pipeline.
    ///
    /// # Errors
    /// Same as [`LineBuffer::multi_replace`]; nothing changes on error.
    pub fn multi_replace(
        &mut self,
        start: usize,
        count: usize,
        new_lines: Vec<String>,
    ) -> EditorResult<LineDelta> {
        self.finish_edit();
        let delta = self.buffer.multi_replace(start, count, new_lines)?;
        if delta.old_count == 0 && delta.new_count == 0 {
            return Ok(delta);
        }
        if delta.line_delta() != 0 {
            self.max_width_dirty = true;
        }
        self.after_edit();
        Ok(delta)
    }

    fn replace_lines(
        &mut self,
        start: usize,
        count: usize,
        lines: Vec<String>,
        intent: EditIntent,
    ) -> Option<LineDelta> {
        match self.buffer.multi_replace_with(start, count, lines, intent) {
            Ok(delta) => {
                if delta.line_delta() != 0 {
                    self.max_width_dirty = true;
                }
                Some(delta)
            }
            Err(err) => {
                error!(
                    target: "vtedit_core::editor",
                    start,
                    count,
                    total_lines = self.buffer.total_lines(),
                    error = %err,
                    "edit rejected; state left unchanged"
                );
                None
            }
        }
    }

    fn after_edit(&mut self) {
        self.wrap_cache.invalidate();
        self.preferred_col = None;
        let cursor = self.clamp_position(self.caret.cursor());
        match self.caret.anchor().map(|anchor| self.clamp_position(anchor)) {
            Some(anchor) => self.caret.select_range(anchor, cursor),
            None => self.caret.set_cursor(cursor),
        }
        self.caret.normalize();
        if !self.word_wrap {
            let width = self.layout.text_width(&self.buffer.get_line(cursor.line));
            self.viewport.note_line_width(width);
        }
        self.events.push(EditorEvent::BufferChanged);
        self.sync_modified();
        let total = self.buffer.total_lines();
        let clamped = self.viewport.clamp(total, self.word_wrap);
        self.note_scroll(clamped);
        self.blink.reset(Instant::now());
        self.ensure_cursor_visible();
    }

    fn sync_modified(&mut self) {
        let modified = self.buffer.is_modified();
        if modified != self.last_modified {
            self.last_modified = modified;
            self.events.push(EditorEvent::ModifiedChanged(modified));
        }
    }

    fn note_scroll(&mut self, changed: bool) -> bool {
        if changed {
            self.max_width_dirty = true;
            self.events.push(EditorEvent::ScrollChanged {
                y: self.viewport.scroll_y(),
                x: self.viewport.scroll_x(),
            });
        }
        changed
    }

    fn clamp_position(&self, pos: TextPosition) -> TextPosition {
        let line = pos.line.min(self.buffer.total_lines() - 1);
        TextPosition::new(line, pos.col.min(self.buffer.line_len(line)))
    }

    /// Seal the typing run and drop the active edit shadow.
    pub fn finish_edit(&mut self) {
        self.active.finish();
        self.buffer.seal_history();
    }

    /// Escape: drop the shadow and any preedit; the buffer is untouched.
    pub fn cancel_edit(&mut self) -> bool {
        let had_preedit = !self.preedit.is_empty();
        self.preedit.clear();
        self.gesture = PointerGesture::Idle;
        let was_active = self.active.is_active();
        self.finish_edit();
        was_active || had_preedit
    }

    // ---- typing ---------------------------------------------------------

    /// Make the shadow track the caret line, restarting it if the buffer
    /// moved underneath.
    fn shadow_caret_line(&mut self) -> TextPosition {
        let pos = self.clamp_position(self.caret.cursor());
        let current = self.buffer.get_line(pos.line);
        if self.active.line() != Some(pos.line) || self.active.text() != Some(current.as_str()) {
            self.active.finish();
        }
        self.active.ensure(pos.line, || current, pos.col);
        pos
    }

    /// Splice `start..end` on the caret line through the shadow and reflect
    /// the result with one single-line replacement.
    fn edit_caret_line(&mut self, start: usize, end: usize, insert: &str, intent: EditIntent) -> bool {
        let pos = self.shadow_caret_line();
        let Some(updated) = self.active.splice(start, end, insert).map(str::to_string) else {
            return false;
        };
        let col = self.active.cursor().unwrap_or(start);
        if self
            .replace_lines(pos.line, 1, vec![updated], intent)
            .is_none()
        {
            self.active.finish();
            return false;
        }
        self.caret.set_cursor(TextPosition::new(pos.line, col));
        self.after_edit();
        true
    }

    /// Insert `text` at the caret, replacing any selection.
    ///
    /// Text with line breaks is split by the background worker and applied
    /// when its result is polled.
    pub fn insert_text(&mut self, text: &str) -> bool {
        if text.is_empty() {
            return false;
        }
        let deleted = self.delete_selection();
        if text.contains('\n') {
            return self.dispatch_paste(text) || deleted;
        }
        let col = self.clamp_position(self.caret.cursor()).col;
        self.edit_caret_line(col, col, text, EditIntent::Insert) || deleted
    }

    fn dispatch_paste(&mut self, text: &str) -> bool {
        self.finish_edit();
        let pos = self.clamp_position(self.caret.cursor());
        let request = WorkerRequest::Paste {
            generation: self.buffer.generation(),
            line: pos.line,
            line_text: self.buffer.get_line(pos.line),
            col: pos.col,
            text: text.to_string(),
        };
        match self.submit(request) {
            Some(event) => self.handle_worker_event(event),
            None => {
                self.pending_pastes += 1;
                true
            }
        }
    }

    /// Send `request` to the worker. Returns the reply directly when it had
    /// to run inline.
    fn submit(&mut self, request: WorkerRequest) -> Option<WorkerEvent> {
        let sent = match self.worker.as_ref() {
            Some(worker) => worker.req_tx.send(request),
            None => return Some(handle_request(request)),
        };
        match sent {
            Ok(()) => None,
            Err(err) => {
                warn!(
                    target: "vtedit_core::editor",
                    error = %EditorError::WorkerUnavailable,
                    "running request inline"
                );
                self.worker = None;
                Some(handle_request(err.into_inner()))
            }
        }
    }

    /// Split the caret line at the caret.
    pub fn insert_newline(&mut self) -> bool {
        self.delete_selection();
        self.finish_edit();
        let pos = self.clamp_position(self.caret.cursor());
        let (before, after) = split_at_col(&self.buffer.get_line(pos.line), pos.col);
        if self
            .replace_lines(pos.line, 1, vec![before, after], EditIntent::Other)
            .is_none()
        {
            return false;
        }
        self.caret.set_cursor(TextPosition::new(pos.line + 1, 0));
        self.after_edit();
        true
    }

    /// Delete the selection, or the grapheme before the caret, or merge with
    /// the previous line at column 0.
    pub fn backspace(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let pos = self.clamp_position(self.caret.cursor());
        if pos.col > 0 {
            let prev = prev_grapheme_col(&self.buffer.get_line(pos.line), pos.col);
            return self.edit_caret_line(prev, pos.col, "", EditIntent::DeleteBackward);
        }
        if pos.line == 0 {
            return false;
        }
        self.merge_with_next(pos.line - 1)
    }

    /// Delete the selection, or the grapheme after the caret, or merge the
    /// next line in at the line end.
    pub fn delete_forward(&mut self) -> bool {
        if self.delete_selection() {
            return true;
        }
        let pos = self.clamp_position(self.caret.cursor());
        let text = self.buffer.get_line(pos.line);
        if pos.col < char_len(&text) {
            let next = next_grapheme_col(&text, pos.col);
            return self.edit_caret_line(pos.col, next, "", EditIntent::DeleteForward);
        }
        if pos.line + 1 >= self.buffer.total_lines() {
            return false;
        }
        self.merge_with_next(pos.line)
    }

    fn merge_with_next(&mut self, line: usize) -> bool {
        self.finish_edit();
        let first = self.buffer.get_line(line);
        let join_col = char_len(&first);
        let merged = first + &self.buffer.get_line(line + 1);
        if self
            .replace_lines(line, 2, vec![merged], EditIntent::Other)
            .is_none()
        {
            return false;
        }
        self.caret.set_cursor(TextPosition::new(line, join_col));
        self.after_edit();
        true
    }

    /// Remove the selected span with one replacement; the caret lands on its start.
    pub fn delete_selection(&mut self) -> bool {
        let Some(range) = self.caret.selection() else {
            return false;
        };
        self.finish_edit();
        let start = self.clamp_position(range.start);
        let end = self.clamp_position(range.end);
        let first = self.buffer.get_line(start.line);
        let merged = if start.line == end.line {
            splice_chars(&first, start.col..end.col, "")
        } else {
            let last = self.buffer.get_line(end.line);
            let mut merged = slice_chars(&first, 0..start.col).to_string();
            merged.push_str(slice_chars(&last, end.col..char_len(&last)));
            merged
        };
        let count = end.line - start.line + 1;
        if self
            .replace_lines(start.line, count, vec![merged], EditIntent::Other)
            .is_none()
        {
            return false;
        }
        self.caret.set_cursor(start);
        self.after_edit();
        true
    }

    // ---- indentation ----------------------------------------------------

    /// Prepend one indent unit to every selected line, as one undo step.
    pub fn indent_selection(&mut self) -> bool {
        let Some(range) = self.caret.selection() else {
            return false;
        };
        self.finish_edit();
        let unit = self.config.indent_unit();
        let lines = selected_lines(range);
        let (first, last) = (*lines.start(), *lines.end());
        let indented: Vec<String> = self
            .buffer
            .get_range(first, last + 1)
            .into_iter()
            .map(|text| format!("{}{}", unit, text))
            .collect();
        let count = indented.len();
        if self
            .replace_lines(first, count, indented, EditIntent::Other)
            .is_none()
        {
            return false;
        }
        let touched: Vec<usize> = (first..first + count).collect();
        self.shift_caret_columns(&touched, char_len(&unit) as isize)
    }

    /// Remove one leading indent unit from every selected line that has it.
    pub fn outdent_selection(&mut self) -> bool {
        let Some(range) = self.caret.selection() else {
            return false;
        };
        self.outdent_lines(selected_lines(range))
    }

    fn outdent_lines(&mut self, lines: RangeInclusive<usize>) -> bool {
        self.finish_edit();
        let unit = self.config.indent_unit();
        let (first, last) = (*lines.start(), *lines.end());
        let mut touched = Vec::new();
        let outdented: Vec<String> = self
            .buffer
            .get_range(first, last + 1)
            .into_iter()
            .enumerate()
            .map(|(offset, text)| match text.strip_prefix(unit.as_str()) {
                Some(rest) => {
                    touched.push(first + offset);
                    rest.to_string()
                }
                None => text,
            })
            .collect();
        if touched.is_empty() {
            return false;
        }
        let count = outdented.len();
        if self
            .replace_lines(first, count, outdented, EditIntent::Other)
            .is_none()
        {
            return false;
        }
        self.shift_caret_columns(&touched, -(char_len(&unit) as isize))
    }

    fn shift_caret_columns(&mut self, lines: &[usize], delta: isize) -> bool {
        if lines.is_empty() {
            return false;
        }
        let shift = |pos: TextPosition| {
            if lines.contains(&pos.line) {
                TextPosition::new(pos.line, pos.col.saturating_add_signed(delta))
            } else {
                pos
            }
        };
        let cursor = shift(self.caret.cursor());
        match self.caret.anchor().map(shift) {
            Some(anchor) => self.caret.select_range(anchor, cursor),
            None => self.caret.set_cursor(cursor),
        }
        self.after_edit();
        true
    }

    /// Tab: indent a selection, otherwise insert one indent unit.
    pub fn indent_key(&mut self) -> bool {
        if self.caret.has_selection() {
            return self.indent_selection();
        }
        let unit = self.config.indent_unit();
        self.insert_text(&unit)
    }

    /// Shift+Tab: outdent the selection, otherwise the caret line.
    pub fn outdent_key(&mut self) -> bool {
        if self.caret.has_selection() {
            return self.outdent_selection();
        }
        let line = self.clamp_position(self.caret.cursor()).line;
        self.outdent_lines(line..=line)
    }

    // ---- history --------------------------------------------------------

    pub fn undo(&mut self) -> bool {
        self.finish_edit();
        match self.buffer.undo() {
            Some(delta) => {
                self.place_after_history(delta);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.finish_edit();
        match self.buffer.redo() {
            Some(delta) => {
                self.place_after_history(delta);
                true
            }
            None => false,
        }
    }

    fn place_after_history(&mut self, delta: LineDelta) {
        let last = self.buffer.total_lines() - 1;
        let line = (delta.start_line + delta.new_count.max(1) - 1).min(last);
        self.caret
            .set_cursor(TextPosition::new(line, self.buffer.line_len(line)));
        if delta.line_delta() != 0 {
            self.max_width_dirty = true;
        }
        self.after_edit();
    }

    // ---- caret navigation -----------------------------------------------

    /// Place the caret, clearing any selection.
    pub fn set_cursor(&mut self, pos: TextPosition) -> bool {
        self.navigate(pos, false)
    }

    /// Select from `anchor` to `cursor`.
    pub fn select(&mut self, anchor: TextPosition, cursor: TextPosition) {
        self.finish_edit();
        let anchor = self.clamp_position(anchor);
        let cursor = self.clamp_position(cursor);
        self.caret.select_range(anchor, cursor);
        self.caret.normalize();
        self.after_caret_move();
    }

    fn navigate(&mut self, pos: TextPosition, select: bool) -> bool {
        self.finish_edit();
        self.preferred_col = None;
        let before = self.caret;
        let pos = self.clamp_position(pos);
        self.caret.move_to(pos, select);
        self.caret.normalize();
        self.after_caret_move();
        before != self.caret
    }

    fn after_caret_move(&mut self) {
        self.blink.reset(Instant::now());
        self.ensure_cursor_visible();
    }

    pub fn move_left(&mut self, select: bool, word: bool) -> bool {
        if !select {
            if let Some(range) = self.caret.selection() {
                return self.navigate(range.start, false);
            }
        }
        let pos = self.clamp_position(self.caret.cursor());
        let target = if pos.col == 0 {
            match pos.line {
                0 => pos,
                line => TextPosition::new(line - 1, self.buffer.line_len(line - 1)),
            }
        } else {
            let text = self.buffer.get_line(pos.line);
            let col = if word {
                word_boundary_left(&text, pos.col)
            } else {
                prev_grapheme_col(&text, pos.col)
            };
            TextPosition::new(pos.line, col)
        };
        self.navigate(target, select)
    }

    pub fn move_right(&mut self, select: bool, word: bool) -> bool {
        if !select {
            if let Some(range) = self.caret.selection() {
                return self.navigate(range.end, false);
            }
        }
        let pos = self.clamp_position(self.caret.cursor());
        let text = self.buffer.get_line(pos.line);
        let target = if pos.col >= char_len(&text) {
            if pos.line + 1 < self.buffer.total_lines() {
                TextPosition::new(pos.line + 1, 0)
            } else {
                pos
            }
        } else {
            let col = if word {
                word_boundary_right(&text, pos.col)
            } else {
                next_grapheme_col(&text, pos.col)
            };
            TextPosition::new(pos.line, col)
        };
        self.navigate(target, select)
    }

    fn move_vertical(&mut self, lines: isize, select: bool) -> bool {
        let pos = self.clamp_position(self.caret.cursor());
        let goal = self.preferred_col.unwrap_or(pos.col);
        let last = self.buffer.total_lines() - 1;
        let line = pos.line.saturating_add_signed(lines).min(last);
        let target = if lines < 0 && pos.line == 0 {
            TextPosition::new(0, 0)
        } else if lines > 0 && pos.line == last {
            TextPosition::new(last, self.buffer.line_len(last))
        } else {
            TextPosition::new(line, goal)
        };
        let moved = self.navigate(target, select);
        self.preferred_col = Some(goal);
        moved
    }

    pub fn move_up(&mut self, select: bool) -> bool {
        self.move_vertical(-1, select)
    }

    pub fn move_down(&mut self, select: bool) -> bool {
        self.move_vertical(1, select)
    }

    pub fn move_home(&mut self, select: bool) -> bool {
        let line = self.caret.cursor().line;
        self.navigate(TextPosition::new(line, 0), select)
    }

    pub fn move_end(&mut self, select: bool) -> bool {
        let line = self.clamp_position(self.caret.cursor()).line;
        self.navigate(TextPosition::new(line, self.buffer.line_len(line)), select)
    }

    pub fn move_document_start(&mut self, select: bool) -> bool {
        let total = self.buffer.total_lines();
        let scrolled = self.viewport.scroll_to_top(total, self.word_wrap);
        self.note_scroll(scrolled);
        self.navigate(TextPosition::default(), select)
    }

    pub fn move_document_end(&mut self, select: bool) -> bool {
        let total = self.buffer.total_lines();
        let scrolled = self.viewport.scroll_to_bottom(total, self.word_wrap);
        self.note_scroll(scrolled);
        let last = total - 1;
        self.navigate(TextPosition::new(last, self.buffer.line_len(last)), select)
    }

    fn page_lines(&self) -> isize {
        self.viewport.visible_lines().saturating_sub(1).max(1) as isize
    }

    pub fn page_up(&mut self, select: bool) -> bool {
        let lines = self.page_lines();
        let total = self.buffer.total_lines();
        let scrolled = self.viewport.scroll_by_lines(-lines, total, self.word_wrap);
        self.note_scroll(scrolled);
        self.move_vertical(-lines, select) || scrolled
    }

    pub fn page_down(&mut self, select: bool) -> bool {
        let lines = self.page_lines();
        let total = self.buffer.total_lines();
        let scrolled = self.viewport.scroll_by_lines(lines, total, self.word_wrap);
        self.note_scroll(scrolled);
        self.move_vertical(lines, select) || scrolled
    }

    pub fn select_all(&mut self) -> bool {
        let last = self.buffer.total_lines() - 1;
        let end = TextPosition::new(last, self.buffer.line_len(last));
        let before = self.caret;
        self.select(TextPosition::default(), end);
        before != self.caret
    }

    // ---- pointer --------------------------------------------------------

    fn hit_tester(&mut self) -> HitTester<'_> {
        let wrap_width = self.wrap_width();
        HitTester {
            buffer: &self.buffer,
            layout: self.layout.as_ref(),
            viewport: &self.viewport,
            cache: &mut self.wrap_cache,
            wrap_width,
        }
    }

    /// Document position under a viewport point; `None` over the gutter.
    pub fn position_at(&mut self, x: f32, y: f32) -> Option<TextPosition> {
        let lookahead = self.config.hit_test_lookahead_lines;
        self.hit_tester().position_at(x, y, lookahead)
    }

    /// Primary button press at a viewport point.
    ///
    /// One click places the caret (shift extends), two select the word or
    /// whitespace run, three select the line. Pressing inside a selection
    /// arms a drag-and-drop source instead of starting a new selection.
    pub fn pointer_press(&mut self, x: f32, y: f32, shift: bool, now: Instant) -> bool {
        let Some(pos) = self.position_at(x, y) else {
            return false;
        };
        self.finish_edit();
        self.preferred_col = None;
        let before = self.caret;
        match self.clicks.register(x, y, now) {
            2 => {
                let words = word_range_at(&self.buffer.get_line(pos.line), pos.col);
                self.caret.select_range(
                    TextPosition::new(pos.line, words.start),
                    TextPosition::new(pos.line, words.end),
                );
                self.gesture = PointerGesture::Idle;
            }
            3 => {
                self.caret.select_range(
                    TextPosition::new(pos.line, 0),
                    TextPosition::new(pos.line, self.buffer.line_len(pos.line)),
                );
                self.gesture = PointerGesture::Idle;
            }
            _ if shift => {
                self.caret.move_to(pos, true);
                self.gesture = PointerGesture::Selecting {
                    press: (x, y),
                    extend: true,
                };
            }
            _ if self.caret.selection_contains(pos) => {
                self.gesture = PointerGesture::DragSource {
                    press: (x, y),
                    target: pos,
                };
            }
            _ => {
                self.caret.select_range(pos, pos);
                self.gesture = PointerGesture::Selecting {
                    press: (x, y),
                    extend: false,
                };
            }
        }
        self.blink.reset(now);
        self.ensure_cursor_visible();
        before != self.caret
    }

    /// Pointer motion with the button held.
    pub fn pointer_drag(&mut self, x: f32, y: f32) -> bool {
        if !matches!(self.gesture, PointerGesture::Selecting { .. }) {
            return false;
        }
        let lookahead = self.config.hit_test_lookahead_lines;
        let pos = self.hit_tester().clamped_position_at(x, y, lookahead);
        if self.caret.cursor() == pos {
            return false;
        }
        self.caret.drag_to(pos);
        self.ensure_cursor_visible();
        true
    }

    /// Button release; finishes a drag-selection or an in-editor move.
    pub fn pointer_release(&mut self, x: f32, y: f32) -> bool {
        let gesture = std::mem::take(&mut self.gesture);
        let moved = gesture.moved_past(x, y, self.config.drag_threshold_px);
        match gesture {
            PointerGesture::Idle => false,
            PointerGesture::Selecting { extend, .. } => {
                let before = self.caret;
                if !extend && !moved {
                    if let Some(anchor) = self.caret.anchor() {
                        self.caret.set_cursor(anchor);
                    }
                }
                self.caret.normalize();
                before != self.caret
            }
            PointerGesture::DragSource { target, .. } => {
                if moved {
                    match self.drag_source_text() {
                        Some(text) => self.drop_text(x, y, &text, true),
                        None => false,
                    }
                } else {
                    self.navigate(target, false)
                }
            }
        }
    }

    // ---- clipboard and drag-and-drop ------------------------------------

    /// Selected text, serialized on the calling thread.
    pub fn selected_text(&self) -> Option<String> {
        let range = self.caret.selection()?;
        let start = self.buffer.char_index(range.start.line, range.start.col);
        let end = self.buffer.char_index(range.end.line, range.end.col);
        Some(self.buffer.text_in(start..end))
    }

    /// Text offered when a drag starts; `None` declines the drag.
    pub fn drag_source_text(&self) -> Option<String> {
        self.selected_text()
    }

    fn request_clipboard(&mut self, cut: bool) -> bool {
        let Some(range) = self.caret.selection() else {
            return false;
        };
        let start = self.buffer.char_index(range.start.line, range.start.col);
        let end = self.buffer.char_index(range.end.line, range.end.col);
        let request = WorkerRequest::Copy {
            snapshot: self.buffer.snapshot(),
            range: start..end,
            cut,
        };
        if let Some(event) = self.submit(request) {
            self.handle_worker_event(event);
        }
        true
    }

    /// Queue the selection for the clipboard; it arrives as
    /// [`EditorEvent::ClipboardText`].
    pub fn copy(&mut self) -> bool {
        self.request_clipboard(false)
    }

    /// Copy, then delete the selection immediately.
    pub fn cut(&mut self) -> bool {
        if !self.request_clipboard(true) {
            return false;
        }
        self.delete_selection()
    }

    /// Insert clipboard text. Ignored while a previous paste is pending.
    pub fn paste(&mut self, text: &str) -> bool {
        if self.paste_in_flight() {
            debug!(
                target: "vtedit_core::editor",
                "paste ignored while another is in flight"
            );
            return false;
        }
        self.insert_text(text)
    }

    /// Drop `text` at a viewport point. With `move_selection`, the current
    /// selection is deleted first (the drop target is adjusted for it).
    pub fn drop_text(&mut self, x: f32, y: f32, text: &str, move_selection: bool) -> bool {
        if text.is_empty() {
            return false;
        }
        let Some(mut target) = self.position_at(x, y) else {
            return false;
        };
        self.finish_edit();
        if move_selection {
            if let Some(range) = self.caret.selection() {
                if range.start <= target && target <= range.end {
                    return false;
                }
                if !self.delete_selection() {
                    return false;
                }
                if target > range.end {
                    if target.line == range.end.line {
                        target = TextPosition::new(
                            range.start.line,
                            range.start.col + (target.col - range.end.col),
                        );
                    } else {
                        target.line -= range.end.line - range.start.line;
                    }
                }
            }
        }
        self.caret.set_cursor(self.clamp_position(target));
        self.insert_text(text)
    }

    // ---- input method ---------------------------------------------------

    /// Show uncommitted composition text at the caret.
    pub fn ime_preedit(&mut self, text: &str) -> bool {
        if self.preedit == text {
            return false;
        }
        self.preedit = text.to_string();
        true
    }

    /// Insert finalized composition text.
    pub fn ime_commit(&mut self, text: &str) -> bool {
        self.preedit.clear();
        self.insert_text(text)
    }

    pub fn ime_disabled(&mut self) -> bool {
        let had_preedit = !self.preedit.is_empty();
        self.preedit.clear();
        had_preedit
    }

    // ---- worker results -------------------------------------------------

    fn handle_worker_event(&mut self, event: WorkerEvent) -> bool {
        match event {
            WorkerEvent::PasteReady {
                generation,
                line,
                original_text,
                plan,
            } => {
                self.pending_pastes = self.pending_pastes.saturating_sub(1);
                let total = self.buffer.total_lines();
                if generation != self.buffer.generation()
                    || line >= total
                    || self.buffer.get_line(line) != original_text
                {
                    error!(
                        target: "vtedit_core::editor",
                        line,
                        generation,
                        current_generation = self.buffer.generation(),
                        total_lines = total,
                        "discarding stale paste result"
                    );
                    return false;
                }
                self.finish_edit();
                if self
                    .replace_lines(line, 1, plan.lines, EditIntent::Other)
                    .is_none()
                {
                    return false;
                }
                self.caret.set_cursor(TextPosition::new(
                    line + plan.cursor_line_offset,
                    plan.cursor_col,
                ));
                self.after_edit();
                true
            }
            WorkerEvent::ClipboardReady { text, cut } => {
                self.events.push(EditorEvent::ClipboardText { text, cut });
                true
            }
        }
    }

    /// Apply every worker result that has already arrived.
    pub fn poll_worker(&mut self) -> bool {
        let pending: Vec<WorkerEvent> = match self.worker.as_ref() {
            Some(worker) => worker.evt_rx.try_iter().collect(),
            None => return false,
        };
        let mut handled = false;
        for event in pending {
            handled |= self.handle_worker_event(event);
        }
        handled
    }

    /// Block up to `timeout` for one worker result, then drain the rest.
    ///
    /// # Errors
    /// Returns [`EditorError::WorkerUnavailable`] if the worker thread is gone.
    pub fn wait_for_worker(&mut self, timeout: Duration) -> EditorResult<bool> {
        let received = match self.worker.as_ref() {
            Some(worker) => worker.evt_rx.recv_timeout(timeout),
            None => return Ok(false),
        };
        match received {
            Ok(event) => {
                let handled = self.handle_worker_event(event);
                Ok(self.poll_worker() || handled)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => {
                self.pending_pastes = 0;
                Err(EditorError::WorkerUnavailable)
            }
        }
    }

    // ---- wrap and viewport ----------------------------------------------

    fn wrap_width(&self) -> Option<f32> {
        self.word_wrap
            .then(|| self.viewport.wrap_width(self.buffer.total_lines()))
    }

    /// Enable or disable word wrap. Enabling resets horizontal scroll.
    pub fn set_word_wrap(&mut self, enabled: bool) -> bool {
        if self.word_wrap == enabled {
            return false;
        }
        self.word_wrap = enabled;
        self.wrap_cache.invalidate();
        self.max_width_dirty = true;
        let total = self.buffer.total_lines();
        let clamped = self.viewport.clamp(total, enabled);
        self.note_scroll(clamped);
        self.ensure_cursor_visible();
        true
    }

    pub fn toggle_word_wrap(&mut self) -> bool {
        self.set_word_wrap(!self.word_wrap)
    }

    /// Update the widget size in pixels.
    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if !self.viewport.resize(width, height) {
            return false;
        }
        self.wrap_cache.invalidate();
        self.max_width_dirty = true;
        let total = self.buffer.total_lines();
        let clamped = self.viewport.clamp(total, self.word_wrap);
        self.note_scroll(clamped);
        true
    }

    fn refresh_max_width(&mut self) {
        if !self.max_width_dirty {
            return;
        }
        self.max_width_dirty = false;
        let caret_line = self
            .buffer
            .get_line(self.clamp_position(self.caret.cursor()).line);
        self.viewport.resample_max_line_width(
            &self.buffer,
            self.layout.as_ref(),
            self.word_wrap,
            Some(&caret_line),
        );
    }

    /// Wheel deltas in notches; positive `dy` scrolls toward the end.
    pub fn scroll_wheel(&mut self, dx: f32, dy: f32) -> bool {
        self.refresh_max_width();
        let total = self.buffer.total_lines();
        let changed = self.viewport.scroll_wheel(
            dx,
            dy,
            self.config.wheel_lines_per_notch,
            self.config.wheel_chars_per_notch,
            total,
            self.word_wrap,
        );
        self.note_scroll(changed)
    }

    pub fn scroll_by_lines(&mut self, lines: isize) -> bool {
        let total = self.buffer.total_lines();
        let changed = self.viewport.scroll_by_lines(lines, total, self.word_wrap);
        self.note_scroll(changed)
    }

    pub fn scroll_to_top(&mut self) -> bool {
        let total = self.buffer.total_lines();
        let changed = self.viewport.scroll_to_top(total, self.word_wrap);
        self.note_scroll(changed)
    }

    pub fn scroll_to_bottom(&mut self) -> bool {
        let total = self.buffer.total_lines();
        let changed = self.viewport.scroll_to_bottom(total, self.word_wrap);
        self.note_scroll(changed)
    }

    pub fn set_scroll_position(&mut self, y: f64, x: f64) -> bool {
        self.refresh_max_width();
        let total = self.buffer.total_lines();
        let changed = self
            .viewport
            .set_scroll_position(y, x, total, self.word_wrap);
        self.note_scroll(changed)
    }

    /// Minimal scroll that shows the caret, keeping a horizontal margin.
    pub fn ensure_cursor_visible(&mut self) -> bool {
        self.refresh_max_width();
        let pos = self.clamp_position(self.caret.cursor());
        let total = self.buffer.total_lines();
        let line_height = self.viewport.line_height();
        let (_, caret_x) = self.hit_tester().caret_offset(pos);
        let mut changed = self.viewport.ensure_visible(
            pos.line as f64 * f64::from(line_height),
            caret_x,
            self.config.scroll_margin_px,
            total,
            self.word_wrap,
        );
        if self.word_wrap {
            // Wrapped rows above the caret can push it below the bottom edge.
            let lookahead = self.config.hit_test_lookahead_lines;
            while self.viewport.first_visible_line() < pos.line {
                let Some(top) = self.hit_tester().caret_row_top(pos, lookahead) else {
                    break;
                };
                if top + line_height <= self.viewport.height() {
                    break;
                }
                let next = (self.viewport.first_visible_line() + 1) as f64 * f64::from(line_height);
                if !self.viewport.set_scroll_position(next, 0.0, total, true) {
                    break;
                }
                changed = true;
            }
        }
        self.note_scroll(changed)
    }

    // ---- rendering ------------------------------------------------------

    /// Whether the caret is in the visible blink phase.
    pub fn cursor_visible(&self, now: Instant) -> bool {
        self.blink.visible(now)
    }

    /// Time until the caret blink flips.
    pub fn until_blink_toggle(&self, now: Instant) -> Duration {
        self.blink.until_toggle(now)
    }

    /// Lay out the visible rows. Cost is bounded by the viewport.
    pub fn render_frame(&mut self, now: Instant) -> RenderFrame {
        self.refresh_max_width();
        let total = self.buffer.total_lines();
        let line_height = self.viewport.line_height();
        let height = self.viewport.height();
        let char_width = self.viewport.char_width();
        let wrap_width = self.wrap_width();
        let margin = self.config.render_margin_lines;
        let selection = self.caret.selection();

        let mut rows = Vec::new();
        let mut y = self.viewport.first_row_offset();
        'lines: for line in self.viewport.visible_range(total, margin) {
            let text = self.buffer.get_line(line);
            let len = char_len(&text);
            let segments =
                self.wrap_cache
                    .segments(&self.buffer, self.layout.as_ref(), wrap_width, line);
            let last = segments.len() - 1;
            let span = selection.and_then(|range| range.span_on_line(line, len));
            let continues = selection
                .is_some_and(|range| line >= range.start.line && line < range.end.line);
            for (idx, segment) in segments.iter().enumerate() {
                if y >= height {
                    break 'lines;
                }
                let highlight = span.as_ref().and_then(|span| {
                    let from = span.start.max(segment.start_col);
                    let to = span.end.min(segment.end_col);
                    let trailing = if continues && idx == last {
                        char_width
                    } else {
                        0.0
                    };
                    if from > to || (from == to && trailing == 0.0) {
                        return None;
                    }
                    let x0 = self
                        .layout
                        .text_width(slice_chars(&text, segment.start_col..from));
                    let x1 = self
                        .layout
                        .text_width(slice_chars(&text, segment.start_col..to))
                        + trailing;
                    Some((x0, x1))
                });
                rows.push(RenderRow {
                    y,
                    line,
                    line_number: (idx == 0).then(|| (line + 1).to_string()),
                    start_col: segment.start_col,
                    text: slice_chars(&text, segment.start_col..segment.end_col).to_string(),
                    selection: highlight,
                });
                y += line_height;
            }
        }

        let origin = self.viewport.text_origin_x(total);
        let cursor = self.clamp_position(self.caret.cursor());
        let mut tester = self.hit_tester();
        let caret_top = tester.caret_row_top(cursor, margin);
        let (_, caret_offset) = tester.caret_offset(cursor);
        let caret_point = caret_top
            .filter(|top| *top < height && *top + line_height > 0.0)
            .map(|top| (origin + caret_offset, top));

        RenderFrame {
            gutter_width: self.viewport.gutter_width(total),
            text_origin_x: origin,
            line_height,
            rows,
            caret: caret_point
                .filter(|_| self.blink.visible(now))
                .map(|(x, y)| CaretDraw {
                    x,
                    y,
                    height: line_height,
                }),
            preedit: caret_point
                .filter(|_| !self.preedit.is_empty())
                .map(|(x, y)| PreeditDraw {
                    x,
                    y,
                    text: self.preedit.clone(),
                }),
        }
    }

    // ---- command dispatch -----------------------------------------------

    /// Apply host commands in order and summarize what changed.
    pub fn apply_commands(&mut self, commands: &[EditorCommand], now: Instant) -> ApplyResult {
        let mut result = ApplyResult::default();
        for command in commands {
            let revision = self.buffer.revision();
            let caret = self.caret;
            let scroll = (self.viewport.scroll_y(), self.viewport.scroll_x());
            match command {
                EditorCommand::MoveLeft { select, word } => {
                    self.move_left(*select, *word);
                }
                EditorCommand::MoveRight { select, word } => {
                    self.move_right(*select, *word);
                }
                EditorCommand::MoveUp { select } => {
                    self.move_up(*select);
                }
                EditorCommand::MoveDown { select } => {
                    self.move_down(*select);
                }
                EditorCommand::MoveHome { select } => {
                    self.move_home(*select);
                }
                EditorCommand::MoveEnd { select } => {
                    self.move_end(*select);
                }
                EditorCommand::DocumentStart { select } => {
                    self.move_document_start(*select);
                }
                EditorCommand::DocumentEnd { select } => {
                    self.move_document_end(*select);
                }
                EditorCommand::PageUp { select } => {
                    self.page_up(*select);
                }
                EditorCommand::PageDown { select } => {
                    self.page_down(*select);
                }
                EditorCommand::SelectAll => {
                    self.select_all();
                }
                EditorCommand::Backspace => {
                    self.backspace();
                }
                EditorCommand::DeleteForward => {
                    self.delete_forward();
                }
                EditorCommand::InsertText(text) => {
                    self.insert_text(text);
                }
                EditorCommand::InsertNewline => {
                    self.insert_newline();
                }
                EditorCommand::Indent => {
                    self.indent_key();
                }
                EditorCommand::Outdent => {
                    self.outdent_key();
                }
                EditorCommand::Copy => result.copy_requested |= self.copy(),
                EditorCommand::Cut => {
                    let cut = self.cut();
                    result.copy_requested |= cut;
                    result.cut |= cut;
                }
                EditorCommand::Paste(text) => result.pasted |= self.paste(text),
                EditorCommand::Undo => {
                    self.undo();
                }
                EditorCommand::Redo => {
                    self.redo();
                }
                EditorCommand::Escape => {
                    self.cancel_edit();
                }
                EditorCommand::ImePreedit(text) => {
                    self.ime_preedit(text);
                }
                EditorCommand::ImeCommit(text) => {
                    self.ime_commit(text);
                }
                EditorCommand::ImeDisabled => {
                    self.ime_disabled();
                }
                EditorCommand::ToggleWordWrap => {
                    self.toggle_word_wrap();
                }
                EditorCommand::Scroll { dx, dy } => {
                    self.scroll_wheel(*dx, *dy);
                }
                EditorCommand::PointerPress { x, y, shift } => {
                    self.pointer_press(*x, *y, *shift, now);
                }
                EditorCommand::PointerDrag { x, y } => {
                    self.pointer_drag(*x, *y);
                }
                EditorCommand::PointerRelease { x, y } => {
                    self.pointer_release(*x, *y);
                }
            }
            result.changed |= self.buffer.revision() != revision;
            result.moved |= self.caret != caret;
            result.scrolled |= (self.viewport.scroll_y(), self.viewport.scroll_x()) != scroll;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::MonospaceLayout;

    fn editor(lines: &[&str]) -> VirtualEditor {
        let mut editor = VirtualEditor::without_worker(
            EditorConfig::default(),
            Box::new(MonospaceLayout::new(10.0, 20.0)),
        );
        editor.resize(400.0, 200.0);
        editor.load_lines(lines.iter().copied());
        editor.take_events();
        editor
    }

    fn lines(editor: &VirtualEditor) -> Vec<String> {
        editor.buffer().get_range(0, editor.buffer().total_lines())
    }

    fn pos(line: usize, col: usize) -> TextPosition {
        TextPosition::new(line, col)
    }

    #[test]
    fn typing_reflects_each_keystroke_and_undoes_as_one_step() {
        let mut editor = editor(&["abc"]);
        editor.set_cursor(pos(0, 1));
        editor.insert_text("X");
        editor.insert_text("Y");
        assert_eq!(lines(&editor), vec!["aXYbc"]);
        assert_eq!(editor.cursor(), pos(0, 3));
        assert!(editor.active_edit().is_active());
        assert_eq!(editor.buffer().history().undo_len(), 1);
        assert!(editor.undo());
        assert_eq!(lines(&editor), vec!["abc"]);
        assert!(!editor.active_edit().is_active());
    }

    #[test]
    fn navigation_seals_the_typing_run() {
        let mut editor = editor(&["abc"]);
        editor.set_cursor(pos(0, 3));
        editor.insert_text("d");
        editor.move_left(false, false);
        editor.insert_text("e");
        assert_eq!(lines(&editor), vec!["abced"]);
        assert_eq!(editor.buffer().history().undo_len(), 2);
    }

    #[test]
    fn backspace_and_delete_merge_lines_at_edges() {
        let mut editor = editor(&["ab", "cd"]);
        editor.set_cursor(pos(1, 0));
        assert!(editor.backspace());
        assert_eq!(lines(&editor), vec!["abcd"]);
        assert_eq!(editor.cursor(), pos(0, 2));
        assert!(editor.insert_newline());
        assert_eq!(lines(&editor), vec!["ab", "cd"]);
        editor.set_cursor(pos(0, 2));
        assert!(editor.delete_forward());
        assert_eq!(lines(&editor), vec!["abcd"]);
        assert_eq!(editor.cursor(), pos(0, 2));
        editor.set_cursor(pos(0, 0));
        assert!(!editor.backspace());
    }

    #[test]
    fn backspace_removes_whole_grapheme() {
        let mut editor = editor(&["ae\u{301}x"]);
        editor.set_cursor(pos(0, 3));
        assert!(editor.backspace());
        assert_eq!(lines(&editor), vec!["ax"]);
        assert_eq!(editor.cursor(), pos(0, 1));
    }

    #[test]
    fn typing_replaces_selection() {
        let mut editor = editor(&["hello world"]);
        editor.select(pos(0, 0), pos(0, 5));
        assert!(editor.insert_text("bye"));
        assert_eq!(lines(&editor), vec!["bye world"]);
        assert_eq!(editor.cursor(), pos(0, 3));
    }

    #[test]
    fn multi_line_insert_runs_inline_without_worker() {
        let mut editor = editor(&["abcd"]);
        editor.set_cursor(pos(0, 2));
        assert!(editor.insert_text("1\n2\n3"));
        assert_eq!(lines(&editor), vec!["ab1", "2", "3cd"]);
        assert_eq!(editor.cursor(), pos(2, 1));
        assert!(editor.undo());
        assert_eq!(lines(&editor), vec!["abcd"]);
    }

    #[test]
    fn indent_and_outdent_selected_lines() {
        let mut editor = editor(&["a", "    b", "c"]);
        editor.select(pos(0, 0), pos(1, 1));
        assert!(editor.indent_selection());
        assert_eq!(lines(&editor), vec!["    a", "        b", "c"]);
        assert_eq!(editor.selection().map(|r| r.end), Some(pos(1, 5)));
        assert!(editor.outdent_selection());
        assert!(editor.outdent_selection());
        assert_eq!(lines(&editor), vec!["a", "b", "c"]);
        assert!(!editor.outdent_selection());
    }

    #[test]
    fn paste_stays_in_flight_until_every_request_returns() {
        let mut editor = VirtualEditor::new(
            EditorConfig::default(),
            Box::new(MonospaceLayout::new(10.0, 20.0)),
        )
        .expect("spawn worker");
        editor.resize(400.0, 200.0);
        editor.load_lines(["xy", "z"]);
        editor.set_cursor(pos(0, 1));
        assert!(editor.insert_text("a\nb"));
        editor.set_cursor(pos(1, 1));
        assert!(editor.insert_text("c\nd"));
        assert!(editor.paste_in_flight());

        let recv = |editor: &VirtualEditor| {
            editor
                .worker
                .as_ref()
                .expect("worker running")
                .evt_rx
                .recv_timeout(Duration::from_secs(2))
                .expect("paste result")
        };
        let first = recv(&editor);
        assert!(editor.handle_worker_event(first));
        assert!(editor.paste_in_flight());
        assert!(!editor.paste("ignored"));

        // Line 1 moved under the second request, so its result is stale.
        let second = recv(&editor);
        assert!(!editor.handle_worker_event(second));
        assert!(!editor.paste_in_flight());
        assert_eq!(lines(&editor), vec!["xa", "by", "z"]);
    }

    #[test]
    fn block_indent_is_one_undo_step() {
        let mut editor = editor(&["a", "b", "    c", "d"]);
        editor.select(pos(0, 0), pos(2, 1));
        assert!(editor.indent_selection());
        assert_eq!(lines(&editor), vec!["    a", "    b", "        c", "d"]);
        assert_eq!(editor.buffer().history().undo_len(), 1);

        assert!(editor.outdent_selection());
        assert!(editor.outdent_selection());
        assert_eq!(lines(&editor), vec!["a", "b", "c", "d"]);
        assert_eq!(editor.buffer().history().undo_len(), 3);

        assert!(editor.undo());
        assert_eq!(lines(&editor), vec!["a", "b", "    c", "d"]);
        assert!(editor.undo());
        assert!(editor.undo());
        assert_eq!(lines(&editor), vec!["a", "b", "    c", "d"]);
        assert!(!editor.buffer().history().can_undo());
    }

    #[test]
    fn tab_without_selection_inserts_unit() {
        let mut editor = editor(&["x"]);
        editor.set_cursor(pos(0, 0));
        assert!(editor.indent_key());
        assert_eq!(lines(&editor), vec!["    x"]);
        assert!(editor.outdent_key());
        assert_eq!(lines(&editor), vec!["x"]);
        assert_eq!(editor.cursor(), pos(0, 0));
    }

    #[test]
    fn word_navigation_and_selection_collapse() {
        let mut editor = editor(&["foo bar", "baz"]);
        editor.set_cursor(pos(0, 0));
        editor.move_right(false, true);
        assert_eq!(editor.cursor(), pos(0, 3));
        editor.move_right(true, true);
        assert_eq!(editor.cursor(), pos(0, 7));
        assert_eq!(editor.selection().map(|r| r.start), Some(pos(0, 3)));
        editor.move_left(false, false);
        assert_eq!(editor.cursor(), pos(0, 3));
        assert!(editor.selection().is_none());
        editor.move_end(false);
        editor.move_right(false, false);
        assert_eq!(editor.cursor(), pos(1, 0));
    }

    #[test]
    fn vertical_moves_keep_preferred_column() {
        let mut editor = editor(&["abcdef", "ab", "abcdef"]);
        editor.set_cursor(pos(0, 5));
        editor.move_down(false);
        assert_eq!(editor.cursor(), pos(1, 2));
        editor.move_down(false);
        assert_eq!(editor.cursor(), pos(2, 5));
        editor.move_down(false);
        assert_eq!(editor.cursor(), pos(2, 6));
        editor.move_document_start(false);
        assert_eq!(editor.cursor(), pos(0, 0));
        editor.move_up(false);
        assert_eq!(editor.cursor(), pos(0, 0));
    }

    #[test]
    fn escape_keeps_reflected_text() {
        let mut editor = editor(&["ab"]);
        editor.set_cursor(pos(0, 2));
        editor.insert_text("c");
        assert!(editor.cancel_edit());
        assert_eq!(lines(&editor), vec!["abc"]);
        assert!(!editor.active_edit().is_active());
    }

    #[test]
    fn events_report_transitions_once() {
        let mut editor = editor(&["ab"]);
        editor.set_cursor(pos(0, 2));
        editor.insert_text("c");
        editor.insert_text("d");
        let events = editor.take_events();
        let modified: Vec<&EditorEvent> = events
            .iter()
            .filter(|event| matches!(event, EditorEvent::ModifiedChanged(_)))
            .collect();
        assert_eq!(modified, vec![&EditorEvent::ModifiedChanged(true)]);
        assert_eq!(
            events
                .iter()
                .filter(|event| **event == EditorEvent::BufferChanged)
                .count(),
            2
        );
        assert!(editor.take_events().is_empty());
    }

    #[test]
    fn copy_and_cut_emit_clipboard_text() {
        let mut editor = editor(&["foo", "bar"]);
        editor.select(pos(0, 1), pos(1, 2));
        assert!(editor.copy());
        assert!(editor.cut());
        assert_eq!(lines(&editor), vec!["fr"]);
        let texts: Vec<(String, bool)> = editor
            .take_events()
            .into_iter()
            .filter_map(|event| match event {
                EditorEvent::ClipboardText { text, cut } => Some((text, cut)),
                _ => None,
            })
            .collect();
        assert_eq!(
            texts,
            vec![("oo\nba".to_string(), false), ("oo\nba".to_string(), true)]
        );
        assert!(!editor.copy());
    }

    #[test]
    fn pointer_clicks_select_words_and_lines() {
        // Gutter is 20px wide; text starts at x = 25, rows are 20px tall.
        let mut editor = editor(&["hello world"]);
        let start = Instant::now();
        assert!(editor.pointer_press(46.0, 5.0, false, start));
        editor.pointer_release(46.0, 5.0);
        assert_eq!(editor.cursor(), pos(0, 2));
        assert!(editor.selection().is_none());

        editor.pointer_press(46.0, 5.0, false, start + Duration::from_millis(100));
        editor.pointer_release(46.0, 5.0);
        let word = editor.selection().expect("word selection");
        assert_eq!((word.start, word.end), (pos(0, 0), pos(0, 5)));

        editor.pointer_press(46.0, 5.0, false, start + Duration::from_millis(200));
        let line = editor.selection().expect("line selection");
        assert_eq!((line.start, line.end), (pos(0, 0), pos(0, 11)));
        editor.pointer_release(46.0, 5.0);

        assert!(!editor.pointer_press(5.0, 5.0, false, start + Duration::from_secs(2)));
    }

    #[test]
    fn drag_selects_and_small_jitter_is_a_click() {
        let mut editor = editor(&["hello world"]);
        let start = Instant::now();
        editor.pointer_press(25.0, 5.0, false, start);
        assert!(editor.pointer_drag(75.0, 5.0));
        editor.pointer_release(75.0, 5.0);
        let range = editor.selection().expect("drag selection");
        assert_eq!((range.start, range.end), (pos(0, 0), pos(0, 5)));

        editor.pointer_press(95.0, 5.0, false, start + Duration::from_secs(1));
        editor.pointer_drag(97.0, 5.0);
        editor.pointer_release(97.0, 5.0);
        assert!(editor.selection().is_none());
        assert_eq!(editor.cursor(), pos(0, 7));
    }

    #[test]
    fn dragging_a_selection_moves_text() {
        let mut editor = editor(&["abc def"]);
        editor.select(pos(0, 0), pos(0, 3));
        let start = Instant::now();
        editor.pointer_press(35.0, 5.0, false, start);
        editor.pointer_drag(85.0, 5.0);
        assert!(editor.pointer_release(85.0, 5.0));
        assert_eq!(lines(&editor), vec![" deabcf"]);
    }

    #[test]
    fn ime_preedit_does_not_touch_buffer() {
        let mut editor = editor(&["ab"]);
        editor.set_cursor(pos(0, 1));
        assert!(editor.ime_preedit("ni"));
        assert_eq!(lines(&editor), vec!["ab"]);
        let frame = editor.render_frame(Instant::now());
        assert_eq!(frame.preedit.map(|p| p.text), Some("ni".to_string()));
        assert!(editor.ime_commit("你"));
        assert_eq!(lines(&editor), vec!["a你b"]);
        assert_eq!(editor.preedit(), "");
    }

    #[test]
    fn wrap_toggle_resets_horizontal_scroll() {
        let long = "x".repeat(200);
        let mut editor = editor(&[long.as_str()]);
        editor.set_cursor(pos(0, 200));
        assert!(editor.viewport().scroll_x() > 0.0);
        assert!(editor.set_word_wrap(true));
        assert_eq!(editor.viewport().scroll_x(), 0.0);
        assert!(!editor.set_word_wrap(true));
        let frame = editor.render_frame(Instant::now());
        assert!(frame.rows.len() > 1);
        assert_eq!(frame.rows[0].line_number.as_deref(), Some("1"));
        assert_eq!(frame.rows[1].line_number, None);
    }

    #[test]
    fn render_frame_is_bounded_by_viewport() {
        let lines: Vec<String> = (0..100_000).map(|i| format!("line {}", i)).collect();
        let mut editor = VirtualEditor::without_worker(
            EditorConfig::default(),
            Box::new(MonospaceLayout::new(10.0, 20.0)),
        );
        editor.resize(400.0, 200.0);
        editor.load_lines(lines);
        editor.scroll_by_lines(50_000);
        let frame = editor.render_frame(Instant::now());
        assert_eq!(frame.rows.len(), 10);
        assert_eq!(frame.rows[0].line, 50_000);
        assert_eq!(frame.rows[0].text, "line 50000");
        assert!(frame.caret.is_none());
    }

    #[test]
    fn selection_highlight_extends_past_line_end() {
        let mut editor = editor(&["abc", "de"]);
        editor.select(pos(0, 1), pos(1, 1));
        let frame = editor.render_frame(Instant::now());
        assert_eq!(frame.rows[0].selection, Some((10.0, 40.0)));
        assert_eq!(frame.rows[1].selection, Some((0.0, 10.0)));
    }

    #[test]
    fn apply_commands_reports_changes() {
        let mut editor = editor(&["ab"]);
        let result = editor.apply_commands(
            &[
                EditorCommand::MoveEnd { select: false },
                EditorCommand::InsertText("c".to_string()),
                EditorCommand::SelectAll,
                EditorCommand::Copy,
            ],
            Instant::now(),
        );
        assert!(result.changed);
        assert!(result.moved);
        assert!(result.copy_requested);
        assert!(!result.cut);
        assert_eq!(lines(&editor), vec!["abc"]);
    }
}
