//! eframe application hosting one [`VirtualEditor`].

use crate::input::{self, PointerSample};
use crate::layout::EguiTextLayout;
use crate::paint;
use eframe::egui;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};
use vtedit_core::sample::generate_test_lines;
use vtedit_core::{
    EditorConfig, EditorError, EditorEvent, EditorResult, MonospaceLayout, RenderTheme,
    VirtualEditor,
};

pub(crate) const DEFAULT_WINDOW_SIZE: [f32; 2] = [1000.0, 700.0];
pub(crate) const MIN_WINDOW_SIZE: [f32; 2] = [480.0, 320.0];
pub(crate) const APP_NAME: &str = "vtedit";

const SETTINGS_KEY: &str = "vtedit_settings";
const EDITOR_FONT_SIZE: f32 = 14.0;
const SAMPLE_LINE_COUNT: usize = 100_000;
const STATUS_TTL: Duration = Duration::from_secs(4);
const WORKER_POLL_INTERVAL: Duration = Duration::from_millis(16);

/// UI preferences persisted by eframe between sessions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct EditorSettings {
    pub(crate) word_wrap: bool,
    pub(crate) dark_theme: bool,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            word_wrap: false,
            dark_theme: true,
        }
    }
}

struct StatusMessage {
    text: String,
    expires_at: Instant,
}

pub(crate) struct EditorApp {
    editor: VirtualEditor,
    settings: EditorSettings,
    font: egui::FontId,
    layout_ppp: Option<f32>,
    pointer_captured: bool,
    status: Option<StatusMessage>,
    title_dirty: bool,
}

impl EditorApp {
    /// Build the app, opening `path` when given.
    ///
    /// # Errors
    /// Fails when the edit worker cannot start or the file cannot be read.
    pub(crate) fn new(config: EditorConfig, path: Option<&Path>) -> EditorResult<Self> {
        let settings = EditorSettings {
            word_wrap: config.word_wrap,
            ..EditorSettings::default()
        };
        // Placeholder metrics until the first frame provides real fonts.
        let mut editor = VirtualEditor::new(config, Box::new(MonospaceLayout::default()))?;
        if let Some(path) = path {
            editor.load_file(path)?;
            info!(path = %path.display(), "opened file");
        }
        editor.set_word_wrap(settings.word_wrap);
        Ok(Self {
            editor,
            settings,
            font: egui::FontId::monospace(EDITOR_FONT_SIZE),
            layout_ppp: None,
            pointer_captured: false,
            status: None,
            title_dirty: true,
        })
    }

    /// Apply persisted settings, if any.
    pub(crate) fn restore(&mut self, storage: Option<&dyn eframe::Storage>) {
        if let Some(settings) =
            storage.and_then(|storage| eframe::get_value::<EditorSettings>(storage, SETTINGS_KEY))
        {
            self.settings = settings;
            self.editor.set_word_wrap(settings.word_wrap);
        }
    }

    fn theme(&self) -> RenderTheme {
        if self.settings.dark_theme {
            RenderTheme::dark()
        } else {
            RenderTheme::light()
        }
    }

    fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            expires_at: Instant::now() + STATUS_TTL,
        });
    }

    pub(crate) fn window_title(&self) -> String {
        let name = self
            .editor
            .buffer()
            .file_path()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled".to_string());
        let marker = if self.editor.is_modified() { "*" } else { "" };
        format!("{}{} - {}", name, marker, APP_NAME)
    }

    fn sync_layout(&mut self, ctx: &egui::Context) {
        let ppp = ctx.pixels_per_point();
        if self.layout_ppp == Some(ppp) {
            return;
        }
        self.layout_ppp = Some(ppp);
        let layout = EguiTextLayout::new(ctx, self.font.clone());
        self.editor.set_layout(Box::new(layout));
    }

    pub(crate) fn save_document(&mut self) {
        match self.editor.save(None) {
            Ok(path) => self.set_status(format!("Saved {}", path.display())),
            Err(EditorError::NoFilePath) => {
                self.set_status("No file to save to; pass a path on the command line")
            }
            Err(err) => {
                error!(error = %err, "save failed");
                self.set_status(format!("Save failed: {}", err));
            }
        }
        self.title_dirty = true;
    }

    /// Replace the document with the file at `path`, keeping the current one on failure.
    pub(crate) fn open_path(&mut self, path: &Path) {
        match self.editor.load_file(path) {
            Ok(()) => {
                info!(path = %path.display(), "opened file");
                self.set_status(format!("Opened {}", path.display()));
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "open failed");
                self.set_status(format!("Open failed: {}", err));
            }
        }
        self.title_dirty = true;
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| {
            input
                .raw
                .dropped_files
                .iter()
                .find_map(|file| file.path.clone())
        });
        if let Some(path) = dropped {
            self.open_path(&path);
        }
    }

    pub(crate) fn toggle_word_wrap(&mut self) {
        self.editor.toggle_word_wrap();
        self.settings.word_wrap = self.editor.word_wrap();
    }

    pub(crate) fn load_sample(&mut self) {
        let started = Instant::now();
        self.editor
            .load_lines(generate_test_lines(SAMPLE_LINE_COUNT));
        info!(
            lines = SAMPLE_LINE_COUNT,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded sample document"
        );
        self.set_status(format!("Loaded {} sample lines", SAMPLE_LINE_COUNT));
        self.title_dirty = true;
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let command_shift = egui::Modifiers::COMMAND | egui::Modifiers::SHIFT;
        let (sample, theme, save, wrap) = ctx.input_mut(|input| {
            (
                input.consume_key(command_shift, egui::Key::T),
                input.consume_key(command_shift, egui::Key::D),
                input.consume_key(egui::Modifiers::COMMAND, egui::Key::S),
                input.consume_key(egui::Modifiers::COMMAND, egui::Key::W),
            )
        });
        if sample {
            self.load_sample();
        }
        if theme {
            self.settings.dark_theme = !self.settings.dark_theme;
        }
        if save {
            self.save_document();
        }
        if wrap {
            self.toggle_word_wrap();
        }
    }

    fn render_status_bar(&mut self, ctx: &egui::Context) {
        if self
            .status
            .as_ref()
            .is_some_and(|status| status.expires_at <= Instant::now())
        {
            self.status = None;
        }
        let cursor = self.editor.cursor();
        egui::TopBottomPanel::bottom("status")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(format!("Ln {}, Col {}", cursor.line + 1, cursor.col + 1));
                    ui.separator();
                    ui.label(format!("{} lines", self.editor.buffer().total_lines()));
                    ui.separator();
                    ui.label(if self.editor.word_wrap() {
                        "Wrap"
                    } else {
                        "No wrap"
                    });
                    if self.editor.is_modified() {
                        ui.separator();
                        ui.label(egui::RichText::new("Modified").color(egui::Color32::YELLOW));
                    }
                    if let Some(status) = &self.status {
                        ui.separator();
                        ui.label(&status.text);
                    }
                });
            });
    }

    fn render_editor(&mut self, ui: &mut egui::Ui, now: Instant) {
        let rect = ui.available_rect_before_wrap();
        let id = ui.id().with("vtedit_editor");
        let response = ui.interact(rect, id, egui::Sense::click_and_drag());
        if response.hovered() {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Text);
        }
        if response.clicked() || response.drag_started() {
            response.request_focus();
        }
        let focused = response.has_focus();
        if focused {
            ui.memory_mut(|memory| {
                memory.set_focus_lock_filter(
                    id,
                    egui::EventFilter {
                        tab: true,
                        horizontal_arrows: true,
                        vertical_arrows: true,
                        escape: true,
                    },
                )
            });
        }

        self.editor.resize(rect.width(), rect.height());

        let (events, sample, wheel) = ui.input(|input| {
            (
                input.events.clone(),
                PointerSample {
                    pressed: input.pointer.primary_pressed(),
                    down: input.pointer.primary_down(),
                    released: input.pointer.primary_released(),
                    hovered: response.hovered(),
                    shift: input.modifiers.shift,
                    pos: input.pointer.interact_pos().map(|pos| pos - rect.min),
                },
                input.raw_scroll_delta,
            )
        });
        let mut commands = input::commands_from_events(&events, focused);
        commands.extend(input::pointer_commands(sample, &mut self.pointer_captured));
        if response.hovered() {
            commands.extend(input::scroll_command(wheel));
        }
        if !commands.is_empty() {
            let result = self.editor.apply_commands(&commands, now);
            if result.changed {
                self.title_dirty = true;
            }
        }
        self.editor.poll_worker();

        let frame = self.editor.render_frame(now);
        paint::paint_frame(ui.painter(), rect, &frame, &self.theme(), &self.font);

        if focused {
            let caret = frame
                .caret
                .map(|caret| {
                    egui::Rect::from_min_size(
                        rect.min + egui::vec2(caret.x, caret.y),
                        egui::vec2(1.0, caret.height),
                    )
                })
                .unwrap_or(rect);
            ui.ctx().output_mut(|output| {
                output.ime = Some(egui::output::IMEOutput {
                    rect,
                    cursor_rect: caret,
                });
            });
        }
    }

    fn drain_editor_events(&mut self, ctx: &egui::Context) {
        for event in self.editor.take_events() {
            match event {
                EditorEvent::ClipboardText { text, cut } => {
                    debug!(chars = text.chars().count(), cut, "clipboard updated");
                    ctx.copy_text(text);
                }
                EditorEvent::ModifiedChanged(_) => self.title_dirty = true,
                EditorEvent::BufferChanged | EditorEvent::ScrollChanged { .. } => {}
            }
        }
        if self.title_dirty {
            self.title_dirty = false;
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(self.window_title()));
        }
    }

    /// One UI pass; split from [`eframe::App::update`] so tests can drive it
    /// with a bare context.
    pub(crate) fn run_frame(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        self.sync_layout(ctx);
        self.handle_shortcuts(ctx);
        self.handle_dropped_files(ctx);
        self.render_status_bar(ctx);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.render_editor(ui, now));
        self.drain_editor_events(ctx);

        let mut repaint_after = self.editor.until_blink_toggle(now);
        if self.editor.paste_in_flight() {
            repaint_after = repaint_after.min(WORKER_POLL_INTERVAL);
        }
        if let Some(status) = &self.status {
            repaint_after = repaint_after.min(status.expires_at.saturating_duration_since(now));
        }
        ctx.request_repaint_after(repaint_after.max(Duration::from_millis(1)));
    }
}

impl eframe::App for EditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.run_frame(ctx);
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, SETTINGS_KEY, &self.settings);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn app_with_file(contents: &str) -> (TempDir, EditorApp) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, contents).expect("write fixture");
        let app = EditorApp::new(EditorConfig::default(), Some(&path)).expect("app");
        (dir, app)
    }

    #[test]
    fn opens_file_and_titles_window() {
        let (_dir, app) = app_with_file("one\ntwo\nthree");
        assert_eq!(app.editor.buffer().total_lines(), 3);
        assert_eq!(app.window_title(), "notes.txt - vtedit");
    }

    #[test]
    fn save_clears_modified_marker() {
        let (dir, mut app) = app_with_file("one");
        app.editor.insert_text("X");
        assert_eq!(app.window_title(), "notes.txt* - vtedit");
        app.save_document();
        assert_eq!(app.window_title(), "notes.txt - vtedit");
        let saved = std::fs::read_to_string(dir.path().join("notes.txt")).expect("read back");
        assert_eq!(saved, "Xone");
    }

    #[test]
    fn failed_open_keeps_current_document() {
        let (dir, mut app) = app_with_file("keep me");
        app.open_path(&dir.path().join("absent.txt"));
        assert_eq!(app.editor.buffer().get_line(0), "keep me");
        let status = app.status.as_ref().map(|status| status.text.as_str());
        assert!(status.is_some_and(|text| text.starts_with("Open failed")));
    }

    #[test]
    fn save_without_path_reports_status() {
        let mut app = EditorApp::new(EditorConfig::default(), None).expect("app");
        app.save_document();
        let status = app.status.as_ref().map(|status| status.text.as_str());
        assert!(status.is_some_and(|text| text.starts_with("No file")));
    }

    #[test]
    fn wrap_toggle_updates_persisted_settings() {
        let mut app = EditorApp::new(EditorConfig::default(), None).expect("app");
        assert!(!app.settings.word_wrap);
        app.toggle_word_wrap();
        assert!(app.settings.word_wrap);
        assert!(app.editor.word_wrap());
    }

    #[test]
    fn frame_runs_headless_and_sizes_viewport() {
        let (_dir, mut app) = app_with_file("alpha\nbeta");
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(800.0, 600.0),
            )),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| app.run_frame(ctx));
        assert!(app.editor.viewport().width() > 0.0);
        assert!(app.editor.viewport().height() > 0.0);
        assert!(app.layout_ppp.is_some());
    }
}
