//! Text measurement backed by egui's font system.

use eframe::egui;
use vtedit_core::TextLayout;

/// [`TextLayout`] that shapes with the context's fonts.
///
/// Metrics are captured once at construction; rebuild the layout when the
/// font or pixels-per-point change.
pub(crate) struct EguiTextLayout {
    ctx: egui::Context,
    font: egui::FontId,
    line_height: f32,
    char_width: f32,
}

impl EguiTextLayout {
    pub(crate) fn new(ctx: &egui::Context, font: egui::FontId) -> Self {
        let (line_height, char_width) = ctx.fonts_mut(|fonts| {
            let char_width = fonts
                .layout_no_wrap("W".to_owned(), font.clone(), egui::Color32::WHITE)
                .size()
                .x;
            (fonts.row_height(&font), char_width)
        });
        Self {
            ctx: ctx.clone(),
            font,
            line_height: line_height.max(1.0),
            char_width: char_width.max(1.0),
        }
    }

    fn galley(&self, text: &str) -> std::sync::Arc<egui::Galley> {
        self.ctx.fonts_mut(|fonts| {
            fonts.layout_no_wrap(text.to_owned(), self.font.clone(), egui::Color32::WHITE)
        })
    }
}

impl TextLayout for EguiTextLayout {
    fn text_width(&self, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        self.galley(text).size().x
    }

    fn hit_test(&self, text: &str, x: f32) -> usize {
        if text.is_empty() || x <= 0.0 {
            return 0;
        }
        self.galley(text)
            .cursor_from_pos(egui::vec2(x, self.line_height / 2.0))
            .index
    }

    fn line_height(&self) -> f32 {
        self.line_height
    }

    fn char_width(&self) -> f32 {
        self.char_width
    }
}
