//! Stroke a [`RenderFrame`] with an egui painter.

use eframe::egui;
use vtedit_core::render::Rgba;
use vtedit_core::{RenderFrame, RenderTheme};

const CARET_WIDTH: f32 = 2.0;
const LINE_NUMBER_INSET: f32 = 5.0;
const PREEDIT_UNDERLINE: f32 = 1.0;

pub(crate) fn color(rgba: Rgba) -> egui::Color32 {
    egui::Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// Paint one frame into `rect`. Colors come from `theme` on every call.
pub(crate) fn paint_frame(
    painter: &egui::Painter,
    rect: egui::Rect,
    frame: &RenderFrame,
    theme: &RenderTheme,
    font: &egui::FontId,
) {
    painter.rect_filled(rect, 0.0, color(theme.background));

    let text_clip = egui::Rect::from_min_max(
        egui::pos2(rect.min.x + frame.gutter_width, rect.min.y),
        rect.max,
    );
    let text_painter = painter.with_clip_rect(text_clip.intersect(painter.clip_rect()));
    let origin_x = rect.min.x + frame.text_origin_x;

    for row in &frame.rows {
        let top = rect.min.y + row.y;
        if let Some((x0, x1)) = row.selection {
            text_painter.rect_filled(
                egui::Rect::from_min_max(
                    egui::pos2(origin_x + x0, top),
                    egui::pos2(origin_x + x1, top + frame.line_height),
                ),
                0.0,
                color(theme.selection),
            );
        }
        if !row.text.is_empty() {
            text_painter.text(
                egui::pos2(origin_x, top),
                egui::Align2::LEFT_TOP,
                &row.text,
                font.clone(),
                color(theme.text),
            );
        }
    }

    if let Some(preedit) = &frame.preedit {
        let at = egui::pos2(rect.min.x + preedit.x, rect.min.y + preedit.y);
        let drawn = text_painter.text(
            at,
            egui::Align2::LEFT_TOP,
            &preedit.text,
            font.clone(),
            color(theme.text),
        );
        let baseline = drawn.max.y;
        text_painter.line_segment(
            [
                egui::pos2(drawn.min.x, baseline),
                egui::pos2(drawn.max.x, baseline),
            ],
            egui::Stroke::new(PREEDIT_UNDERLINE, color(theme.preedit_underline)),
        );
    }

    if let Some(caret) = &frame.caret {
        text_painter.rect_filled(
            egui::Rect::from_min_size(
                egui::pos2(rect.min.x + caret.x, rect.min.y + caret.y),
                egui::vec2(CARET_WIDTH, caret.height),
            ),
            0.0,
            color(theme.caret),
        );
    }

    let gutter = egui::Rect::from_min_max(
        rect.min,
        egui::pos2(rect.min.x + frame.gutter_width, rect.max.y),
    );
    painter.rect_filled(gutter, 0.0, color(theme.gutter_background));
    for row in &frame.rows {
        if let Some(number) = &row.line_number {
            painter.text(
                egui::pos2(gutter.max.x - LINE_NUMBER_INSET, rect.min.y + row.y),
                egui::Align2::RIGHT_TOP,
                number,
                font.clone(),
                color(theme.line_number),
            );
        }
    }
}
