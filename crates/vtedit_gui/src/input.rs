//! Translate egui events into editor commands.

use eframe::egui;
use vtedit_core::EditorCommand;

/// Wheel travel egui reports for one notch, in points.
pub(crate) const WHEEL_POINTS_PER_NOTCH: f32 = 50.0;

fn word_modifier(modifiers: egui::Modifiers) -> bool {
    modifiers.ctrl || modifiers.alt
}

/// Convert keyboard, clipboard, and IME events into editor commands.
///
/// Copy and cut arrive as dedicated `Copy`/`Cut` events, so their key
/// chords are not mapped again here.
pub(crate) fn commands_from_events(events: &[egui::Event], focused: bool) -> Vec<EditorCommand> {
    if !focused {
        return Vec::new();
    }
    let mut out = Vec::new();
    for event in events {
        match event {
            egui::Event::Text(text) => {
                if !text.is_empty() {
                    out.push(EditorCommand::InsertText(text.clone()));
                }
            }
            egui::Event::Paste(text) => out.push(EditorCommand::Paste(text.clone())),
            egui::Event::Copy => out.push(EditorCommand::Copy),
            egui::Event::Cut => out.push(EditorCommand::Cut),
            egui::Event::Ime(ime) => match ime {
                egui::ImeEvent::Enabled => {}
                egui::ImeEvent::Preedit(text) => out.push(EditorCommand::ImePreedit(text.clone())),
                egui::ImeEvent::Commit(text) => out.push(EditorCommand::ImeCommit(text.clone())),
                egui::ImeEvent::Disabled => out.push(EditorCommand::ImeDisabled),
            },
            egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => {
                let select = modifiers.shift;
                if modifiers.command {
                    match key {
                        egui::Key::A => out.push(EditorCommand::SelectAll),
                        egui::Key::Z if modifiers.shift => out.push(EditorCommand::Redo),
                        egui::Key::Z => out.push(EditorCommand::Undo),
                        egui::Key::Y => out.push(EditorCommand::Redo),
                        egui::Key::Home => out.push(EditorCommand::DocumentStart { select }),
                        egui::Key::End => out.push(EditorCommand::DocumentEnd { select }),
                        egui::Key::ArrowLeft => out.push(EditorCommand::MoveLeft {
                            select,
                            word: true,
                        }),
                        egui::Key::ArrowRight => out.push(EditorCommand::MoveRight {
                            select,
                            word: true,
                        }),
                        _ => {}
                    }
                    continue;
                }
                match key {
                    egui::Key::ArrowLeft => out.push(EditorCommand::MoveLeft {
                        select,
                        word: word_modifier(*modifiers),
                    }),
                    egui::Key::ArrowRight => out.push(EditorCommand::MoveRight {
                        select,
                        word: word_modifier(*modifiers),
                    }),
                    egui::Key::ArrowUp => out.push(EditorCommand::MoveUp { select }),
                    egui::Key::ArrowDown => out.push(EditorCommand::MoveDown { select }),
                    egui::Key::Home => out.push(EditorCommand::MoveHome { select }),
                    egui::Key::End => out.push(EditorCommand::MoveEnd { select }),
                    egui::Key::PageUp => out.push(EditorCommand::PageUp { select }),
                    egui::Key::PageDown => out.push(EditorCommand::PageDown { select }),
                    egui::Key::Backspace => out.push(EditorCommand::Backspace),
                    egui::Key::Delete => out.push(EditorCommand::DeleteForward),
                    egui::Key::Enter => out.push(EditorCommand::InsertNewline),
                    egui::Key::Tab if modifiers.shift => out.push(EditorCommand::Outdent),
                    egui::Key::Tab => out.push(EditorCommand::Indent),
                    egui::Key::Escape => out.push(EditorCommand::Escape),
                    _ => {}
                }
            }
            _ => {}
        }
    }
    out
}

/// Primary-button state sampled once per frame.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct PointerSample {
    pub(crate) pressed: bool,
    pub(crate) down: bool,
    pub(crate) released: bool,
    pub(crate) hovered: bool,
    pub(crate) shift: bool,
    /// Pointer position relative to the editor rect.
    pub(crate) pos: Option<egui::Vec2>,
}

/// Turn a pointer sample into press/drag/release commands.
///
/// `captured` tracks whether a press started inside the editor, so drags
/// and the release keep flowing after the pointer leaves it.
pub(crate) fn pointer_commands(sample: PointerSample, captured: &mut bool) -> Vec<EditorCommand> {
    let mut out = Vec::new();
    let Some(pos) = sample.pos else {
        return out;
    };
    let (x, y) = (pos.x, pos.y);
    if sample.pressed && sample.hovered {
        *captured = true;
        out.push(EditorCommand::PointerPress {
            x,
            y,
            shift: sample.shift,
        });
    } else if sample.down && *captured {
        out.push(EditorCommand::PointerDrag { x, y });
    }
    if sample.released && *captured {
        *captured = false;
        out.push(EditorCommand::PointerRelease { x, y });
    }
    out
}

/// Wheel delta in points to an editor scroll command in notches.
pub(crate) fn scroll_command(delta: egui::Vec2) -> Option<EditorCommand> {
    if delta == egui::Vec2::ZERO {
        return None;
    }
    Some(EditorCommand::Scroll {
        dx: -delta.x / WHEEL_POINTS_PER_NOTCH,
        dy: -delta.y / WHEEL_POINTS_PER_NOTCH,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(key: egui::Key, modifiers: egui::Modifiers) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    #[test]
    fn maps_command_shortcuts() {
        let command = egui::Modifiers {
            command: true,
            ..Default::default()
        };
        let redo = egui::Modifiers {
            command: true,
            shift: true,
            ..Default::default()
        };
        let events = vec![
            key(egui::Key::A, command),
            key(egui::Key::Z, command),
            key(egui::Key::Z, redo),
            key(egui::Key::End, command),
            key(egui::Key::C, command),
        ];
        assert_eq!(
            commands_from_events(&events, true),
            vec![
                EditorCommand::SelectAll,
                EditorCommand::Undo,
                EditorCommand::Redo,
                EditorCommand::DocumentEnd { select: false },
            ]
        );
    }

    #[test]
    fn maps_navigation_and_editing_keys() {
        let shift = egui::Modifiers {
            shift: true,
            ..Default::default()
        };
        let alt = egui::Modifiers {
            alt: true,
            ..Default::default()
        };
        let events = vec![
            key(egui::Key::ArrowLeft, alt),
            key(egui::Key::ArrowDown, shift),
            key(egui::Key::Tab, shift),
            key(egui::Key::Tab, egui::Modifiers::NONE),
            key(egui::Key::Enter, egui::Modifiers::NONE),
            egui::Event::Text("x".to_string()),
            egui::Event::Text(String::new()),
        ];
        assert_eq!(
            commands_from_events(&events, true),
            vec![
                EditorCommand::MoveLeft {
                    select: false,
                    word: true
                },
                EditorCommand::MoveDown { select: true },
                EditorCommand::Outdent,
                EditorCommand::Indent,
                EditorCommand::InsertNewline,
                EditorCommand::InsertText("x".to_string()),
            ]
        );
    }

    #[test]
    fn maps_ime_and_clipboard_events() {
        let events = vec![
            egui::Event::Ime(egui::ImeEvent::Enabled),
            egui::Event::Ime(egui::ImeEvent::Preedit("に".to_string())),
            egui::Event::Ime(egui::ImeEvent::Commit("日".to_string())),
            egui::Event::Ime(egui::ImeEvent::Disabled),
            egui::Event::Copy,
            egui::Event::Cut,
            egui::Event::Paste("p".to_string()),
        ];
        assert_eq!(
            commands_from_events(&events, true),
            vec![
                EditorCommand::ImePreedit("に".to_string()),
                EditorCommand::ImeCommit("日".to_string()),
                EditorCommand::ImeDisabled,
                EditorCommand::Copy,
                EditorCommand::Cut,
                EditorCommand::Paste("p".to_string()),
            ]
        );
    }

    #[test]
    fn unfocused_editor_ignores_input() {
        let events = vec![egui::Event::Text("x".to_string())];
        assert!(commands_from_events(&events, false).is_empty());
    }

    #[test]
    fn pointer_capture_spans_press_to_release() {
        let mut captured = false;
        let at = Some(egui::vec2(12.0, 30.0));
        let outside_press = PointerSample {
            pressed: true,
            down: true,
            pos: at,
            ..Default::default()
        };
        assert!(pointer_commands(outside_press, &mut captured).is_empty());

        let press = PointerSample {
            hovered: true,
            ..outside_press
        };
        assert_eq!(
            pointer_commands(press, &mut captured),
            vec![EditorCommand::PointerPress {
                x: 12.0,
                y: 30.0,
                shift: false
            }]
        );
        let drag = PointerSample {
            down: true,
            pos: Some(egui::vec2(-5.0, 90.0)),
            ..Default::default()
        };
        assert_eq!(
            pointer_commands(drag, &mut captured),
            vec![EditorCommand::PointerDrag { x: -5.0, y: 90.0 }]
        );
        let release = PointerSample {
            released: true,
            pos: Some(egui::vec2(-5.0, 90.0)),
            ..Default::default()
        };
        assert_eq!(
            pointer_commands(release, &mut captured),
            vec![EditorCommand::PointerRelease { x: -5.0, y: 90.0 }]
        );
        assert!(!captured);
    }

    #[test]
    fn wheel_points_become_notches() {
        assert_eq!(scroll_command(egui::Vec2::ZERO), None);
        assert_eq!(
            scroll_command(egui::vec2(0.0, -100.0)),
            Some(EditorCommand::Scroll { dx: -0.0, dy: 2.0 })
        );
    }
}
