//! End-to-end editing workflows against the public engine API.

use std::time::{Duration, Instant};
use tempfile::TempDir;
use vtedit_core::layout::{wrap_line, WrapSegment};
use vtedit_core::{
    EditorCommand, EditorConfig, EditorError, EditorEvent, LineBuffer, MonospaceLayout,
    TextPosition, VirtualEditor,
};

fn headless(lines: &[&str]) -> VirtualEditor {
    let mut editor = VirtualEditor::without_worker(
        EditorConfig::default(),
        Box::new(MonospaceLayout::new(8.0, 16.0)),
    );
    editor.resize(640.0, 320.0);
    editor.load_lines(lines.iter().copied());
    editor
}

fn threaded(lines: &[&str]) -> VirtualEditor {
    let mut editor = VirtualEditor::new(
        EditorConfig::default(),
        Box::new(MonospaceLayout::new(8.0, 16.0)),
    )
    .expect("spawn editor worker");
    editor.resize(640.0, 320.0);
    editor.load_lines(lines.iter().copied());
    editor
}

fn contents(editor: &VirtualEditor) -> Vec<String> {
    editor.buffer().get_range(0, editor.buffer().total_lines())
}

#[test]
fn insert_text_inside_line() {
    let mut editor = headless(&["abc"]);
    editor.set_cursor(TextPosition::new(0, 1));
    assert!(editor.insert_text("X"));
    assert_eq!(editor.buffer().get_line(0), "aXbc");
}

#[test]
fn newline_at_line_end() {
    let mut editor = headless(&["hello", "world"]);
    editor.set_cursor(TextPosition::new(0, 5));
    assert!(editor.insert_newline());
    assert_eq!(contents(&editor), vec!["hello", "", "world"]);
    assert_eq!(editor.cursor(), TextPosition::new(1, 0));
}

#[test]
fn delete_multi_line_selection_is_one_step() {
    let mut editor = headless(&["foo", "bar"]);
    editor.select(TextPosition::new(0, 1), TextPosition::new(1, 2));
    assert!(editor.delete_selection());
    assert_eq!(contents(&editor), vec!["fr"]);
    assert_eq!(editor.cursor(), TextPosition::new(0, 1));
    assert_eq!(editor.buffer().history().undo_len(), 1);
    assert!(editor.undo());
    assert_eq!(contents(&editor), vec!["foo", "bar"]);
}

#[test]
fn multi_replace_undo_redo_round_trip() {
    let mut editor = headless(&["line1", "line2", "line3"]);
    editor
        .multi_replace(1, 1, vec!["X".to_string(), "Y".to_string()])
        .expect("replace");
    assert_eq!(contents(&editor), vec!["line1", "X", "Y", "line3"]);
    assert!(editor.undo());
    assert_eq!(contents(&editor), vec!["line1", "line2", "line3"]);
    assert!(editor.redo());
    assert_eq!(contents(&editor), vec!["line1", "X", "Y", "line3"]);
    assert!(editor.undo());
    assert!(editor.buffer().history().can_redo());
    assert!(!editor.undo());
}

#[test]
fn wrap_splits_at_pixel_width() {
    let layout = MonospaceLayout::new(1.0, 1.0);
    assert_eq!(
        wrap_line(&layout, 0, "abcdef", Some(3.0)),
        vec![
            WrapSegment {
                line: 0,
                start_col: 0,
                end_col: 3
            },
            WrapSegment {
                line: 0,
                start_col: 3,
                end_col: 6
            },
        ]
    );
}

#[test]
fn rejected_replacements_leave_state_untouched() {
    let mut editor = headless(&["a", "b"]);
    let revision = editor.buffer().revision();
    match editor.multi_replace(1, 5, vec![]) {
        Err(EditorError::OutOfRange { start, count, total }) => {
            assert_eq!((start, count, total), (1, 5, 2));
        }
        other => panic!("expected out-of-range error, got {:?}", other),
    }
    assert!(matches!(
        editor.multi_replace(0, 1, vec!["x\ny".to_string()]),
        Err(EditorError::EmbeddedLineBreak { index: 0 })
    ));
    assert_eq!(editor.buffer().revision(), revision);
    assert_eq!(contents(&editor), vec!["a", "b"]);
}

#[test]
fn deleting_everything_leaves_one_empty_line() {
    let mut editor = headless(&["a", "b", "c"]);
    editor.multi_replace(0, 3, vec![]).expect("replace");
    assert_eq!(contents(&editor), vec![""]);
    assert_eq!(editor.cursor(), TextPosition::new(0, 0));
}

#[test]
fn caret_stays_visible_and_scroll_is_idempotent() {
    let lines: Vec<String> = (0..500).map(|i| format!("row {}", i)).collect();
    let mut editor = VirtualEditor::without_worker(
        EditorConfig::default(),
        Box::new(MonospaceLayout::new(8.0, 16.0)),
    );
    editor.resize(640.0, 320.0);
    editor.load_lines(lines);

    editor.set_cursor(TextPosition::new(300, 2));
    let scroll = editor.viewport().scroll_y();
    assert!(scroll > 0.0);
    let caret_top = 300.0 * 16.0 - scroll;
    assert!(caret_top >= 0.0 && caret_top + 16.0 <= 320.0);
    assert!(!editor.ensure_cursor_visible());
    assert_eq!(editor.viewport().scroll_y(), scroll);

    editor.move_document_start(false);
    assert_eq!(editor.viewport().scroll_y(), 0.0);
    editor.move_document_end(false);
    assert_eq!(editor.cursor(), TextPosition::new(499, 7));
    assert_eq!(editor.viewport().scroll_y(), 500.0 * 16.0 - 320.0);
}

#[test]
fn long_line_scrolls_horizontally_with_margin() {
    let long = "y".repeat(300);
    let mut editor = headless(&[long.as_str()]);
    editor.move_end(false);
    let scroll_x = editor.viewport().scroll_x();
    assert!(scroll_x > 0.0);
    assert!(editor.set_word_wrap(true));
    assert_eq!(editor.viewport().scroll_x(), 0.0);
    assert!(editor.toggle_word_wrap());
    assert!(!editor.word_wrap());
}

#[test]
fn collapsed_selection_reads_as_none() {
    let mut editor = headless(&["abc"]);
    editor.select(TextPosition::new(0, 2), TextPosition::new(0, 2));
    assert!(editor.selection().is_none());
    editor.select(TextPosition::new(0, 3), TextPosition::new(0, 1));
    let range = editor.selection().expect("selection");
    assert_eq!(range.start, TextPosition::new(0, 1));
    assert_eq!(range.end, TextPosition::new(0, 3));
    assert_eq!(editor.selected_text().as_deref(), Some("bc"));
}

#[test]
fn worker_applies_multi_line_paste() {
    let mut editor = threaded(&["start end"]);
    editor.set_cursor(TextPosition::new(0, 6));
    assert!(editor.paste("one\ntwo\n"));
    assert!(editor.paste_in_flight());
    assert!(!editor.paste("ignored"));
    assert!(editor
        .wait_for_worker(Duration::from_secs(2))
        .expect("worker alive"));
    assert!(!editor.paste_in_flight());
    assert_eq!(contents(&editor), vec!["start one", "two", "end"]);
    assert_eq!(editor.cursor(), TextPosition::new(2, 0));
}

#[test]
fn stale_paste_result_is_discarded() {
    let mut editor = threaded(&["xy"]);
    editor.set_cursor(TextPosition::new(0, 1));
    assert!(editor.insert_text("a\nb"));
    editor.set_cursor(TextPosition::new(0, 2));
    assert!(editor.insert_text("Z"));
    assert!(!editor
        .wait_for_worker(Duration::from_secs(2))
        .expect("worker alive"));
    assert_eq!(contents(&editor), vec!["xyZ"]);
    assert!(!editor.paste_in_flight());
}

#[test]
fn worker_serializes_copy() {
    let mut editor = threaded(&["alpha", "beta"]);
    editor.select_all();
    editor.take_events();
    assert!(editor.copy());
    editor
        .wait_for_worker(Duration::from_secs(2))
        .expect("worker alive");
    let events = editor.take_events();
    assert!(events.contains(&EditorEvent::ClipboardText {
        text: "alpha\nbeta".to_string(),
        cut: false,
    }));
}

#[test]
fn save_and_reload_through_files() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("doc.txt");
    let mut editor = headless(&["first", "second"]);
    assert!(matches!(editor.save(None), Err(EditorError::NoFilePath)));

    editor.set_cursor(TextPosition::new(1, 6));
    editor.insert_text("!");
    assert!(editor.is_modified());
    let saved = editor.save(Some(&path)).expect("save");
    assert_eq!(saved, path);
    assert!(!editor.is_modified());
    assert_eq!(
        std::fs::read_to_string(&path).expect("read back"),
        "first\nsecond!"
    );

    let mut reopened = headless(&[]);
    reopened.load_file(&path).expect("load");
    assert_eq!(contents(&reopened), vec!["first", "second!"]);
    assert_eq!(reopened.buffer().file_path(), Some(path.as_path()));
    assert!(!reopened.buffer().history().can_undo());

    let missing = dir.path().join("missing.txt");
    assert!(matches!(reopened.load_file(&missing), Err(EditorError::Io(_))));
    assert_eq!(contents(&reopened), vec!["first", "second!"]);
}

#[test]
fn failed_save_keeps_modified_flag_and_path() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("kept.txt");
    let mut editor = headless(&["draft"]);
    editor.save(Some(&path)).expect("first save");

    editor.set_cursor(TextPosition::new(0, 5));
    editor.insert_text("!");
    assert!(editor.is_modified());
    let blocked = dir.path().join("a-directory");
    std::fs::create_dir(&blocked).expect("create dir");
    assert!(matches!(editor.save(Some(&blocked)), Err(EditorError::Io(_))));
    assert!(editor.is_modified());
    assert_eq!(editor.buffer().file_path(), Some(path.as_path()));
    assert_eq!(std::fs::read_to_string(&path).expect("read back"), "draft");

    editor.save(None).expect("save to bound path");
    assert!(!editor.is_modified());
    assert_eq!(std::fs::read_to_string(&path).expect("read back"), "draft!");
}

#[test]
fn undo_all_then_redo_all_round_trips_mixed_edits() {
    let original = ["fn main() {", "let x = 1;", "}"];
    let mut editor = headless(&original);

    editor.set_cursor(TextPosition::new(1, 10));
    editor.insert_text(" // one");
    editor.backspace();
    editor.backspace();
    editor.set_cursor(TextPosition::new(0, 0));
    editor.delete_forward();
    editor.set_cursor(TextPosition::new(2, 1));
    editor.insert_text("\nfn helper() {\n}\n");
    editor.select(TextPosition::new(1, 0), TextPosition::new(3, 0));
    editor.indent_selection();
    editor.select_all();
    editor.delete_selection();
    editor.set_cursor(TextPosition::new(0, 0));
    editor.insert_text("rewritten");
    editor.finish_edit();

    let final_text = editor.buffer().text();
    assert_eq!(final_text, "rewritten");
    let mut undone = 0;
    while editor.undo() {
        undone += 1;
    }
    assert!(undone >= 6);
    assert_eq!(contents(&editor), original.to_vec());

    let mut redone = 0;
    while editor.redo() {
        redone += 1;
    }
    assert_eq!(redone, undone);
    assert_eq!(editor.buffer().text(), final_text);
}

#[test]
fn modified_flag_events_follow_save() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("flag.txt");
    let mut editor = headless(&["x"]);
    editor.take_events();
    editor.insert_text("y");
    editor.save(Some(&path)).expect("save");
    let flags: Vec<bool> = editor
        .take_events()
        .into_iter()
        .filter_map(|event| match event {
            EditorEvent::ModifiedChanged(flag) => Some(flag),
            _ => None,
        })
        .collect();
    assert_eq!(flags, vec![true, false]);
}

#[test]
fn command_batches_drive_the_editor() {
    let mut editor = headless(&["    indented", "plain"]);
    let now = Instant::now();
    let result = editor.apply_commands(
        &[
            EditorCommand::DocumentEnd { select: false },
            EditorCommand::MoveHome { select: true },
            EditorCommand::MoveUp { select: true },
            EditorCommand::Outdent,
            EditorCommand::Escape,
        ],
        now,
    );
    assert!(result.changed);
    assert_eq!(contents(&editor), vec!["indented", "plain"]);

    let result = editor.apply_commands(&[EditorCommand::Undo], now);
    assert!(result.changed);
    assert_eq!(contents(&editor), vec!["    indented", "plain"]);
}

#[test]
fn huge_document_renders_only_visible_rows() {
    let buffer_lines = vtedit_core::sample::generate_test_lines(200_000);
    let mut editor = VirtualEditor::without_worker(
        EditorConfig::default(),
        Box::new(MonospaceLayout::new(8.0, 16.0)),
    );
    editor.resize(640.0, 320.0);
    editor.load_lines(buffer_lines);
    editor.set_cursor(TextPosition::new(150_000, 0));
    let frame = editor.render_frame(Instant::now());
    assert!(frame.rows.len() <= 22);
    assert!(frame.rows.iter().any(|row| row.line == 150_000));
    assert_eq!(frame.gutter_width, 6.0 * 8.0 + 10.0);
}

#[test]
fn one_line_scrolls_move_the_top_line_in_an_eight_million_line_document() {
    let mut editor = VirtualEditor::without_worker(
        EditorConfig::default(),
        Box::new(MonospaceLayout::new(8.0, 20.0)),
    );
    editor.resize(640.0, 320.0);
    editor.load_lines(std::iter::repeat("x").take(8_000_000));
    assert!(editor.set_scroll_position(7_000_001.0 * 20.0, 0.0));
    for _ in 0..10 {
        let before = editor.viewport().first_visible_line();
        assert!(editor.scroll_by_lines(1));
        assert_eq!(editor.viewport().first_visible_line(), before + 1);
    }
    let frame = editor.render_frame(Instant::now());
    assert_eq!(frame.rows.first().map(|row| row.line), Some(7_000_011));
}

#[test]
fn line_buffer_is_usable_standalone() {
    let mut buffer = LineBuffer::from_lines(["a", "b"]);
    buffer
        .multi_replace(2, 0, vec!["c".to_string()])
        .expect("append");
    assert_eq!(buffer.text(), "a\nb\nc");
    assert_eq!(buffer.undo().map(|delta| delta.new_count), Some(0));
}
