//! Background worker for bulk paste splitting and clipboard serialization.
//!
//! The worker never touches the buffer. It receives owned inputs (line text,
//! rope snapshots) and replies with owned results that the interaction loop
//! validates and applies.

use crate::error::EditorResult;
use crate::text::{char_len, split_at_col};
use crossbeam_channel::{unbounded, Receiver, Sender};
use ropey::Rope;
use std::ops::Range;
use std::thread;
use tracing::debug;

/// Work handed to the background thread.
#[derive(Debug)]
pub enum WorkerRequest {
    /// Split multi-line `text` into the line at `line`, inserting at `col`.
    Paste {
        generation: u64,
        line: usize,
        line_text: String,
        col: usize,
        text: String,
    },
    /// Serialize a char range of a document snapshot for the clipboard.
    Copy {
        snapshot: Rope,
        range: Range<usize>,
        cut: bool,
    },
}

/// Results produced by the background thread.
#[derive(Debug)]
pub enum WorkerEvent {
    PasteReady {
        generation: u64,
        line: usize,
        /// Line text the plan was computed against.
        original_text: String,
        plan: PastePlan,
    },
    ClipboardReady {
        text: String,
        cut: bool,
    },
}

/// Replacement lines for one target line plus the caret after applying them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PastePlan {
    pub lines: Vec<String>,
    /// Caret line relative to the target line.
    pub cursor_line_offset: usize,
    pub cursor_col: usize,
}

/// Split `text` into `line_text` at char column `col`.
///
/// The first line keeps the prefix, the last line keeps the suffix, and
/// interior pasted lines go between. `\r\n` is treated as one break.
pub fn plan_paste(line_text: &str, col: usize, text: &str) -> PastePlan {
    let normalized = text.replace("\r\n", "\n");
    let segments: Vec<&str> = normalized.split('\n').collect();
    let (before, after) = split_at_col(line_text, col);

    if segments.len() == 1 {
        let cursor_col = char_len(&before) + char_len(segments[0]);
        return PastePlan {
            lines: vec![format!("{}{}{}", before, segments[0], after)],
            cursor_line_offset: 0,
            cursor_col,
        };
    }

    let last_index = segments.len() - 1;
    let mut lines = Vec::with_capacity(segments.len());
    lines.push(format!("{}{}", before, segments[0]));
    lines.extend(segments[1..last_index].iter().map(|segment| segment.to_string()));
    lines.push(format!("{}{}", segments[last_index], after));
    PastePlan {
        lines,
        cursor_line_offset: last_index,
        cursor_col: char_len(segments[last_index]),
    }
}

/// Compute the reply for one request. Runs on the worker thread, or inline
/// when no worker is available.
pub fn handle_request(request: WorkerRequest) -> WorkerEvent {
    match request {
        WorkerRequest::Paste {
            generation,
            line,
            line_text,
            col,
            text,
        } => {
            let plan = plan_paste(&line_text, col, &text);
            debug!(
                target: "vtedit_core::worker",
                line,
                lines = plan.lines.len(),
                "paste plan ready"
            );
            WorkerEvent::PasteReady {
                generation,
                line,
                original_text: line_text,
                plan,
            }
        }
        WorkerRequest::Copy {
            snapshot,
            range,
            cut,
        } => {
            let end = range.end.min(snapshot.len_chars());
            let start = range.start.min(end);
            WorkerEvent::ClipboardReady {
                text: snapshot.slice(start..end).to_string(),
                cut,
            }
        }
    }
}

/// Handle for sending requests to, and receiving events from, the worker.
pub struct WorkerHandle {
    pub req_tx: Sender<WorkerRequest>,
    pub evt_rx: Receiver<WorkerEvent>,
}

/// Spawn the named worker thread. It exits when the handle is dropped.
///
/// # Errors
/// Returns [`crate::EditorError::Io`] if the thread cannot be spawned.
pub fn spawn_edit_worker(name: &str) -> EditorResult<WorkerHandle> {
    let (req_tx, req_rx) = unbounded::<WorkerRequest>();
    let (evt_tx, evt_rx) = unbounded::<WorkerEvent>();

    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            debug!(target: "vtedit_core::worker", "edit worker started");
            for request in req_rx.iter() {
                let event = handle_request(request);
                if evt_tx.send(event).is_err() {
                    break;
                }
            }
            debug!(target: "vtedit_core::worker", "edit worker stopped");
        })?;

    Ok(WorkerHandle { req_tx, evt_rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn recv_event(rx: &Receiver<WorkerEvent>) -> WorkerEvent {
        rx.recv_timeout(Duration::from_secs(2))
            .expect("expected worker event")
    }

    #[test]
    fn plan_splits_around_cursor() {
        struct Case {
            name: &'static str,
            line: &'static str,
            col: usize,
            text: &'static str,
            lines: &'static [&'static str],
            cursor: (usize, usize),
        }

        let cases = [
            Case {
                name: "single segment",
                line: "abcd",
                col: 2,
                text: "XY",
                lines: &["abXYcd"],
                cursor: (0, 4),
            },
            Case {
                name: "two segments",
                line: "abcd",
                col: 2,
                text: "X\nYZ",
                lines: &["abX", "YZcd"],
                cursor: (1, 2),
            },
            Case {
                name: "interior lines and crlf",
                line: "",
                col: 0,
                text: "1\r\n2\r\n3\r\n",
                lines: &["1", "2", "3", ""],
                cursor: (3, 0),
            },
            Case {
                name: "unicode columns",
                line: "héllo",
                col: 2,
                text: "\n",
                lines: &["hé", "llo"],
                cursor: (1, 0),
            },
        ];

        for case in cases {
            let plan = plan_paste(case.line, case.col, case.text);
            let expected: Vec<String> = case.lines.iter().map(|l| l.to_string()).collect();
            assert_eq!(plan.lines, expected, "case: {}", case.name);
            assert_eq!(
                (plan.cursor_line_offset, plan.cursor_col),
                case.cursor,
                "case: {}",
                case.name
            );
        }
    }

    #[test]
    fn worker_replies_to_paste_and_copy() {
        let worker = spawn_edit_worker("vtedit-test-worker").expect("spawn worker");
        worker
            .req_tx
            .send(WorkerRequest::Paste {
                generation: 7,
                line: 3,
                line_text: "ab".to_string(),
                col: 1,
                text: "x\ny".to_string(),
            })
            .expect("send paste");
        match recv_event(&worker.evt_rx) {
            WorkerEvent::PasteReady {
                generation,
                line,
                original_text,
                plan,
            } => {
                assert_eq!((generation, line), (7, 3));
                assert_eq!(original_text, "ab");
                assert_eq!(plan.lines, vec!["ax".to_string(), "yb".to_string()]);
            }
            other => panic!("unexpected event: {:?}", other),
        }

        worker
            .req_tx
            .send(WorkerRequest::Copy {
                snapshot: Rope::from_str("foo\nbar"),
                range: 1..6,
                cut: true,
            })
            .expect("send copy");
        match recv_event(&worker.evt_rx) {
            WorkerEvent::ClipboardReady { text, cut } => {
                assert_eq!(text, "oo\nba");
                assert!(cut);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
