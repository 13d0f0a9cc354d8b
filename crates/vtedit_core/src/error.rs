//! Error types for the line store, edit engine, and background worker.
use thiserror::Error;

/// Top-level editor error type.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("invalid range for multi_replace: start {start}, count {count}, total lines {total}")]
    OutOfRange {
        start: usize,
        count: usize,
        total: usize,
    },

    #[error("replacement line {index} contains a line break")]
    EmbeddedLineBreak { index: usize },

    #[error("no file path provided and buffer has no associated file")]
    NoFilePath,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background worker is unavailable")]
    WorkerUnavailable,
}

/// Result alias used across the core crate.
pub type EditorResult<T> = Result<T, EditorError>;
