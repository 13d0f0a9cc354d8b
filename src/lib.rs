//! Root crate facade for the vtedit engine.

pub use vtedit_core::*;
