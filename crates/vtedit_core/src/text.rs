//! Char-indexed string helpers shared by the editing and layout layers.
//!
//! Columns throughout the crate count Unicode scalar values, never bytes.

use std::ops::Range;
use unicode_segmentation::UnicodeSegmentation;

/// Number of chars in `text`.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of char column `col`, clamped to the end of `text`.
pub fn byte_offset(text: &str, col: usize) -> usize {
    text.char_indices()
        .nth(col)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

/// Char column of byte offset `byte`, rounding down to a char boundary.
pub fn char_col(text: &str, byte: usize) -> usize {
    let mut byte = byte.min(text.len());
    while !text.is_char_boundary(byte) {
        byte -= 1;
    }
    text[..byte].chars().count()
}

/// Borrow the chars in `range` (clamped).
pub fn slice_chars(text: &str, range: Range<usize>) -> &str {
    let start = byte_offset(text, range.start);
    let end = byte_offset(text, range.end.max(range.start));
    &text[start..end]
}

/// Replace the chars in `range` (clamped) with `replacement`.
pub fn splice_chars(text: &str, range: Range<usize>, replacement: &str) -> String {
    let start = byte_offset(text, range.start);
    let end = byte_offset(text, range.end.max(range.start));
    let mut out = String::with_capacity(text.len() - (end - start) + replacement.len());
    out.push_str(&text[..start]);
    out.push_str(replacement);
    out.push_str(&text[end..]);
    out
}

/// Split `text` at char column `col` into owned prefix/suffix.
pub fn split_at_col(text: &str, col: usize) -> (String, String) {
    let at = byte_offset(text, col);
    (text[..at].to_string(), text[at..].to_string())
}

/// Column of the grapheme boundary before `col`.
pub fn prev_grapheme_col(text: &str, col: usize) -> usize {
    let target = byte_offset(text, col);
    let mut previous = 0;
    for (offset, _) in text.grapheme_indices(true) {
        if offset >= target {
            break;
        }
        previous = offset;
    }
    char_col(text, previous)
}

/// Column of the grapheme boundary after `col`.
pub fn next_grapheme_col(text: &str, col: usize) -> usize {
    let target = byte_offset(text, col);
    text.grapheme_indices(true)
        .map(|(offset, grapheme)| offset + grapheme.len())
        .find(|end| *end > target)
        .map(|end| char_col(text, end))
        .unwrap_or_else(|| char_len(text))
}

/// Returns whether a character belongs to a word run.
pub fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric()
}

fn is_punct_char(ch: char) -> bool {
    !ch.is_alphanumeric() && !ch.is_whitespace()
}

/// Start of the word run ending at or before `col`.
///
/// Skips whitespace leftwards, then consumes one alphanumeric run or one
/// punctuation run.
pub fn word_boundary_left(text: &str, col: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = col.min(chars.len());
    while pos > 0 && chars[pos - 1].is_whitespace() {
        pos -= 1;
    }
    if pos == 0 {
        return 0;
    }
    let class: fn(char) -> bool = if is_word_char(chars[pos - 1]) {
        is_word_char
    } else {
        is_punct_char
    };
    while pos > 0 && class(chars[pos - 1]) {
        pos -= 1;
    }
    pos
}

/// End of the word run starting at or after `col`.
pub fn word_boundary_right(text: &str, col: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len();
    let mut pos = col.min(len);
    while pos < len && chars[pos].is_whitespace() {
        pos += 1;
    }
    if pos == len {
        return len;
    }
    let class: fn(char) -> bool = if is_word_char(chars[pos]) {
        is_word_char
    } else {
        is_punct_char
    };
    while pos < len && class(chars[pos]) {
        pos += 1;
    }
    pos
}

/// Range selected by a double-click at `col`.
///
/// Selects the whitespace, alphanumeric, or punctuation run containing the
/// char under `col` (the last char when `col` is at the line end).
pub fn word_range_at(text: &str, col: usize) -> Range<usize> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return 0..0;
    }
    let probe = col.min(chars.len() - 1);
    let class: fn(char) -> bool = if chars[probe].is_whitespace() {
        char::is_whitespace
    } else if is_word_char(chars[probe]) {
        is_word_char
    } else {
        is_punct_char
    };
    let mut start = probe;
    while start > 0 && class(chars[start - 1]) {
        start -= 1;
    }
    let mut end = probe + 1;
    while end < chars.len() && class(chars[end]) {
        end += 1;
    }
    start..end
}
