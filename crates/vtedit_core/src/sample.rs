//! Synthetic document used for scroll and rendering stress tests.

/// Build `count` lines of the section/subsection test document.
///
/// Every 10 000th line is a section header, every 1 000th a subsection
/// header, and every 100th a longer line that needs horizontal scrolling.
pub fn generate_test_lines(count: usize) -> Vec<String> {
    (0..count).map(test_line).collect()
}

/// Text of line `index` (0-based) in the test document.
pub fn test_line(index: usize) -> String {
    let number = index + 1;
    if index % 10_000 == 0 {
        format!(
            "=== Section {} === Line {} ===",
            index / 10_000 + 1,
            number
        )
    } else if index % 1_000 == 0 {
        format!("--- Subsection {} --- Line {}", index / 1_000 + 1, number)
    } else if index % 100 == 0 {
        format!(
            "Line {}: This is a longer line with more content to test horizontal scrolling and text rendering performance in our virtual text view.",
            number
        )
    } else {
        format!("Line {}: Sample text content for testing virtual scrolling", number)
    }
}
