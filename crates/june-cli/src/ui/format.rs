//! Formatting utilities for CLI output.

use chrono::{DateTime, Local, Utc};

/// Truncate a string to at most `max_len` characters, ending with `...`.
///
/// ```text
/// truncate_str("hello", 10)       -> "hello"
/// truncate_str("hello world", 8)  -> "hello..."
/// ```
pub fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 3 {
        return ".".repeat(max_len);
    }
    let kept: String = s.chars().take(max_len - 3).collect();
    format!("{}...", kept)
}

/// Collapse all whitespace runs (newlines included) into single spaces.
pub fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Single-line preview of `s` limited to `max_len` characters.
pub fn preview(s: &str, max_len: usize) -> String {
    truncate_str(&one_line(s), max_len)
}

/// Format a turn timestamp as local wall-clock time (`HH:MM:SS`).
pub fn format_clock(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Indent every line of `text` by `indent` spaces.
pub fn indent(text: &str, indent: usize) -> String {
    let pad = " ".repeat(indent);
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", pad, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
