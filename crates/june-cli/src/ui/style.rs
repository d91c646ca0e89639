//! Message styling for CLI output.
//!
//! Provides consistent prefixes, colors, and formatting for all CLI messages.
//!
//! ## Message Types
//!
//! | Prefix | Meaning | Color |
//! |--------|---------|-------|
//! | `[ok]` | Success | Green |
//! | `[err]` | Error | Red |
//! | `[warn]` | Warning | Yellow |
//! | `[info]` | Information | Blue |
//! | `[hint]` | Suggestion | Cyan |

use owo_colors::OwoColorize;

use june_core::{Category, ReplyOrigin};

use super::color::ColorMode;

/// Message severity/type for CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    /// Success - operation completed successfully
    Ok,
    /// Error - operation failed, cannot continue
    Err,
    /// Warning - operation succeeded with caveats
    Warn,
    /// Information - neutral status update
    Info,
    /// Hint - actionable next step or tip
    Hint,
}

impl MessageType {
    /// Returns the prefix text for this message type.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Ok => "[ok]",
            Self::Err => "[err]",
            Self::Warn => "[warn]",
            Self::Info => "[info]",
            Self::Hint => "[hint]",
        }
    }
}

/// Main styling interface for CLI output.
#[derive(Debug, Clone)]
pub struct Style {
    color_mode: ColorMode,
}

impl Style {
    /// Create a Style instance with an explicit color mode.
    pub fn new(color_mode: ColorMode) -> Self {
        Self { color_mode }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(&self) -> bool {
        self.color_mode.is_enabled()
    }

    /// Format a simple message with a type prefix, e.g. `[ok] Done`.
    pub fn message(&self, msg_type: MessageType, text: &str) -> String {
        let prefix = msg_type.prefix();
        if self.colors_enabled() {
            let colored_prefix = match msg_type {
                MessageType::Ok => prefix.green().to_string(),
                MessageType::Err => prefix.red().to_string(),
                MessageType::Warn => prefix.yellow().to_string(),
                MessageType::Info => prefix.blue().to_string(),
                MessageType::Hint => prefix.cyan().to_string(),
            };
            format!("{} {}", colored_prefix, text)
        } else {
            format!("{} {}", prefix, text)
        }
    }

    /// Format a section header.
    pub fn section(&self, title: &str) -> String {
        if self.colors_enabled() {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// Format a structured error with optional cause and hint.
    pub fn error_with_context(&self, msg: &str, cause: Option<&str>, hint: Option<&str>) -> String {
        let mut output = self.message(MessageType::Err, msg);

        if let Some(cause_text) = cause {
            output.push_str(&format!("\n      Cause: {}", cause_text));
        }

        if let Some(hint_text) = hint {
            output.push_str(&format!("\n      Hint: {}", hint_text));
        }

        output
    }

    /// Format a key-value pair, e.g. `Model: gemini-1.5-pro`.
    pub fn key_value(&self, key: &str, value: &str) -> String {
        if self.colors_enabled() {
            format!("{}: {}", key.dimmed(), value)
        } else {
            format!("{}: {}", key, value)
        }
    }

    /// Format a retrieval score relative to the best score of the result set.
    ///
    /// - top third: green
    /// - middle third: yellow
    /// - bottom third: red
    pub fn score(&self, value: u32, best: u32) -> String {
        let formatted = value.to_string();
        if !self.colors_enabled() || best == 0 {
            return formatted;
        }
        let ratio = value as f32 / best as f32;
        if ratio >= 0.67 {
            formatted.green().to_string()
        } else if ratio >= 0.34 {
            formatted.yellow().to_string()
        } else {
            formatted.red().to_string()
        }
    }

    /// Format a category label, e.g. `[SKILLS]`.
    pub fn category(&self, category: Category) -> String {
        let label = format!("[{}]", category.as_str().to_uppercase());
        if self.colors_enabled() {
            label.magenta().to_string()
        } else {
            label
        }
    }

    /// Format a chunk id (colored cyan).
    pub fn chunk_id(&self, id: &str) -> String {
        if self.colors_enabled() {
            id.cyan().to_string()
        } else {
            id.to_string()
        }
    }

    /// Format a speaker label for chat output, e.g. `june>`.
    pub fn speaker(&self, name: &str) -> String {
        let label = format!("{}>", name.to_lowercase());
        if self.colors_enabled() {
            label.bold().to_string()
        } else {
            label
        }
    }

    /// Describe where a reply came from.
    pub fn origin(&self, origin: ReplyOrigin) -> String {
        let text = match origin {
            ReplyOrigin::Model => "model".to_string(),
            ReplyOrigin::Fallback => "local knowledge".to_string(),
            ReplyOrigin::Failure(kind) => format!("local reply after {:?} failure", kind),
        };
        if self.colors_enabled() {
            text.dimmed().to_string()
        } else {
            text
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use june_core::FailureKind;

    fn plain() -> Style {
        Style::new(ColorMode::Never)
    }

    #[test]
    fn test_message_type_prefix() {
        assert_eq!(MessageType::Ok.prefix(), "[ok]");
        assert_eq!(MessageType::Err.prefix(), "[err]");
        assert_eq!(MessageType::Warn.prefix(), "[warn]");
        assert_eq!(MessageType::Info.prefix(), "[info]");
        assert_eq!(MessageType::Hint.prefix(), "[hint]");
    }

    #[test]
    fn test_message_no_color() {
        assert_eq!(plain().message(MessageType::Ok, "Success"), "[ok] Success");
        assert_eq!(plain().message(MessageType::Err, "Failed"), "[err] Failed");
    }

    #[test]
    fn test_error_with_context() {
        let output = plain().error_with_context(
            "Failed to load configuration",
            Some("bad yaml"),
            Some("Run `june config check`"),
        );
        assert!(output.starts_with("[err] Failed to load configuration"));
        assert!(output.contains("Cause: bad yaml"));
        assert!(output.contains("Hint: Run `june config check`"));
    }

    #[test]
    fn test_key_value_and_labels() {
        let style = plain();
        assert_eq!(style.key_value("Model", "gemini-1.5-pro"), "Model: gemini-1.5-pro");
        assert_eq!(style.category(Category::Skills), "[SKILLS]");
        assert_eq!(style.speaker("June"), "june>");
        assert_eq!(style.score(27, 27), "27");
    }

    #[test]
    fn test_origin_text() {
        let style = plain();
        assert_eq!(style.origin(ReplyOrigin::Model), "model");
        assert_eq!(style.origin(ReplyOrigin::Fallback), "local knowledge");
        assert_eq!(
            style.origin(ReplyOrigin::Failure(FailureKind::RateLimited)),
            "local reply after RateLimited failure"
        );
    }
}
