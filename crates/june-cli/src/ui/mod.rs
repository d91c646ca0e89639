//! # CLI UI Module
//!
//! Styling and formatting layer for `june` CLI output.
//!
//! Output stays readable without colors (respecting `NO_COLOR`) and every
//! data command can switch to machine-readable output with `--json`.
//!
//! ## Module Structure
//!
//! - `color`: Color mode detection and terminal capability checks
//! - `style`: Message types, prefixes, and styling functions
//! - `format`: Truncation, previews and timestamps
//! - `table`: Table rendering with comfy-table
//! - `progress`: Spinner shown while waiting for the model

pub mod color;
pub mod format;
pub mod progress;
pub mod style;
pub mod table;

pub use color::ColorMode;
pub use progress::{Progress, ProgressMode};
pub use style::{MessageType, Style};
