//! Whether June paints its answers, labels and tables.
//!
//! Chosen once per run from `--color` (or `JUNE_COLOR`) and handed to
//! [`Style`](super::Style). In `auto` mode a set `NO_COLOR` wins, then
//! stdout decides: a piped `june ask` prints plain text.

use std::io::IsTerminal;

use clap::ValueEnum;

/// Value of `--color` / `JUNE_COLOR`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Color even when stdout is redirected.
    Always,
    /// Plain text everywhere.
    Never,
    /// Color only on an interactive stdout without `NO_COLOR`.
    #[default]
    Auto,
}

impl ColorMode {
    /// Resolve the mode against the current process environment.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => auto_colorize(
                std::env::var_os("NO_COLOR").is_some(),
                std::io::stdout().is_terminal(),
            ),
        }
    }
}

/// `NO_COLOR` of any value turns colors off, even on a TTY.
fn auto_colorize(no_color_set: bool, stdout_is_tty: bool) -> bool {
    !no_color_set && stdout_is_tty
}

/// Width used to wrap chunk previews in `june chunks`, 80 when unknown.
pub fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}
