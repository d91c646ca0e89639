//! Common constants used throughout june-core.

// ============================================================================
// Directory Names
// ============================================================================

/// The name of the global June configuration directory.
///
/// Located at `~/.june/` on Unix-like systems.
pub const JUNE_HOME_DIR: &str = ".june";

/// File name of the global configuration inside [`JUNE_HOME_DIR`].
pub const CONFIG_FILENAME: &str = "config.yaml";

/// Environment variable overriding the configuration file path.
pub const JUNE_CONFIG_ENV: &str = "JUNE_CONFIG";

// ============================================================================
// Retrieval & Conversation Defaults
// ============================================================================

/// Chunks retrieved to build the model context.
pub const DEFAULT_CONTEXT_TOP_K: usize = 4;

/// Chunks retrieved when picking a canned fallback reply.
pub const DEFAULT_FALLBACK_TOP_K: usize = 2;

/// Exchange pairs (user + assistant) kept in conversation history.
pub const DEFAULT_MAX_PAIRS: usize = 10;

/// `contextTopK` above this value triggers a config warning.
pub const LARGE_TOP_K_WARNING: usize = 10;

// ============================================================================
// Context Assembly
// ============================================================================

/// Separator placed between rendered chunks in the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";
