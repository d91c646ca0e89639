//! Error types for june-core.

use std::path::PathBuf;

use thiserror::Error;

/// Domain-specific errors for June operations.
///
/// Model failures during a conversation are classified and turned into reply
/// text by [`crate::assistant::Assistant`]; they only surface here when a
/// caller asks for a model outside of a conversation.
#[derive(Error, Debug)]
pub enum JuneError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Global configuration file is invalid.
    #[error("Global config invalid: {0}")]
    InvalidGlobalConfig(String),

    /// A configuration value is invalid.
    ///
    /// Used for validation errors detected after parsing (e.g., timeoutSecs=0).
    #[error("Invalid configuration: {message}. {hint}")]
    InvalidConfiguration {
        /// Description of the invalid configuration.
        message: String,
        /// Actionable hint on how to fix it.
        hint: String,
    },

    // =========================================================================
    // Knowledge Profile Errors
    // =========================================================================
    /// The knowledge profile could not be read.
    #[error("Failed to read knowledge profile `{path}`: {message}")]
    ProfileIo {
        /// Path to the profile file.
        path: PathBuf,
        /// Description of the I/O error.
        message: String,
    },

    /// The knowledge profile is malformed or fails validation.
    #[error("Knowledge profile invalid: {0}")]
    InvalidProfile(String),

    /// Two chunks share one id.
    #[error("Duplicate chunk id `{0}` in knowledge profile.")]
    DuplicateChunkId(String),

    // =========================================================================
    // Model Errors
    // =========================================================================
    /// A hosted model error.
    #[error(transparent)]
    Model(#[from] june_model::ModelError),

    /// A wrapped generic error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl JuneError {
    /// Create an [`JuneError::InvalidConfiguration`] error.
    pub fn invalid_configuration(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
            hint: hint.into(),
        }
    }
}
