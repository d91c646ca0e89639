//! Error types for june-model.
//!
//! Errors keep the provider's status code and status text so that callers can
//! classify failures (bad credential, quota, safety block) without parsing
//! free-form strings.

use thiserror::Error;

/// Result type alias for june-model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while talking to a hosted model.
#[derive(Debug, Error)]
pub enum ModelError {
    // ========================================================================
    // Setup errors
    // ========================================================================
    /// No API key was configured for the provider.
    #[error("No API key configured for '{provider}'.\n\nSet GEMINI_API_KEY or gemini.apiKey in ~/.june/config.yaml.")]
    MissingApiKey { provider: String },

    /// Provider not compiled in or not usable.
    #[error("Provider '{provider}' not available: {reason}")]
    ProviderNotAvailable { provider: String, reason: String },

    /// Provider configuration invalid.
    #[error("Invalid model configuration: {message}")]
    InvalidConfig { message: String },

    // ========================================================================
    // Request errors
    // ========================================================================
    /// The provider answered with a non-success status.
    #[error("{provider} API error (HTTP {status}{}): {message}", format_code(.code))]
    Api {
        provider: String,
        status: u16,
        /// Provider status text, e.g. `RESOURCE_EXHAUSTED`.
        code: Option<String>,
        message: String,
    },

    /// The prompt or the candidate was blocked by the provider's safety filters.
    #[error("Response blocked by safety filters: {reason}")]
    Blocked { reason: String },

    /// The response carried no text.
    #[error("Model '{model_id}' returned no text")]
    EmptyResponse { model_id: String },

    /// The request did not complete within the configured timeout.
    #[error("Request to '{model_id}' timed out after {timeout_secs}s")]
    Timeout { model_id: String, timeout_secs: u64 },

    /// Connection or protocol failure below the API level.
    #[error("Transport error: {message}")]
    Transport { message: String },

    // ========================================================================
    // Decoding errors
    // ========================================================================
    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_code(code: &Option<String>) -> String {
    match code {
        Some(code) => format!(" {code}"),
        None => String::new(),
    }
}

// ============================================================================
// Error constructors
// ============================================================================

impl ModelError {
    /// Create an API error.
    pub fn api(
        provider: impl Into<String>,
        status: u16,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Api {
            provider: provider.into(),
            status,
            code,
            message: message.into(),
        }
    }

    /// Create a safety-block error.
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::Blocked {
            reason: reason.into(),
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// HTTP status of an API error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
