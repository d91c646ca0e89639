//! # june-model
//!
//! Hosted model layer for June - multi-turn chat against generative
//! language APIs.
//!
//! This crate provides:
//!
//! - **Chat traits**: [`ChatModel`] starts sessions, [`ChatSession`] carries a
//!   provider-side conversation across turns
//! - **Gemini backend**: `GeminiChatModel`, a blocking client for the
//!   `generateContent` REST endpoint
//! - **Errors**: [`ModelError`] with enough structure to classify failures
//!
//! ## Design Principles
//!
//! 1. **Production-only**: No mock implementations. Test doubles live in consuming crates.
//! 2. **Explicit timeouts**: Every request is bounded by `GeminiConfig::timeout_secs`.
//! 3. **Provider-agnostic**: Traits don't leak HTTP or JSON types.
//!
//! ## Features
//!
//! - `gemini` (default): Gemini REST backend via `reqwest`
//!
//! ## Usage
//!
//! ```ignore
//! use june_model::{create_chat_model, ChatTurn, GeminiConfig};
//!
//! let model = create_chat_model(&GeminiConfig::default(), "You are June.")?;
//! let mut session = model.start_chat(&[ChatTurn::user("Hi"), ChatTurn::model("Hello!")]);
//! let reply = session.send_message("Who is Daniel?")?;
//! ```

pub mod config;
pub mod error;

#[cfg(feature = "gemini")]
mod gemini;

use serde::{Deserialize, Serialize};

// Re-export error types
pub use error::{ModelError, ModelResult};

// Re-export config types (canonical source of truth)
pub use config::{
    is_usable_api_key, GeminiConfig, GenerationConfig, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_GEMINI_MODEL, DEFAULT_TIMEOUT_SECS, GEMINI_API_KEY_ENV, PLACEHOLDER_API_KEY,
};

// ============================================================================
// Chat turns
// ============================================================================

/// Speaker of a provider-side turn.
///
/// Providers name the assistant side `model`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

/// One text turn exchanged with a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

// ============================================================================
// Chat Model Traits
// ============================================================================

/// Trait for hosted chat models.
///
/// A model is stateless; conversation state lives in the sessions it
/// starts.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow use across threads.
pub trait ChatModel: Send + Sync + std::fmt::Debug {
    /// Start a new session seeded with `history`.
    ///
    /// Starting a session performs no I/O.
    fn start_chat(&self, history: &[ChatTurn]) -> Box<dyn ChatSession>;

    /// Get the model ID.
    fn model_id(&self) -> &str;
}

/// A multi-turn conversation with a hosted model.
///
/// On success the prompt and the reply are appended to the session history.
/// On failure the history is left unchanged.
pub trait ChatSession: Send + std::fmt::Debug {
    /// Send `prompt` as the next user turn and return the reply text.
    fn send_message(&mut self, prompt: &str) -> ModelResult<String>;

    /// Turns exchanged so far, including the seed history.
    fn history(&self) -> &[ChatTurn];

    /// Drop the oldest turns so at most `max_turns` remain.
    ///
    /// Sessions resend their whole history with every request.
    fn truncate(&mut self, max_turns: usize);
}

/// Drop the oldest turns of `turns` so at most `max_turns` remain.
///
/// Turns are removed in user/model pairs, so the kept history still opens
/// with a user turn.
pub fn truncate_turns(turns: &mut Vec<ChatTurn>, max_turns: usize) {
    if turns.len() <= max_turns {
        return;
    }
    let excess = turns.len() - max_turns;
    let excess = (excess + excess % 2).min(turns.len());
    turns.drain(..excess);
}

// ============================================================================
// Factory Functions
// ============================================================================

/// Create a chat model from configuration.
///
/// `system_instruction` is attached to every request made by sessions of
/// this model.
///
/// # Errors
///
/// Returns [`ModelError::MissingApiKey`] when no usable key is configured,
/// or [`ModelError::InvalidConfig`] if the HTTP client cannot be built.
#[cfg(feature = "gemini")]
pub fn create_chat_model(
    config: &GeminiConfig,
    system_instruction: &str,
) -> ModelResult<Box<dyn ChatModel>> {
    let model = gemini::GeminiChatModel::new(config, system_instruction)?;
    Ok(Box::new(model))
}

#[cfg(not(feature = "gemini"))]
pub fn create_chat_model(
    _config: &GeminiConfig,
    _system_instruction: &str,
) -> ModelResult<Box<dyn ChatModel>> {
    Err(ModelError::ProviderNotAvailable {
        provider: "gemini".to_string(),
        reason: "No chat providers available. Enable the 'gemini' feature.".to_string(),
    })
}

// ============================================================================
// Re-export implementations (feature-gated)
// ============================================================================

#[cfg(feature = "gemini")]
pub use gemini::{GeminiChatModel, GeminiChatSession};
