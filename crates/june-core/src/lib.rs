//! # june-core
//!
//! **June** – portfolio knowledge assistant core library.
//!
//! This crate provides the knowledge base, the keyword retriever, prompt
//! assembly and the conversational wrapper around a hosted chat model. It is
//! consumed by the `june` CLI.
//!
//! ## Main Types
//!
//! - [`Assistant`] – answers visitor messages, degrading to local replies
//! - [`ChatState`] – caller-owned conversation state
//! - [`KnowledgeBase`] – validated knowledge profile
//! - [`Retriever`] – scores chunks against a query
//! - [`JuneError`] – domain-specific error type
//!
//! ## Modules
//!
//! - [`assistant`] – conversation flow and failure classification
//! - [`config`] – configuration types (GlobalConfig)
//! - [`context`] – context and prompt assembly
//! - [`conversation`] – bounded turn history
//! - [`fallback`] – local replies
//! - [`knowledge`] – knowledge profile loading
//! - [`retriever`] – keyword scoring
//!
//! ## Example
//!
//! ```ignore
//! use june_core::{Assistant, ChatState, GlobalConfig};
//!
//! let config = GlobalConfig::load_default()?;
//! let assistant = Assistant::from_config(&config)?;
//!
//! let (state, reply) = assistant.converse(ChatState::new(), "Who is Daniel?");
//! println!("{}", reply.text);
//! ```

// Modules
pub mod assistant;
pub mod config;
pub mod constants;
pub mod context;
pub mod conversation;
pub mod errors;
pub mod fallback;
pub mod knowledge;
pub mod retriever;

// Re-exports
pub use assistant::{
    classify_model_error, Assistant, AssistantSettings, ChatState, FailureKind, Reply,
    ReplyOrigin,
};
pub use config::{
    check_config, ConfigSourceInfo, ConfigValidationResult, ConversationConfig, GlobalConfig,
    KnowledgeConfig, RetrievalConfig,
};
pub use constants::{CONFIG_FILENAME, JUNE_CONFIG_ENV, JUNE_HOME_DIR};
pub use context::{build_context, build_prompt, no_context_placeholder, render_chunk};
pub use conversation::{ConversationHistory, Role, Turn};
pub use errors::JuneError;
pub use fallback::{fallback_response, is_greeting, FallbackKind, LocalReply};
pub use knowledge::{AssistantPersona, Category, KnowledgeBase, KnowledgeChunk, Profile};
pub use retriever::{Query, Retriever, ScoreBreakdown, ScoredChunk};

// Model configuration lives in june-model; re-exported for CLI convenience.
pub use june_model::{GeminiConfig, GenerationConfig, GEMINI_API_KEY_ENV};
