//! Conversational request wrapper.
//!
//! [`Assistant::converse`] turns one visitor message into reply text. It
//! retrieves context, asks the hosted model through a [`ChatSession`], and
//! records the exchange. Whatever happens it returns text: missing
//! credentials and model failures degrade to local replies.
//!
//! ## Session lifecycle
//!
//! ```text
//! no session --(message)--> start session seeded with history
//!     ^                              |
//!     |                      success | failure
//!     |                              v
//!     +----(failure / reset)---- active session
//! ```
//!
//! The caller owns the [`ChatState`] and threads it through each call, so
//! two requests can never interleave on one conversation.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use june_model::{create_chat_model, ChatModel, ChatSession, ModelError};

use crate::config::GlobalConfig;
use crate::constants::{DEFAULT_CONTEXT_TOP_K, DEFAULT_FALLBACK_TOP_K, DEFAULT_MAX_PAIRS};
use crate::context::{build_context, build_prompt};
use crate::conversation::ConversationHistory;
use crate::errors::JuneError;
use crate::fallback::{fallback_response, LocalReply};
use crate::knowledge::KnowledgeBase;
use crate::retriever::{Retriever, ScoredChunk};

// ============================================================================
// Reply types
// ============================================================================

/// Failure classes of a model request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// No usable API key.
    MissingCredential,
    /// The provider rejected the API key.
    InvalidCredential,
    /// Quota or rate limit exhausted.
    RateLimited,
    /// Safety filters rejected the prompt or the answer.
    ContentRejected,
    /// Anything else, timeouts included.
    Unknown,
}

/// Where reply text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyOrigin {
    /// The hosted model answered.
    Model,
    /// No model is configured; a local reply was used.
    Fallback,
    /// The model request failed; the text depends on the failure class.
    Failure(FailureKind),
}

/// Text returned to the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    pub text: String,
    pub origin: ReplyOrigin,
    /// Ids of the chunks retrieved for this reply, best first.
    pub chunk_ids: Vec<String>,
}

impl Reply {
    fn local(local: LocalReply, origin: ReplyOrigin) -> Self {
        Self {
            text: local.text,
            origin,
            chunk_ids: local.chunk_ids,
        }
    }
}

// ============================================================================
// ChatState
// ============================================================================

/// Per-conversation state owned by the caller.
#[derive(Debug)]
pub struct ChatState {
    id: Uuid,
    history: ConversationHistory,
    session: Option<Box<dyn ChatSession>>,
}

impl Default for ChatState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            history: ConversationHistory::new(),
            session: None,
        }
    }

    /// Random id used to correlate log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Whether a model session is currently open.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Drop the session and clear history.
    pub fn reset(&mut self) {
        tracing::debug!(session = %self.id, "Conversation reset");
        self.session = None;
        self.history.clear();
        self.id = Uuid::new_v4();
    }
}

// ============================================================================
// Assistant
// ============================================================================

/// Tunables of [`Assistant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssistantSettings {
    /// Chunks rendered into the model context.
    pub context_top_k: usize,
    /// Chunks considered for the local reply.
    pub fallback_top_k: usize,
    /// Exchange pairs kept in history.
    pub max_pairs: usize,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            context_top_k: DEFAULT_CONTEXT_TOP_K,
            fallback_top_k: DEFAULT_FALLBACK_TOP_K,
            max_pairs: DEFAULT_MAX_PAIRS,
        }
    }
}

impl AssistantSettings {
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            context_top_k: config.retrieval.context_top_k,
            fallback_top_k: config.retrieval.fallback_top_k,
            max_pairs: config.conversation.max_pairs,
        }
    }
}

/// Retrieval-augmented chat assistant.
#[derive(Debug, Clone)]
pub struct Assistant {
    retriever: Retriever,
    model: Option<Arc<dyn ChatModel>>,
    settings: AssistantSettings,
}

impl Assistant {
    /// Create an assistant. `model` is `None` when no credential is configured.
    pub fn new(
        kb: Arc<KnowledgeBase>,
        model: Option<Arc<dyn ChatModel>>,
        settings: AssistantSettings,
    ) -> Self {
        Self {
            retriever: Retriever::new(kb),
            model,
            settings,
        }
    }

    /// Build an assistant from configuration.
    ///
    /// Loads the knowledge profile and, when a usable API key is configured,
    /// the hosted model. A missing key or a provider compiled out leaves the
    /// assistant in local-reply mode.
    ///
    /// # Errors
    ///
    /// Returns profile errors, or [`JuneError::Model`] if the model client
    /// cannot be built.
    pub fn from_config(config: &GlobalConfig) -> Result<Self, JuneError> {
        let kb = Arc::new(KnowledgeBase::load(&config.knowledge)?);
        let settings = AssistantSettings::from_config(config);

        if config.gemini.usable_api_key().is_none() {
            tracing::warn!("Gemini API key not configured, answers will use local knowledge");
            return Ok(Self::new(kb, None, settings));
        }

        let model = match create_chat_model(&config.gemini, &kb.persona().system_prompt) {
            Ok(model) => Some(Arc::from(model)),
            Err(ModelError::ProviderNotAvailable { provider, reason }) => {
                tracing::warn!("Provider '{}' unavailable: {}", provider, reason);
                None
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self::new(kb, model, settings))
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        self.retriever.knowledge()
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    /// Whether replies can come from the hosted model.
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Model id, when a model is configured.
    pub fn model_id(&self) -> Option<&str> {
        self.model.as_deref().map(|m| m.model_id())
    }

    pub fn suggestions(&self) -> &[String] {
        self.knowledge().suggestions()
    }

    /// Retrieve context chunks for `query` with the configured K.
    pub fn retrieve(&self, query: &str) -> Vec<ScoredChunk<'_>> {
        self.retriever.retrieve(query, self.settings.context_top_k)
    }

    /// Build the local reply for `query`.
    pub fn local_reply(&self, query: &str) -> LocalReply {
        fallback_response(&self.retriever, query, self.settings.fallback_top_k)
    }

    /// Answer `query` within the conversation `state`.
    ///
    /// Never fails: model errors are classified and mapped to reply text.
    /// History only changes after a successful model reply.
    pub fn converse(&self, mut state: ChatState, query: &str) -> (ChatState, Reply) {
        let Some(model) = self.model.as_deref() else {
            tracing::debug!(session = %state.id, "No model configured, using local reply");
            let reply = Reply::local(self.local_reply(query), ReplyOrigin::Fallback);
            return (state, reply);
        };

        let kb = self.knowledge();
        let retrieved = self.retrieve(query);
        let chunk_ids: Vec<String> = retrieved.iter().map(|r| r.chunk.id.clone()).collect();
        let context = build_context(retrieved.iter().map(|r| r.chunk), kb.owner());
        let prompt = build_prompt(kb.persona(), &context, query);

        let session_id = state.id;
        let history = &state.history;
        let session = state.session.get_or_insert_with(|| {
            tracing::debug!(
                session = %session_id,
                turns = history.len(),
                "Starting {} session",
                model.model_id()
            );
            model.start_chat(&history.to_chat_turns())
        });

        match session.send_message(&prompt) {
            Ok(text) => {
                session.truncate(self.settings.max_pairs * 2);
                state
                    .history
                    .record_exchange(query, text.as_str(), self.settings.max_pairs);
                tracing::debug!(
                    session = %session_id,
                    turns = state.history.len(),
                    "Model replied"
                );
                let reply = Reply {
                    text,
                    origin: ReplyOrigin::Model,
                    chunk_ids,
                };
                (state, reply)
            }
            Err(err) => {
                state.session = None;
                let kind = classify_model_error(&err);
                tracing::error!(session = %session_id, ?kind, "Model request failed: {}", err);
                let reply = self.failure_reply(kind, query);
                (state, reply)
            }
        }
    }

    fn failure_reply(&self, kind: FailureKind, query: &str) -> Reply {
        let persona = self.knowledge().persona();
        let origin = ReplyOrigin::Failure(kind);
        match kind {
            FailureKind::RateLimited => Reply {
                text: persona.rate_limited_reply.clone(),
                origin,
                chunk_ids: Vec::new(),
            },
            FailureKind::ContentRejected => Reply {
                text: persona.content_rejected_reply.clone(),
                origin,
                chunk_ids: Vec::new(),
            },
            FailureKind::MissingCredential
            | FailureKind::InvalidCredential
            | FailureKind::Unknown => Reply::local(self.local_reply(query), origin),
        }
    }
}

// ============================================================================
// Error classification
// ============================================================================

/// Map a model error to its failure class.
///
/// Structured fields (HTTP status, provider status text) decide first; the
/// error message is searched for well-known markers otherwise.
pub fn classify_model_error(err: &ModelError) -> FailureKind {
    match err {
        ModelError::MissingApiKey { .. } => FailureKind::MissingCredential,
        ModelError::Blocked { .. } => FailureKind::ContentRejected,
        ModelError::Timeout { .. } => FailureKind::Unknown,
        ModelError::Api {
            status,
            code,
            message,
            ..
        } => {
            let code = code.as_deref().unwrap_or_default();
            if matches!(status, 401 | 403) || code == "API_KEY_INVALID" {
                FailureKind::InvalidCredential
            } else if *status == 429 || code == "RESOURCE_EXHAUSTED" {
                FailureKind::RateLimited
            } else {
                classify_message(message)
            }
        }
        other => classify_message(&other.to_string()),
    }
}

fn classify_message(message: &str) -> FailureKind {
    if message.contains("API key") || message.contains("API_KEY_INVALID") {
        FailureKind::InvalidCredential
    } else if message.contains("quota")
        || message.contains("RATE_LIMIT")
        || message.contains("429")
    {
        FailureKind::RateLimited
    } else if message.contains("SAFETY") {
        FailureKind::ContentRejected
    } else {
        FailureKind::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use june_model::{ChatTurn, ModelResult};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    // ------------------------------------------------------------------------
    // Scripted chat model
    // ------------------------------------------------------------------------

    #[derive(Debug, Default)]
    struct Script {
        outcomes: Mutex<VecDeque<ModelResult<String>>>,
        prompts: Mutex<Vec<String>>,
        seeds: Mutex<Vec<Vec<ChatTurn>>>,
        sent_turns: Mutex<Vec<usize>>,
    }

    #[derive(Debug, Clone)]
    struct ScriptedModel {
        script: Arc<Script>,
    }

    impl ScriptedModel {
        fn new(outcomes: Vec<ModelResult<String>>) -> Self {
            let script = Script {
                outcomes: Mutex::new(outcomes.into()),
                ..Default::default()
            };
            Self {
                script: Arc::new(script),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.script.prompts.lock().unwrap().clone()
        }

        fn seeds(&self) -> Vec<Vec<ChatTurn>> {
            self.script.seeds.lock().unwrap().clone()
        }

        fn sent_turns(&self) -> Vec<usize> {
            self.script.sent_turns.lock().unwrap().clone()
        }
    }

    impl ChatModel for ScriptedModel {
        fn start_chat(&self, history: &[ChatTurn]) -> Box<dyn ChatSession> {
            self.script.seeds.lock().unwrap().push(history.to_vec());
            Box::new(ScriptedSession {
                script: Arc::clone(&self.script),
                history: history.to_vec(),
            })
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    #[derive(Debug)]
    struct ScriptedSession {
        script: Arc<Script>,
        history: Vec<ChatTurn>,
    }

    impl ChatSession for ScriptedSession {
        fn send_message(&mut self, prompt: &str) -> ModelResult<String> {
            self.script.prompts.lock().unwrap().push(prompt.to_string());
            self.script.sent_turns.lock().unwrap().push(self.history.len());
            let outcome = self
                .script
                .outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted");
            if let Ok(text) = &outcome {
                self.history.push(ChatTurn::user(prompt));
                self.history.push(ChatTurn::model(text.as_str()));
            }
            outcome
        }

        fn history(&self) -> &[ChatTurn] {
            &self.history
        }

        fn truncate(&mut self, max_turns: usize) {
            june_model::truncate_turns(&mut self.history, max_turns);
        }
    }

    fn assistant_with(model: Option<ScriptedModel>, settings: AssistantSettings) -> Assistant {
        let kb = Arc::new(KnowledgeBase::builtin().unwrap());
        let model = model.map(|m| Arc::new(m) as Arc<dyn ChatModel>);
        Assistant::new(kb, model, settings)
    }

    fn rate_limited() -> ModelError {
        ModelError::api(
            "gemini",
            429,
            Some("RESOURCE_EXHAUSTED".to_string()),
            "Resource has been exhausted (e.g. check quota).",
        )
    }

    const EMAIL: &str = "dannyjoseph3007@outlook.com";

    // ------------------------------------------------------------------------
    // Conversation flow
    // ------------------------------------------------------------------------

    #[test]
    fn test_missing_credential_uses_local_reply() {
        let assistant = Assistant::from_config(&GlobalConfig::default()).unwrap();
        assert!(!assistant.has_model());

        let (state, reply) = assistant.converse(ChatState::new(), "How can I contact Daniel?");
        assert_eq!(reply.origin, ReplyOrigin::Fallback);
        assert!(reply.text.contains(EMAIL));
        assert!(state.history().is_empty());
        assert!(!state.has_session());
    }

    #[test]
    fn test_placeholder_credential_uses_local_reply() {
        let mut config = GlobalConfig::default();
        config.gemini.api_key = Some(june_model::PLACEHOLDER_API_KEY.to_string());
        let assistant = Assistant::from_config(&config).unwrap();
        assert!(!assistant.has_model());
    }

    #[test]
    fn test_success_records_exchange_and_keeps_session() {
        let model = ScriptedModel::new(vec![
            Ok("Daniel can be reached by email.".to_string()),
            Ok("He knows Rust.".to_string()),
        ]);
        let assistant = assistant_with(Some(model.clone()), AssistantSettings::default());

        let (state, reply) = assistant.converse(ChatState::new(), "How can I contact Daniel?");
        assert_eq!(reply.origin, ReplyOrigin::Model);
        assert_eq!(reply.text, "Daniel can be reached by email.");
        assert_eq!(reply.chunk_ids[0], "personal-2");
        assert!(reply.chunk_ids.len() <= 4);
        assert!(state.has_session());
        assert_eq!(state.history().len(), 2);
        assert_eq!(state.history().turns()[0].content, "How can I contact Daniel?");

        let (state, _) = assistant.converse(state, "What are his skills?");
        assert_eq!(state.history().len(), 4);
        // The open session is reused.
        assert_eq!(model.seeds().len(), 1);

        let prompts = model.prompts();
        assert!(prompts[0].contains("[CONTACT] Contact Information:"));
        assert!(prompts[0].contains("## User Question:\nHow can I contact Daniel?"));
        assert!(prompts[0].ends_with("## Your Response as June:"));
    }

    #[test]
    fn test_history_is_truncated_to_max_pairs() {
        let model = ScriptedModel::new((0..3).map(|i| Ok(format!("a{i}"))).collect());
        let settings = AssistantSettings {
            max_pairs: 2,
            ..Default::default()
        };
        let assistant = assistant_with(Some(model), settings);

        let mut state = ChatState::new();
        for i in 0..3 {
            state = assistant.converse(state, &format!("q{i}")).0;
        }

        let contents: Vec<_> = state
            .history()
            .turns()
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(contents, vec!["q1", "a1", "q2", "a2"]);
    }

    #[test]
    fn test_open_session_resends_at_most_max_pairs() {
        let model = ScriptedModel::new((0..8).map(|i| Ok(format!("a{i}"))).collect());
        let settings = AssistantSettings {
            max_pairs: 3,
            ..Default::default()
        };
        let assistant = assistant_with(Some(model.clone()), settings);

        let mut state = ChatState::new();
        for i in 0..8 {
            state = assistant.converse(state, &format!("q{i}")).0;
        }

        assert!(state.has_session());
        assert_eq!(model.seeds().len(), 1);
        assert_eq!(model.sent_turns(), vec![0, 2, 4, 6, 6, 6, 6, 6]);
    }

    #[test]
    fn test_rate_limit_returns_fixed_reply_and_clears_session() {
        let model = ScriptedModel::new(vec![
            Ok("first".to_string()),
            Err(rate_limited()),
            Ok("third".to_string()),
        ]);
        let assistant = assistant_with(Some(model.clone()), AssistantSettings::default());

        let (state, _) = assistant.converse(ChatState::new(), "Who is Daniel?");
        let (state, reply) = assistant.converse(state, "Tell me about his projects");

        assert_eq!(reply.origin, ReplyOrigin::Failure(FailureKind::RateLimited));
        assert_eq!(
            reply.text,
            assistant.knowledge().persona().rate_limited_reply
        );
        assert!(!state.has_session());
        assert_eq!(state.history().len(), 2);

        // The next message opens a new session seeded with the kept history.
        let (state, reply) = assistant.converse(state, "Work experience?");
        assert_eq!(reply.text, "third");
        assert!(state.has_session());
        let seeds = model.seeds();
        assert_eq!(seeds.len(), 2);
        assert!(seeds[0].is_empty());
        assert_eq!(seeds[1], vec![ChatTurn::user("Who is Daniel?"), ChatTurn::model("first")]);
    }

    #[test]
    fn test_safety_block_returns_rejection_reply() {
        let model = ScriptedModel::new(vec![Err(ModelError::blocked("SAFETY"))]);
        let assistant = assistant_with(Some(model), AssistantSettings::default());

        let (state, reply) = assistant.converse(ChatState::new(), "something rude");
        assert_eq!(reply.origin, ReplyOrigin::Failure(FailureKind::ContentRejected));
        assert_eq!(
            reply.text,
            assistant.knowledge().persona().content_rejected_reply
        );
        assert!(state.history().is_empty());
    }

    #[test]
    fn test_invalid_key_falls_back_to_local_reply() {
        let model = ScriptedModel::new(vec![Err(ModelError::api(
            "gemini",
            400,
            Some("API_KEY_INVALID".to_string()),
            "API key not valid. Please pass a valid API key.",
        ))]);
        let assistant = assistant_with(Some(model), AssistantSettings::default());

        let (state, reply) = assistant.converse(ChatState::new(), "How can I contact Daniel?");
        assert_eq!(reply.origin, ReplyOrigin::Failure(FailureKind::InvalidCredential));
        assert!(reply.text.contains(EMAIL));
        assert!(!state.has_session());
    }

    #[test]
    fn test_timeout_falls_back_to_local_reply() {
        let model = ScriptedModel::new(vec![Err(ModelError::Timeout {
            model_id: "scripted".to_string(),
            timeout_secs: 30,
        })]);
        let assistant = assistant_with(Some(model), AssistantSettings::default());

        let (_, reply) = assistant.converse(ChatState::new(), "xyzzy qqq");
        assert_eq!(reply.origin, ReplyOrigin::Failure(FailureKind::Unknown));
        assert_eq!(reply.text, assistant.knowledge().persona().default_reply);
    }

    #[test]
    fn test_reset_clears_history_and_session() {
        let model = ScriptedModel::new(vec![Ok("hello".to_string())]);
        let assistant = assistant_with(Some(model), AssistantSettings::default());

        let (mut state, _) = assistant.converse(ChatState::new(), "Who is Daniel?");
        let old_id = state.id();
        state.reset();

        assert!(state.history().is_empty());
        assert!(!state.has_session());
        assert_ne!(state.id(), old_id);
    }

    #[test]
    fn test_reply_origin_serialization() {
        let reply = Reply {
            text: "x".to_string(),
            origin: ReplyOrigin::Failure(FailureKind::RateLimited),
            chunk_ids: vec![],
        };
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["origin"], serde_json::json!({"failure": "rate_limited"}));
        assert_eq!(
            serde_json::to_value(ReplyOrigin::Model).unwrap(),
            serde_json::json!("model")
        );
    }

    // ------------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------------

    #[test]
    fn test_classify_by_status_and_code() {
        let cases = [
            (ModelError::api("gemini", 401, None, "unauthorized"), FailureKind::InvalidCredential),
            (ModelError::api("gemini", 403, None, "forbidden"), FailureKind::InvalidCredential),
            (
                ModelError::api("gemini", 400, Some("API_KEY_INVALID".into()), "bad"),
                FailureKind::InvalidCredential,
            ),
            (ModelError::api("gemini", 429, None, "slow down"), FailureKind::RateLimited),
            (rate_limited(), FailureKind::RateLimited),
            (ModelError::api("gemini", 500, None, "internal"), FailureKind::Unknown),
        ];
        for (err, expected) in cases {
            assert_eq!(classify_model_error(&err), expected, "{err}");
        }
    }

    #[test]
    fn test_classify_by_message() {
        let cases = [
            (ModelError::api("gemini", 400, None, "API key expired"), FailureKind::InvalidCredential),
            (ModelError::api("gemini", 400, None, "quota exceeded"), FailureKind::RateLimited),
            (ModelError::transport("RATE_LIMIT hit"), FailureKind::RateLimited),
            (ModelError::transport("status 429"), FailureKind::RateLimited),
            (ModelError::api("gemini", 400, None, "finish reason SAFETY"), FailureKind::ContentRejected),
            (ModelError::blocked("PROHIBITED_CONTENT"), FailureKind::ContentRejected),
            (ModelError::transport("connection reset"), FailureKind::Unknown),
            (
                ModelError::EmptyResponse { model_id: "m".into() },
                FailureKind::Unknown,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(classify_model_error(&err), expected, "{err}");
        }
    }

    #[test]
    fn test_classify_missing_key() {
        let err = ModelError::MissingApiKey {
            provider: "gemini".into(),
        };
        assert_eq!(classify_model_error(&err), FailureKind::MissingCredential);
    }
}
