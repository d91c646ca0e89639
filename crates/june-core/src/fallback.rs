//! Local replies used when no model answer is available.
//!
//! Greetings get the persona greeting. Anything else is matched against the
//! knowledge base and answered with the canned reply of the best chunk's
//! category, or the persona's default reply when nothing matches.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::knowledge::Category;
use crate::retriever::Retriever;

static GREETING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(hi|hello|hey|greetings|howdy)").expect("Invalid regex"));

/// Which rule produced a local reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "category", rename_all = "lowercase")]
pub enum FallbackKind {
    Greeting,
    Category(Category),
    Default,
}

/// A reply built without the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalReply {
    pub text: String,
    pub kind: FallbackKind,
    /// Chunks retrieved while choosing the reply.
    pub chunk_ids: Vec<String>,
}

/// Whether `message` opens with a greeting word.
///
/// Matching is a prefix test on the lower-cased message, so "history" counts.
pub fn is_greeting(message: &str) -> bool {
    GREETING_RE.is_match(&message.to_lowercase())
}

/// Build the local reply for `message`.
pub fn fallback_response(retriever: &Retriever, message: &str, top_k: usize) -> LocalReply {
    let kb = retriever.knowledge();
    let persona = kb.persona();

    let chunks = retriever.retrieve(message, top_k);
    let chunk_ids: Vec<String> = chunks.iter().map(|c| c.chunk.id.clone()).collect();

    if is_greeting(message) {
        return LocalReply {
            text: persona.greeting.clone(),
            kind: FallbackKind::Greeting,
            chunk_ids,
        };
    }

    if let Some(top) = chunks.first() {
        let category = top.chunk.category;
        if let Some(text) = kb.fallback_reply(category) {
            return LocalReply {
                text: text.to_string(),
                kind: FallbackKind::Category(category),
                chunk_ids,
            };
        }
        tracing::debug!("No fallback reply for category `{}`", category);
    }

    LocalReply {
        text: persona.default_reply.clone(),
        kind: FallbackKind::Default,
        chunk_ids,
    }
}
