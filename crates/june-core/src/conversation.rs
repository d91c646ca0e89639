//! Conversation history.
//!
//! History is kept in memory only. It grows by one user turn and one
//! assistant turn per successful model reply and is trimmed to the most
//! recent `max_pairs` exchanges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use june_model::ChatTurn;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Provider-side representation (assistant turns are `model`).
    pub fn to_chat_turn(&self) -> ChatTurn {
        match self.role {
            Role::User => ChatTurn::user(&self.content),
            Role::Assistant => ChatTurn::model(&self.content),
        }
    }
}

/// Bounded, ordered conversation history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversationHistory {
    turns: Vec<Turn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed exchange and keep the last `max_pairs` pairs.
    pub fn record_exchange(
        &mut self,
        query: impl Into<String>,
        reply: impl Into<String>,
        max_pairs: usize,
    ) {
        self.turns.push(Turn::new(Role::User, query));
        self.turns.push(Turn::new(Role::Assistant, reply));
        self.truncate(max_pairs);
    }

    /// Drop the oldest turns so at most `max_pairs * 2` remain.
    pub fn truncate(&mut self, max_pairs: usize) {
        let limit = max_pairs.saturating_mul(2);
        if self.turns.len() > limit {
            let excess = self.turns.len() - limit;
            self.turns.drain(..excess);
        }
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// History in the provider's turn format, used to seed a new session.
    pub fn to_chat_turns(&self) -> Vec<ChatTurn> {
        self.turns.iter().map(Turn::to_chat_turn).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use june_model::ChatRole;

    #[test]
    fn test_record_exchange_appends_pair() {
        let mut history = ConversationHistory::new();
        history.record_exchange("hi", "hello", 10);

        assert_eq!(history.len(), 2);
        assert_eq!(history.turns()[0].role, Role::User);
        assert_eq!(history.turns()[1].role, Role::Assistant);
        assert_eq!(history.turns()[1].content, "hello");
    }

    #[test]
    fn test_history_keeps_most_recent_pairs() {
        let mut history = ConversationHistory::new();
        for i in 0..12 {
            history.record_exchange(format!("q{i}"), format!("a{i}"), 10);
        }

        assert_eq!(history.len(), 20);
        assert_eq!(history.turns()[0].content, "q2");
        assert_eq!(history.turns()[19].content, "a11");
    }

    #[test]
    fn test_to_chat_turns_maps_roles() {
        let mut history = ConversationHistory::new();
        history.record_exchange("q", "a", 1);

        let turns = history.to_chat_turns();
        assert_eq!(turns[0].role, ChatRole::User);
        assert_eq!(turns[1].role, ChatRole::Model);
        assert_eq!(turns[1].text, "a");
    }

    #[test]
    fn test_turn_serializes_role_lowercase() {
        let json = serde_json::to_value(Turn::new(Role::Assistant, "x")).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json["timestamp"].is_string());
    }
}
