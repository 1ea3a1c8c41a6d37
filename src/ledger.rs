//! Conversation ledger
//!
//! Append-only, ordered log of turns for the active conversation. The full
//! ledger is sent with every search so the backend can stay stateless.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One utterance in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    /// RFC 3339 time the turn was recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: None,
        }
    }

    #[must_use]
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.timestamp = Some(time.to_rfc3339_opts(SecondsFormat::Millis, true));
        self
    }
}

/// Ordered turns of the active conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationLedger {
    turns: Vec<ConversationTurn>,
}

impl ConversationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn at the end. Turns are never removed individually.
    pub fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// Owned copy of the current turns; later appends are not visible through it
    pub fn snapshot(&self) -> Vec<ConversationTurn> {
        self.turns.clone()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Number of completed user/assistant pairs
    pub fn exchanges(&self) -> usize {
        self.turns
            .windows(2)
            .step_by(2)
            .filter(|pair| pair[0].role == Role::User && pair[1].role == Role::Assistant)
            .count()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }
}
