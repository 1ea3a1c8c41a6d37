//! Session state types

use crate::ledger::ConversationLedger;
use crate::session_id::SessionId;
use crate::transport::Product;
use serde::{Deserialize, Serialize};

/// Shown in place of a reply whenever the backend call fails
pub const APOLOGY_MESSAGE: &str = "Sorry, I had trouble processing your request. Please try again.";

/// Whether a search is in flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchPhase {
    /// No query in flight
    #[default]
    Idle,
    /// One query in flight; its user turn is appended when it resolves
    Pending { query: String },
}

/// Externally observable session state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionView {
    pub phase: SearchPhase,
    pub ledger: ConversationLedger,
    /// Clarifying question from the last reply, empty when none
    pub pending_follow_up: String,
    /// Staged search box text
    pub input: String,
    pub last_results: Vec<Product>,
    pub last_message: String,
    pub is_conversation_active: bool,
}

impl SessionView {
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, SearchPhase::Pending { .. })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, SearchPhase::Idle)
    }

    pub fn has_follow_up(&self) -> bool {
        !self.pending_follow_up.is_empty()
    }

    /// Reset everything the clear action owns
    pub(crate) fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Immutable per-session configuration
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_id: SessionId,
}

impl SessionContext {
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(SessionId::generate())
    }
}
