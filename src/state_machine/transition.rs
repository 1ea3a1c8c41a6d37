//! Pure state transition function
//!
//! Given the same view, context and event this always produces the same
//! result, with no I/O. Timestamps arrive inside the events.

use super::state::APOLOGY_MESSAGE;
use super::{Effect, Event, Presentation, SearchPhase, SessionContext, SessionView};
use crate::ledger::ConversationTurn;
use crate::transport::SearchRequest;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_view: SessionView,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(view: SessionView) -> Self {
        Self {
            new_view: view,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Why an event was not applied. The view is unchanged in every case.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Query is empty")]
    EmptyInput,
    #[error("A search is already in progress")]
    ConcurrentRequestRejected,
    #[error("Cannot clear while a search is in progress")]
    ClearWhilePending,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

pub fn transition(
    view: &SessionView,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (&view.phase, event) {
        // ============================================================
        // Submission
        // ============================================================
        (SearchPhase::Pending { .. }, Event::SubmitQuery { .. } | Event::SubmitInput) => {
            Err(TransitionError::ConcurrentRequestRejected)
        }

        (SearchPhase::Idle, Event::SubmitQuery { text }) => submit(view, context, &text),

        (SearchPhase::Idle, Event::SubmitInput) => submit(view, context, &view.input),

        // ============================================================
        // Input staging, allowed in any phase
        // ============================================================
        (_, Event::InputChanged { text }) => {
            let mut new_view = view.clone();
            new_view.input = text;
            Ok(TransitionResult::new(new_view))
        }

        (_, Event::SelectFollowUp) => {
            let mut new_view = view.clone();
            if view.has_follow_up() {
                new_view.input.clone_from(&view.pending_follow_up);
            }
            Ok(TransitionResult::new(new_view))
        }

        // ============================================================
        // Resolution
        // ============================================================
        (SearchPhase::Pending { query }, Event::SearchCompleted { response, at }) => {
            let mut new_view = view.clone();
            append_exchange(&mut new_view, query, &response.message, at);
            new_view.pending_follow_up = response.follow_up_question.clone().unwrap_or_default();
            new_view.last_message.clone_from(&response.message);
            new_view.is_conversation_active = true;
            new_view.input.clear();
            new_view.phase = SearchPhase::Idle;

            let presentation = Presentation::from(&response);
            new_view.last_results = response.products;

            Ok(TransitionResult::new(new_view).with_effect(Effect::Present(presentation)))
        }

        (SearchPhase::Pending { query }, Event::SearchFailed { error: _, at }) => {
            let mut new_view = view.clone();
            append_exchange(&mut new_view, query, APOLOGY_MESSAGE, at);
            new_view.pending_follow_up.clear();
            new_view.last_results.clear();
            new_view.last_message = APOLOGY_MESSAGE.to_string();
            new_view.is_conversation_active = true;
            new_view.phase = SearchPhase::Idle;

            Ok(TransitionResult::new(new_view)
                .with_effect(Effect::Present(Presentation::apology(APOLOGY_MESSAGE))))
        }

        // ============================================================
        // Clear
        // ============================================================
        (SearchPhase::Idle, Event::Clear) => {
            let mut new_view = view.clone();
            new_view.reset();
            Ok(TransitionResult::new(new_view).with_effect(Effect::NotifyCleared))
        }

        (SearchPhase::Pending { .. }, Event::Clear) => Err(TransitionError::ClearWhilePending),

        // ============================================================
        // Invalid Transitions
        // ============================================================
        (phase, event) => Err(TransitionError::InvalidTransition(format!(
            "No transition from {phase:?} with event {}",
            event.name()
        ))),
    }
}

fn submit(
    view: &SessionView,
    context: &SessionContext,
    text: &str,
) -> Result<TransitionResult, TransitionError> {
    let query = text.trim();
    if query.is_empty() {
        return Err(TransitionError::EmptyInput);
    }

    let request = SearchRequest {
        query: query.to_string(),
        session_id: context.session_id.clone(),
        conversation_history: view.ledger.snapshot(),
    };

    let mut new_view = view.clone();
    new_view.phase = SearchPhase::Pending {
        query: query.to_string(),
    };

    Ok(TransitionResult::new(new_view).with_effect(Effect::send_search(request)))
}

/// User turn always precedes its assistant turn
fn append_exchange(view: &mut SessionView, query: &str, reply: &str, at: DateTime<Utc>) {
    view.ledger.append(ConversationTurn::user(query).at(at));
    view.ledger.append(ConversationTurn::assistant(reply).at(at));
}
