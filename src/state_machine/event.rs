//! Events that can occur in a search session

use crate::transport::{SearchResponse, TransportError};
use chrono::{DateTime, Utc};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    SubmitQuery {
        text: String,
    },
    /// Submit whatever is staged in the search box
    SubmitInput,
    InputChanged {
        text: String,
    },
    SelectFollowUp,
    Clear,

    // Transport events
    SearchCompleted {
        response: SearchResponse,
        at: DateTime<Utc>,
    },
    SearchFailed {
        error: TransportError,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn submit(text: impl Into<String>) -> Self {
        Event::SubmitQuery { text: text.into() }
    }

    /// Short label for logs
    pub fn name(&self) -> &'static str {
        match self {
            Event::SubmitQuery { .. } => "submit_query",
            Event::SubmitInput => "submit_input",
            Event::InputChanged { .. } => "input_changed",
            Event::SelectFollowUp => "select_follow_up",
            Event::Clear => "clear",
            Event::SearchCompleted { .. } => "search_completed",
            Event::SearchFailed { .. } => "search_failed",
        }
    }
}
