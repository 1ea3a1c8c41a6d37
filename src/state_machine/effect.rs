//! Effects produced by state transitions

use crate::transport::{Product, ResponseType, SearchRequest, SearchResponse};
use serde::Serialize;

/// What the presenter receives after each resolved exchange
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Presentation {
    pub response_type: ResponseType,
    pub message: String,
    pub products: Vec<Product>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_question: Option<String>,
}

impl Presentation {
    /// Fallback shown after a failed exchange
    pub fn apology(message: &str) -> Self {
        Self {
            response_type: ResponseType::Results,
            message: message.to_string(),
            products: vec![],
            follow_up_question: None,
        }
    }
}

impl From<&SearchResponse> for Presentation {
    fn from(response: &SearchResponse) -> Self {
        Self {
            response_type: response.response_type,
            message: response.message.clone(),
            products: response.products.clone(),
            follow_up_question: response
                .follow_up_question
                .clone()
                .filter(|q| !q.is_empty()),
        }
    }
}

/// Effects to be executed after state transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Dispatch a search through the transport
    SendSearch { request: SearchRequest },

    /// Hand a resolved exchange to the presenter
    Present(Presentation),

    /// Conversation was cleared; presenter should reset
    NotifyCleared,
}

impl Effect {
    pub fn send_search(request: SearchRequest) -> Self {
        Effect::SendSearch { request }
    }
}
