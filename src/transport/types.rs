//! Wire types shared with the recommendation backend

use crate::ledger::ConversationTurn;
use crate::session_id::SessionId;
use serde::{Deserialize, Serialize};

/// Catalog product. Read-only from the client's point of view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub price: f64,
    /// Fraction in [0, 1]
    pub margin: f64,
    pub description: String,
    #[serde(default)]
    pub ingredients: Option<String>,
    #[serde(default)]
    pub skin_type: Option<String>,
    #[serde(default)]
    pub benefits: Option<String>,
    pub image_url: String,
}

/// Body of `POST /api/search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub session_id: SessionId,
    pub conversation_history: Vec<ConversationTurn>,
}

/// What the backend intends with a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Backend needs clarification before offering products
    Question,
    /// `products` is authoritative
    Results,
    /// Direct answer to a question
    Answer,
}

/// Body returned by `POST /api/search`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub response_type: ResponseType,
    pub message: String,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_up_question: Option<String>,
    pub session_id: SessionId,
}

/// Body of `POST /api/ask`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<i64>,
    pub session_id: SessionId,
}

impl AskRequest {
    /// Question about one product, asked within that product's session
    pub fn about_product(
        question: impl Into<String>,
        product_id: Option<i64>,
        session_id: SessionId,
    ) -> Self {
        Self {
            question: question.into(),
            product_id,
            session_id,
        }
    }
}

/// Body returned by `POST /api/ask`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub citations: Vec<String>,
    pub session_id: SessionId,
}

/// `GET /api/categories` has shipped both as a bare array and wrapped
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CategoriesBody {
    Bare(Vec<String>),
    Wrapped { categories: Vec<String> },
}

impl CategoriesBody {
    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            Self::Bare(v) | Self::Wrapped { categories: v } => v,
        }
    }
}
