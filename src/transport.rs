//! Transport to the recommendation backend
//!
//! The session runtime only sees [`SearchTransport`], so tests can swap the
//! HTTP client for a mock.

mod error;
mod http;
mod types;

pub use error::TransportError;
pub use http::StorefrontClient;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Performs one search call. Implementations must bound the call in time and
/// must not touch session state.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, TransportError>;

    /// Label for logs
    fn name(&self) -> &str;
}

#[async_trait]
impl<T: SearchTransport + ?Sized> SearchTransport for Arc<T> {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, TransportError> {
        (**self).search(request).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Logging wrapper for search transports
pub struct LoggingTransport<T> {
    inner: T,
}

impl<T: SearchTransport> LoggingTransport<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<T: SearchTransport> SearchTransport for LoggingTransport<T> {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, TransportError> {
        let start = std::time::Instant::now();
        let result = self.inner.search(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    backend = %self.inner.name(),
                    session_id = %request.session_id,
                    duration_ms = %duration.as_millis(),
                    history_len = request.conversation_history.len(),
                    response_type = ?response.response_type,
                    products = response.products.len(),
                    follow_up = response.follow_up_question.is_some(),
                    "Search completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    backend = %self.inner.name(),
                    session_id = %request.session_id,
                    duration_ms = %duration.as_millis(),
                    kind = e.kind(),
                    error = %e,
                    "Search failed"
                );
            }
        }

        result
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
