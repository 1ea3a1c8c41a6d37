//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use crate::transport::{SearchRequest, SearchResponse, SearchTransport, TransportError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

// ============================================================================
// Mock Transport
// ============================================================================

/// Mock transport that returns queued responses
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<SearchResponse, TransportError>>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<SearchRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: SearchResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: TransportError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<SearchRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: &SearchRequest) -> Result<SearchResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::network("No mock response queued")))
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchTransport for MockTransport {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, TransportError> {
        self.next(request)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Delayed Mock Transport (for in-flight and timeout testing)
// ============================================================================

/// Mock transport with a configurable delay and optional wall-clock bound
pub struct DelayedMockTransport {
    inner: MockTransport,
    delay: Duration,
    timeout: Option<Duration>,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockTransport {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockTransport::new(),
            delay,
            timeout: None,
            request_started: Arc::new(Notify::new()),
        }
    }

    /// Give up with `TransportError::Timeout` once `bound` elapses
    pub fn with_timeout(mut self, bound: Duration) -> Self {
        self.timeout = Some(bound);
        self
    }

    pub fn queue_response(&self, response: SearchResponse) {
        self.inner.queue_response(response);
    }

    pub fn recorded_requests(&self) -> Vec<SearchRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl SearchTransport for DelayedMockTransport {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, TransportError> {
        self.request_started.notify_one();
        match self.timeout {
            Some(bound) if bound < self.delay => {
                self.inner.requests.lock().unwrap().push(request.clone());
                tokio::time::sleep(bound).await;
                Err(TransportError::Timeout)
            }
            _ => {
                tokio::time::sleep(self.delay).await;
                self.inner.next(request)
            }
        }
    }

    fn name(&self) -> &str {
        "delayed-mock"
    }
}

// ============================================================================
// Panicking Transport (for task failure testing)
// ============================================================================

/// Transport whose search future panics
#[derive(Default)]
pub struct PanickingTransport;

#[async_trait]
impl SearchTransport for PanickingTransport {
    async fn search(&self, _request: &SearchRequest) -> Result<SearchResponse, TransportError> {
        panic!("transport blew up")
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Role;
    use crate::runtime::{SessionError, SessionEvent, SessionRuntime};
    use crate::session_id::SessionId;
    use crate::state_machine::{SessionContext, TransitionError, APOLOGY_MESSAGE};
    use crate::transport::{LoggingTransport, Product, ResponseType};

    fn test_context() -> SessionContext {
        SessionContext::new(SessionId::from("S"))
    }

    fn product(id: i64) -> Product {
        Product {
            id,
            name: format!("P{id}"),
            category: "serums".to_string(),
            price: 18.0,
            margin: 0.5,
            description: "desc".to_string(),
            ingredients: Some("niacinamide".to_string()),
            skin_type: Some("acne-prone".to_string()),
            benefits: None,
            image_url: format!("/img/{id}.png"),
        }
    }

    fn results(message: &str, products: Vec<Product>) -> SearchResponse {
        SearchResponse {
            response_type: ResponseType::Results,
            message: message.to_string(),
            products,
            follow_up_question: None,
            session_id: SessionId::from("S"),
        }
    }

    #[tokio::test]
    async fn test_mock_transport() {
        let mock = MockTransport::new();
        mock.queue_response(results("ok", vec![]));

        let request = SearchRequest {
            query: "q".to_string(),
            session_id: SessionId::from("S"),
            conversation_history: vec![],
        };

        assert!(mock.search(&request).await.is_ok());
        // Second call should fail (no more responses)
        assert!(mock.search(&request).await.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }

    /// Scenario: successful exchange populates ledger and results
    #[tokio::test]
    async fn test_successful_exchange() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_response(results(
            "Here are some great options",
            vec![product(1), product(2)],
        ));
        let handle = SessionRuntime::spawn(test_context(), transport.clone());
        let mut events = handle.subscribe();

        handle.submit_query("serums for acne-prone skin").await.unwrap();
        let view = handle.wait_until_idle().await.unwrap();

        let turns = view.ledger.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[0].content, "serums for acne-prone skin");
        assert_eq!(turns[1].role, Role::Assistant);
        assert_eq!(turns[1].content, "Here are some great options");
        assert!(view.is_conversation_active);
        assert_eq!(view.last_results, vec![product(1), product(2)]);

        let requests = transport.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].session_id, SessionId::from("S"));
        assert!(requests[0].conversation_history.is_empty());

        match events.recv().await.unwrap() {
            SessionEvent::Presented(p) => assert_eq!(p.products.len(), 2),
            SessionEvent::Cleared => panic!("expected a presentation"),
        }
    }

    /// Scenario: timeout falls back to the apology and leaves the session usable
    #[tokio::test]
    async fn test_timeout_falls_back() {
        let transport = DelayedMockTransport::new(Duration::from_secs(30))
            .with_timeout(Duration::from_millis(50));
        let handle = SessionRuntime::spawn(test_context(), LoggingTransport::new(transport));

        handle.submit_query("hello").await.unwrap();
        assert!(handle.view().is_loading());
        let view = handle.wait_until_idle().await.unwrap();

        assert_eq!(view.ledger.len(), 2);
        assert_eq!(view.ledger.turns()[0].content, "hello");
        assert_eq!(view.ledger.last().unwrap().role, Role::Assistant);
        assert_eq!(view.ledger.last().unwrap().content, APOLOGY_MESSAGE);
        assert!(view.last_results.is_empty());
        assert_eq!(view.last_message, APOLOGY_MESSAGE);
        assert!(view.is_idle());
    }

    /// Scenario B end to end: the real client's bound against a slow backend
    #[tokio::test]
    async fn test_timeout_over_http_client() {
        use crate::config::StorefrontConfig;
        use crate::transport::StorefrontClient;
        use axum::routing::post;
        use axum::{Json, Router};

        let router = Router::new().route(
            "/api/search",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(serde_json::json!({}))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        let config = StorefrontConfig::new(format!("http://{addr}"), Duration::from_millis(100));
        let client = StorefrontClient::new(&config).unwrap();
        let handle = SessionRuntime::spawn(test_context(), LoggingTransport::new(client));
        let mut events = handle.subscribe();

        handle.submit_query("hello").await.unwrap();
        let view = tokio::time::timeout(Duration::from_secs(2), handle.wait_until_idle())
            .await
            .expect("timeout should resolve the exchange")
            .unwrap();

        assert_eq!(view.ledger.len(), 2);
        assert_eq!(view.ledger.turns()[0].content, "hello");
        assert_eq!(view.ledger.last().unwrap().content, APOLOGY_MESSAGE);
        assert!(view.last_results.is_empty());
        match events.recv().await.unwrap() {
            SessionEvent::Presented(p) => assert_eq!(p.message, APOLOGY_MESSAGE),
            SessionEvent::Cleared => panic!("expected the fallback presentation"),
        }
    }

    #[tokio::test]
    async fn test_panicking_search_falls_back() {
        let handle = SessionRuntime::spawn(test_context(), PanickingTransport);

        handle.submit_query("hello").await.unwrap();
        let view = tokio::time::timeout(Duration::from_millis(500), handle.wait_until_idle())
            .await
            .expect("session should not stay pending")
            .unwrap();

        assert_eq!(view.ledger.len(), 2);
        assert_eq!(view.ledger.last().unwrap().content, APOLOGY_MESSAGE);

        // Still usable afterwards
        handle.submit_query("again").await.unwrap();
        let view = handle.wait_until_idle().await.unwrap();
        assert_eq!(view.ledger.len(), 4);
        handle.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_error(TransportError::status(500, "boom"));
        transport.queue_response(results("Found it", vec![product(4)]));
        let handle = SessionRuntime::spawn(test_context(), transport.clone());

        handle.submit_query("retinol").await.unwrap();
        handle.wait_until_idle().await.unwrap();
        handle.submit_query("retinol").await.unwrap();
        let view = handle.wait_until_idle().await.unwrap();

        assert_eq!(view.ledger.len(), 4);
        assert_eq!(view.last_message, "Found it");
        // The failed exchange is part of the history sent with the retry
        let requests = transport.recorded_requests();
        assert_eq!(requests[1].conversation_history.len(), 2);
        assert_eq!(requests[1].conversation_history[1].content, APOLOGY_MESSAGE);
    }

    #[tokio::test]
    async fn test_submit_while_pending_is_dropped() {
        let transport = Arc::new(DelayedMockTransport::new(Duration::from_millis(200)));
        transport.queue_response(results("first reply", vec![]));
        transport.queue_response(results("never requested", vec![]));
        let handle = SessionRuntime::spawn(test_context(), transport.clone());

        handle.submit_query("first").await.unwrap();
        transport.request_started.notified().await;

        let second = handle.submit_query("second").await;
        assert_eq!(
            second,
            Err(SessionError::Rejected(TransitionError::ConcurrentRequestRejected))
        );
        assert_eq!(handle.view().ledger.len(), 0);

        let cleared = handle.clear().await;
        assert_eq!(
            cleared,
            Err(SessionError::Rejected(TransitionError::ClearWhilePending))
        );

        let view = handle.wait_until_idle().await.unwrap();
        assert_eq!(view.ledger.len(), 2);
        assert_eq!(view.ledger.turns()[0].content, "first");
        assert_eq!(transport.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_follow_up_flow() {
        let transport = Arc::new(MockTransport::new());
        let mut first = results("Happy to help", vec![]);
        first.response_type = ResponseType::Question;
        first.follow_up_question = Some("What's your skin type?".to_string());
        transport.queue_response(first);
        transport.queue_response(results("For oily skin", vec![product(9)]));
        let handle = SessionRuntime::spawn(test_context(), transport.clone());

        handle.submit_query("moisturizer").await.unwrap();
        let view = handle.wait_until_idle().await.unwrap();
        assert_eq!(view.pending_follow_up, "What's your skin type?");

        handle.select_follow_up().await.unwrap();
        let view = handle.view();
        assert_eq!(view.input, "What's your skin type?");
        // Selecting does not submit
        assert!(view.is_idle());
        assert_eq!(transport.recorded_requests().len(), 1);

        handle.set_input("oily").await.unwrap();
        handle.submit_input().await.unwrap();
        let view = handle.wait_until_idle().await.unwrap();

        assert!(view.pending_follow_up.is_empty());
        assert!(view.input.is_empty());
        assert_eq!(view.ledger.len(), 4);
        let requests = transport.recorded_requests();
        assert_eq!(requests[1].query, "oily");
        assert_eq!(requests[1].conversation_history.len(), 2);
    }

    #[tokio::test]
    async fn test_clear_resets_and_notifies() {
        let transport = Arc::new(MockTransport::new());
        transport.queue_response(results("Here", vec![product(1)]));
        let handle = SessionRuntime::spawn(test_context(), transport);
        let mut events = handle.subscribe();

        handle.submit_query("toner").await.unwrap();
        handle.wait_until_idle().await.unwrap();
        handle.clear().await.unwrap();
        handle.clear().await.unwrap();

        let view = handle.view();
        assert!(view.ledger.is_empty());
        assert!(view.pending_follow_up.is_empty());
        assert!(!view.is_conversation_active);
        assert!(view.last_results.is_empty());

        assert!(matches!(events.recv().await.unwrap(), SessionEvent::Presented(_)));
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Cleared);
        assert_eq!(events.recv().await.unwrap(), SessionEvent::Cleared);
    }

    #[tokio::test]
    async fn test_empty_query_rejected() {
        let transport = Arc::new(MockTransport::new());
        let handle = SessionRuntime::spawn(test_context(), transport.clone());

        let result = handle.submit_query("   ").await;

        assert_eq!(result, Err(SessionError::Rejected(TransitionError::EmptyInput)));
        assert!(handle.view().is_idle());
        assert!(transport.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn test_runtime_stops_when_handles_drop() {
        let (runtime, handle) = SessionRuntime::new(test_context(), MockTransport::new());
        let task = tokio::spawn(runtime.run());

        drop(handle);

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("runtime should stop")
            .unwrap();
    }
}
