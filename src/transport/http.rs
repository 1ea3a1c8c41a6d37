//! reqwest-backed client for the storefront backend

use super::types::{AskRequest, AskResponse, CategoriesBody, Product};
use super::types::{SearchRequest, SearchResponse};
use super::{SearchTransport, TransportError};
use crate::config::StorefrontConfig;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Error bodies can be whole HTML pages; keep logs readable
const MAX_ERROR_BODY: usize = 512;

/// HTTP client for search, product questions and catalog reads
#[derive(Debug, Clone)]
pub struct StorefrontClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl StorefrontClient {
    pub fn new(config: &StorefrontConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .connect_timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            timeout: config.request_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send with the per-request bound and decode a 2xx JSON body
    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = request
            .timeout(self.timeout)
            .header("Accept", "application/json")
            .header("Cache-Control", "no-cache")
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout
            } else {
                TransportError::network(format!("Failed to read response: {e}"))
            }
        })?;

        if !status.is_success() {
            return Err(TransportError::status(status.as_u16(), truncate(&body)));
        }

        serde_json::from_str(&body).map_err(|e| TransportError::decode(e.to_string()))
    }

    /// Single-turn product question, no conversation history
    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, TransportError> {
        self.execute(self.client.post(self.url("/api/ask")).json(request)).await
    }

    pub async fn products(&self) -> Result<Vec<Product>, TransportError> {
        self.execute(self.client.get(self.url("/api/products"))).await
    }

    pub async fn product(&self, id: i64) -> Result<Product, TransportError> {
        self.execute(self.client.get(self.url(&format!("/api/products/{id}")))).await
    }

    pub async fn categories(&self) -> Result<Vec<String>, TransportError> {
        let body: CategoriesBody = self
            .execute(self.client.get(self.url("/api/categories")))
            .await?;
        Ok(body.into_vec())
    }

    pub async fn health(&self) -> Result<serde_json::Value, TransportError> {
        self.execute(self.client.get(self.url("/api/health"))).await
    }
}

#[async_trait]
impl SearchTransport for StorefrontClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, TransportError> {
        self.execute(self.client.post(self.url("/api/search")).json(request)).await
    }

    fn name(&self) -> &str {
        &self.base_url
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX_ERROR_BODY).collect();
        format!("{head}...")
    }
}
