//! Expected-response bookkeeping
//!
//! Every dispatched AuthnRequest registers its correlation id here before
//! the request leaves the service provider, so that inbound responses can
//! be matched to a pending login attempt and replays rejected.

use crate::error::SignOnResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// A registered expectation for one in-flight login attempt.
#[derive(Debug, Clone)]
pub struct ExpectedResponse {
    pub idp_id: String,
    pub registered_at: DateTime<Utc>,
}

/// Registry of request ids awaiting a response.
#[async_trait]
pub trait ExpectedResponses: Send + Sync {
    /// Register a request id before its request is dispatched.
    async fn register(&self, request_id: &str, idp_id: &str) -> SignOnResult<()>;

    /// Consume an expectation, returning it when the id was registered.
    /// A second consume for the same id returns `None`.
    async fn consume(&self, request_id: &str) -> SignOnResult<Option<ExpectedResponse>>;
}

/// In-memory registry for tests and single-node deployments.
#[derive(Debug, Default)]
pub struct InMemoryExpectedResponses {
    pending: RwLock<HashMap<String, ExpectedResponse>>,
}

impl InMemoryExpectedResponses {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpectedResponses for InMemoryExpectedResponses {
    async fn register(&self, request_id: &str, idp_id: &str) -> SignOnResult<()> {
        let expectation = ExpectedResponse {
            idp_id: idp_id.to_string(),
            registered_at: Utc::now(),
        };
        self.pending
            .write()
            .await
            .insert(request_id.to_string(), expectation);
        tracing::debug!(
            request_id = %request_id,
            idp_id = %idp_id,
            "registered expected response"
        );
        Ok(())
    }

    async fn consume(&self, request_id: &str) -> SignOnResult<Option<ExpectedResponse>> {
        Ok(self.pending.write().await.remove(request_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_then_consume_once() {
        let registry = InMemoryExpectedResponses::new();
        registry.register("_req-1", "idp-a").await.unwrap();

        let expectation = registry.consume("_req-1").await.unwrap();
        assert_eq!(expectation.unwrap().idp_id, "idp-a");

        // Second consume finds nothing.
        assert!(registry.consume("_req-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_consume_unknown_id() {
        let registry = InMemoryExpectedResponses::new();
        assert!(registry.consume("_unknown").await.unwrap().is_none());
    }
}
