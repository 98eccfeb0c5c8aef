//! Pending-login store
//!
//! A keyed, time-bounded store bridging the back-channel artifact round
//! trip: a correlation token is inserted when an artifact is dispatched and
//! consumed when the matching artifact-resolve request arrives. The store is
//! externally owned and may be a distributed cache; this crate only demands
//! atomic get/set at single-key granularity.

use crate::error::SignOnResult;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Grace window for entries inserted with an already-due expiry.
///
/// Artifact dispatch registers its pending entry with the minimum
/// representable timestamp, meaning "insert now, resolve promptly". The
/// in-memory store keeps such placeholders alive for this many seconds
/// after insertion.
pub const PLACEHOLDER_GRACE_SECONDS: i64 = 60;

/// Keyed store for pending-login transaction state.
#[async_trait]
pub trait PendingLoginStore: Send + Sync {
    /// Look up a live entry. Entries past expiry read as absent.
    async fn get(&self, key: &str) -> SignOnResult<Option<Vec<u8>>>;

    /// Insert an entry, replacing any previous entry under the same key.
    async fn set(&self, key: &str, value: Vec<u8>, expires_at: DateTime<Utc>) -> SignOnResult<()>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: Vec<u8>,
    expires_at: DateTime<Utc>,
    inserted_at: DateTime<Utc>,
}

impl Entry {
    fn deadline(&self) -> DateTime<Utc> {
        // Placeholder entries carry an already-due expiry; keep them alive
        // for the grace window from insertion instead.
        self.expires_at
            .max(self.inserted_at + Duration::seconds(PLACEHOLDER_GRACE_SECONDS))
    }
}

/// In-memory pending-login store for tests and single-node deployments.
#[derive(Debug, Default)]
pub struct InMemoryPendingLoginStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryPendingLoginStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PendingLoginStore for InMemoryPendingLoginStore {
    async fn get(&self, key: &str) -> SignOnResult<Option<Vec<u8>>> {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if now <= entry.deadline() => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                tracing::debug!(key = %key, "expired pending-login entry discarded");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Vec<u8>, expires_at: DateTime<Utc>) -> SignOnResult<()> {
        let entry = Entry {
            value,
            expires_at,
            inserted_at: Utc::now(),
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}
