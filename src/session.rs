//! Caller-owned session bridge
//!
//! Small pieces of cross-request state (last-attempted IdP id, one-shot
//! force-authn / is-passive overrides, post-login redirect target) live in a
//! session abstraction the caller supplies. Override keys have one-shot
//! semantics: read once, then cleared.

use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Session keys used by the sign-on service.
pub mod keys {
    /// Last-attempted identity provider id.
    pub const IDP_ID: &str = "IdpId";
    /// One-shot force-authn override for the next login attempt.
    pub const FORCE_AUTHN: &str = "IdpForceAuthn";
    /// One-shot is-passive override for the next login attempt.
    pub const IS_PASSIVE: &str = "IdpIsPassive";
    /// Post-login redirect target.
    pub const RETURN_URL: &str = "ReturnUrl";
}

/// String mapping backed by the caller's session mechanism.
#[async_trait]
pub trait SessionBridge: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;

    async fn set(&self, key: &str, value: String);

    /// Remove a key, returning its previous value.
    async fn remove(&self, key: &str) -> Option<String>;
}

/// Read a one-shot tri-state override and clear it.
///
/// The key is removed even when the stored value is `false`: presence of
/// the key only matters for the initial check, never afterwards. Values
/// that parse as neither true nor false read as unset (but are still
/// cleared).
pub async fn take_override(session: &dyn SessionBridge, key: &str) -> Option<bool> {
    let raw = session.remove(key).await?;
    match raw.as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

/// In-memory session bridge for tests and single-node deployments.
#[derive(Debug, Default)]
pub struct InMemorySessionBridge {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySessionBridge {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionBridge for InMemorySessionBridge {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: String) {
        self.values.write().await.insert(key.to_string(), value);
    }

    async fn remove(&self, key: &str) -> Option<String> {
        self.values.write().await.remove(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_remove() {
        let session = InMemorySessionBridge::new();
        session.set(keys::IDP_ID, "idp-a".to_string()).await;
        assert_eq!(session.get(keys::IDP_ID).await.as_deref(), Some("idp-a"));
        assert_eq!(session.remove(keys::IDP_ID).await.as_deref(), Some("idp-a"));
        assert!(session.get(keys::IDP_ID).await.is_none());
    }

    #[tokio::test]
    async fn test_take_override_clears_true() {
        let session = InMemorySessionBridge::new();
        session.set(keys::FORCE_AUTHN, "true".to_string()).await;

        assert_eq!(take_override(&session, keys::FORCE_AUTHN).await, Some(true));
        assert!(session.get(keys::FORCE_AUTHN).await.is_none());
        assert_eq!(take_override(&session, keys::FORCE_AUTHN).await, None);
    }

    #[tokio::test]
    async fn test_take_override_clears_even_when_false() {
        let session = InMemorySessionBridge::new();
        session.set(keys::IS_PASSIVE, "false".to_string()).await;

        assert_eq!(take_override(&session, keys::IS_PASSIVE).await, Some(false));
        assert!(session.get(keys::IS_PASSIVE).await.is_none());
    }

    #[tokio::test]
    async fn test_take_override_unparsable_reads_unset_but_clears() {
        let session = InMemorySessionBridge::new();
        session.set(keys::FORCE_AUTHN, "maybe".to_string()).await;

        assert_eq!(take_override(&session, keys::FORCE_AUTHN).await, None);
        assert!(session.get(keys::FORCE_AUTHN).await.is_none());
    }
}
