//! External collaborator seams
//!
//! SOAP message construction, artifact resolution, response XML parsing and
//! signature verification all live outside this crate and are consumed
//! through these narrow interfaces.

use crate::cache::PendingLoginStore;
use crate::config::SpConfig;
use crate::error::SignOnResult;
use crate::models::{AuthnRequest, ValidatedAssertion};
use crate::session::SessionBridge;
use async_trait::async_trait;

/// Outcome of handling an inbound SOAP envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoapOutcome {
    /// Envelope to write back on the back channel as `text/xml`.
    Envelope(String),
    /// The envelope carried a response; login was completed through the
    /// assertion handler.
    Completed,
}

/// Back-channel SOAP collaborator.
///
/// Covers both directions of the artifact binding: issuing an artifact for
/// an outbound request and resolving / handling inbound envelopes.
#[async_trait]
pub trait SoapBackchannel: Send + Sync {
    /// Handle an inbound SOAP envelope containing either an artifact-resolve
    /// request or a direct response.
    async fn handle_soap(
        &self,
        body: &[u8],
        config: &SpConfig,
        on_assertion: &dyn AssertionHandler,
        cache: &dyn PendingLoginStore,
        session: &dyn SessionBridge,
    ) -> SignOnResult<SoapOutcome>;

    /// Resolve an artifact at the identity provider's resolution service.
    ///
    /// This is the only operation in a sign-on exchange that blocks on
    /// outbound I/O. No timeout is imposed here; cancellation propagates
    /// from the outer exchange.
    async fn resolve_artifact(
        &self,
        artifact: &str,
        relay_state: Option<&str>,
        config: &SpConfig,
    ) -> SignOnResult<Vec<u8>>;

    /// Issue an artifact for an outbound request and return the
    /// front-channel redirect URL.
    ///
    /// Signing and encoding of the artifact payload happen here, not in the
    /// dispatcher. The implementation must register the pending-login entry
    /// (token to transaction state, already-due placeholder expiry) before
    /// returning.
    async fn issue_artifact(
        &self,
        request: &AuthnRequest,
        config: &SpConfig,
        relay_state: Option<&str>,
        cache: &dyn PendingLoginStore,
    ) -> SignOnResult<String>;
}

/// Response-processing collaborator.
///
/// Fails with a protocol error when the response is malformed, unsigned,
/// expired, or fails signature / condition checks. This crate never
/// swallows that error.
#[async_trait]
pub trait ResponseProcessor: Send + Sync {
    async fn handle_response(
        &self,
        config: &SpConfig,
        raw_response: &str,
        session: &dyn SessionBridge,
        cache: &dyn PendingLoginStore,
    ) -> SignOnResult<ValidatedAssertion>;
}

/// Completion callback invoked once a validated assertion has arrived.
///
/// How "logged in" is represented downstream is deliberately left to the
/// caller; this crate only reports that an assertion arrived and for which
/// subject and session index.
#[async_trait]
pub trait AssertionHandler: Send + Sync {
    async fn complete(&self, assertion: &ValidatedAssertion) -> SignOnResult<()>;
}
