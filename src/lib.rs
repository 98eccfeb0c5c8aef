//! Service-provider side of a SAML 2.0 single sign-on exchange.
//!
//! This crate provides the protocol dispatch and session correlation logic
//! of SP-initiated SSO:
//! - login initiation: IdP selection, binding selection (Redirect, POST,
//!   Artifact), request construction, signing and dispatch
//! - response correlation: SOAP back-channel handling, artifact resolution,
//!   direct response processing and completion-callback invocation
//! - one-shot session overrides and a pending-login store bridging the
//!   artifact round trip
//!
//! XML signature verification, response parsing, SOAP message construction
//! and metadata parsing are consumed through collaborator traits; see
//! [`services::collaborators`].

pub mod cache;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod session;

pub use cache::{InMemoryPendingLoginStore, PendingLoginStore};
pub use config::{CommonDomainCookie, SpConfig};
pub use error::{SignOnError, SignOnResult};
pub use handlers::SignOnState;
pub use models::{
    AuthnRequest, IdentityProvider, IdpEndpoint, RequestContext, SamlBinding, SignOnAction,
    SignOnExchange, ValidatedAssertion,
};
pub use router::sign_on_router;
pub use services::{
    AssertionHandler, ExpectedResponses, InMemoryExpectedResponses, OpensslSigner,
    ResponseProcessor, SignOnService, SignOnServiceBuilder, SigningService, SoapBackchannel,
    SoapOutcome,
};
pub use session::{InMemorySessionBridge, SessionBridge};
