//! Identity provider records
//!
//! Loaded from external configuration (and metadata refresh), immutable per
//! request.

use crate::models::SamlBinding;
use serde::{Deserialize, Serialize};

/// A single sign-on endpoint at an identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdpEndpoint {
    /// Binding URN as configured. Parsed at dispatch time so that unknown
    /// values fail loudly.
    pub binding: String,

    /// Destination URL for authentication requests.
    pub url: String,

    /// When set, overrides the `ProtocolBinding` hint on the outgoing
    /// AuthnRequest regardless of which transport carries it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_protocol_binding: Option<String>,
}

/// An identity provider this service provider can authenticate against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityProvider {
    pub id: String,

    /// Explicitly configured sign-on endpoints. Takes priority over the
    /// metadata-derived list.
    #[serde(default)]
    pub sign_on_endpoints: Vec<IdpEndpoint>,

    /// SSO endpoints published in the IdP's metadata.
    #[serde(default)]
    pub metadata_sso_endpoints: Vec<IdpEndpoint>,

    /// Always demand fresh authentication from this IdP.
    #[serde(default)]
    pub force_authn: bool,

    /// Never interact with the user at this IdP.
    #[serde(default)]
    pub is_passive: bool,
}

impl IdentityProvider {
    /// Resolve the destination endpoint for a new login attempt.
    ///
    /// Explicit configuration wins; otherwise the metadata SSO endpoint
    /// list is consulted with the Redirect binding as the default lookup
    /// key. Destination resolution is deliberately decoupled from which
    /// binding eventually carries the request — the chosen endpoint's own
    /// declared binding drives transport.
    #[must_use]
    pub fn resolve_sign_on_endpoint(&self) -> Option<&IdpEndpoint> {
        self.sign_on_endpoints.first().or_else(|| {
            self.metadata_sso_endpoints
                .iter()
                .find(|e| e.binding == SamlBinding::Redirect.uri())
        })
    }
}
