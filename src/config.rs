//! Service-provider configuration
//!
//! All records here are plain data loaded by the caller (file, database,
//! metadata refresh job). The sign-on service treats them as immutable for
//! the duration of one HTTP exchange.

use crate::models::IdentityProvider;
use serde::{Deserialize, Serialize};

/// Common-domain-cookie discovery settings.
///
/// When enabled, an unauthenticated request that carries neither a discovery
/// round-trip marker (`r`) nor an explicit IdP choice (`cidp`) is redirected
/// to the local reader endpoint before login initiation starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonDomainCookie {
    pub enabled: bool,
    /// Reader endpoint that inspects the common domain cookie and redirects
    /// back with the discovery marker set.
    pub local_reader_endpoint: String,
}

/// Service-provider configuration consumed by the sign-on service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpConfig {
    /// Entity id of this service provider (the AuthnRequest issuer).
    pub entity_id: String,

    /// Absolute URL of this SP's own sign-on endpoint. Used as the return
    /// target for common-domain-cookie discovery round trips.
    pub sign_on_url: String,

    /// Private signing key in PEM format for the default signer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_key_pem: Option<String>,

    /// Identity providers this SP can send users to.
    pub identity_providers: Vec<IdentityProvider>,

    /// Id of the IdP to use when the request does not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_identity_provider: Option<String>,

    /// Where to send the browser when several IdPs are configured and none
    /// was chosen. Absent means IdP selection is unavailable and initiation
    /// fails hard rather than picking one arbitrarily.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idp_selection_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_domain_cookie: Option<CommonDomainCookie>,
}

impl SpConfig {
    /// Look up an identity provider by id.
    #[must_use]
    pub fn identity_provider(&self, id: &str) -> Option<&IdentityProvider> {
        self.identity_providers.iter().find(|idp| idp.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IdentityProvider, IdpEndpoint, SamlBinding};

    fn config_with_idps(ids: &[&str]) -> SpConfig {
        SpConfig {
            entity_id: "https://sp.example.com".to_string(),
            sign_on_url: "https://sp.example.com/saml/signon".to_string(),
            signing_key_pem: None,
            identity_providers: ids
                .iter()
                .map(|id| IdentityProvider {
                    id: (*id).to_string(),
                    sign_on_endpoints: vec![IdpEndpoint {
                        binding: SamlBinding::Redirect.uri().to_string(),
                        url: format!("https://{id}/sso"),
                        force_protocol_binding: None,
                    }],
                    metadata_sso_endpoints: vec![],
                    force_authn: false,
                    is_passive: false,
                })
                .collect(),
            default_identity_provider: None,
            idp_selection_url: None,
            common_domain_cookie: None,
        }
    }

    #[test]
    fn test_identity_provider_lookup() {
        let config = config_with_idps(&["idp-a", "idp-b"]);
        assert!(config.identity_provider("idp-b").is_some());
        assert!(config.identity_provider("idp-c").is_none());
    }
}
