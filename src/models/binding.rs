//! SAML 2.0 transport bindings

/// HTTP-Redirect binding URN
pub const BINDING_HTTP_REDIRECT: &str = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect";

/// HTTP-POST binding URN
pub const BINDING_HTTP_POST: &str = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST";

/// HTTP-Artifact binding URN
pub const BINDING_HTTP_ARTIFACT: &str = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact";

/// Transport binding for exchanging SAML messages.
///
/// Endpoints are configured with binding URIs; dispatch parses them with
/// [`SamlBinding::from_uri`] so that anything unrecognized surfaces as a
/// fatal configuration error instead of being matched loosely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamlBinding {
    Redirect,
    Post,
    Artifact,
}

impl SamlBinding {
    /// The official binding URN.
    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            SamlBinding::Redirect => BINDING_HTTP_REDIRECT,
            SamlBinding::Post => BINDING_HTTP_POST,
            SamlBinding::Artifact => BINDING_HTTP_ARTIFACT,
        }
    }

    /// Parse a binding URN. Returns `None` for unknown values.
    #[must_use]
    pub fn from_uri(uri: &str) -> Option<Self> {
        match uri {
            BINDING_HTTP_REDIRECT => Some(SamlBinding::Redirect),
            BINDING_HTTP_POST => Some(SamlBinding::Post),
            BINDING_HTTP_ARTIFACT => Some(SamlBinding::Artifact),
            _ => None,
        }
    }
}
