//! Outgoing authentication request

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A SAML 2.0 AuthnRequest under construction.
///
/// Created fresh per login attempt, mutated only while the sign-on service
/// configures it, never reused.
#[derive(Debug, Clone)]
pub struct AuthnRequest {
    /// Correlation id, also used for expected-response bookkeeping.
    pub id: String,
    /// Entity id of the issuing service provider.
    pub issuer: String,
    /// Destination URL at the identity provider.
    pub destination: String,
    /// Binding the IdP should use for its response, when forced.
    pub protocol_binding: Option<String>,
    pub force_authn: bool,
    pub is_passive: bool,
    pub issue_instant: DateTime<Utc>,
}

impl AuthnRequest {
    /// Create a request with a fresh correlation id and issue instant.
    ///
    /// SAML ids must not start with a digit, hence the underscore prefix.
    #[must_use]
    pub fn new(issuer: &str) -> Self {
        Self {
            id: format!("_{}", Uuid::new_v4()),
            issuer: issuer.to_string(),
            destination: String::new(),
            protocol_binding: None,
            force_authn: false,
            is_passive: false,
            issue_instant: Utc::now(),
        }
    }

    /// Serialize to AuthnRequest XML.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let issue_instant = self.issue_instant.format("%Y-%m-%dT%H:%M:%SZ").to_string();

        let mut xml = String::new();
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<samlp:AuthnRequest xmlns:samlp=\"urn:oasis:names:tc:SAML:2.0:protocol\"\n");
        xml.push_str("    xmlns:saml=\"urn:oasis:names:tc:SAML:2.0:assertion\"\n");
        xml.push_str("    ID=\"");
        xml.push_str(&xml_escape(&self.id));
        xml.push_str("\"\n    Version=\"2.0\"\n    IssueInstant=\"");
        xml.push_str(&issue_instant);
        xml.push_str("\"\n    Destination=\"");
        xml.push_str(&xml_escape(&self.destination));
        xml.push('"');
        if let Some(binding) = &self.protocol_binding {
            xml.push_str("\n    ProtocolBinding=\"");
            xml.push_str(&xml_escape(binding));
            xml.push('"');
        }
        xml.push_str("\n    ForceAuthn=\"");
        xml.push_str(if self.force_authn { "true" } else { "false" });
        xml.push_str("\"\n    IsPassive=\"");
        xml.push_str(if self.is_passive { "true" } else { "false" });
        xml.push_str("\">\n    <saml:Issuer>");
        xml.push_str(&xml_escape(&self.issuer));
        xml.push_str("</saml:Issuer>\n</samlp:AuthnRequest>");

        xml
    }
}

/// XML escape for attribute and text content
pub(crate) fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_request_has_prefixed_id() {
        let request = AuthnRequest::new("https://sp.example.com");
        assert!(request.id.starts_with('_'));
        assert!(request.id.len() > 1);
    }

    #[test]
    fn test_to_xml_contains_flags_and_issuer() {
        let mut request = AuthnRequest::new("https://sp.example.com");
        request.destination = "https://idp.example.com/sso".to_string();
        request.force_authn = true;

        let xml = request.to_xml();
        assert!(xml.contains("ForceAuthn=\"true\""));
        assert!(xml.contains("IsPassive=\"false\""));
        assert!(xml.contains("<saml:Issuer>https://sp.example.com</saml:Issuer>"));
        assert!(xml.contains("Destination=\"https://idp.example.com/sso\""));
        assert!(!xml.contains("ProtocolBinding"));
    }

    #[test]
    fn test_to_xml_protocol_binding_hint() {
        let mut request = AuthnRequest::new("https://sp.example.com");
        request.protocol_binding =
            Some("urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST".to_string());
        let xml = request.to_xml();
        assert!(xml.contains("ProtocolBinding=\"urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST\""));
    }

    #[test]
    fn test_xml_escape_in_destination() {
        let mut request = AuthnRequest::new("https://sp.example.com");
        request.destination = "https://idp.example.com/sso?a=1&b=2".to_string();
        let xml = request.to_xml();
        assert!(xml.contains("a=1&amp;b=2"));
    }
}
