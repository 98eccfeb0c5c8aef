//! Inbound exchange snapshot and outbound transport actions

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
};
use std::collections::HashMap;

/// Snapshot of one inbound HTTP exchange.
///
/// Query and form parameters are merged into a single map; the SOAP action
/// header is kept separate because its mere presence (even with an empty
/// value — some IdPs send the header with no value) selects the
/// back-channel path.
#[derive(Debug, Default, Clone)]
pub struct SignOnExchange {
    /// Value of the `SOAPAction` header when the header was present at all.
    pub soap_action: Option<String>,
    /// Merged query + form parameters.
    pub params: HashMap<String, String>,
    /// Raw request body (the SOAP envelope on the back-channel path).
    pub body: Vec<u8>,
}

impl SignOnExchange {
    /// Look up a parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Whether this exchange arrived on the SOAP back channel.
    #[must_use]
    pub fn is_soap(&self) -> bool {
        self.soap_action.is_some()
    }
}

/// Per-request context store.
///
/// The last-attempted IdP id is written both here and into the session, so
/// callers without session support still see it.
#[derive(Debug, Default)]
pub struct RequestContext {
    values: HashMap<String, String>,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &str, value: String) {
        self.values.insert(key.to_string(), value);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Transport action produced by one pass through the sign-on service.
///
/// Each dispatch branch returns a value instead of performing I/O, keeping
/// the decision logic testable without a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignOnAction {
    /// 302 to the given URL (redirect binding, artifact issuance, discovery).
    Redirect(String),
    /// 200 with a self-submitting HTML form (POST binding).
    HtmlForm(String),
    /// 200 with a `text/xml` SOAP envelope (back-channel reply).
    SoapEnvelope(String),
    /// Assertion handled; control returns to the caller with no body.
    Completed,
}

impl IntoResponse for SignOnAction {
    fn into_response(self) -> Response {
        match self {
            SignOnAction::Redirect(url) => Redirect::temporary(&url).into_response(),
            SignOnAction::HtmlForm(html) => Html(html).into_response(),
            SignOnAction::SoapEnvelope(xml) => (
                [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
                xml,
            )
                .into_response(),
            SignOnAction::Completed => StatusCode::OK.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_soap_header_present_even_when_empty() {
        let exchange = SignOnExchange {
            soap_action: Some(String::new()),
            ..Default::default()
        };
        assert!(exchange.is_soap());

        let exchange = SignOnExchange::default();
        assert!(!exchange.is_soap());
    }

    #[test]
    fn test_redirect_action_renders_as_307() {
        let response =
            SignOnAction::Redirect("https://idp.example.com/sso".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "https://idp.example.com/sso"
        );
    }

    #[test]
    fn test_param_lookup() {
        let mut exchange = SignOnExchange::default();
        exchange
            .params
            .insert("SAMLart".to_string(), "AAQAA...".to_string());
        assert_eq!(exchange.param("SAMLart"), Some("AAQAA..."));
        assert_eq!(exchange.param("SamlResponse"), None);
    }
}
