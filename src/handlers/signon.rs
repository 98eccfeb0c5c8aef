//! Sign-on endpoint handlers
//!
//! Thin glue between the HTTP framework and the sign-on service: the raw
//! request (headers, query, form body) becomes a [`SignOnExchange`]
//! snapshot, and the resulting [`SignOnAction`] becomes a response.

use crate::models::SignOnExchange;
use crate::services::{AssertionHandler, SignOnService};
use crate::session::SessionBridge;
use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared state for the sign-on endpoint.
#[derive(Clone)]
pub struct SignOnState {
    pub service: Arc<SignOnService>,
    pub session: Arc<dyn SessionBridge>,
    pub assertion_handler: Arc<dyn AssertionHandler>,
}

/// Sign-on endpoint, GET side (redirect returns, artifact returns, login
/// initiation).
#[utoipa::path(
    get,
    path = "/saml/signon",
    responses(
        (status = 307, description = "Redirect to IdP, discovery service or selection endpoint"),
        (status = 200, description = "Self-submitting form, SOAP envelope, or completed sign-on"),
        (status = 400, description = "Malformed response"),
        (status = 501, description = "No identity provider could be resolved"),
    ),
    tag = "SAML"
)]
pub async fn sign_on_get(
    State(state): State<SignOnState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    handle(state, headers, query, body).await
}

/// Sign-on endpoint, POST side (form responses and SOAP back-channel).
#[utoipa::path(
    post,
    path = "/saml/signon",
    responses(
        (status = 307, description = "Redirect to IdP, discovery service or selection endpoint"),
        (status = 200, description = "Self-submitting form, SOAP envelope, or completed sign-on"),
        (status = 400, description = "Malformed response"),
        (status = 501, description = "No identity provider could be resolved"),
    ),
    tag = "SAML"
)]
pub async fn sign_on_post(
    State(state): State<SignOnState>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
    body: Bytes,
) -> Response {
    handle(state, headers, query, body).await
}

async fn handle(
    state: SignOnState,
    headers: HeaderMap,
    query: Option<String>,
    body: Bytes,
) -> Response {
    let exchange = build_exchange(&headers, query.as_deref(), &body);
    match state
        .service
        .invoke(&exchange, &*state.session, &*state.assertion_handler)
        .await
    {
        Ok(action) => action.into_response(),
        Err(e) => {
            tracing::error!(error = %e, "sign-on exchange failed");
            e.into_response()
        }
    }
}

/// Snapshot the raw request. Query and form parameters are merged; the
/// SOAP action header is recorded by presence, with a non-UTF-8 value
/// treated as present-but-empty.
fn build_exchange(headers: &HeaderMap, query: Option<&str>, body: &Bytes) -> SignOnExchange {
    let soap_action = headers
        .get("SOAPAction")
        .map(|v| v.to_str().unwrap_or_default().to_string());

    let mut params: HashMap<String, String> = HashMap::new();
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            params.insert(key.into_owned(), value.into_owned());
        }
    }

    let is_form = headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    if is_form {
        for (key, value) in url::form_urlencoded::parse(body) {
            params.insert(key.into_owned(), value.into_owned());
        }
    }

    SignOnExchange {
        soap_action,
        params,
        body: body.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;

    #[test]
    fn test_build_exchange_merges_query_and_form() {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            "application/x-www-form-urlencoded".parse().unwrap(),
        );
        let body = Bytes::from_static(b"SamlResponse=abc&RelayState=ctx");
        let exchange = build_exchange(&headers, Some("cidp=idp-a"), &body);

        assert_eq!(exchange.param("cidp"), Some("idp-a"));
        assert_eq!(exchange.param("SamlResponse"), Some("abc"));
        assert_eq!(exchange.param("RelayState"), Some("ctx"));
        assert!(!exchange.is_soap());
    }

    #[test]
    fn test_build_exchange_detects_empty_soap_action() {
        let mut headers = HeaderMap::new();
        headers.insert("SOAPAction", "".parse().unwrap());
        let exchange = build_exchange(&headers, None, &Bytes::new());
        assert!(exchange.is_soap());
        assert_eq!(exchange.soap_action.as_deref(), Some(""));
    }

    #[test]
    fn test_build_exchange_ignores_non_form_body() {
        let headers = HeaderMap::new();
        let body = Bytes::from_static(b"<soap:Envelope/>");
        let exchange = build_exchange(&headers, None, &body);
        assert!(exchange.params.is_empty());
        assert_eq!(exchange.body, b"<soap:Envelope/>".to_vec());
    }
}
