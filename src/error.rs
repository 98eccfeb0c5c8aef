//! Sign-on specific error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Result type for sign-on operations
pub type SignOnResult<T> = Result<T, SignOnError>;

/// Errors raised while initiating a login or correlating a response
#[derive(Debug, Error)]
pub enum SignOnError {
    /// Endpoint declares a binding this handler cannot dispatch
    #[error("Invalid endpoint binding: {0}")]
    EndpointBindingInvalid(String),

    /// Identity provider id not present in configuration
    #[error("Unknown identity provider: {0}")]
    IdpNotFound(String),

    /// No identity provider could be resolved and no selection endpoint is
    /// configured. An IdP-picker UI is an external collaborator, so this is
    /// a hard failure rather than a silent default.
    #[error("No identity provider could be resolved for this request")]
    IdpSelectionUnavailable,

    /// The chosen identity provider has no usable sign-on endpoint
    #[error("No sign-on endpoint configured for identity provider: {0}")]
    SignOnEndpointMissing(String),

    /// A required collaborator was not supplied at construction time
    #[error("Missing required collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Request serialization or signing failed
    #[error("Signing failed: {0}")]
    Signing(String),

    /// Malformed, unsigned or expired response surfaced by the
    /// response-processing collaborator
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Back-channel artifact resolution failed
    #[error("Artifact resolution failed: {0}")]
    ArtifactResolution(String),

    /// SOAP back-channel collaborator failed
    #[error("Back-channel error: {0}")]
    Backchannel(String),

    /// Pending-login store operation failed
    #[error("Pending-login store error: {0}")]
    Store(String),

    /// Session bridge operation failed
    #[error("Session error: {0}")]
    Session(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saml_status: Option<String>,
}

impl IntoResponse for SignOnError {
    fn into_response(self) -> Response {
        let (status, error_code, saml_status) = match &self {
            SignOnError::EndpointBindingInvalid(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "endpoint_binding_invalid",
                Some("urn:oasis:names:tc:SAML:2.0:status:Responder"),
            ),
            SignOnError::IdpNotFound(_) => (StatusCode::NOT_FOUND, "idp_not_found", None),
            SignOnError::IdpSelectionUnavailable => (
                StatusCode::NOT_IMPLEMENTED,
                "idp_selection_unavailable",
                None,
            ),
            SignOnError::SignOnEndpointMissing(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "sign_on_endpoint_missing",
                Some("urn:oasis:names:tc:SAML:2.0:status:Responder"),
            ),
            SignOnError::MissingCollaborator(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "missing_collaborator",
                None,
            ),
            SignOnError::Signing(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "signing_failed",
                Some("urn:oasis:names:tc:SAML:2.0:status:Responder"),
            ),
            SignOnError::Protocol(_) => (
                StatusCode::BAD_REQUEST,
                "protocol_error",
                Some("urn:oasis:names:tc:SAML:2.0:status:Requester"),
            ),
            SignOnError::ArtifactResolution(_) => (
                StatusCode::BAD_GATEWAY,
                "artifact_resolution_failed",
                Some("urn:oasis:names:tc:SAML:2.0:status:Responder"),
            ),
            SignOnError::Backchannel(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "backchannel_error",
                Some("urn:oasis:names:tc:SAML:2.0:status:Responder"),
            ),
            SignOnError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "pending_login_store_error",
                None,
            ),
            SignOnError::Session(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "session_error", None)
            }
        };

        let message = match &self {
            SignOnError::Signing(msg) => {
                tracing::error!("sign-on request signing failed: {}", msg);
                "Request signing failed".to_string()
            }
            SignOnError::Store(msg) => {
                tracing::error!("pending-login store error: {}", msg);
                "A store error occurred".to_string()
            }
            SignOnError::Session(msg) => {
                tracing::error!("session bridge error: {}", msg);
                "A session error occurred".to_string()
            }
            SignOnError::Backchannel(msg) => {
                tracing::error!("SOAP back-channel error: {}", msg);
                "A back-channel error occurred".to_string()
            }
            // Safe user-facing messages (contain only configuration ids)
            SignOnError::EndpointBindingInvalid(_)
            | SignOnError::IdpNotFound(_)
            | SignOnError::IdpSelectionUnavailable
            | SignOnError::SignOnEndpointMissing(_)
            | SignOnError::MissingCollaborator(_)
            | SignOnError::Protocol(_)
            | SignOnError::ArtifactResolution(_) => self.to_string(),
        };

        let body = ErrorResponse {
            error: error_code.to_string(),
            message,
            saml_status: saml_status.map(String::from),
        };

        (status, Json(body)).into_response()
    }
}
