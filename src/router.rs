//! Route definitions

use crate::handlers::{sign_on_get, sign_on_post, SignOnState};
use axum::{routing::get, Router};

/// Create the public sign-on router.
///
/// One endpoint serves every leg of the exchange: login initiation,
/// front-channel returns (redirect/POST), artifact returns and the SOAP
/// back channel.
pub fn sign_on_router(state: SignOnState) -> Router {
    Router::new()
        .route("/saml/signon", get(sign_on_get).post(sign_on_post))
        .with_state(state)
}
