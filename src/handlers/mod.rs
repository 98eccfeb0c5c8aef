//! HTTP handlers for the sign-on endpoint

pub mod signon;

pub use signon::{sign_on_get, sign_on_post, SignOnState};
