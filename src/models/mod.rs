//! Data model for the sign-on exchange

pub mod assertion;
pub mod authn_request;
pub mod binding;
pub mod exchange;
pub mod identity_provider;

pub use assertion::ValidatedAssertion;
pub use authn_request::AuthnRequest;
pub use binding::SamlBinding;
pub use exchange::{RequestContext, SignOnAction, SignOnExchange};
pub use identity_provider::{IdentityProvider, IdpEndpoint};
