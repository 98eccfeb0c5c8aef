//! Sign-on services

pub mod collaborators;
pub mod expected_responses;
pub mod signer;
pub mod signon;

pub use collaborators::{AssertionHandler, ResponseProcessor, SoapBackchannel, SoapOutcome};
pub use expected_responses::{ExpectedResponse, ExpectedResponses, InMemoryExpectedResponses};
pub use signer::{OpensslSigner, SigningService};
pub use signon::{SignOnService, SignOnServiceBuilder};
