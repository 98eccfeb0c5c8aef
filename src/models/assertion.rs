//! Validated assertion summary

/// The outcome of response processing, handed to the completion callback.
///
/// Produced by the external response-processing collaborator after
/// signature and condition checks; this crate only logs it and forwards it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAssertion {
    /// Subject identifier (NameID value).
    pub subject: String,
    /// Subject format URN.
    pub subject_format: String,
    /// Session index at the identity provider, when present.
    pub session_index: Option<String>,
}
