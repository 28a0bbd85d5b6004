//! FHIR R4-shaped resources produced from HL7 v2 messages.
//!
//! This crate provides:
//! - code translators from HL7 table values to FHIR vocabulary ([`codes`])
//! - the wire models for the supported resources (Patient, Coverage, ServiceRequest)
//! - one mapper per resource type, each locating its governing segment in a [`hl7::Message`]
//! - [`ResourceType`] / [`ResourceRecord`], the closed set of supported resources and the
//!   tagged union of their mapped forms
//!
//! Structural shape only: no profile or terminology validation is performed.

pub mod codes;
pub mod coverage;
pub mod datatypes;
pub mod patient;
pub mod record;
pub mod service_request;

pub use coverage::Coverage;
pub use patient::Patient;
pub use record::{ResourceRecord, ResourceType};
pub use service_request::ServiceRequest;

/// Errors returned by the `fhir` mapping crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    /// A governing segment is absent; no meaningful resource can be built.
    #[error(transparent)]
    Hl7(#[from] hl7::Hl7Error),

    /// A governing segment is present but a field every resource depends on is blank.
    #[error("{field} not found in {segment} segment")]
    MissingField { segment: String, field: String },

    #[error("invalid resource type: {0}")]
    InvalidResourceType(String),

    #[error("failed to serialise resource: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FhirError {
    /// True for errors caused by the message content rather than the request or the runtime.
    pub fn is_malformed_message(&self) -> bool {
        matches!(self, FhirError::Hl7(_) | FhirError::MissingField { .. })
    }
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
