//! HL7 v2 message support for the bridge.
//!
//! This crate provides a deliberately small view of pipe-delimited HL7 v2 messages:
//! - a line-oriented [`Message`] made of [`Segment`]s, located by segment id
//! - field (`|`) and component (`^`) access by position
//! - decoding of the JSON object form of a message into raw text
//! - structural validation that lists every defect it finds
//!
//! It does not decode escape sequences, repetitions or nested segment groups.

pub mod constants;
pub mod document;
pub mod message;
pub mod validation;

pub use document::MessageDocument;
pub use message::{Message, Segment};
pub use validation::{validate, ValidationIssue};

/// Errors returned by the `hl7` crate.
#[derive(Debug, thiserror::Error)]
pub enum Hl7Error {
    #[error("{segment} segment not found")]
    MissingSegment { segment: String },

    #[error("invalid message object: {0}")]
    InvalidObject(String),
}

/// Type alias for Results that can fail with an [`Hl7Error`].
pub type Hl7Result<T> = Result<T, Hl7Error>;
