//! # Bridge Core
//!
//! Core services of the HL7 v2 to FHIR bridge:
//! - startup configuration ([`CoreConfig`])
//! - the remote FHIR repository seam ([`ClinicalRepository`]) and its HTTP implementation
//! - the idempotent search-then-create [`SyncOrchestrator`]
//! - the OAuth authorization-code client
//!
//! **No API concerns**: routing, status codes and response envelopes belong in `api-rest`.

pub mod config;
pub mod constants;
pub mod error;
pub mod input;
pub mod oauth;
pub mod remote;
pub mod sync;

pub use config::{CoreConfig, OAuthSettings};
pub use error::{CoreError, CoreResult};
pub use input::message_text;
pub use oauth::OAuthClient;
pub use remote::{ClinicalRepository, HttpRepository, SearchResponse};
pub use sync::{map_all, SyncDecision, SyncOrchestrator};
