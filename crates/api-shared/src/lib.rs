//! # API Shared
//!
//! Wire types and helpers shared by the bridge's HTTP surface and its core services.
//!
//! Contains:
//! - Request and response DTOs (`dto` module), annotated for OpenAPI
//! - `HealthService`
//! - Bearer-token extraction from the `Authorization` header
//!
//! Used by `bridge-core`, `api-rest` and the `bridge` CLI.

pub mod auth;
pub mod dto;
pub mod health;

pub use auth::{bearer_token, AuthError};
pub use dto::*;
pub use health::HealthService;

/// RFC 3339 timestamp attached to every response envelope.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
