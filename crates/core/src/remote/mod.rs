//! Remote FHIR repository: the seam between the orchestrator and the FHIR server.
//!
//! Every call resolves to a [`RemoteResponse`] envelope rather than an error. Transport failures
//! and non-2xx replies are data the caller reports back per resource type.

mod http;

pub use http::HttpRepository;

use api_shared::RemoteResponse;
use async_trait::async_trait;
use bridge_types::BearerToken;
use fhir::{ResourceRecord, ResourceType};
use serde_json::Value;

use crate::constants::TRANSPORT_FAILURE_STATUS;

/// Search result together with the number of matches it reports.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchResponse {
    pub response: RemoteResponse,
    pub total: u64,
}

impl SearchResponse {
    /// Wrap a search envelope, counting the matches in the returned bundle.
    ///
    /// `Bundle.total` is optional on searchset bundles, so the `entry` count is used when the
    /// server leaves it out.
    pub fn from_response(response: RemoteResponse) -> Self {
        let total = match response.data.as_ref() {
            Some(bundle) if response.success => bundle_total(bundle),
            _ => 0,
        };
        Self { response, total }
    }

    pub fn exists(&self) -> bool {
        self.response.success && self.total > 0
    }
}

fn bundle_total(bundle: &Value) -> u64 {
    bundle
        .get("total")
        .and_then(Value::as_u64)
        .or_else(|| {
            bundle
                .get("entry")
                .and_then(Value::as_array)
                .map(|entries| entries.len() as u64)
        })
        .unwrap_or(0)
}

#[async_trait]
pub trait ClinicalRepository: Send + Sync {
    /// Type-level search, e.g. `Patient?identifier=123456`.
    async fn search(
        &self,
        resource_type: ResourceType,
        params: &[(&str, &str)],
        token: &BearerToken,
    ) -> SearchResponse;

    /// Create `record` at its type endpoint.
    async fn create(&self, record: &ResourceRecord, token: &BearerToken) -> RemoteResponse;

    /// Fetch one resource by type name and logical id, or run a type-level search when `id` is
    /// absent. `query` is appended to the URL unchanged.
    async fn read(
        &self,
        resource_type: &str,
        id: Option<&str>,
        query: &[(String, String)],
        token: &BearerToken,
    ) -> RemoteResponse;
}

/// Envelope for a call that failed before the server answered.
pub(crate) fn transport_failure(err: impl std::fmt::Display) -> RemoteResponse {
    RemoteResponse::failed(TRANSPORT_FAILURE_STATUS, Value::String(err.to_string()))
}

/// Turn an HTTP reply into an envelope. The body is kept as JSON when it parses, else as text.
pub(crate) async fn into_envelope(response: reqwest::Response) -> RemoteResponse {
    let status = response.status();
    let body = match response.text().await {
        Ok(body) => body,
        Err(err) => return transport_failure(err),
    };
    let body = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };

    if status.is_success() {
        RemoteResponse::ok(status.as_u16(), body)
    } else {
        RemoteResponse::failed(status.as_u16(), body)
    }
}

/// FHIR resource type names are bare ASCII words starting with an upper-case letter.
pub fn is_valid_type_name(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphabetic())
}

/// FHIR logical ids: 1 to 64 characters from `[A-Za-z0-9-.]`.
pub fn is_valid_id(id: &str) -> bool {
    (1..=64).contains(&id.len())
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}
