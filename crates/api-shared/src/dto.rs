//! JSON request and response bodies for the bridge's HTTP surface.
//!
//! Field names follow the camelCase wire format clients already send and expect.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Body of `POST /convert/hl7-to-fhir`.
///
/// Both fields are optional at the type level so that a missing field is reported as a 400
/// with the field name rather than a generic deserialisation failure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertReq {
    /// Raw HL7 v2 text, or an object of the form `{ "segments": [{ "segmentType", "fields" }] }`.
    #[schema(value_type = Option<Object>)]
    pub message: Option<Value>,
    /// Comma-separated list such as `"Patient,Coverage"`.
    #[schema(example = "Patient,Coverage,ServiceRequest")]
    pub resource_type: Option<String>,
}

/// Result of one remote call, passed through to the client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RemoteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub error: Option<Value>,
    pub status: u16,
}

impl RemoteResponse {
    pub fn ok(status: u16, data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status,
        }
    }

    pub fn failed(status: u16, error: Value) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            status,
        }
    }
}

/// Per-resource-type entry of `conversionResults`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOutcome {
    pub resource_type: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub error: Option<Value>,
    pub status: u16,
    /// Set when the resource was found on the server and no create was issued.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_found: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ConversionOutcome {
    /// Outcome of a create (or failed search/create) for `resource_type`.
    pub fn from_remote(resource_type: impl Into<String>, response: RemoteResponse) -> Self {
        Self {
            resource_type: resource_type.into(),
            success: response.success,
            data: response.data,
            error: response.error,
            status: response.status,
            existed: None,
            total_found: None,
            message: None,
        }
    }

    /// Outcome for a resource the server already holds.
    pub fn existing(resource_type: impl Into<String>, status: u16, total_found: u64) -> Self {
        Self {
            resource_type: resource_type.into(),
            success: true,
            data: None,
            error: None,
            status,
            existed: Some(true),
            total_found: Some(total_found),
            message: Some("Resource already exists, not created".into()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRes {
    pub success: bool,
    pub message: String,
    pub conversion_results: Vec<ConversionOutcome>,
    pub timestamp: String,
}

/// Error envelope shared by every endpoint.
///
/// `error` is a string for most failures and a list of validation issues when the message
/// failed structural validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[schema(value_type = Object)]
    pub error: Value,
    pub timestamp: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthorizeQuery {
    pub state: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizeRes {
    pub success: bool,
    pub message: String,
    pub redirect_url: String,
    pub timestamp: String,
}

/// Body of `POST /auth/oauth`, as relayed from the identity provider's redirect.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TokenReq {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenRes {
    pub success: bool,
    pub message: String,
    pub authorization_code: String,
    pub state: Option<String>,
    #[schema(value_type = Object)]
    pub token_data: Value,
    pub timestamp: String,
}

/// Successful reply of the `/fhir` proxy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResourceRes {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: Value,
    pub timestamp: String,
}

/// Failed reply of the `/fhir` proxy. `message` carries the FHIR server's error body as sent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ResourceErrorRes {
    pub success: bool,
    pub error: String,
    #[schema(value_type = Object)]
    pub message: Value,
    pub timestamp: String,
}

/// Reply to a method other than GET on the `/fhir` proxy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MethodNotAllowedRes {
    pub success: bool,
    pub message: String,
    pub timestamp: String,
}
