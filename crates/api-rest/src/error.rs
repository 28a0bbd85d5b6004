//! Mapping of bridge failures onto HTTP responses.

use api_shared::{timestamp, AuthError, ErrorRes};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bridge_core::CoreError;
use fhir::FhirError;
use hl7::ValidationIssue;
use serde_json::{json, Value};

pub const PROCESSING_FAILED: &str = "Failed to process HL7 v2 message.";
pub const INVALID_RESOURCE_TYPE: &str =
    "Invalid Resource Type. Resource Type is not a valid FHIR R4 resource type.";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    InvalidMessage(String),
    #[error("message failed validation")]
    Validation(Vec<ValidationIssue>),
    /// A mapper could not find a required segment or field.
    #[error("{0}")]
    MissingSegment(String),
    #[error("unknown resource type: {0}")]
    InvalidResourceType(String),
    /// OAuth flow rejected before any upstream call.
    #[error("{error}: {message}")]
    OAuthRejected {
        error: &'static str,
        message: String,
    },
    /// The FHIR server or identity provider answered with a failure.
    #[error("{error}: {message}")]
    Upstream {
        status: u16,
        error: &'static str,
        message: String,
    },
    #[error("{0}")]
    Internal(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(issues) => ApiError::Validation(issues),
            CoreError::InvalidInput(message) => ApiError::InvalidMessage(message),
            CoreError::Fhir(FhirError::InvalidResourceType(name)) => {
                ApiError::InvalidResourceType(name)
            }
            CoreError::Fhir(err) if err.is_malformed_message() => {
                ApiError::MissingSegment(err.to_string())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::MissingField(_)
            | ApiError::InvalidMessage(_)
            | ApiError::Validation(_)
            | ApiError::MissingSegment(_)
            | ApiError::OAuthRejected { .. } => StatusCode::BAD_REQUEST,
            ApiError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ApiError::InvalidResourceType(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The `(message, error)` pair of the response envelope.
    fn envelope(self) -> (Option<String>, Value) {
        match self {
            ApiError::Validation(issues) => (Some(PROCESSING_FAILED.into()), json!(issues)),
            ApiError::MissingSegment(detail) | ApiError::InvalidMessage(detail) => {
                (Some(PROCESSING_FAILED.into()), json!(detail))
            }
            ApiError::InvalidResourceType(name) => (
                Some(format!("Unsupported resource type: {name}")),
                json!(INVALID_RESOURCE_TYPE),
            ),
            ApiError::OAuthRejected { error, message } | ApiError::Upstream { error, message, .. } => {
                (Some(message), json!(error))
            }
            ApiError::Internal(_) => (None, json!("Internal server error")),
            other => (None, json!(other.to_string())),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, error = %self, "request failed");
        } else {
            tracing::warn!(%status, error = %self, "request rejected");
        }

        let (message, error) = self.envelope();
        let body = ErrorRes {
            success: false,
            message,
            error,
            timestamp: timestamp(),
        };
        (status, Json(body)).into_response()
    }
}
