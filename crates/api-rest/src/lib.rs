//! # API REST
//!
//! REST surface of the HL7 v2 to FHIR bridge.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (status codes, CORS, response envelopes)
//!
//! Uses `api-shared` for wire types and `bridge-core` for conversion and remote calls.

#![warn(rust_2018_idioms)]

pub mod error;

use std::sync::Arc;

use api_shared::{
    bearer_token, timestamp, AuthorizeQuery, AuthorizeRes, ConversionOutcome, ConvertReq,
    ConvertRes, ErrorRes, HealthRes, HealthService, MethodNotAllowedRes, RemoteResponse,
    ResourceErrorRes, ResourceRes, TokenReq, TokenRes,
};
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use bridge_core::{OAuthClient, SyncOrchestrator};
use bridge_types::BearerToken;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use error::ApiError;

const CONVERSION_REQUESTED: &str = "FHIR insertion requested - see results below";
const RETRIEVAL_FAILED: &str = "Failed to retrieve FHIR resource";

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    pub sync: SyncOrchestrator,
    /// Absent when the process was started without client credentials.
    pub oauth: Option<Arc<OAuthClient>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        convert_hl7_to_fhir,
        read_resource,
        search_resources,
        authorize,
        exchange_token,
    ),
    components(schemas(
        HealthRes,
        ConvertReq,
        ConvertRes,
        ConversionOutcome,
        RemoteResponse,
        ResourceRes,
        ResourceErrorRes,
        MethodNotAllowedRes,
        ErrorRes,
        AuthorizeQuery,
        AuthorizeRes,
        TokenReq,
        TokenRes,
    ))
)]
pub struct ApiDoc;

/// Build the application router with OpenAPI docs and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/convert/hl7-to-fhir", post(convert_hl7_to_fhir))
        .route(
            "/fhir/:resource_type",
            get(search_resources).fallback(fhir_method_not_allowed),
        )
        .route(
            "/fhir/:resource_type/:id",
            get(read_resource).fallback(fhir_method_not_allowed),
        )
        .route("/auth/authorize", get(authorize))
        .route("/auth/oauth", post(exchange_token))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn bearer(headers: &HeaderMap) -> Result<BearerToken, ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    Ok(bearer_token(header)?)
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
#[axum::debug_handler]
async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    post,
    path = "/convert/hl7-to-fhir",
    request_body = ConvertReq,
    responses(
        (status = 200, description = "Per-resource-type results", body = ConvertRes),
        (status = 400, description = "Missing field, invalid message or unmappable message", body = ErrorRes),
        (status = 401, description = "Missing bearer token", body = ErrorRes),
        (status = 500, description = "Unsupported resource type", body = ErrorRes)
    )
)]
/// Convert an HL7 v2 message and synchronise the requested resources with the FHIR server.
///
/// Credentials are checked before the body is parsed. The body is taken as raw bytes so that
/// a missing field is reported by name.
#[axum::debug_handler]
async fn convert_hl7_to_fhir(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ConvertRes>, ApiError> {
    let token = bearer(&headers)?;

    let req: ConvertReq = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidMessage(format!("request body is not valid JSON: {e}")))?;
    let message = req
        .message
        .filter(|m| !m.is_null())
        .ok_or(ApiError::MissingField("message"))?;
    let resource_types = req
        .resource_type
        .filter(|t| !t.trim().is_empty())
        .ok_or(ApiError::MissingField("resourceType"))?;

    let conversion_results = state
        .sync
        .convert(&message, &resource_types, &token)
        .await?;

    Ok(Json(ConvertRes {
        success: true,
        message: CONVERSION_REQUESTED.into(),
        conversion_results,
        timestamp: timestamp(),
    }))
}

#[utoipa::path(
    get,
    path = "/fhir/{resource_type}/{id}",
    params(
        ("resource_type" = String, Path, description = "FHIR resource type, e.g. Patient"),
        ("id" = String, Path, description = "Logical id")
    ),
    responses(
        (status = 200, description = "Remote resource", body = ResourceRes),
        (status = 401, description = "Missing bearer token", body = ErrorRes),
        (status = 405, description = "Only GET is supported", body = MethodNotAllowedRes),
        (status = 404, description = "Failure reported by the FHIR server, with its status", body = ResourceErrorRes)
    )
)]
/// Read one resource from the FHIR server.
#[axum::debug_handler]
async fn read_resource(
    State(state): State<AppState>,
    Path((resource_type, id)): Path<(String, String)>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    proxy(&state, &headers, &resource_type, Some(&id), &query).await
}

#[utoipa::path(
    get,
    path = "/fhir/{resource_type}",
    params(
        ("resource_type" = String, Path, description = "FHIR resource type, e.g. Patient")
    ),
    responses(
        (status = 200, description = "Search bundle from the FHIR server", body = ResourceRes),
        (status = 401, description = "Missing bearer token", body = ErrorRes),
        (status = 405, description = "Only GET is supported", body = MethodNotAllowedRes),
        (status = 404, description = "Failure reported by the FHIR server, with its status", body = ResourceErrorRes)
    )
)]
/// Search a resource type on the FHIR server; query parameters are forwarded unchanged.
#[axum::debug_handler]
async fn search_resources(
    State(state): State<AppState>,
    Path(resource_type): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    proxy(&state, &headers, &resource_type, None, &query).await
}

/// Forward a GET to the FHIR server and answer with the remote status.
async fn proxy(
    state: &AppState,
    headers: &HeaderMap,
    resource_type: &str,
    id: Option<&str>,
    query: &[(String, String)],
) -> Result<Response, ApiError> {
    let token = bearer(headers)?;
    let response = state
        .sync
        .repository()
        .read(resource_type, id, query, &token)
        .await;
    let status =
        StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if response.success {
        let body = ResourceRes {
            success: true,
            data: response.data.unwrap_or_default(),
            timestamp: timestamp(),
        };
        return Ok((status, Json(body)).into_response());
    }

    tracing::warn!(%status, resource_type, "FHIR resource retrieval failed");
    let body = ResourceErrorRes {
        success: false,
        error: RETRIEVAL_FAILED.into(),
        message: response.error.unwrap_or_default(),
        timestamp: timestamp(),
    };
    Ok((status, Json(body)).into_response())
}

/// The proxy is read-only.
async fn fhir_method_not_allowed(method: Method) -> impl IntoResponse {
    let body = MethodNotAllowedRes {
        success: false,
        message: format!(
            "{method} requests to FHIR resources are not supported. This endpoint only supports \
             GET requests for read-only access to FHIR resources."
        ),
        timestamp: timestamp(),
    };
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "GET")],
        Json(body),
    )
}

#[utoipa::path(
    get,
    path = "/auth/authorize",
    params(("state" = Option<String>, Query, description = "Opaque value echoed back by the identity provider")),
    responses(
        (status = 200, description = "Identity provider authorize URL", body = AuthorizeRes),
        (status = 500, description = "OAuth is not configured", body = ErrorRes),
        (status = 502, description = "Identity provider unreachable", body = ErrorRes)
    )
)]
#[axum::debug_handler]
async fn authorize(
    State(state): State<AppState>,
    Query(query): Query<AuthorizeQuery>,
) -> Result<Json<AuthorizeRes>, ApiError> {
    let oauth = oauth_client(&state)?;
    let redirect_url = oauth
        .authorization_url(query.state.as_deref())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let provider = oauth.contact_provider(&redirect_url).await;
    if !provider.success {
        let detail = provider
            .error
            .map(|e| match e {
                serde_json::Value::String(text) => text,
                other => other.to_string(),
            })
            .unwrap_or_default();
        return Err(ApiError::Upstream {
            status: StatusCode::BAD_GATEWAY.as_u16(),
            error: "OAuth2 Request Failed",
            message: format!("Failed to connect to OAuth2 server: {detail}"),
        });
    }

    Ok(Json(AuthorizeRes {
        success: true,
        message: "Authorization initiated".into(),
        redirect_url,
        timestamp: timestamp(),
    }))
}

#[utoipa::path(
    post,
    path = "/auth/oauth",
    request_body = TokenReq,
    responses(
        (status = 200, description = "Tokens issued", body = TokenRes),
        (status = 400, description = "Authorization failed, code missing or body not JSON", body = ErrorRes),
        (status = 500, description = "OAuth is not configured", body = ErrorRes)
    )
)]
/// Exchange the authorization code relayed from the identity provider for tokens.
///
/// An empty body reads as no fields, so it is reported as a missing code.
#[axum::debug_handler]
async fn exchange_token(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<TokenRes>, ApiError> {
    let req: TokenReq = if body.iter().all(u8::is_ascii_whitespace) {
        TokenReq::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::OAuthRejected {
            error: "Invalid Request Body",
            message: format!("request body is not valid JSON: {e}"),
        })?
    };
    if let Some(error) = req.error.filter(|e| !e.is_empty()) {
        return Err(ApiError::OAuthRejected {
            error: "OAuth Authorization Failed",
            message: format!("OAuth error: {error}"),
        });
    }
    let code = req
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::OAuthRejected {
            error: "Missing Authorization Code",
            message: "Authorization code is required for OAuth flow".into(),
        })?;

    let oauth = oauth_client(&state)?;
    let response = oauth.exchange_code(&code).await;
    if !response.success {
        let detail = response
            .error
            .map(|e| e.to_string())
            .unwrap_or_default();
        return Err(ApiError::Upstream {
            status: response.status,
            error: "Token Exchange Failed",
            message: format!(
                "Failed to exchange authorization code for access token: {detail}"
            ),
        });
    }

    Ok(Json(TokenRes {
        success: true,
        message: "OAuth authorization completed successfully".into(),
        authorization_code: code,
        state: req.state,
        token_data: response.data.unwrap_or_default(),
        timestamp: timestamp(),
    }))
}

fn oauth_client(state: &AppState) -> Result<&OAuthClient, ApiError> {
    state
        .oauth
        .as_deref()
        .ok_or_else(|| ApiError::Internal("OAuth client is not configured".into()))
}
