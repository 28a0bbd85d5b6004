//! HTTP repository and OAuth client against a local stub FHIR server.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use bridge_core::{ClinicalRepository, CoreConfig, HttpRepository, OAuthClient, OAuthSettings};
use bridge_types::BearerToken;
use fhir::ResourceType;
use hl7::Message;
use serde_json::{json, Value};

const TOKEN: &str = "stub-token";
const MESSAGE: &str = "MSH|^~\\&|App|Fac|RApp|RFac|20240101120000||ADT^A01|123456|P|2.5\n\
PID|1||123456||Doe^John||19900101|M\n\
IN1|1|PLAN-1|ACME|Acme Health";

fn authorised(headers: &HeaderMap) -> bool {
    let value = |name: header::HeaderName| headers.get(name).and_then(|v| v.to_str().ok());
    value(header::AUTHORIZATION) == Some("Bearer stub-token")
        && value(header::ACCEPT) == Some("application/fhir+json")
        && value(header::CONTENT_TYPE) == Some("application/fhir+json")
}

async fn search_patient(
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    if !authorised(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorised" })));
    }
    let total = u64::from(params.get("identifier").map(String::as_str) == Some("123456"));
    (
        StatusCode::OK,
        Json(json!({ "resourceType": "Bundle", "type": "searchset", "total": total })),
    )
}

async fn create_patient(headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    if !authorised(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorised" })));
    }
    let mut resource: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    resource["meta"] = json!({ "versionId": "1" });
    (StatusCode::CREATED, Json(resource))
}

async fn reject_coverage() -> impl IntoResponse {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "resourceType": "OperationOutcome", "issue": [{ "severity": "error" }] })),
    )
}

/// Searchset without `total`, as many servers send unless `_total` is requested.
async fn search_without_total(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let entry: Vec<Value> = params
        .get("identifier")
        .filter(|id| id.as_str() == "PLAN-1")
        .map(|id| json!({ "resource": { "resourceType": "Coverage", "id": id } }))
        .into_iter()
        .collect();
    Json(json!({ "resourceType": "Bundle", "type": "searchset", "entry": entry }))
}

async fn broken_search() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn read_patient(Path(id): Path<String>) -> impl IntoResponse {
    Json(json!({ "resourceType": "Patient", "id": id }))
}

async fn authorize_page() -> impl IntoResponse {
    (StatusCode::OK, "<html>sign in</html>")
}

async fn token(headers: HeaderMap, Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
    // "bridge:s3cret" in base64.
    let basic = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if basic != Some("Basic YnJpZGdlOnMzY3JldA==") {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_client" })));
    }
    let form_ok = form.get("grant_type").map(String::as_str) == Some("authorization_code")
        && form.get("client_id").map(String::as_str) == Some("bridge")
        && form.get("redirect_uri").map(String::as_str) == Some("http://localhost:3010/callback");
    if form_ok && form.get("code").map(String::as_str) == Some("good-code") {
        (
            StatusCode::OK,
            Json(json!({ "access_token": "issued", "token_type": "Bearer" })),
        )
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" })))
    }
}

async fn spawn_stub() -> String {
    let router = Router::new()
        .route("/fhir/R4/Patient", get(search_patient).post(create_patient))
        .route("/fhir/R4/Patient/:id", get(read_patient))
        .route("/fhir/R4/Coverage", get(search_without_total).post(reject_coverage))
        .route("/fhir/R4/ServiceRequest", get(broken_search))
        .route("/oauth2/authorize", get(authorize_page))
        .route("/oauth2/token", post(token));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve stub");
    });
    format!("http://{addr}")
}

fn config(server_url: &str) -> Arc<CoreConfig> {
    let oauth = OAuthSettings::new("bridge", "s3cret", "http://localhost:3010/callback")
        .expect("oauth settings");
    Arc::new(CoreConfig::new(server_url, "fhir/R4", Some(oauth)).expect("config"))
}

fn bearer() -> BearerToken {
    BearerToken::new(TOKEN).expect("token")
}

#[tokio::test]
async fn search_reads_bundle_total() {
    let repository = HttpRepository::new(config(&spawn_stub().await)).expect("repository");

    let found = repository
        .search(ResourceType::Patient, &[("identifier", "123456")], &bearer())
        .await;
    assert!(found.response.success);
    assert_eq!(found.response.status, 200);
    assert_eq!(found.total, 1);
    assert!(found.exists());

    let missing = repository
        .search(ResourceType::Patient, &[("identifier", "999")], &bearer())
        .await;
    assert_eq!(missing.total, 0);
    assert!(!missing.exists());
}

#[tokio::test]
async fn search_counts_entries_when_total_is_omitted() {
    let repository = HttpRepository::new(config(&spawn_stub().await)).expect("repository");

    let found = repository
        .search(ResourceType::Coverage, &[("identifier", "PLAN-1")], &bearer())
        .await;
    assert_eq!(found.total, 1);
    assert!(found.exists());

    let missing = repository
        .search(ResourceType::Coverage, &[("identifier", "PLAN-2")], &bearer())
        .await;
    assert_eq!(missing.total, 0);
    assert!(!missing.exists());
}

#[tokio::test]
async fn create_posts_fhir_json_with_bearer_token() {
    let repository = HttpRepository::new(config(&spawn_stub().await)).expect("repository");
    let record = ResourceType::Patient
        .map(&Message::parse(MESSAGE))
        .expect("map patient");

    let created = repository.create(&record, &bearer()).await;
    assert!(created.success, "{created:?}");
    assert_eq!(created.status, 201);
    let data = created.data.expect("data");
    assert_eq!(data["resourceType"], "Patient");
    assert_eq!(data["id"], "123456");
    assert_eq!(data["meta"]["versionId"], "1");
}

#[tokio::test]
async fn non_success_status_carries_remote_body() {
    let repository = HttpRepository::new(config(&spawn_stub().await)).expect("repository");
    let record = ResourceType::Coverage
        .map(&Message::parse(MESSAGE))
        .expect("map coverage");

    let rejected = repository.create(&record, &bearer()).await;
    assert!(!rejected.success);
    assert_eq!(rejected.status, 422);
    assert_eq!(rejected.error.expect("error")["resourceType"], "OperationOutcome");

    let broken = repository
        .search(ResourceType::ServiceRequest, &[("identifier", "x")], &bearer())
        .await;
    assert!(!broken.response.success);
    assert_eq!(broken.response.status, 500);
    assert_eq!(broken.response.error, Some(json!("boom")));
}

#[tokio::test]
async fn wrong_token_is_rejected_by_server() {
    let repository = HttpRepository::new(config(&spawn_stub().await)).expect("repository");
    let other = BearerToken::new("other").expect("token");

    let search = repository
        .search(ResourceType::Patient, &[("identifier", "123456")], &other)
        .await;
    assert!(!search.response.success);
    assert_eq!(search.response.status, 401);
}

#[tokio::test]
async fn read_fetches_instance_and_rejects_bad_ids() {
    let repository = HttpRepository::new(config(&spawn_stub().await)).expect("repository");

    let read = repository.read("Patient", Some("p-1"), &[], &bearer()).await;
    assert!(read.success);
    assert_eq!(read.data.expect("data")["id"], "p-1");

    let bad = repository.read("Patient", Some("../etc"), &[], &bearer()).await;
    assert!(!bad.success);
    assert_eq!(bad.status, 400);

    let bad_type = repository.read("patient", None, &[], &bearer()).await;
    assert_eq!(bad_type.status, 400);
}

#[tokio::test]
async fn type_level_read_passes_query_through() {
    let repository = HttpRepository::new(config(&spawn_stub().await)).expect("repository");
    let query = [("identifier".to_string(), "123456".to_string())];

    let bundle = repository.read("Patient", None, &query, &bearer()).await;
    assert!(bundle.success, "{bundle:?}");
    let data = bundle.data.expect("data");
    assert_eq!(data["resourceType"], "Bundle");
    assert_eq!(data["total"], 1);
}

#[tokio::test]
async fn unreachable_server_is_reported_as_status_500() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let repository =
        HttpRepository::new(config(&format!("http://{addr}"))).expect("repository");
    let search = repository
        .search(ResourceType::Patient, &[("identifier", "123456")], &bearer())
        .await;
    assert!(!search.response.success);
    assert_eq!(search.response.status, 500);
    assert!(search.response.error.expect("error").is_string());
}

#[tokio::test]
async fn exchanges_code_with_basic_client_credentials() {
    let oauth = OAuthClient::new(config(&spawn_stub().await)).expect("oauth client");

    let issued = oauth.exchange_code("good-code").await;
    assert!(issued.success, "{issued:?}");
    assert_eq!(issued.status, 200);
    assert_eq!(issued.data.expect("data")["access_token"], "issued");

    let refused = oauth.exchange_code("stale-code").await;
    assert!(!refused.success);
    assert_eq!(refused.status, 400);
    assert_eq!(refused.error, Some(json!({ "error": "invalid_grant" })));
}

#[tokio::test]
async fn identity_provider_is_contacted_before_redirecting() {
    let oauth = OAuthClient::new(config(&spawn_stub().await)).expect("oauth client");
    let url = oauth.authorization_url(None).expect("authorize url");

    let reached = oauth.contact_provider(&url).await;
    assert!(reached.success, "{reached:?}");
    assert_eq!(reached.status, 200);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let offline = OAuthClient::new(config(&format!("http://{addr}"))).expect("oauth client");
    let url = offline.authorization_url(None).expect("authorize url");
    let unreachable = offline.contact_provider(&url).await;
    assert!(!unreachable.success);
    assert_eq!(unreachable.status, 500);
}
