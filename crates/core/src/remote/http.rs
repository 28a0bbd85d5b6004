use std::sync::Arc;

use api_shared::RemoteResponse;
use async_trait::async_trait;
use bridge_types::BearerToken;
use fhir::{ResourceRecord, ResourceType};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use super::{
    into_envelope, is_valid_id, is_valid_type_name, transport_failure, ClinicalRepository,
    SearchResponse,
};
use crate::constants::{FHIR_JSON, REQUEST_TIMEOUT};
use crate::{CoreConfig, CoreResult};

/// [`ClinicalRepository`] backed by a FHIR R4 REST server.
#[derive(Clone, Debug)]
pub struct HttpRepository {
    client: reqwest::Client,
    cfg: Arc<CoreConfig>,
}

impl HttpRepository {
    pub fn new(cfg: Arc<CoreConfig>) -> CoreResult<Self> {
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client, cfg })
    }

    async fn send(&self, request: reqwest::RequestBuilder, token: &BearerToken) -> RemoteResponse {
        let result = request
            .bearer_auth(token.secret())
            .header(CONTENT_TYPE, FHIR_JSON)
            .header(ACCEPT, FHIR_JSON)
            .send()
            .await;

        match result {
            Ok(response) => into_envelope(response).await,
            Err(err) => {
                tracing::warn!(error = %err, "FHIR server request failed");
                transport_failure(err)
            }
        }
    }
}

#[async_trait]
impl ClinicalRepository for HttpRepository {
    async fn search(
        &self,
        resource_type: ResourceType,
        params: &[(&str, &str)],
        token: &BearerToken,
    ) -> SearchResponse {
        let url = match reqwest::Url::parse_with_params(
            &self.cfg.resource_url(resource_type.as_str()),
            params,
        ) {
            Ok(url) => url,
            Err(err) => return SearchResponse::from_response(transport_failure(err)),
        };
        tracing::debug!(%url, "searching FHIR server");

        let response = self.send(self.client.get(url), token).await;
        SearchResponse::from_response(response)
    }

    async fn create(&self, record: &ResourceRecord, token: &BearerToken) -> RemoteResponse {
        let body = match serde_json::to_vec(record) {
            Ok(body) => body,
            Err(err) => return transport_failure(err),
        };
        let url = self.cfg.resource_url(record.resource_type().as_str());
        tracing::debug!(%url, "creating resource");

        self.send(self.client.post(url).body(body), token).await
    }

    async fn read(
        &self,
        resource_type: &str,
        id: Option<&str>,
        query: &[(String, String)],
        token: &BearerToken,
    ) -> RemoteResponse {
        if !is_valid_type_name(resource_type) || !id.map_or(true, is_valid_id) {
            let target = match id {
                Some(id) => format!("{resource_type}/{id}"),
                None => resource_type.to_string(),
            };
            return RemoteResponse::failed(
                400,
                Value::String(format!("invalid resource reference: {target}")),
            );
        }
        let base = match id {
            Some(id) => self.cfg.resource_instance_url(resource_type, id),
            None => self.cfg.resource_url(resource_type),
        };
        let url = match reqwest::Url::parse_with_params(&base, query) {
            Ok(url) => url,
            Err(err) => return transport_failure(err),
        };
        tracing::debug!(%url, "reading resource");

        self.send(self.client.get(url), token).await
    }
}
