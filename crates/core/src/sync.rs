//! Idempotent synchronisation of mapped records with the remote FHIR server.
//!
//! For each requested resource type, in request order: search by identifier, skip the create
//! when the server already holds a match, otherwise create. Every requested mapper runs before
//! the first remote call, so a message that cannot be mapped leaves the server untouched.

use std::sync::Arc;

use api_shared::{ConversionOutcome, RemoteResponse};
use bridge_types::BearerToken;
use fhir::{FhirResult, ResourceRecord, ResourceType};
use hl7::Message;
use serde_json::Value;
use uuid::Uuid;

use crate::constants::IDENTIFIER_SEARCH_PARAM;
use crate::input::message_text;
use crate::remote::ClinicalRepository;
use crate::{CoreError, CoreResult};

/// What to do with one mapped record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncDecision {
    /// The server already holds `total` matches; nothing is created.
    Exists { total: u64, status: u16 },
    Create,
}

#[derive(Clone)]
pub struct SyncOrchestrator {
    repository: Arc<dyn ClinicalRepository>,
}

impl SyncOrchestrator {
    pub fn new(repository: Arc<dyn ClinicalRepository>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<dyn ClinicalRepository> {
        &self.repository
    }

    /// Validate, map and synchronise a conversion request.
    ///
    /// `resource_types` is a comma-separated list such as `"Patient,Coverage"`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::Validation`] if the message is not a usable string/object or fails
    ///   structural validation
    /// - [`CoreError::Fhir`] if a resource type name is unknown or a mapper cannot find its
    ///   segment or field
    /// - [`CoreError::InvalidInput`] if the list names no resource type at all
    ///
    /// Remote failures are not errors; they are reported in the returned outcomes.
    pub async fn convert(
        &self,
        message: &Value,
        resource_types: &str,
        token: &BearerToken,
    ) -> CoreResult<Vec<ConversionOutcome>> {
        let raw = message_text(message)?;
        let issues = hl7::validate(&raw);
        if !issues.is_empty() {
            return Err(CoreError::Validation(issues));
        }

        let types = ResourceType::parse_list(resource_types)?;
        if types.is_empty() {
            return Err(CoreError::InvalidInput(
                "resourceType must name at least one resource type".into(),
            ));
        }

        self.sync_message(&Message::parse(&raw), &types, token)
            .await
    }

    /// Map `message` for every type in `types`, then synchronise the records one at a time.
    ///
    /// Outcomes are returned in the order of `types`. A failure for one type never prevents
    /// later types from being processed.
    pub async fn sync_message(
        &self,
        message: &Message,
        types: &[ResourceType],
        token: &BearerToken,
    ) -> CoreResult<Vec<ConversionOutcome>> {
        let records = map_all(message, types)?;
        let conversion_id = Uuid::new_v4();
        tracing::info!(%conversion_id, records = records.len(), "synchronising mapped records");

        let mut outcomes = Vec::with_capacity(records.len());
        for record in &records {
            outcomes.push(self.sync_record(record, token, conversion_id).await);
        }
        Ok(outcomes)
    }

    /// Search for `record` by identifier and decide whether it must be created.
    ///
    /// Records without an identifier cannot be matched and are always created. A failed search
    /// is returned as `Err` so the caller can report it without creating anything.
    pub async fn decide(
        &self,
        record: &ResourceRecord,
        token: &BearerToken,
    ) -> Result<SyncDecision, RemoteResponse> {
        let Some(identifier) = record.identifier() else {
            return Ok(SyncDecision::Create);
        };

        let search = self
            .repository
            .search(
                record.resource_type(),
                &[(IDENTIFIER_SEARCH_PARAM, identifier)],
                token,
            )
            .await;

        if !search.response.success {
            return Err(search.response);
        }
        if search.exists() {
            return Ok(SyncDecision::Exists {
                total: search.total,
                status: search.response.status,
            });
        }
        Ok(SyncDecision::Create)
    }

    async fn sync_record(
        &self,
        record: &ResourceRecord,
        token: &BearerToken,
        conversion_id: Uuid,
    ) -> ConversionOutcome {
        let resource_type = record.resource_type();

        match self.decide(record, token).await {
            Ok(SyncDecision::Exists { total, status }) => {
                tracing::info!(%conversion_id, %resource_type, total, "resource exists, skipping create");
                ConversionOutcome::existing(resource_type.as_str(), status, total)
            }
            Ok(SyncDecision::Create) => {
                let response = self.repository.create(record, token).await;
                if response.success {
                    tracing::info!(%conversion_id, %resource_type, status = response.status, "resource created");
                } else {
                    tracing::warn!(%conversion_id, %resource_type, status = response.status, "create failed");
                }
                ConversionOutcome::from_remote(resource_type.as_str(), response)
            }
            Err(search) => {
                tracing::warn!(%conversion_id, %resource_type, status = search.status, "search failed, create skipped");
                ConversionOutcome::from_remote(resource_type.as_str(), search)
            }
        }
    }
}

/// Run every requested mapper, stopping at the first one that fails.
pub fn map_all(message: &Message, types: &[ResourceType]) -> FhirResult<Vec<ResourceRecord>> {
    types.iter().map(|t| t.map(message)).collect()
}
