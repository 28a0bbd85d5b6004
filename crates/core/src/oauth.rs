//! Authorization-code flow against the FHIR server's identity provider.

use std::sync::Arc;

use api_shared::RemoteResponse;

use crate::config::OAuthSettings;
use crate::constants::{OAUTH_SCOPE, REQUEST_TIMEOUT};
use crate::remote::{into_envelope, transport_failure};
use crate::{CoreConfig, CoreError, CoreResult};

#[derive(Clone, Debug)]
pub struct OAuthClient {
    client: reqwest::Client,
    cfg: Arc<CoreConfig>,
    settings: OAuthSettings,
}

impl OAuthClient {
    /// # Errors
    ///
    /// Returns [`CoreError::NotConfigured`] when `cfg` carries no client credentials.
    pub fn new(cfg: Arc<CoreConfig>) -> CoreResult<Self> {
        let settings = cfg
            .oauth()
            .cloned()
            .ok_or(CoreError::NotConfigured("OAuth client"))?;
        let client = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            cfg,
            settings,
        })
    }

    /// URL the user agent should be sent to in order to start the flow.
    pub fn authorization_url(&self, state: Option<&str>) -> CoreResult<String> {
        let mut params = vec![
            ("response_type", "code"),
            ("client_id", self.settings.client_id()),
            ("redirect_uri", self.settings.redirect_uri()),
            ("scope", OAUTH_SCOPE),
        ];
        if let Some(state) = state.filter(|s| !s.is_empty()) {
            params.push(("state", state));
        }

        let url = reqwest::Url::parse_with_params(&self.cfg.authorize_url(), &params)
            .map_err(|e| CoreError::InvalidInput(format!("authorize url: {e}")))?;
        Ok(url.into())
    }

    /// Request `authorize_url` from the identity provider so an unreachable provider is reported
    /// before the user agent is sent there. Redirects are followed; only transport failures and
    /// 5xx replies come back unsuccessful.
    pub async fn contact_provider(&self, authorize_url: &str) -> RemoteResponse {
        match self.client.get(authorize_url).send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_server_error() {
                    tracing::warn!(%status, "identity provider failed");
                    return into_envelope(response).await;
                }
                RemoteResponse::ok(
                    status.as_u16(),
                    serde_json::json!({ "redirectUrl": response.url().as_str() }),
                )
            }
            Err(err) => {
                tracing::warn!(error = %err, "identity provider unreachable");
                transport_failure(err)
            }
        }
    }

    /// Exchange an authorization code for tokens, authenticating with HTTP Basic client
    /// credentials.
    pub async fn exchange_code(&self, code: &str) -> RemoteResponse {
        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.settings.client_id()),
            ("code", code),
            ("redirect_uri", self.settings.redirect_uri()),
        ];

        let result = self
            .client
            .post(self.cfg.token_url())
            .basic_auth(
                self.settings.client_id(),
                Some(self.settings.client_secret()),
            )
            .form(&form)
            .send()
            .await;

        match result {
            Ok(response) => {
                let envelope = into_envelope(response).await;
                if !envelope.success {
                    tracing::warn!(status = envelope.status, "token exchange rejected");
                }
                envelope
            }
            Err(err) => {
                tracing::warn!(error = %err, "token endpoint unreachable");
                transport_failure(err)
            }
        }
    }
}
