//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core services, so
//! nothing reads process-wide environment variables while a request is being handled.

use crate::constants::{
    DEFAULT_FHIR_BASE_PATH, ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_FHIR_BASE_PATH,
    ENV_REDIRECT_URI, ENV_SERVER_URL, OAUTH_AUTHORIZE_PATH, OAUTH_TOKEN_PATH,
};
use crate::{CoreError, CoreResult};
use bridge_types::NonEmptyText;

/// Client credentials for the identity provider's authorization-code flow.
#[derive(Clone)]
pub struct OAuthSettings {
    client_id: NonEmptyText,
    client_secret: String,
    redirect_uri: NonEmptyText,
}

impl OAuthSettings {
    pub fn new(client_id: &str, client_secret: &str, redirect_uri: &str) -> CoreResult<Self> {
        let client_id = NonEmptyText::new(client_id)
            .map_err(|e| CoreError::InvalidInput(format!("client id: {e}")))?;
        let redirect_uri = NonEmptyText::new(redirect_uri)
            .map_err(|e| CoreError::InvalidInput(format!("redirect uri: {e}")))?;

        Ok(Self {
            client_id,
            client_secret: client_secret.to_string(),
            redirect_uri,
        })
    }

    pub fn client_id(&self) -> &str {
        self.client_id.as_str()
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    pub fn redirect_uri(&self) -> &str {
        self.redirect_uri.as_str()
    }
}

impl std::fmt::Debug for OAuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthSettings")
            .field("client_id", &self.client_id.as_str())
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri.as_str())
            .finish()
    }
}

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    server_url: String,
    fhir_base_path: String,
    oauth: Option<OAuthSettings>,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// `server_url` is the base URL shared by the FHIR server and its identity provider; a
    /// trailing `/` is dropped. `fhir_base_path` is the FHIR API path below it, e.g. `fhir/R4`.
    pub fn new(
        server_url: &str,
        fhir_base_path: &str,
        oauth: Option<OAuthSettings>,
    ) -> CoreResult<Self> {
        let server_url = server_url.trim().trim_end_matches('/');
        if server_url.is_empty() {
            return Err(CoreError::InvalidInput("server url cannot be empty".into()));
        }
        let parsed = reqwest::Url::parse(server_url)
            .map_err(|e| CoreError::InvalidInput(format!("server url '{server_url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CoreError::InvalidInput(format!(
                "server url must use http or https, got: {}",
                parsed.scheme()
            )));
        }

        let fhir_base_path = fhir_base_path.trim().trim_matches('/');
        if fhir_base_path.is_empty() {
            return Err(CoreError::InvalidInput(
                "fhir base path cannot be empty".into(),
            ));
        }

        Ok(Self {
            server_url: server_url.to_string(),
            fhir_base_path: fhir_base_path.to_string(),
            oauth,
        })
    }

    /// Build configuration from environment-style lookups.
    ///
    /// OAuth settings are only required when any of them is present; a partial set is an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> CoreResult<Self> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let server_url = get(ENV_SERVER_URL)
            .ok_or_else(|| CoreError::InvalidInput(format!("{ENV_SERVER_URL} must be set")))?;
        let fhir_base_path =
            get(ENV_FHIR_BASE_PATH).unwrap_or_else(|| DEFAULT_FHIR_BASE_PATH.to_string());

        let oauth = match (get(ENV_CLIENT_ID), get(ENV_REDIRECT_URI)) {
            (None, None) => None,
            (Some(client_id), Some(redirect_uri)) => Some(OAuthSettings::new(
                &client_id,
                &get(ENV_CLIENT_SECRET).unwrap_or_default(),
                &redirect_uri,
            )?),
            _ => {
                return Err(CoreError::InvalidInput(format!(
                    "{ENV_CLIENT_ID} and {ENV_REDIRECT_URI} must be set together"
                )))
            }
        };

        Self::new(&server_url, &fhir_base_path, oauth)
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn oauth(&self) -> Option<&OAuthSettings> {
        self.oauth.as_ref()
    }

    /// Type-level endpoint, used for search and create: `{server}/{base}/{type}`.
    pub fn resource_url(&self, resource_type: &str) -> String {
        format!(
            "{}/{}/{}",
            self.server_url, self.fhir_base_path, resource_type
        )
    }

    /// Instance-level endpoint: `{server}/{base}/{type}/{id}`.
    pub fn resource_instance_url(&self, resource_type: &str, id: &str) -> String {
        format!("{}/{}", self.resource_url(resource_type), id)
    }

    pub fn authorize_url(&self) -> String {
        format!("{}/{}", self.server_url, OAUTH_AUTHORIZE_PATH)
    }

    pub fn token_url(&self) -> String {
        format!("{}/{}", self.server_url, OAUTH_TOKEN_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn derives_endpoints_without_double_slashes() {
        let cfg = CoreConfig::new("https://fhir.example.org/", "/fhir/R4/", None).expect("cfg");
        assert_eq!(cfg.server_url(), "https://fhir.example.org");
        assert_eq!(
            cfg.resource_url("Patient"),
            "https://fhir.example.org/fhir/R4/Patient"
        );
        assert_eq!(
            cfg.resource_instance_url("Coverage", "c-1"),
            "https://fhir.example.org/fhir/R4/Coverage/c-1"
        );
        assert_eq!(cfg.token_url(), "https://fhir.example.org/oauth2/token");
        assert_eq!(
            cfg.authorize_url(),
            "https://fhir.example.org/oauth2/authorize"
        );
    }

    #[test]
    fn rejects_blank_or_non_http_server_url() {
        assert!(matches!(
            CoreConfig::new("  ", "fhir/R4", None),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            CoreConfig::new("ftp://example.org", "fhir/R4", None),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            CoreConfig::new("https://example.org", "/", None),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn oauth_settings_reject_blank_client_id() {
        assert!(matches!(
            OAuthSettings::new(" ", "secret", "https://app/callback"),
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[test]
    fn oauth_settings_debug_hides_secret() {
        let settings =
            OAuthSettings::new("client", "hunter2", "https://app/callback").expect("settings");
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("client"));
    }

    #[test]
    fn from_lookup_applies_defaults() {
        let cfg = CoreConfig::from_lookup(lookup(&[(ENV_SERVER_URL, "http://localhost:8103")]))
            .expect("cfg");
        assert_eq!(
            cfg.resource_url("Patient"),
            "http://localhost:8103/fhir/R4/Patient"
        );
        assert!(cfg.oauth().is_none());
    }

    #[test]
    fn from_lookup_reads_oauth_settings() {
        let cfg = CoreConfig::from_lookup(lookup(&[
            (ENV_SERVER_URL, "http://localhost:8103"),
            (ENV_FHIR_BASE_PATH, "r4"),
            (ENV_CLIENT_ID, "bridge"),
            (ENV_CLIENT_SECRET, "s3cret"),
            (ENV_REDIRECT_URI, "http://localhost:3010/callback"),
        ]))
        .expect("cfg");
        assert_eq!(cfg.resource_url("Patient"), "http://localhost:8103/r4/Patient");
        let oauth = cfg.oauth().expect("oauth");
        assert_eq!(oauth.client_id(), "bridge");
        assert_eq!(oauth.client_secret(), "s3cret");
    }

    #[test]
    fn from_lookup_requires_server_url_and_complete_oauth() {
        assert!(CoreConfig::from_lookup(lookup(&[])).is_err());
        assert!(CoreConfig::from_lookup(lookup(&[
            (ENV_SERVER_URL, "http://localhost:8103"),
            (ENV_CLIENT_ID, "bridge"),
        ]))
        .is_err());
    }
}
