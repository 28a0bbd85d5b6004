//! Constants used throughout the bridge core crate.

/// Media type sent as both `Content-Type` and `Accept` on every FHIR call.
pub const FHIR_JSON: &str = "application/fhir+json";

/// Path of the FHIR REST API below the server's base URL, when not overridden.
pub const DEFAULT_FHIR_BASE_PATH: &str = "fhir/R4";

/// Listen address for the REST server, when not overridden.
pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3010";

/// Identity provider endpoints, relative to the server's base URL.
pub const OAUTH_AUTHORIZE_PATH: &str = "oauth2/authorize";
pub const OAUTH_TOKEN_PATH: &str = "oauth2/token";

/// Scope requested by the authorization-code flow.
pub const OAUTH_SCOPE: &str = "openid";

/// Search parameter used to look a record up before creating it.
pub const IDENTIFIER_SEARCH_PARAM: &str = "identifier";

/// Upper bound for any single remote call.
pub const REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Status reported when a remote call fails before any response arrives.
pub const TRANSPORT_FAILURE_STATUS: u16 = 500;

/// Environment variables read once at startup.
pub const ENV_SERVER_URL: &str = "OAUTH2_SERVER_URL";
pub const ENV_FHIR_BASE_PATH: &str = "FHIR_BASE_PATH";
pub const ENV_CLIENT_ID: &str = "OAUTH2_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "OAUTH2_CLIENT_SECRET";
pub const ENV_REDIRECT_URI: &str = "OAUTH2_REDIRECT_URI";
pub const ENV_REST_ADDR: &str = "BRIDGE_REST_ADDR";
