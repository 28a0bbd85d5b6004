//! Authorization header handling.
//!
//! The bridge never validates tokens itself; it only requires one to be present so it can be
//! forwarded to the FHIR server.

use bridge_types::BearerToken;

/// Message used when a conversion request arrives without usable credentials.
pub const MISSING_AUTHORIZATION: &str =
    "Missing Authorization. Authorization is required in the request headers.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{MISSING_AUTHORIZATION}")]
    Missing,
    #[error("Authorization header must use the Bearer scheme")]
    Malformed,
}

/// Extract the bearer token from a raw `Authorization` header value.
///
/// # Errors
///
/// Returns [`AuthError::Missing`] when no header was sent (or it is blank) and
/// [`AuthError::Malformed`] when it is not of the form `Bearer <token>`.
pub fn bearer_token(header: Option<&str>) -> Result<BearerToken, AuthError> {
    let header = header
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::Missing)?;
    BearerToken::from_authorization(header).ok_or(AuthError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_token_from_bearer_header() {
        let token = bearer_token(Some("Bearer abc.def")).expect("token");
        assert_eq!(token.secret(), "abc.def");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert!(bearer_token(Some("bearer abc")).is_ok());
    }

    #[test]
    fn missing_or_blank_header_is_missing() {
        assert_eq!(bearer_token(None), Err(AuthError::Missing));
        assert_eq!(bearer_token(Some("   ")), Err(AuthError::Missing));
    }

    #[test]
    fn other_schemes_are_malformed() {
        assert_eq!(bearer_token(Some("Basic dXNlcg==")), Err(AuthError::Malformed));
        assert_eq!(bearer_token(Some("Bearer")), Err(AuthError::Malformed));
    }
}
