//! Small validated primitives shared across the bridge crates.

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The credential contained whitespace inside the token body
    #[error("Token must not contain whitespace")]
    Whitespace,
}

/// A string type that guarantees non-empty content.
///
/// The input is trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Caller-supplied bearer credential, forwarded unmodified to the remote repository.
///
/// `Debug` is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wraps a raw token value (without the `Bearer ` scheme prefix).
    ///
    /// # Errors
    ///
    /// Returns `TextError::Empty` for blank input and `TextError::Whitespace` if the token
    /// contains interior whitespace.
    pub fn new(token: impl AsRef<str>) -> Result<Self, TextError> {
        let token = token.as_ref().trim();
        if token.is_empty() {
            return Err(TextError::Empty);
        }
        if token.chars().any(char::is_whitespace) {
            return Err(TextError::Whitespace);
        }
        Ok(Self(token.to_owned()))
    }

    /// Parses an `Authorization` header value of the form `Bearer <token>`.
    ///
    /// The scheme is matched case-insensitively. Returns `None` for any other scheme or an
    /// empty token.
    pub fn from_authorization(header: &str) -> Option<Self> {
        let (scheme, token) = header.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        Self::new(token).ok()
    }

    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_rejects_blank() {
        let text = NonEmptyText::new("  https://fhir.example.org  ").expect("valid");
        assert_eq!(text.as_str(), "https://fhir.example.org");
        assert_eq!(NonEmptyText::new("   "), Err(TextError::Empty));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty_string() {
        let err = serde_json::from_str::<NonEmptyText>("\"\"").expect_err("should reject");
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn bearer_token_parses_authorization_header() {
        let token = BearerToken::from_authorization("Bearer abc.def").expect("bearer");
        assert_eq!(token.secret(), "abc.def");

        let token = BearerToken::from_authorization("bearer xyz").expect("lowercase scheme");
        assert_eq!(token.secret(), "xyz");
    }

    #[test]
    fn bearer_token_rejects_other_schemes_and_blank_tokens() {
        assert!(BearerToken::from_authorization("Basic Zm9vOmJhcg==").is_none());
        assert!(BearerToken::from_authorization("Bearer ").is_none());
        assert!(BearerToken::from_authorization("Bearer").is_none());
        assert!(BearerToken::from_authorization("").is_none());
    }

    #[test]
    fn bearer_token_debug_is_redacted() {
        let token = BearerToken::new("super-secret").expect("valid");
        assert!(!format!("{token:?}").contains("super-secret"));
    }
}
