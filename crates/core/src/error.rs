use hl7::ValidationIssue;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The message failed structural validation; every issue is reported.
    #[error("message failed validation with {} issue(s)", .0.len())]
    Validation(Vec<ValidationIssue>),
    #[error("{0} is not configured")]
    NotConfigured(&'static str),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Fhir(#[from] fhir::FhirError),
}

impl CoreError {
    /// True when the caller sent something unusable, as opposed to a server-side failure.
    pub fn is_client_error(&self) -> bool {
        match self {
            CoreError::InvalidInput(_) | CoreError::Validation(_) => true,
            CoreError::Fhir(err) => err.is_malformed_message(),
            CoreError::NotConfigured(_) | CoreError::Http(_) => false,
        }
    }
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
