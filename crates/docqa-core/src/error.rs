use thiserror::Error;

/// Request-scoped failures surfaced by every docqa crate.
///
/// None of these abort the process. `InvalidConfig` is the only one expected
/// at startup; the rest are returned to whoever issued the request.
#[derive(Debug, Error)]
pub enum Error {
    #[error("document appears empty")]
    EmptyCorpus,

    #[error("Unsupported document: {0}")]
    UnsupportedDocument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Topic '{topic}' is ambiguous; candidates: {}", options.join(", "))]
    AmbiguousTopic { topic: String, options: Vec<String> },

    #[error("Retrieval unavailable: {0}")]
    RetrievalUnavailable(String),

    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("History storage failed: {0}")]
    Storage(String),
}

impl Error {
    pub fn retrieval(reason: impl Into<String>) -> Self { Self::RetrievalUnavailable(reason.into()) }

    pub fn generation(reason: impl Into<String>) -> Self { Self::GenerationUnavailable(reason.into()) }

    /// Short machine-readable code for the failure class.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyCorpus => "EMPTY_CORPUS",
            Self::UnsupportedDocument(_) => "UNSUPPORTED_DOCUMENT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::AmbiguousTopic { .. } => "AMBIGUOUS_TOPIC",
            Self::RetrievalUnavailable(_) => "RETRIEVAL_UNAVAILABLE",
            Self::GenerationUnavailable(_) => "GENERATION_UNAVAILABLE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Storage(_) => "STORAGE",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
