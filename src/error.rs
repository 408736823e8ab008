use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComicError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Empty response from chat model")]
    UpstreamEmptyResponse,

    #[error("Malformed JSON from chat model: {0}")]
    MalformedJson(String),

    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Prediction failed: {0}")]
    UpstreamPrediction(String),

    #[error("Prediction returned no output")]
    EmptyOutput,

    #[error("Invalid image URL received: {0}")]
    InvalidOutputUrl(String),

    #[error("Failed to read history: {0}")]
    UpstreamRead(String),

    #[error("Failed to save history: {0}")]
    Storage(String),

    #[error("Request error: {0}")]
    Request(String),

    #[error("Response error: {0}")]
    Response(String),

    #[error("Generation timed out after {0}s")]
    Timeout(u64),
}

impl ComicError {
    /// Stable tag used in structured log context.
    pub fn kind(&self) -> &'static str {
        match self {
            ComicError::Validation(_) => "validation",
            ComicError::Configuration(_) => "configuration",
            ComicError::UpstreamEmptyResponse => "upstream_empty_response",
            ComicError::MalformedJson(_) => "malformed_json",
            ComicError::SchemaViolation(_) => "schema_violation",
            ComicError::UpstreamPrediction(_) => "upstream_prediction",
            ComicError::EmptyOutput => "empty_output",
            ComicError::InvalidOutputUrl(_) => "invalid_output_url",
            ComicError::UpstreamRead(_) => "upstream_read",
            ComicError::Storage(_) => "storage",
            ComicError::Request(_) => "request",
            ComicError::Response(_) => "response",
            ComicError::Timeout(_) => "timeout",
        }
    }
}

pub type Result<T> = std::result::Result<T, ComicError>;
