use thiserror::Error;

/// Errors that can occur during recipe extraction operations
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Failed to reach the LLM provider
    #[error("Provider request failed: {0}")]
    TransportError(#[from] reqwest::Error),

    /// Provider returned a non-success HTTP status
    #[error("Provider returned {status}: {body}")]
    ProviderError { status: u16, body: String },

    /// Provider response was missing an expected field or was not valid JSON
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Batch job ended in a terminal failure state
    #[error("Batch job {batch_id} ended with status: {status}")]
    JobFailed { batch_id: String, status: String },

    /// Failed to read or write the local post cache
    #[error("Cache I/O error: {0}")]
    CacheError(#[from] std::io::Error),

    /// Failed to serialize or deserialize JSON
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// Post source error
    #[error("Post source error: {0}")]
    SourceError(String),
}
