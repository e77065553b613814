//! Error types for the question-answering system

use thiserror::Error;

/// Result type alias for herbal-rag operations
pub type Result<T> = std::result::Result<T, Error>;

/// herbal-rag errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Startup failed (missing or incompatible vector index)
    #[error("Initialization failed: {0}")]
    Initialization(String),

    /// Provider reported quota exhaustion for the active credential
    #[error("API quota exceeded: {0}")]
    Quota(String),

    /// Every retry attempt ended in a quota error
    #[error("All API credentials exhausted after {attempts} attempts (last error: {last_error})")]
    CredentialsExhausted { attempts: u32, last_error: String },

    /// Non-quota model failure, never retried
    #[error("LLM generation failed: {0}")]
    Generation(String),

    /// Model output did not contain a JSON object
    #[error("No JSON object found in model output: {0}")]
    Parse(String),

    /// Model output contained an object that is not valid JSON
    #[error("Failed to decode model JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// Vector index lookup failed
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    /// Embedding error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an initialization error
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::Initialization(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a retrieval error
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True when the retry budget was spent entirely on quota errors
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::CredentialsExhausted { .. })
    }

    /// True for malformed structured output (skips one document, not the batch)
    pub fn is_malformed_output(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::Decode(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhausted_is_distinct_from_quota() {
        let exhausted = Error::CredentialsExhausted {
            attempts: 3,
            last_error: "429".to_string(),
        };
        assert!(exhausted.is_exhausted());
        assert!(!Error::Quota("429".to_string()).is_exhausted());
        assert!(exhausted.to_string().contains("exhausted"));
    }

    #[test]
    fn test_malformed_output_classification() {
        let decode = serde_json::from_str::<serde_json::Value>("{bad").unwrap_err();
        assert!(Error::Decode(decode).is_malformed_output());
        assert!(Error::Parse("prose only".to_string()).is_malformed_output());
        assert!(!Error::generation("boom").is_malformed_output());
    }
}
