//! Model binding trait and its structured failure classification

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::generation::Credential;

/// Failure reported by a model binding
///
/// Quota exhaustion is classified at the binding boundary so the retry layer
/// never inspects error text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The credential's quota or rate limit was hit; retry with another credential
    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Any other failure (prompt, model, network)
    #[error("{0}")]
    Failed(String),
}

impl ProviderError {
    /// Classify opaque provider error text
    ///
    /// Compatibility shim for bindings that only surface a message: a `429`
    /// status code anywhere in the text counts as quota exhaustion.
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.contains("429") {
            Self::QuotaExceeded(message)
        } else {
            Self::Failed(message)
        }
    }

    /// True for quota/rate-limit failures
    pub fn is_quota(&self) -> bool {
        matches!(self, Self::QuotaExceeded(_))
    }

    /// Error text as reported by the provider
    pub fn message(&self) -> &str {
        match self {
            Self::QuotaExceeded(m) | Self::Failed(m) => m,
        }
    }
}

/// A model session bound to one credential: prompt in, text out
///
/// Implementations:
/// - `GeminiClient`: Google Generative Language API
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for a prompt
    async fn generate(&self, prompt: &str) -> std::result::Result<String, ProviderError>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}

/// Builds a fresh model session whenever the active credential changes
pub trait SessionFactory: Send + Sync {
    /// Create a session using `credential`
    fn create_session(&self, credential: &Credential) -> Arc<dyn LlmProvider>;
}

impl<F> SessionFactory for F
where
    F: Fn(&Credential) -> Arc<dyn LlmProvider> + Send + Sync,
{
    fn create_session(&self, credential: &Credential) -> Arc<dyn LlmProvider> {
        self(credential)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_message_detects_429() {
        let err = ProviderError::from_message("HTTP 429 Too Many Requests: Resource has been exhausted");
        assert!(err.is_quota());

        let err = ProviderError::from_message("400 Bad Request: invalid argument");
        assert!(!err.is_quota());
        assert_eq!(err.message(), "400 Bad Request: invalid argument");
    }
}
