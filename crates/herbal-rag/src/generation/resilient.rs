//! Quota-aware model client with credential rotation and an optional rate governor
//!
//! Quota errors are blamed on the credential: the client rotates to the next
//! key, rebuilds the session, waits a fixed delay, and retries. Every other
//! failure is blamed on the prompt, model, or network and surfaces at once.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::config::{RagConfig, RetryConfig};
use crate::error::{Error, Result};
use crate::providers::{GeminiSessionFactory, LlmProvider, ProviderError, SessionFactory};

use super::credentials::CredentialPool;

/// Retry and spacing policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per call, including the first
    pub max_retries: u32,
    /// Fixed wait after each rotation
    pub retry_delay: Duration,
    /// Minimum time between successful calls; `None` disables the governor
    pub min_spacing: Option<Duration>,
}

impl RetryPolicy {
    /// Policy for interactive questions: no spacing
    pub fn interactive(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            min_spacing: None,
        }
    }

    /// Policy for bulk structuring: spacing from `bulk_min_spacing_ms`
    pub fn bulk(config: &RetryConfig) -> Self {
        let spacing = config.bulk_min_spacing();
        Self {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
            min_spacing: (!spacing.is_zero()).then_some(spacing),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::interactive(&RetryConfig::default())
    }
}

struct ClientState {
    pool: CredentialPool,
    session: Arc<dyn LlmProvider>,
    last_success: Option<Instant>,
    rotations: u64,
}

/// Model client that survives per-key quota exhaustion
///
/// Calls are serialized: the state lock is held for the whole retry loop, so a
/// rotation can never race with an in-flight call on the stale session.
pub struct ResilientLlm {
    factory: Arc<dyn SessionFactory>,
    policy: RetryPolicy,
    state: Mutex<ClientState>,
}

impl ResilientLlm {
    /// Create a client; the pool's current credential gets the first session
    pub fn new(pool: CredentialPool, factory: Arc<dyn SessionFactory>, mut policy: RetryPolicy) -> Self {
        policy.max_retries = policy.max_retries.max(1);
        let session = factory.create_session(pool.current());

        Self {
            factory,
            policy,
            state: Mutex::new(ClientState {
                pool,
                session,
                last_success: None,
                rotations: 0,
            }),
        }
    }

    /// Gemini-backed client using the configured keys
    pub fn from_config(config: &RagConfig, policy: RetryPolicy) -> Result<Self> {
        let pool = CredentialPool::from_keys(&config.llm.api_keys)?;
        let factory = GeminiSessionFactory::new(&config.llm)?;
        tracing::info!(
            model = %config.llm.model,
            credentials = pool.len(),
            max_retries = policy.max_retries,
            min_spacing_ms = policy.min_spacing.map(|d| d.as_millis() as u64),
            "Initialized Gemini client"
        );
        Ok(Self::new(pool, Arc::new(factory), policy))
    }

    /// Generate text for `prompt`
    ///
    /// Fails with `Error::CredentialsExhausted` when every attempt hit a quota
    /// error, or with `Error::Generation` on the first non-quota failure.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let mut state = self.state.lock().await;
        let max = self.policy.max_retries;
        let mut last_quota = String::new();

        for attempt in 1..=max {
            self.wait_for_spacing(&state).await;

            match state.session.generate(prompt).await {
                Ok(text) => {
                    state.last_success = Some(Instant::now());
                    return Ok(text);
                }
                Err(ProviderError::QuotaExceeded(message)) if attempt < max => {
                    tracing::warn!(
                        attempt,
                        max_attempts = max,
                        error = %message,
                        "API quota exceeded, switching credential and retrying"
                    );
                    self.rotate(&mut state);
                    sleep(self.policy.retry_delay).await;
                    last_quota = message;
                }
                Err(ProviderError::QuotaExceeded(message)) => {
                    tracing::error!(attempts = attempt, error = %message, "All API credentials exhausted");
                    return Err(Error::CredentialsExhausted {
                        attempts: attempt,
                        last_error: message,
                    });
                }
                Err(ProviderError::Failed(message)) => {
                    tracing::warn!(attempt, error = %message, "LLM call failed");
                    return Err(Error::Generation(message));
                }
            }
        }

        Err(Error::CredentialsExhausted {
            attempts: max,
            last_error: last_quota,
        })
    }

    async fn wait_for_spacing(&self, state: &ClientState) {
        let (Some(spacing), Some(last)) = (self.policy.min_spacing, state.last_success) else {
            return;
        };
        let elapsed = last.elapsed();
        if elapsed < spacing {
            let wait = spacing - elapsed;
            tracing::debug!(wait_ms = wait.as_millis() as u64, "Waiting before next API call");
            sleep(wait).await;
        }
    }

    fn rotate(&self, state: &mut ClientState) {
        let credential = state.pool.rotate().clone();
        state.session = self.factory.create_session(&credential);
        state.rotations += 1;
    }

    /// Zero-based index of the active credential
    pub async fn active_position(&self) -> usize {
        self.state.lock().await.pool.position()
    }

    /// Number of rotations performed since construction
    pub async fn rotations(&self) -> u64 {
        self.state.lock().await.rotations
    }

    /// Policy in effect
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}
