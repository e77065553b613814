//! Scripted collaborators shared by unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::generation::{Credential, CredentialPool, ResilientLlm, RetryPolicy};
use crate::providers::{LlmProvider, ProviderError, SessionFactory, VectorIndex};
use crate::types::RetrievedPassage;

type Reply = std::result::Result<String, ProviderError>;

#[derive(Default)]
struct Shared {
    script: Mutex<VecDeque<Reply>>,
    repeat: Option<Reply>,
    calls: Mutex<Vec<String>>,
    sessions: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
}

/// Session factory whose sessions answer from a shared script
#[derive(Clone)]
pub(crate) struct ScriptedFactory {
    shared: Arc<Shared>,
}

impl ScriptedFactory {
    /// Replies consumed in order; once exhausted every call fails
    pub(crate) fn new(script: Vec<Reply>) -> Self {
        Self {
            shared: Arc::new(Shared {
                script: Mutex::new(script.into()),
                ..Default::default()
            }),
        }
    }

    /// Every call returns `reply`
    pub(crate) fn always(reply: Reply) -> Self {
        Self {
            shared: Arc::new(Shared {
                repeat: Some(reply),
                ..Default::default()
            }),
        }
    }

    /// Credential used by each generate call, in order
    pub(crate) fn calls(&self) -> Vec<String> {
        self.shared.calls.lock().clone()
    }

    /// Credential of each session built, in order
    pub(crate) fn sessions(&self) -> Vec<String> {
        self.shared.sessions.lock().clone()
    }

    /// Prompts received, in order
    pub(crate) fn prompts(&self) -> Vec<String> {
        self.shared.prompts.lock().clone()
    }
}

struct ScriptedLlm {
    credential: String,
    shared: Arc<Shared>,
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Reply {
        self.shared.calls.lock().push(self.credential.clone());
        self.shared.prompts.lock().push(prompt.to_string());

        if let Some(reply) = self.shared.script.lock().pop_front() {
            return reply;
        }
        self.shared
            .repeat
            .clone()
            .unwrap_or_else(|| Err(ProviderError::Failed("script exhausted".to_string())))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted-model"
    }
}

impl SessionFactory for ScriptedFactory {
    fn create_session(&self, credential: &Credential) -> Arc<dyn LlmProvider> {
        self.shared.sessions.lock().push(credential.expose().to_string());
        Arc::new(ScriptedLlm {
            credential: credential.expose().to_string(),
            shared: Arc::clone(&self.shared),
        })
    }
}

pub(crate) fn quota() -> Reply {
    Err(ProviderError::QuotaExceeded("429 Resource has been exhausted".to_string()))
}

pub(crate) fn pool(size: usize) -> CredentialPool {
    CredentialPool::from_keys((0..size).map(|i| format!("key-{}", i))).unwrap()
}

/// Three attempts, 10ms between retries, no spacing
pub(crate) fn fast_policy() -> RetryPolicy {
    RetryPolicy {
        max_retries: 3,
        retry_delay: Duration::from_millis(10),
        min_spacing: None,
    }
}

pub(crate) fn client(factory: &ScriptedFactory, policy: RetryPolicy) -> ResilientLlm {
    ResilientLlm::new(pool(3), Arc::new(factory.clone()), policy)
}

/// Vector index returning a fixed result
pub(crate) struct StaticIndex {
    passages: Option<Vec<RetrievedPassage>>,
}

impl StaticIndex {
    pub(crate) fn with(passages: Vec<RetrievedPassage>) -> Self {
        Self {
            passages: Some(passages),
        }
    }

    pub(crate) fn failing() -> Self {
        Self { passages: None }
    }
}

#[async_trait]
impl VectorIndex for StaticIndex {
    async fn search(&self, _query: &str, top_k: usize) -> Result<Vec<RetrievedPassage>> {
        match &self.passages {
            Some(passages) => Ok(passages.iter().take(top_k).cloned().collect()),
            None => Err(Error::retrieval("index unavailable")),
        }
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.passages.as_ref().map_or(0, Vec::len))
    }

    fn name(&self) -> &str {
        "static"
    }
}
