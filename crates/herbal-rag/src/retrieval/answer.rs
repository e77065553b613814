//! Question answering over the indexed corpus

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::generation::{PromptBuilder, ResilientLlm, RetryPolicy};
use crate::providers::{EmbeddingProvider, LocalVectorIndex, OllamaEmbedder, VectorIndex};
use crate::types::Answer;

/// Retrieve, prompt, generate; degrade to the raw passages when the model is unavailable
pub struct AnswerEngine {
    index: Arc<dyn VectorIndex>,
    llm: Arc<ResilientLlm>,
    top_k: usize,
}

impl AnswerEngine {
    /// Create an engine from its collaborators
    pub fn new(index: Arc<dyn VectorIndex>, llm: Arc<ResilientLlm>, top_k: usize) -> Self {
        Self {
            index,
            llm,
            top_k: top_k.max(1),
        }
    }

    /// Open the persisted index and build the interactive client
    pub async fn from_config(config: &RagConfig) -> Result<Self> {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(OllamaEmbedder::new(&config.embeddings)?);
        let index = LocalVectorIndex::open(&config.vector_db.storage_path, embedder)
            .await
            .map_err(|e| match e {
                Error::Initialization(_) => e,
                other => Error::initialization(format!("cannot open vector index: {}", other)),
            })?;

        let llm = ResilientLlm::from_config(config, RetryPolicy::interactive(&config.retry))?;
        Ok(Self::new(Arc::new(index), Arc::new(llm), config.retrieval.top_k))
    }

    /// Answer one question; never fails, the variant tells how it was produced
    pub async fn answer(&self, question: &str) -> Answer {
        let passages = match self.index.search(question, self.top_k).await {
            Ok(passages) => passages,
            Err(e) => {
                tracing::error!(index = self.index.name(), error = %e, "Retrieval failed");
                return Answer::Failed(PromptBuilder::build_error_response(&e));
            }
        };

        tracing::info!(count = passages.len(), "Retrieved passages");
        for (rank, passage) in passages.iter().enumerate() {
            tracing::info!(rank = rank + 1, source = %passage.source(), "Retrieved source");
        }

        let context = PromptBuilder::build_context(&passages);
        let prompt = PromptBuilder::build_answer_prompt(question, &context);

        match self.llm.generate(&prompt).await {
            Ok(text) => Answer::Generated(text),
            Err(e) => {
                tracing::warn!(error = %e, "Generation unavailable, returning retrieved passages");
                Answer::Fallback(PromptBuilder::build_fallback_response(&passages))
            }
        }
    }

    /// Passages retrieved per question
    pub fn top_k(&self) -> usize {
        self.top_k
    }
}
