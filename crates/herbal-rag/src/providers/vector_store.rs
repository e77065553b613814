//! Vector index trait consumed by the answering flow

use async_trait::async_trait;
use crate::error::Result;
use crate::types::RetrievedPassage;

/// Similarity search over the indexed corpus
///
/// Implementations:
/// - `LocalVectorIndex`: brute-force cosine search over a persisted directory
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `top_k` passages, most relevant first
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedPassage>>;

    /// Number of indexed passages
    async fn len(&self) -> Result<usize>;

    /// Check if the index is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Get provider name for logging
    fn name(&self) -> &str;
}
