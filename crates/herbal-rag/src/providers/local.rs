//! Local persisted vector index
//!
//! Layout of the index directory:
//! - `manifest.json`: embedding model, dimensions, entry count, build time
//! - `chunks.jsonl`: one indexed chunk per line (content, metadata, embedding)

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{CorpusChunk, RetrievedPassage};

use super::embedding::EmbeddingProvider;
use super::vector_store::VectorIndex;

const MANIFEST_FILE: &str = "manifest.json";
const CHUNKS_FILE: &str = "chunks.jsonl";

/// Describes how an index directory was built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    /// Embedding model used at build time
    pub embedding_model: String,
    /// Vector dimensions
    pub dimensions: usize,
    /// Number of indexed chunks
    pub count: usize,
    /// Build timestamp
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    id: Uuid,
    content: String,
    metadata: Map<String, Value>,
    embedding: Vec<f32>,
}

/// Brute-force cosine index loaded fully into memory
pub struct LocalVectorIndex {
    dir: PathBuf,
    embedder: Arc<dyn EmbeddingProvider>,
    manifest: IndexManifest,
    entries: Vec<IndexEntry>,
}

impl LocalVectorIndex {
    /// Open an existing index directory
    ///
    /// Fails with `Error::Initialization` when the directory or manifest is
    /// missing, the data is unreadable, or the embedding model differs from
    /// the one the index was built with.
    pub async fn open(dir: &Path, embedder: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        if !dir.is_dir() {
            return Err(Error::initialization(format!(
                "Vector store directory '{}' not found",
                dir.display()
            )));
        }

        let manifest_path = dir.join(MANIFEST_FILE);
        let raw_manifest = tokio::fs::read_to_string(&manifest_path).await.map_err(|e| {
            Error::initialization(format!(
                "cannot read index manifest '{}': {}",
                manifest_path.display(),
                e
            ))
        })?;
        let manifest: IndexManifest = serde_json::from_str(&raw_manifest).map_err(|e| {
            Error::initialization(format!("corrupt index manifest '{}': {}", manifest_path.display(), e))
        })?;

        if manifest.embedding_model != embedder.model() {
            return Err(Error::initialization(format!(
                "index '{}' was built with embedding model '{}' but '{}' is configured",
                dir.display(),
                manifest.embedding_model,
                embedder.model()
            )));
        }

        let chunks_path = dir.join(CHUNKS_FILE);
        let raw_chunks = tokio::fs::read_to_string(&chunks_path).await.map_err(|e| {
            Error::initialization(format!("cannot read index data '{}': {}", chunks_path.display(), e))
        })?;

        let mut entries = Vec::with_capacity(manifest.count);
        for (line_no, line) in raw_chunks.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let entry: IndexEntry = serde_json::from_str(line).map_err(|e| {
                Error::initialization(format!(
                    "corrupt index data '{}' line {}: {}",
                    chunks_path.display(),
                    line_no + 1,
                    e
                ))
            })?;
            entries.push(entry);
        }

        tracing::info!(
            path = %dir.display(),
            entries = entries.len(),
            model = %manifest.embedding_model,
            "Opened vector index"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            embedder,
            manifest,
            entries,
        })
    }

    /// Embed `chunks` and persist them as a new index in `dir`, replacing any previous one
    pub async fn build(
        dir: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
        chunks: &[CorpusChunk],
    ) -> Result<Self> {
        tokio::fs::create_dir_all(dir).await?;

        let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(Error::embedding(format!(
                "expected {} embeddings, got {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let dimensions = embeddings.first().map(Vec::len).unwrap_or(0);
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimensions) {
            return Err(Error::embedding(format!(
                "inconsistent embedding dimensions: {} vs {}",
                dimensions,
                bad.len()
            )));
        }

        let entries: Vec<IndexEntry> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry {
                id: chunk.id,
                content: chunk.content.clone(),
                metadata: chunk.metadata.to_metadata_map(),
                embedding,
            })
            .collect();

        let mut data = String::new();
        for entry in &entries {
            data.push_str(&serde_json::to_string(entry)?);
            data.push('\n');
        }
        tokio::fs::write(dir.join(CHUNKS_FILE), data).await?;

        let manifest = IndexManifest {
            embedding_model: embedder.model().to_string(),
            dimensions,
            count: entries.len(),
            created_at: Utc::now(),
        };
        tokio::fs::write(dir.join(MANIFEST_FILE), serde_json::to_string_pretty(&manifest)?).await?;

        tracing::info!(
            path = %dir.display(),
            entries = entries.len(),
            dimensions,
            "Persisted vector index"
        );

        Ok(Self {
            dir: dir.to_path_buf(),
            embedder,
            manifest,
            entries,
        })
    }

    /// Manifest of the loaded index
    pub fn manifest(&self) -> &IndexManifest {
        &self.manifest
    }

    /// Index directory
    pub fn path(&self) -> &Path {
        &self.dir
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for LocalVectorIndex {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedPassage>> {
        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| Error::retrieval(format!("failed to embed query: {}", e)))?;

        let mut scored: Vec<(f32, &IndexEntry)> = self
            .entries
            .iter()
            .map(|entry| (cosine_similarity(&query_embedding, &entry.embedding), entry))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);

        Ok(scored
            .into_iter()
            .map(|(_, entry)| RetrievedPassage::new(entry.content.clone(), entry.metadata.clone()))
            .collect())
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.len())
    }

    fn name(&self) -> &str {
        "local-cosine"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    /// Embeds text as counts of a few marker words
    struct KeywordEmbedder;

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let text = text.to_lowercase();
            Ok(["gừng", "nghệ", "tỏi"]
                .iter()
                .map(|w| text.matches(w).count() as f32 + 0.01)
                .collect())
        }

        fn model(&self) -> &str {
            "keyword-test"
        }

        fn name(&self) -> &str {
            "keyword"
        }
    }

    fn chunk(name: &str, text: &str) -> CorpusChunk {
        CorpusChunk::new(
            Category::Plant,
            name,
            "Công dụng",
            text,
            format!("data/plants/{}.txt", name),
            0,
        )
    }

    #[tokio::test]
    async fn test_open_missing_directory_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("vector");

        let err = LocalVectorIndex::open(&missing, Arc::new(KeywordEmbedder))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Initialization(_)));
        assert!(err.to_string().contains("not found"));
    }

    #[tokio::test]
    async fn test_build_then_open_and_search() {
        let dir = tempfile::tempdir().unwrap();
        let chunks = vec![
            chunk("Gừng", "gừng chống viêm"),
            chunk("Tỏi", "tỏi hạ huyết áp"),
            chunk("Nghệ", "nghệ kháng khuẩn"),
        ];

        LocalVectorIndex::build(dir.path(), Arc::new(KeywordEmbedder), &chunks)
            .await
            .unwrap();

        let index = LocalVectorIndex::open(dir.path(), Arc::new(KeywordEmbedder))
            .await
            .unwrap();
        assert_eq!(index.len().await.unwrap(), 3);
        assert_eq!(index.manifest().dimensions, 3);

        let results = index.search("tỏi", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].content.contains("Tỏi"));
        assert_eq!(results[0].source(), "data/plants/Tỏi.txt");
        assert_eq!(results[0].metadata["plant_name"], "Tỏi");
    }

    #[tokio::test]
    async fn test_open_rejects_different_embedding_model() {
        struct OtherEmbedder;

        #[async_trait]
        impl EmbeddingProvider for OtherEmbedder {
            async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
                Ok(vec![1.0, 0.0, 0.0])
            }
            fn model(&self) -> &str {
                "other-model"
            }
            fn name(&self) -> &str {
                "other"
            }
        }

        let dir = tempfile::tempdir().unwrap();
        LocalVectorIndex::build(dir.path(), Arc::new(KeywordEmbedder), &[chunk("Gừng", "gừng")])
            .await
            .unwrap();

        let err = LocalVectorIndex::open(dir.path(), Arc::new(OtherEmbedder))
            .await
            .err()
            .unwrap();
        assert!(matches!(err, Error::Initialization(_)));
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 1.0]), 0.0);
    }
}
