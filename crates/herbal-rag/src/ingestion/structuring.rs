//! Bulk structuring: source document -> model-extracted record -> retrievable chunks
//!
//! Each document is sent to the model with its category schema. The returned
//! JSON object is exploded field by field into overlapping windows. Failures
//! are isolated per document; the batch always runs to the end.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{CorpusConfig, RagConfig};
use crate::error::{Error, Result};
use crate::generation::{PromptBuilder, ResilientLlm, RetryPolicy};
use crate::types::{Category, CorpusChunk, SourceDocument};

use super::chunker::TextChunker;
use super::loader::load_documents;
use super::schema::NO_INFORMATION;

/// Return the first balanced `{...}` substring of `raw`
///
/// Braces inside JSON strings are ignored. Fails with `Error::Parse` when no
/// opening brace exists or it is never closed.
pub fn extract_json_object(raw: &str) -> Result<&str> {
    let start = raw
        .find('{')
        .ok_or_else(|| Error::Parse(preview(raw)))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&raw[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    Err(Error::Parse(preview(raw)))
}

fn preview(raw: &str) -> String {
    const MAX: usize = 200;
    if raw.chars().count() <= MAX {
        raw.to_string()
    } else {
        format!("{}...", raw.chars().take(MAX).collect::<String>())
    }
}

/// Textual form of a field value; `None` when absent or the no-information sentinel
fn value_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    };

    if text.is_empty() || text == NO_INFORMATION {
        None
    } else {
        Some(text)
    }
}

/// Fields extracted by the model from one source document
#[derive(Debug, Clone)]
pub struct StructuredRecord {
    category: Category,
    name: String,
    fields: Vec<(String, String)>,
}

impl StructuredRecord {
    /// Decode a JSON object, keeping only fields with real content
    pub fn from_json(category: Category, json: &str) -> Result<Self> {
        let object: Map<String, Value> = serde_json::from_str(json).map_err(Error::Decode)?;

        let name = object
            .get(category.name_key())
            .and_then(value_text)
            .unwrap_or_default();

        let fields = object
            .iter()
            .filter_map(|(field, value)| value_text(value).map(|text| (field.clone(), text)))
            .collect();

        Ok(Self {
            category,
            name,
            fields,
        })
    }

    /// Primary name used for provenance tagging
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields with content, in the model's order
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Explode into one chunk per window per field
    pub fn into_chunks(self, source: &str, chunker: &TextChunker) -> Vec<CorpusChunk> {
        let mut chunks = Vec::new();
        for (field, text) in &self.fields {
            for (index, window) in chunker.split(text).iter().enumerate() {
                chunks.push(CorpusChunk::new(
                    self.category,
                    &self.name,
                    field,
                    window,
                    source.to_string(),
                    index,
                ));
            }
        }
        chunks
    }
}

/// A document that contributed no chunks
#[derive(Debug, Clone)]
pub struct SkippedDocument {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of structuring one category
#[derive(Debug, Clone)]
pub struct CategoryOutcome {
    pub category: Category,
    /// Chunks in document order
    pub chunks: Vec<CorpusChunk>,
    /// File names of every document read, including skipped ones
    pub processed: Vec<String>,
    pub skipped: Vec<SkippedDocument>,
}

impl CategoryOutcome {
    fn new(category: Category) -> Self {
        Self {
            category,
            chunks: Vec::new(),
            processed: Vec::new(),
            skipped: Vec::new(),
        }
    }
}

/// Result of a full corpus run, categories in processing order
#[derive(Debug, Clone, Default)]
pub struct StructuringReport {
    pub outcomes: Vec<CategoryOutcome>,
}

impl StructuringReport {
    /// Total chunk count
    pub fn chunk_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.chunks.len()).sum()
    }

    /// Flatten every category's chunks into one ordered list
    pub fn into_chunks(self) -> Vec<CorpusChunk> {
        self.outcomes.into_iter().flat_map(|o| o.chunks).collect()
    }
}

/// Runs source documents through the model and chunker
pub struct StructuringPipeline {
    llm: Arc<ResilientLlm>,
    chunker: TextChunker,
}

impl StructuringPipeline {
    /// Create a pipeline around an existing client
    pub fn new(llm: Arc<ResilientLlm>, chunker: TextChunker) -> Self {
        Self { llm, chunker }
    }

    /// Gemini-backed pipeline with the bulk (rate-governed) retry policy
    pub fn from_config(config: &RagConfig) -> Result<Self> {
        let llm = ResilientLlm::from_config(config, RetryPolicy::bulk(&config.retry))?;
        Ok(Self::new(Arc::new(llm), TextChunker::from_config(&config.chunking)))
    }

    /// Structure one document into chunks
    pub async fn structure_document(&self, doc: &SourceDocument) -> Result<Vec<CorpusChunk>> {
        let prompt = PromptBuilder::build_structuring_prompt(doc.category, &doc.content);
        let raw = self.llm.generate(&prompt).await?;

        let record = extract_json_object(&raw)
            .and_then(|json| StructuredRecord::from_json(doc.category, json))
            .map_err(|e| {
                tracing::debug!(path = %doc.path.display(), output = %raw, "Unusable model output");
                e
            })?;

        Ok(record.into_chunks(&doc.source(), &self.chunker))
    }

    /// Structure a batch of documents of one category
    pub async fn process_documents(
        &self,
        category: Category,
        documents: Vec<SourceDocument>,
    ) -> CategoryOutcome {
        let mut outcome = CategoryOutcome::new(category);
        let total = documents.len();

        for (i, doc) in documents.into_iter().enumerate() {
            outcome.processed.push(doc.filename.clone());

            match self.structure_document(&doc).await {
                Ok(chunks) => {
                    outcome.chunks.extend(chunks);
                    tracing::info!(
                        category = %category,
                        document = i + 1,
                        total,
                        file = %doc.filename,
                        chunks = outcome.chunks.len(),
                        "Structured document"
                    );
                }
                Err(e) => {
                    if e.is_malformed_output() {
                        tracing::warn!(file = %doc.filename, hash = %doc.content_hash, error = %e, "Skipping document with malformed model output");
                    } else {
                        tracing::error!(file = %doc.filename, hash = %doc.content_hash, error = %e, "Skipping document after unexpected error");
                    }
                    outcome.skipped.push(SkippedDocument {
                        path: doc.path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        outcome
    }

    /// Load and structure every document in `dir`
    pub async fn process_category(&self, category: Category, dir: &Path) -> Result<CategoryOutcome> {
        let documents = load_documents(dir, category).await?;
        Ok(self.process_documents(category, documents).await)
    }

    /// Structure every category folder of the corpus: plant, disease, advice, user
    pub async fn process_corpus(&self, corpus: &CorpusConfig) -> Result<StructuringReport> {
        let mut report = StructuringReport::default();
        for category in Category::ALL {
            tracing::info!(category = %category, "Processing {} documents", category.display_name());
            let outcome = self
                .process_category(category, &corpus.folder_for(category))
                .await?;
            report.outcomes.push(outcome);
        }
        Ok(report)
    }
}
