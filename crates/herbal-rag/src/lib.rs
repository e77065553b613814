//! herbal-rag: question answering over a Vietnamese medicinal-plant corpus
//!
//! Answers are grounded in passages retrieved from a persisted vector index
//! and generated by Gemini through a client that rotates across a pool of API
//! keys whenever one runs out of quota. When no key can answer, the retrieved
//! passages are returned verbatim instead.
//!
//! The offline side structures raw text documents into per-field records with
//! the same client, splits them into overlapping windows, and builds the index.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod types;

#[cfg(test)]
mod testing;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::{Credential, CredentialPool, PromptBuilder, ResilientLlm, RetryPolicy};
pub use ingestion::{StructuringPipeline, StructuringReport, TextChunker};
pub use retrieval::AnswerEngine;
pub use types::{Answer, Category, CorpusChunk, RetrievedPassage, SourceDocument};
