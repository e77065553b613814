//! Provider abstractions for the model binding, embeddings, and vector index
//!
//! The core only depends on the traits here; Gemini, Ollama, and the local
//! persisted index are the concrete backends.

pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod local;
pub mod ollama;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use gemini::{GeminiClient, GeminiSessionFactory};
pub use llm::{LlmProvider, ProviderError, SessionFactory};
pub use local::LocalVectorIndex;
pub use ollama::OllamaEmbedder;
pub use vector_store::VectorIndex;
