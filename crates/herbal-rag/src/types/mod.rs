//! Core types for the question-answering system

pub mod answer;
pub mod category;
pub mod document;
pub mod passage;

pub use answer::Answer;
pub use category::Category;
pub use document::{ChunkMetadata, CorpusChunk, SourceDocument};
pub use passage::RetrievedPassage;
