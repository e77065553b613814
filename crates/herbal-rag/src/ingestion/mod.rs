//! Offline corpus preparation: load, structure with the model, chunk

mod chunker;
pub mod loader;
pub mod schema;
pub mod structuring;

pub use chunker::TextChunker;
pub use loader::load_documents;
pub use schema::{schema_for, CategorySchema, FieldSpec, NO_INFORMATION};
pub use structuring::{
    extract_json_object, CategoryOutcome, SkippedDocument, StructuredRecord, StructuringPipeline,
    StructuringReport,
};
