//! Source documents and the chunks derived from them

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::path::PathBuf;
use uuid::Uuid;

use super::category::Category;

/// One plain-text file from the offline corpus
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Full path, recorded as chunk provenance
    pub path: PathBuf,
    /// File name only
    pub filename: String,
    /// Category of the folder it was read from
    pub category: Category,
    /// Whole file contents
    pub content: String,
    /// SHA-256 of the contents
    pub content_hash: String,
}

impl SourceDocument {
    /// Create a source document, hashing its contents
    pub fn new(path: PathBuf, category: Category, content: String) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let content_hash = hex::encode(Sha256::digest(content.as_bytes()));

        Self {
            path,
            filename,
            category,
            content,
            content_hash,
        }
    }

    /// Provenance string stored under the `source` metadata key
    pub fn source(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}

/// Provenance of a chunk
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChunkMetadata {
    /// Path of the source document
    pub source: String,
    /// Category of the source document
    pub category: Category,
    /// Schema field the text came from
    pub field: String,
    /// Primary name of the structured record
    pub name: String,
    /// Window position within the field
    pub chunk_index: usize,
}

impl ChunkMetadata {
    /// Flatten into the key/value layout stored in the vector index
    pub fn to_metadata_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("source".to_string(), Value::String(self.source.clone()));
        map.insert("type".to_string(), Value::String(self.category.as_str().to_string()));
        map.insert("field".to_string(), Value::String(self.field.clone()));
        map.insert(self.category.name_metadata_key(), Value::String(self.name.clone()));
        map.insert("chunk_index".to_string(), Value::from(self.chunk_index));
        map
    }
}

/// An independently retrievable unit produced by bulk structuring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusChunk {
    /// Unique chunk ID
    pub id: Uuid,
    /// Text as embedded and retrieved, prefixed with entity and field labels
    pub content: String,
    /// Provenance
    pub metadata: ChunkMetadata,
}

impl CorpusChunk {
    /// Create a chunk for one window of one field
    pub fn new(
        category: Category,
        name: &str,
        field: &str,
        window: &str,
        source: String,
        chunk_index: usize,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: format!("{}: {}\n{}: {}", category.entity_label(), name, field, window),
            metadata: ChunkMetadata {
                source,
                category,
                field: field.to_string(),
                name: name.to_string(),
                chunk_index,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_content_prefix() {
        let chunk = CorpusChunk::new(
            Category::Plant,
            "Gừng",
            "Công dụng",
            "chống viêm",
            "data/plants/gung.txt".to_string(),
            0,
        );
        assert_eq!(chunk.content, "Tên cây: Gừng\nCông dụng: chống viêm");
    }

    #[test]
    fn test_metadata_map_keys() {
        let meta = ChunkMetadata {
            source: "data/diseases/cam.txt".to_string(),
            category: Category::Disease,
            field: "Triệu chứng".to_string(),
            name: "Cảm cúm".to_string(),
            chunk_index: 2,
        };
        let map = meta.to_metadata_map();

        assert_eq!(map["source"], "data/diseases/cam.txt");
        assert_eq!(map["type"], "disease");
        assert_eq!(map["field"], "Triệu chứng");
        assert_eq!(map["disease_name"], "Cảm cúm");
        assert_eq!(map["chunk_index"], 2);
    }

    #[test]
    fn test_source_document_filename_and_hash() {
        let doc = SourceDocument::new(
            PathBuf::from("data/plants/nghe.txt"),
            Category::Plant,
            "Nghệ vàng".to_string(),
        );
        assert_eq!(doc.filename, "nghe.txt");
        assert_eq!(doc.content_hash.len(), 64);
    }
}
