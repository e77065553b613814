//! Passages returned by the vector index

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Shown when a passage carries no `source` metadata
pub const UNKNOWN_SOURCE: &str = "Unknown source";

/// A unit of corpus text returned by the vector index, in rank order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedPassage {
    /// Raw chunk text as indexed
    pub content: String,
    /// Provenance metadata; `source` is expected
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl RetrievedPassage {
    /// Create a passage
    pub fn new(content: impl Into<String>, metadata: Map<String, Value>) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Origin identifier, or "Unknown source"
    pub fn source(&self) -> &str {
        self.metadata
            .get("source")
            .and_then(Value::as_str)
            .unwrap_or(UNKNOWN_SOURCE)
    }

    /// Text shown to the model: the value after the first `:` label, or the whole passage
    pub fn display_text(&self) -> &str {
        match self.content.split_once(':') {
            Some((_, value)) => value.trim(),
            None => self.content.trim(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_text_strips_first_label() {
        let passage = RetrievedPassage::new("Tên cây: Gừng: chống viêm", Map::new());
        assert_eq!(passage.display_text(), "Gừng: chống viêm");

        let plain = RetrievedPassage::new("  không có nhãn  ", Map::new());
        assert_eq!(plain.display_text(), "không có nhãn");
    }

    #[test]
    fn test_source_fallback() {
        let mut metadata = Map::new();
        assert_eq!(RetrievedPassage::new("x", metadata.clone()).source(), UNKNOWN_SOURCE);

        metadata.insert("source".to_string(), Value::from("data/plants/gung.txt"));
        assert_eq!(RetrievedPassage::new("x", metadata).source(), "data/plants/gung.txt");
    }
}
