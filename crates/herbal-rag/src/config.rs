//! Configuration for the question-answering system

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::types::Category;

/// Environment variable pointing at a TOML config file
pub const CONFIG_PATH_ENV: &str = "HERBAL_RAG_CONFIG";
/// Environment variable holding comma-separated Gemini API keys
pub const API_KEYS_ENV: &str = "HERBAL_RAG_API_KEYS";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Gemini configuration
    pub llm: LlmConfig,
    /// Retry and rate-governor policy
    pub retry: RetryConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Vector index configuration
    pub vector_db: VectorDbConfig,
    /// Offline corpus layout
    pub corpus: CorpusConfig,
}

impl RagConfig {
    /// Load configuration from an optional TOML file, then apply env overrides
    ///
    /// With no explicit path, `HERBAL_RAG_CONFIG` is consulted; without either,
    /// defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let mut config = match path.map(Path::to_path_buf).or(env_path) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Ok(keys) = std::env::var(API_KEYS_ENV) {
            config.llm.api_keys = parse_key_list(&keys);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("cannot read config '{}': {}", path.display(), e))
        })?;
        toml::from_str(&raw)
            .map_err(|e| Error::config(format!("invalid config '{}': {}", path.display(), e)))
    }

    /// Reject settings the retry loop and chunker cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.llm.api_keys.iter().all(|k| k.trim().is_empty()) {
            return Err(Error::config(format!(
                "no Gemini API keys configured; set llm.api_keys or {}",
                API_KEYS_ENV
            )));
        }
        if self.retry.max_retries == 0 {
            return Err(Error::config("retry.max_retries must be at least 1"));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::config("retrieval.top_k must be at least 1"));
        }
        if self.chunking.chunk_size == 0 {
            return Err(Error::config("chunking.chunk_size must be at least 1"));
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return Err(Error::config(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        Ok(())
    }
}

fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Gemini configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Ordered credential pool; the first key is active at startup
    pub api_keys: Vec<String>,
    /// Generation model name
    pub model: String,
    /// Gemini API base URL
    pub base_url: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Maximum output tokens per call
    pub max_output_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_keys: Vec::new(),
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.3,
            max_output_tokens: 8192,
            timeout_secs: 120,
        }
    }
}

/// Retry policy for quota errors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts per `generate` call, including the first
    pub max_retries: u32,
    /// Fixed wait after rotating credentials, in milliseconds
    pub retry_delay_ms: u64,
    /// Minimum spacing between successful calls in bulk structuring, in milliseconds
    pub bulk_min_spacing_ms: u64,
}

impl RetryConfig {
    /// Inter-retry delay
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Rate-governor spacing for bulk workloads
    pub fn bulk_min_spacing(&self) -> Duration {
        Duration::from_millis(self.bulk_min_spacing_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 2_000,
            bulk_min_spacing_ms: 10_000,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Passages fetched per question
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 10 }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap between chunks in characters
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 8000,
            chunk_overlap: 800,
        }
    }
}

/// Embedding (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name; must match the model the index was built with
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            timeout_secs: 60,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Directory holding the persisted index
    pub storage_path: PathBuf,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("vector"),
        }
    }
}

/// Offline corpus layout, one folder of `.txt` files per category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Root data directory
    pub data_dir: PathBuf,
    /// Plant folder, relative to `data_dir`
    pub plants_dir: String,
    /// Disease folder, relative to `data_dir`
    pub diseases_dir: String,
    /// Advice folder, relative to `data_dir`
    pub advice_dir: String,
    /// User folder, relative to `data_dir`
    pub users_dir: String,
}

impl CorpusConfig {
    /// Folder holding the source documents of one category
    pub fn folder_for(&self, category: Category) -> PathBuf {
        let sub = match category {
            Category::Plant => &self.plants_dir,
            Category::Disease => &self.diseases_dir,
            Category::Advice => &self.advice_dir,
            Category::User => &self.users_dir,
        };
        self.data_dir.join(sub)
    }
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            plants_dir: "plants".to_string(),
            diseases_dir: "diseases".to_string(),
            advice_dir: "advice".to_string(),
            users_dir: "users".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_keys() -> RagConfig {
        let mut config = RagConfig::default();
        config.llm.api_keys = vec!["key-a".to_string()];
        config
    }

    #[test]
    fn test_defaults_match_retry_contract() {
        let config = RagConfig::default();
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.retry.retry_delay(), Duration::from_secs(2));
        assert_eq!(config.retry.bulk_min_spacing(), Duration::from_secs(10));
        assert_eq!(config.retrieval.top_k, 10);
        assert_eq!(config.chunking.chunk_size, 8000);
        assert_eq!(config.chunking.chunk_overlap, 800);
    }

    #[test]
    fn test_validate_requires_keys() {
        let config = RagConfig::default();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
        assert!(with_keys().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_chunking() {
        let mut config = with_keys();
        config.chunking.chunk_overlap = config.chunking.chunk_size;
        assert!(config.validate().is_err());

        let mut config = with_keys();
        config.retry.max_retries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RagConfig = toml::from_str(
            r#"
            [llm]
            api_keys = ["a", "b"]

            [retry]
            retry_delay_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.api_keys, vec!["a", "b"]);
        assert_eq!(config.llm.model, "gemini-1.5-flash");
        assert_eq!(config.retry.retry_delay_ms, 500);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.corpus.plants_dir, "plants");
    }

    #[test]
    fn test_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("herbal.toml");
        std::fs::write(&path, "[retrieval]\ntop_k = 4\n").unwrap();

        let config = RagConfig::from_file(&path).unwrap();
        assert_eq!(config.retrieval.top_k, 4);

        let missing = RagConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(missing.to_string().contains("nope.toml"));
    }

    #[test]
    fn test_parse_key_list() {
        assert_eq!(parse_key_list(" a, ,b ,c"), vec!["a", "b", "c"]);
        assert!(parse_key_list("").is_empty());
    }

    #[test]
    fn test_folder_for_category() {
        let corpus = CorpusConfig::default();
        assert_eq!(corpus.folder_for(Category::Disease), PathBuf::from("data/diseases"));
        assert_eq!(corpus.folder_for(Category::User), PathBuf::from("data/users"));
    }
}
