//! Configuration for the retrieval engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::rag::core::errors::{RagError, RagResult};

/// Top-level configuration for the RAG engine.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Retrieval and fusion settings.
    pub retrieval: RetrievalConfig,
    /// Storage backend settings.
    pub storage: StorageConfig,
    /// Embedding model settings.
    pub embedding: EmbeddingConfig,
    /// Completion model settings.
    pub llm: LlmConfig,
    /// Document chunking settings.
    pub chunking: ChunkingConfig,
    /// Prompt construction settings.
    pub prompt: PromptConfig,
}

impl RagConfig {
    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> RagResult<()> {
        if self.retrieval.top_k == 0 {
            return Err(RagError::InvalidConfig(
                "retrieval.top_k must be > 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.retrieval.alpha) {
            return Err(RagError::InvalidConfig(
                "retrieval.alpha must be in [0, 1]".to_string(),
            ));
        }

        if self.retrieval.fallback_threshold < 0.0 {
            return Err(RagError::InvalidConfig(
                "retrieval.fallback_threshold must be >= 0".to_string(),
            ));
        }

        if self.embedding.ndims == 0 {
            return Err(RagError::InvalidConfig(
                "embedding.ndims must be > 0".to_string(),
            ));
        }

        if self.chunking.max_chunk_chars == 0 {
            return Err(RagError::InvalidConfig(
                "chunking.max_chunk_chars must be > 0".to_string(),
            ));
        }

        if self.prompt.max_context_chars == 0 {
            return Err(RagError::InvalidConfig(
                "prompt.max_context_chars must be > 0".to_string(),
            ));
        }

        if let Some(base_url) = &self.embedding.base_url {
            Url::parse(base_url)?;
        }

        if let Some(base_url) = &self.llm.base_url {
            Url::parse(base_url)?;
        }

        Ok(())
    }
}

/// Retrieval and fusion settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of results to return.
    pub top_k: usize,
    /// Weight on the semantic signal in fusion; `1 - alpha` goes to keyword.
    pub alpha: f64,
    /// Fused-score floor below which the orchestrator falls back to pure
    /// semantic retrieval. Inherited default, not tuned against real data.
    pub fallback_threshold: f64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            alpha: 0.7,
            fallback_threshold: 0.1,
        }
    }
}

/// Storage backend selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// `SQLite` with the sqlite-vec extension for nearest-neighbor search.
    Sqlite,
    /// JSON flat file with in-memory linear-scan search.
    FlatFile,
}

/// Storage configuration for record data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backend to construct at startup.
    pub backend: StorageBackend,
    /// `SQLite` database path (sqlite backend).
    pub sqlite_path: PathBuf,
    /// Record table name (sqlite backend).
    pub record_table: String,
    /// JSON store path (flat-file backend).
    pub flat_file_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Sqlite,
            sqlite_path: PathBuf::from("talkflow.sqlite"),
            record_table: "records".to_string(),
            flat_file_path: PathBuf::from("talkflow_store.json"),
        }
    }
}

/// Embedding model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Ollama embedding model name.
    pub model: String,
    /// Embedding vector dimensions.
    pub ndims: usize,
    /// Optional custom base URL.
    pub base_url: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "nomic-embed-text".to_string(),
            ndims: 768,
            base_url: None,
        }
    }
}

/// Completion model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama completion model name.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f64,
    /// Optional max tokens.
    pub max_tokens: Option<u64>,
    /// Optional custom base URL.
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "ministral-3:8b-instruct-2512-q8_0".to_string(),
            temperature: 0.7,
            max_tokens: None,
            base_url: None,
        }
    }
}

/// Document chunking settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters; longer paragraphs are split.
    pub max_chunk_chars: usize,
    /// Minimum chunk size in characters; shorter fragments are dropped.
    pub min_chunk_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_chars: 2000,
            min_chunk_chars: 1,
        }
    }
}

/// Prompt construction settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Maximum retrieved-context size in characters.
    pub max_context_chars: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_context_chars: 3600,
        }
    }
}
