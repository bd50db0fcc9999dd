//! Core retrieval types and identifiers.

pub mod config;
pub mod errors;
pub mod ids;
pub mod metadata;
pub mod record;

pub use config::{
    ChunkingConfig, EmbeddingConfig, LlmConfig, PromptConfig, RagConfig, RetrievalConfig,
    StorageBackend, StorageConfig,
};
pub use errors::{RagError, RagResult};
pub use ids::{DocumentId, RecordId};
pub use metadata::RecordMetadata;
pub use record::{Record, ScoredResult};
