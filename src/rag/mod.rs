//! Retrieval-augmented generation subsystem.
//!
//! Organized into:
//! - `core`: Configuration, errors, IDs, records, and metadata
//! - `storage`: Record stores (sqlite-vec and flat-file backends)
//! - `retrieval`: Semantic, keyword, and fusion rankers plus orchestration
//! - `embedding`: Embedding model abstraction and Ollama implementation
//! - `generation`: Completion model abstraction and Ollama implementation
//! - `ingest`: Document chunking and the embed-and-store pipeline
//! - `prompt`: Personas and grounded prompt construction
//! - `engine`: Main orchestration of the RAG system

pub mod core;
pub mod embedding;
pub mod engine;
pub mod generation;
pub mod ingest;
pub mod prompt;
pub mod retrieval;
pub mod storage;

// Re-export commonly used types for convenience
pub use core::{
    ChunkingConfig, DocumentId, EmbeddingConfig, LlmConfig, PromptConfig, RagConfig, RagError,
    RagResult, Record, RecordId, RecordMetadata, RetrievalConfig, ScoredResult, StorageBackend,
    StorageConfig,
};
pub use embedding::{EmbedFuture, Embedder, InitState, LazyEmbedder, OllamaEmbedder};
pub use engine::{GroundedAnswer, RagBackends, RagEngine};
pub use generation::{GenerateFuture, Generator, OllamaGenerator, chunk_generated};
pub use ingest::{DocumentIngestor, IngestReport, chunk_text};
pub use prompt::{Persona, PromptParts, build_prompt, enforce_budget};
pub use retrieval::{
    DEFAULT_ALPHA, FusionRanker, KeywordRanker, RetrievalOrchestrator, RetrievalStrategy,
    SemanticRanker, max_normalize,
};
pub use storage::{
    FlatFileRecordStore, RecordStore, SqliteRecordStore, StoreFuture, build_record_store,
    init_sqlite_vec_extension,
};
