//! Error types for the retrieval subsystem.

use thiserror::Error;

/// Retrieval subsystem error type.
#[derive(Debug, Error)]
pub enum RagError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Invalid record content or embedding.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    /// Query or record embedding length disagrees with the store dimensionality.
    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// Dimensionality the store was configured with.
        expected: usize,
        /// Dimensionality of the offending vector.
        got: usize,
    },
    /// Persistence layer unavailable on the write path.
    #[error("store write error: {0}")]
    StoreWrite(String),
    /// Persistence layer unavailable on the read path.
    #[error("store read error: {0}")]
    StoreRead(String),
    /// `SQLite` storage error (async).
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// Embedding provider error.
    #[error("embedding error: {0}")]
    Embedding(#[from] rig::embeddings::EmbeddingError),
    /// Completion provider error.
    #[error("completion error: {0}")]
    Completion(#[from] rig::completion::CompletionError),
    /// HTTP client error from Rig.
    #[error("http client error: {0}")]
    HttpClient(#[from] rig::http_client::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Required `SQLite` extension not available.
    #[error("sqlite-vec extension is not available; load it before initializing the record store")]
    SqliteVecUnavailable,
}

/// Convenience result alias for retrieval operations.
pub type RagResult<T> = Result<T, RagError>;
