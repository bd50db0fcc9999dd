//! Record model and per-query result types.

use serde::{Deserialize, Serialize};

use crate::rag::core::errors::{RagError, RagResult};
use crate::rag::core::ids::RecordId;
use crate::rag::core::metadata::RecordMetadata;

/// An immutable unit of retrievable content: one embedded text chunk.
///
/// Records are created only by the ingestion path and never updated in
/// place. Duplicate text across distinct ids is permitted; the store does
/// not deduplicate by content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Unique record identifier.
    pub id: RecordId,
    /// Fixed-length embedding vector; dimensionality is constant per store.
    pub embedding: Vec<f32>,
    /// Provenance and the chunk text itself.
    pub metadata: RecordMetadata,
}

impl Record {
    /// Create a new record with a fresh id.
    ///
    /// # Errors
    /// Returns an error if the text is empty after trimming or the
    /// embedding is empty.
    pub fn new(embedding: Vec<f32>, metadata: RecordMetadata) -> RagResult<Self> {
        if metadata.text.trim().is_empty() {
            return Err(RagError::InvalidRecord("text is empty".to_string()));
        }
        if embedding.is_empty() {
            return Err(RagError::InvalidRecord("embedding is empty".to_string()));
        }

        Ok(Self {
            id: RecordId::new(),
            embedding,
            metadata,
        })
    }
}

/// A per-query search hit. Transient, never persisted.
///
/// The score is strategy-relative: similarity for semantic search, overlap
/// ratio for keyword search, fused weight for hybrid. Scores from different
/// strategies, or from different queries, are not comparable.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoredResult {
    /// Id of the matching record.
    pub id: RecordId,
    /// Strategy-relative relevance score.
    pub score: f64,
    /// Metadata of the matching record.
    pub metadata: RecordMetadata,
}

impl ScoredResult {
    /// Build a result from a record and a score.
    #[must_use]
    pub fn from_record(record: &Record, score: f64) -> Self {
        Self {
            id: record.id,
            score,
            metadata: record.metadata.clone(),
        }
    }
}
