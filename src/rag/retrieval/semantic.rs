//! Semantic ranking by vector-space similarity.

use std::sync::Arc;

use crate::rag::core::errors::RagResult;
use crate::rag::core::record::ScoredResult;
use crate::rag::retrieval::score::max_normalize;
use crate::rag::storage::record_store::RecordStore;

/// Ranks records by embedding similarity to a query vector.
#[derive(Clone)]
pub struct SemanticRanker {
    store: Arc<dyn RecordStore>,
}

impl SemanticRanker {
    /// Create a ranker over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Return up to `top_k` records by descending relevance.
    ///
    /// Output scores are normalized per call to `[0, 1]` (batch-max
    /// normalization), monotonically increasing with relevance regardless
    /// of the store's native metric. An empty store yields an empty vec.
    ///
    /// # Errors
    /// Returns an error if the query dimensionality disagrees with the
    /// store or the store cannot be read.
    pub async fn rank(&self, query_vector: &[f32], top_k: usize) -> RagResult<Vec<ScoredResult>> {
        let mut results = self.store.nearest_neighbors(query_vector, top_k).await?;
        max_normalize(&mut results);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::core::errors::RagError;
    use crate::rag::core::metadata::RecordMetadata;
    use crate::rag::core::record::Record;
    use crate::rag::storage::flat_file::FlatFileRecordStore;

    fn record(text: &str, embedding: Vec<f32>) -> Record {
        Record::new(embedding, RecordMetadata::new(text)).expect("valid record")
    }

    async fn seeded_store() -> Arc<dyn RecordStore> {
        let store = FlatFileRecordStore::in_memory(2);
        store
            .add(vec![
                record("aligned", vec![1.0, 0.0]),
                record("diagonal", vec![1.0, 1.0]),
                record("orthogonal", vec![0.0, 1.0]),
            ])
            .await
            .expect("add");
        Arc::new(store)
    }

    #[tokio::test]
    async fn test_scores_normalized_to_unit_interval() {
        let ranker = SemanticRanker::new(seeded_store().await);
        let results = ranker.rank(&[1.0, 0.0], 3).await.expect("rank");
        assert_eq!(results.len(), 3);
        assert!((results[0].score - 1.0).abs() < f64::EPSILON);
        assert!(results.iter().all(|r| (0.0..=1.0).contains(&r.score)));
        assert_eq!(results[0].metadata.text, "aligned");
    }

    #[tokio::test]
    async fn test_empty_store_is_zero_result_success() {
        let store: Arc<dyn RecordStore> = Arc::new(FlatFileRecordStore::in_memory(2));
        let ranker = SemanticRanker::new(store);
        let results = ranker.rank(&[1.0, 0.0], 3).await.expect("rank");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_dimension_mismatch_propagates() {
        let ranker = SemanticRanker::new(seeded_store().await);
        let err = ranker.rank(&[1.0, 0.0, 0.0], 3).await;
        assert!(matches!(err, Err(RagError::DimensionMismatch { .. })));
    }

    #[tokio::test]
    async fn test_deterministic_across_calls() {
        let ranker = SemanticRanker::new(seeded_store().await);
        let first = ranker.rank(&[0.5, 0.5], 3).await.expect("rank");
        let second = ranker.rank(&[0.5, 0.5], 3).await.expect("rank");
        assert_eq!(first, second);
    }
}
