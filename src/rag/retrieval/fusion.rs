//! Hybrid ranking: weighted fusion of semantic and keyword signals.
//!
//! The two strategies score on incompatible scales (distance-derived
//! similarity vs term-overlap ratio), so each batch is max-normalized
//! independently before the weighted sum. Fused scores are therefore only
//! meaningful relative to their own query's batch; never cache or compare
//! them across queries.

use std::collections::HashMap;

use crate::rag::core::errors::{RagError, RagResult};
use crate::rag::core::ids::RecordId;
use crate::rag::core::metadata::RecordMetadata;
use crate::rag::core::record::ScoredResult;
use crate::rag::retrieval::keyword::KeywordRanker;
use crate::rag::retrieval::score::max_normalize;
use crate::rag::retrieval::semantic::SemanticRanker;

/// Default weight on the semantic signal.
pub const DEFAULT_ALPHA: f64 = 0.7;

/// Combines semantic and keyword rankings into one ranked list.
#[derive(Clone)]
pub struct FusionRanker {
    semantic: SemanticRanker,
    keyword: KeywordRanker,
}

struct FusedEntry {
    score: f64,
    metadata: RecordMetadata,
}

impl FusionRanker {
    /// Create a fusion ranker over the two strategies.
    #[must_use]
    pub const fn new(semantic: SemanticRanker, keyword: KeywordRanker) -> Self {
        Self { semantic, keyword }
    }

    /// Return up to `top_k` records ranked by the fused score.
    ///
    /// `alpha` weights the semantic signal, `1 - alpha` the keyword signal.
    /// Each ranker is asked for `2 × top_k` candidates so the union keeps
    /// decent recall before truncation. A record present in only one batch
    /// contributes its single weighted term, which is what makes fusion
    /// degrade to the surviving signal when the other returns nothing.
    /// Ordering is deterministic: stable sort with ties keeping semantic
    /// rank, then keyword rank.
    ///
    /// # Errors
    /// Returns an error if `alpha` is outside `[0, 1]` or either ranker
    /// fails.
    pub async fn rank(
        &self,
        query_vector: &[f32],
        query_text: &str,
        top_k: usize,
        alpha: f64,
    ) -> RagResult<Vec<ScoredResult>> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(RagError::InvalidConfig(format!(
                "fusion alpha must be in [0, 1], got {alpha}"
            )));
        }

        let fetch = top_k.saturating_mul(2);
        let mut semantic_batch = self.semantic.rank(query_vector, fetch).await?;
        let mut keyword_batch = self.keyword.rank(query_text, fetch).await?;
        max_normalize(&mut semantic_batch);
        max_normalize(&mut keyword_batch);

        // First-seen order makes the later stable sort deterministic.
        let mut order: Vec<RecordId> = Vec::with_capacity(semantic_batch.len());
        let mut combined: HashMap<RecordId, FusedEntry> = HashMap::new();

        for result in semantic_batch {
            order.push(result.id);
            combined.insert(
                result.id,
                FusedEntry {
                    score: alpha * result.score,
                    metadata: result.metadata,
                },
            );
        }

        for result in keyword_batch {
            let weighted = (1.0 - alpha) * result.score;
            if let Some(entry) = combined.get_mut(&result.id) {
                entry.score += weighted;
            } else {
                order.push(result.id);
                combined.insert(
                    result.id,
                    FusedEntry {
                        score: weighted,
                        metadata: result.metadata,
                    },
                );
            }
        }

        let mut results: Vec<ScoredResult> = order
            .into_iter()
            .filter_map(|id| {
                combined.remove(&id).map(|entry| ScoredResult {
                    id,
                    score: entry.score,
                    metadata: entry.metadata,
                })
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::rag::core::record::Record;
    use crate::rag::storage::flat_file::FlatFileRecordStore;
    use crate::rag::storage::record_store::RecordStore;

    fn record(text: &str, embedding: Vec<f32>) -> Record {
        Record::new(embedding, RecordMetadata::new(text)).expect("valid record")
    }

    async fn rankers_over(records: Vec<Record>, ndims: usize) -> (SemanticRanker, KeywordRanker) {
        let store = FlatFileRecordStore::in_memory(ndims);
        store.add(records).await.expect("add");
        let store: Arc<dyn RecordStore> = Arc::new(store);
        (
            SemanticRanker::new(Arc::clone(&store)),
            KeywordRanker::new(store),
        )
    }

    fn ids(results: &[ScoredResult]) -> Vec<RecordId> {
        results.iter().map(|r| r.id).collect()
    }

    // Three records with distinct semantic and keyword orderings.
    async fn mixed_fixture() -> (SemanticRanker, KeywordRanker) {
        rankers_over(
            vec![
                record("cats are great pets", vec![0.2, 1.0]),
                record("dogs are loyal companions", vec![1.0, 0.1]),
                record("cats and dogs both need care", vec![0.7, 0.7]),
            ],
            2,
        )
        .await
    }

    #[tokio::test]
    async fn test_alpha_one_matches_semantic_order() {
        let (semantic, keyword) = mixed_fixture().await;
        let fusion = FusionRanker::new(semantic.clone(), keyword);

        let fused = fusion.rank(&[1.0, 0.0], "cats pets", 3, 1.0).await.expect("fused");
        let pure = semantic.rank(&[1.0, 0.0], 3).await.expect("semantic");
        assert_eq!(ids(&fused), ids(&pure));
    }

    #[tokio::test]
    async fn test_alpha_zero_matches_keyword_order() {
        let (semantic, keyword) = mixed_fixture().await;
        let fusion = FusionRanker::new(semantic, keyword.clone());

        let fused = fusion.rank(&[1.0, 0.0], "cats pets", 3, 0.0).await.expect("fused");
        let pure = keyword.rank("cats pets", 3).await.expect("keyword");
        assert_eq!(ids(&fused), ids(&pure));
    }

    #[tokio::test]
    async fn test_empty_keyword_batch_degrades_to_semantic_order() {
        let (semantic, keyword) = mixed_fixture().await;
        let fusion = FusionRanker::new(semantic.clone(), keyword);

        // No term overlap at all: every keyword score is zero, so only the
        // semantic signal orders the output.
        let fused = fusion
            .rank(&[1.0, 0.0], "zebra quagga", 3, DEFAULT_ALPHA)
            .await
            .expect("fused");
        let pure = semantic.rank(&[1.0, 0.0], 3).await.expect("semantic");
        assert_eq!(ids(&fused), ids(&pure));
    }

    #[tokio::test]
    async fn test_record_in_both_batches_outranks_single_signal() {
        // "cats and dogs both need care" is mid-pack on both signals but the
        // only record strong on both at once.
        let (semantic, keyword) = rankers_over(
            vec![
                record("cats are great pets", vec![0.0, 1.0]),
                record("cats and dogs both need care", vec![0.9, 0.5]),
                record("unrelated quarterly report", vec![1.0, 0.0]),
            ],
            2,
        )
        .await;
        let fusion = FusionRanker::new(semantic, keyword);

        let fused = fusion
            .rank(&[0.8, 0.6], "cats care", 3, 0.5)
            .await
            .expect("fused");
        assert_eq!(fused[0].metadata.text, "cats and dogs both need care");
    }

    #[tokio::test]
    async fn test_respects_top_k() {
        let (semantic, keyword) = mixed_fixture().await;
        let fusion = FusionRanker::new(semantic, keyword);
        let fused = fusion
            .rank(&[1.0, 0.0], "cats", 2, DEFAULT_ALPHA)
            .await
            .expect("fused");
        assert!(fused.len() <= 2);
    }

    #[tokio::test]
    async fn test_rejects_alpha_out_of_range() {
        let (semantic, keyword) = mixed_fixture().await;
        let fusion = FusionRanker::new(semantic, keyword);
        let err = fusion.rank(&[1.0, 0.0], "cats", 3, 1.2).await;
        assert!(matches!(err, Err(RagError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_deterministic_across_calls() {
        let (semantic, keyword) = mixed_fixture().await;
        let fusion = FusionRanker::new(semantic, keyword);
        let first = fusion
            .rank(&[0.6, 0.4], "cats dogs", 3, DEFAULT_ALPHA)
            .await
            .expect("fused");
        let second = fusion
            .rank(&[0.6, 0.4], "cats dogs", 3, DEFAULT_ALPHA)
            .await
            .expect("fused");
        assert_eq!(first, second);
    }
}
