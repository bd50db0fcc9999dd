//! Retrieval orchestration: fusion first, semantic fallback.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::rag::core::config::RetrievalConfig;
use crate::rag::core::errors::RagResult;
use crate::rag::core::record::ScoredResult;
use crate::rag::retrieval::fusion::FusionRanker;
use crate::rag::retrieval::keyword::KeywordRanker;
use crate::rag::retrieval::semantic::SemanticRanker;

/// Strategy selector for diagnostic retrieval calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalStrategy {
    /// The default two-tier policy (fusion with semantic fallback).
    #[default]
    Auto,
    /// Pure vector-space retrieval.
    Semantic,
    /// Pure term-overlap retrieval.
    Keyword,
    /// Weighted fusion without the fallback check.
    Fusion,
}

/// Top-level retrieval policy over the three strategies.
///
/// A two-state machine entered once per call: fuse, and if the fused result
/// is empty or uniformly weak, discard it and answer with pure semantic
/// retrieval instead. No retries, no loops.
#[derive(Clone)]
pub struct RetrievalOrchestrator {
    semantic: SemanticRanker,
    keyword: KeywordRanker,
    fusion: FusionRanker,
    config: RetrievalConfig,
}

impl RetrievalOrchestrator {
    /// Create an orchestrator over pre-built rankers.
    #[must_use]
    pub const fn new(
        semantic: SemanticRanker,
        keyword: KeywordRanker,
        fusion: FusionRanker,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            semantic,
            keyword,
            fusion,
            config,
        }
    }

    /// Retrieve with the default policy.
    ///
    /// # Errors
    /// Returns an error if ranking or storage access fails.
    pub async fn retrieve(
        &self,
        query_vector: &[f32],
        query_text: &str,
        top_k: usize,
    ) -> RagResult<Vec<ScoredResult>> {
        let fused = self
            .fusion
            .rank(query_vector, query_text, top_k, self.config.alpha)
            .await?;

        let weak = fused.is_empty()
            || fused
                .iter()
                .all(|result| result.score < self.config.fallback_threshold);
        if weak {
            debug!(
                "fused scores below threshold {}; falling back to semantic-only",
                self.config.fallback_threshold
            );
            return self.semantic.rank(query_vector, top_k).await;
        }

        Ok(fused)
    }

    /// Retrieve with an explicitly selected strategy (diagnostics).
    ///
    /// # Errors
    /// Returns an error if ranking or storage access fails.
    pub async fn retrieve_with(
        &self,
        strategy: RetrievalStrategy,
        query_vector: &[f32],
        query_text: &str,
        top_k: usize,
    ) -> RagResult<Vec<ScoredResult>> {
        match strategy {
            RetrievalStrategy::Auto => self.retrieve(query_vector, query_text, top_k).await,
            RetrievalStrategy::Semantic => self.semantic.rank(query_vector, top_k).await,
            RetrievalStrategy::Keyword => self.keyword.rank(query_text, top_k).await,
            RetrievalStrategy::Fusion => {
                self.fusion
                    .rank(query_vector, query_text, top_k, self.config.alpha)
                    .await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::rag::core::ids::RecordId;
    use crate::rag::core::metadata::RecordMetadata;
    use crate::rag::core::record::Record;
    use crate::rag::storage::flat_file::FlatFileRecordStore;
    use crate::rag::storage::record_store::RecordStore;

    fn record(text: &str, embedding: Vec<f32>) -> Record {
        Record::new(embedding, RecordMetadata::new(text)).expect("valid record")
    }

    async fn orchestrator_over(
        records: Vec<Record>,
        ndims: usize,
        config: RetrievalConfig,
    ) -> RetrievalOrchestrator {
        let store = FlatFileRecordStore::in_memory(ndims);
        store.add(records).await.expect("add");
        let store: Arc<dyn RecordStore> = Arc::new(store);
        let semantic = SemanticRanker::new(Arc::clone(&store));
        let keyword = KeywordRanker::new(store);
        let fusion = FusionRanker::new(semantic.clone(), keyword.clone());
        RetrievalOrchestrator::new(semantic, keyword, fusion, config)
    }

    fn ids(results: &[ScoredResult]) -> Vec<RecordId> {
        results.iter().map(|r| r.id).collect()
    }

    #[tokio::test]
    async fn test_strong_fusion_returned_unchanged() {
        let orchestrator = orchestrator_over(
            vec![
                record("cats are great pets", vec![1.0, 0.0]),
                record("dogs are loyal companions", vec![0.0, 1.0]),
            ],
            2,
            RetrievalConfig::default(),
        )
        .await;

        let results = orchestrator
            .retrieve(&[1.0, 0.0], "cats pets", 2)
            .await
            .expect("retrieve");
        assert_eq!(results[0].metadata.text, "cats are great pets");
        // Top fused score: strong on both signals, well above the threshold.
        assert!(results[0].score >= 0.1);
    }

    #[tokio::test]
    async fn test_weak_fusion_falls_back_to_semantic_output() {
        // Query vector orthogonal to every record and no shared terms:
        // both signals are uniformly zero, so every fused score is below
        // the threshold and the orchestrator must answer with the semantic
        // ranker's direct output.
        let orchestrator = orchestrator_over(
            vec![
                record("cats are great pets", vec![1.0, 0.0]),
                record("dogs are loyal companions", vec![0.5, 0.0]),
            ],
            2,
            RetrievalConfig::default(),
        )
        .await;

        let query = [0.0f32, 1.0];
        let fallback = orchestrator
            .retrieve(&query, "zebra", 2)
            .await
            .expect("retrieve");
        let semantic_direct = orchestrator
            .retrieve_with(RetrievalStrategy::Semantic, &query, "zebra", 2)
            .await
            .expect("semantic");
        assert_eq!(fallback, semantic_direct);
    }

    #[tokio::test]
    async fn test_empty_store_yields_empty_not_error() {
        let orchestrator =
            orchestrator_over(Vec::new(), 2, RetrievalConfig::default()).await;
        let results = orchestrator
            .retrieve(&[1.0, 0.0], "anything", 3)
            .await
            .expect("retrieve");
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_is_configurable() {
        // With the floor raised above any attainable fused score, even a
        // perfect match triggers the fallback; the result must equal the
        // semantic ranker's direct output.
        let config = RetrievalConfig {
            fallback_threshold: 2.0,
            ..RetrievalConfig::default()
        };
        let orchestrator = orchestrator_over(
            vec![record("cats are great pets", vec![1.0, 0.0])],
            2,
            config,
        )
        .await;

        let query = [1.0f32, 0.0];
        let results = orchestrator
            .retrieve(&query, "cats are great pets", 1)
            .await
            .expect("retrieve");
        let semantic_direct = orchestrator
            .retrieve_with(RetrievalStrategy::Semantic, &query, "cats are great pets", 1)
            .await
            .expect("semantic");
        assert_eq!(results, semantic_direct);
    }

    #[tokio::test]
    async fn test_result_length_bounded_by_top_k() {
        let orchestrator = orchestrator_over(
            vec![
                record("one cat", vec![1.0, 0.0]),
                record("two cats", vec![0.9, 0.1]),
                record("three cats", vec![0.8, 0.2]),
                record("four cats", vec![0.7, 0.3]),
            ],
            2,
            RetrievalConfig::default(),
        )
        .await;

        for top_k in 1..=5 {
            let results = orchestrator
                .retrieve(&[1.0, 0.0], "cats", top_k)
                .await
                .expect("retrieve");
            assert!(results.len() <= top_k);
        }
    }

    #[tokio::test]
    async fn test_strategies_share_result_shape() {
        let orchestrator = orchestrator_over(
            vec![
                record("cats are great pets", vec![1.0, 0.0]),
                record("dogs are loyal companions", vec![0.0, 1.0]),
            ],
            2,
            RetrievalConfig::default(),
        )
        .await;

        for strategy in [
            RetrievalStrategy::Auto,
            RetrievalStrategy::Semantic,
            RetrievalStrategy::Keyword,
            RetrievalStrategy::Fusion,
        ] {
            let results = orchestrator
                .retrieve_with(strategy, &[1.0, 0.0], "cats", 2)
                .await
                .expect("retrieve");
            assert!(results.len() <= 2);
            for result in results {
                assert!(!result.metadata.text.is_empty());
                assert!(result.score.is_finite());
            }
        }
    }

    #[tokio::test]
    async fn test_idempotent_retrieval() {
        let orchestrator = orchestrator_over(
            vec![
                record("cats are great pets", vec![0.4, 0.6]),
                record("dogs are loyal companions", vec![0.6, 0.4]),
                record("cats and dogs both need care", vec![0.5, 0.5]),
            ],
            2,
            RetrievalConfig::default(),
        )
        .await;

        let first = orchestrator
            .retrieve(&[0.7, 0.3], "cats dogs", 3)
            .await
            .expect("retrieve");
        let second = orchestrator
            .retrieve(&[0.7, 0.3], "cats dogs", 3)
            .await
            .expect("retrieve");
        assert_eq!(ids(&first), ids(&second));
    }
}
