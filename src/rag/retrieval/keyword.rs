//! Keyword ranking by lexical term overlap.
//!
//! Deliberately a bag-of-words set overlap, not BM25: no inverse-document-
//! frequency weighting, no term-frequency saturation, no document-length
//! normalization. Known limitation, kept for predictability.

use std::collections::HashSet;
use std::sync::Arc;

use crate::rag::core::errors::RagResult;
use crate::rag::core::record::ScoredResult;
use crate::rag::storage::record_store::RecordStore;

/// Ranks records by the fraction of query terms present in their text.
#[derive(Clone)]
pub struct KeywordRanker {
    store: Arc<dyn RecordStore>,
}

/// Lowercase whitespace tokenization into a set of unique terms.
fn tokenize(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Fraction of query terms present in the document term set.
#[allow(clippy::cast_precision_loss)] // Term counts are small.
fn overlap_score(query_terms: &HashSet<String>, document_terms: &HashSet<String>) -> f64 {
    let overlap = query_terms
        .iter()
        .filter(|term| document_terms.contains(*term))
        .count();
    overlap as f64 / query_terms.len() as f64
}

impl KeywordRanker {
    /// Create a ranker over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Return up to `top_k` records by descending term overlap.
    ///
    /// Score is `|Q ∩ D| / |Q|` over deduplicated term sets; repeated terms
    /// in a document do not raise it. A blank query scores every record
    /// zero. Ties keep store insertion order (stable sort), and zero-score
    /// entries are retained so result-count contracts hold.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub async fn rank(&self, query_text: &str, top_k: usize) -> RagResult<Vec<ScoredResult>> {
        let query_terms = tokenize(query_text);
        let records = self.store.all_records().await?;

        let mut results: Vec<ScoredResult> = records
            .iter()
            .map(|record| {
                let score = if query_terms.is_empty() {
                    0.0
                } else {
                    overlap_score(&query_terms, &tokenize(&record.metadata.text))
                };
                ScoredResult::from_record(record, score)
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(top_k);
        Ok(results)
    }
}
