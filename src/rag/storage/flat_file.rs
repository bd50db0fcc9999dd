//! Flat-file record store with linear-scan similarity search.
//!
//! Persists the whole collection as one JSON document and answers
//! nearest-neighbor queries with an in-memory cosine scan. Suitable for
//! small deployments and for tests (open without a path for an ephemeral
//! store).

use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::debug;

use crate::rag::core::errors::{RagError, RagResult};
use crate::rag::core::record::{Record, ScoredResult};
use crate::rag::storage::record_store::{RecordStore, StoreFuture};

/// JSON-backed record store guarded by a read-write lock.
pub struct FlatFileRecordStore {
    path: Option<PathBuf>,
    ndims: usize,
    records: RwLock<Vec<Record>>,
}

impl FlatFileRecordStore {
    /// Open a store at `path`, loading any existing snapshot.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be read or parsed, or if it
    /// contains a record whose embedding length differs from `ndims`.
    pub fn open(path: impl AsRef<Path>, ndims: usize) -> RagResult<Self> {
        let path = path.as_ref().to_path_buf();
        let records = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|err| RagError::StoreRead(format!("{}: {err}", path.display())))?;
            let records: Vec<Record> = serde_json::from_str(&raw)
                .map_err(|err| RagError::StoreRead(format!("{}: {err}", path.display())))?;
            for record in &records {
                if record.embedding.len() != ndims {
                    return Err(RagError::DimensionMismatch {
                        expected: ndims,
                        got: record.embedding.len(),
                    });
                }
            }
            debug!("loaded {} records from {}", records.len(), path.display());
            records
        } else {
            Vec::new()
        };

        Ok(Self {
            path: Some(path),
            ndims,
            records: RwLock::new(records),
        })
    }

    /// Create an ephemeral store that never touches disk.
    #[must_use]
    pub fn in_memory(ndims: usize) -> Self {
        Self {
            path: None,
            ndims,
            records: RwLock::new(Vec::new()),
        }
    }

    fn persist(&self, records: &[Record]) -> RagResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let raw = serde_json::to_string(records)
            .map_err(|err| RagError::StoreWrite(err.to_string()))?;
        std::fs::write(path, raw)
            .map_err(|err| RagError::StoreWrite(format!("{}: {err}", path.display())))
    }
}

/// Cosine similarity; zero when either vector has zero norm.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

impl RecordStore for FlatFileRecordStore {
    fn add(&self, records: Vec<Record>) -> StoreFuture<'_, RagResult<()>> {
        Box::pin(async move {
            for record in &records {
                if record.embedding.len() != self.ndims {
                    return Err(RagError::DimensionMismatch {
                        expected: self.ndims,
                        got: record.embedding.len(),
                    });
                }
            }

            let mut guard = self.records.write().await;
            let previous_len = guard.len();
            guard.extend(records);
            if let Err(err) = self.persist(&guard) {
                guard.truncate(previous_len);
                return Err(err);
            }
            Ok(())
        })
    }

    fn nearest_neighbors(
        &self,
        query: &[f32],
        k: usize,
    ) -> StoreFuture<'_, RagResult<Vec<ScoredResult>>> {
        let query = query.to_vec();
        Box::pin(async move {
            if query.len() != self.ndims {
                return Err(RagError::DimensionMismatch {
                    expected: self.ndims,
                    got: query.len(),
                });
            }

            let guard = self.records.read().await;
            let mut results: Vec<ScoredResult> = guard
                .iter()
                .map(|record| {
                    ScoredResult::from_record(record, cosine_similarity(&query, &record.embedding))
                })
                .collect();

            // Stable sort keeps insertion order among equal scores.
            results.sort_by(|a, b| b.score.total_cmp(&a.score));
            results.truncate(k);
            Ok(results)
        })
    }

    fn all_records(&self) -> StoreFuture<'_, RagResult<Vec<Record>>> {
        Box::pin(async move {
            let guard = self.records.read().await;
            Ok(guard.clone())
        })
    }

    fn ndims(&self) -> usize {
        self.ndims
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::core::metadata::RecordMetadata;

    fn record(text: &str, embedding: Vec<f32>) -> Record {
        Record::new(embedding, RecordMetadata::new(text)).expect("valid record")
    }

    #[tokio::test]
    async fn test_empty_store_returns_empty() {
        let store = FlatFileRecordStore::in_memory(3);
        let hits = store.nearest_neighbors(&[1.0, 0.0, 0.0], 5).await.expect("query");
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_query_dimension_mismatch() {
        let store = FlatFileRecordStore::in_memory(3);
        let err = store.nearest_neighbors(&[1.0, 0.0], 5).await;
        assert!(matches!(
            err,
            Err(RagError::DimensionMismatch { expected: 3, got: 2 })
        ));
    }

    #[tokio::test]
    async fn test_add_dimension_mismatch() {
        let store = FlatFileRecordStore::in_memory(3);
        let err = store.add(vec![record("text", vec![1.0])]).await;
        assert!(matches!(
            err,
            Err(RagError::DimensionMismatch { expected: 3, got: 1 })
        ));
    }

    #[tokio::test]
    async fn test_nearest_neighbors_ordering() {
        let store = FlatFileRecordStore::in_memory(2);
        let close = record("close", vec![1.0, 0.0]);
        let far = record("far", vec![0.0, 1.0]);
        let mid = record("mid", vec![1.0, 1.0]);
        store
            .add(vec![far.clone(), mid.clone(), close.clone()])
            .await
            .expect("add");

        let hits = store.nearest_neighbors(&[1.0, 0.0], 2).await.expect("query");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, close.id);
        assert_eq!(hits[1].id, mid.id);
    }

    #[tokio::test]
    async fn test_add_then_all_records_roundtrip() {
        let store = FlatFileRecordStore::in_memory(2);
        let records: Vec<Record> = (0..4)
            .map(|i| record(&format!("chunk {i}"), vec![i as f32, 1.0]))
            .collect();
        let ids: Vec<_> = records.iter().map(|r| r.id).collect();
        store.add(records).await.expect("add");

        let all = store.all_records().await.expect("scan");
        assert_eq!(all.len(), 4);
        for id in ids {
            assert!(all.iter().any(|r| r.id == id));
        }
    }

    #[tokio::test]
    async fn test_persistence_roundtrip() {
        let path = std::env::temp_dir().join(format!("talkflow-test-{}.json", uuid::Uuid::new_v4()));
        {
            let store = FlatFileRecordStore::open(&path, 2).expect("open");
            store
                .add(vec![record("persisted chunk", vec![0.5, 0.5])])
                .await
                .expect("add");
        }

        let reopened = FlatFileRecordStore::open(&path, 2).expect("reopen");
        let all = reopened.all_records().await.expect("scan");
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].metadata.text, "persisted chunk");

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_duplicate_text_not_deduplicated() {
        let store = FlatFileRecordStore::in_memory(1);
        store
            .add(vec![record("dup", vec![1.0]), record("dup", vec![1.0])])
            .await
            .expect("add");
        let all = store.all_records().await.expect("scan");
        assert_eq!(all.len(), 2);
    }
}
