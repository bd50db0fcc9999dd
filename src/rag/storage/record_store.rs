//! Record store abstraction.

use std::future::Future;
use std::pin::Pin;

use crate::rag::core::errors::RagResult;
use crate::rag::core::record::{Record, ScoredResult};

/// Boxed future type for record store operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persistence capability for embedded records.
///
/// Implementations hold a single logical collection with a fixed embedding
/// dimensionality. A read that begins after `add` returns must observe the
/// added records (read-after-write consistency); each `add` call is
/// all-or-nothing.
pub trait RecordStore: Send + Sync {
    /// Append records to the store. Never deduplicates by content.
    ///
    /// # Errors
    /// Returns [`RagError::StoreWrite`] if the persistence medium is
    /// unavailable and [`RagError::DimensionMismatch`] if any record's
    /// embedding length differs from the store dimensionality.
    ///
    /// [`RagError::StoreWrite`]: crate::rag::core::errors::RagError::StoreWrite
    /// [`RagError::DimensionMismatch`]: crate::rag::core::errors::RagError::DimensionMismatch
    fn add(&self, records: Vec<Record>) -> StoreFuture<'_, RagResult<()>>;

    /// Return up to `k` records ordered by descending native similarity to
    /// `query`. An empty store yields an empty vec, not an error.
    ///
    /// # Errors
    /// Returns [`RagError::DimensionMismatch`] if `query` length differs
    /// from the store dimensionality, or [`RagError::StoreRead`] if the
    /// persistence medium is unavailable.
    ///
    /// [`RagError::DimensionMismatch`]: crate::rag::core::errors::RagError::DimensionMismatch
    /// [`RagError::StoreRead`]: crate::rag::core::errors::RagError::StoreRead
    fn nearest_neighbors(
        &self,
        query: &[f32],
        k: usize,
    ) -> StoreFuture<'_, RagResult<Vec<ScoredResult>>>;

    /// Full scan of all records in insertion order.
    ///
    /// # Errors
    /// Returns [`RagError::StoreRead`] if the persistence medium is
    /// unavailable.
    ///
    /// [`RagError::StoreRead`]: crate::rag::core::errors::RagError::StoreRead
    fn all_records(&self) -> StoreFuture<'_, RagResult<Vec<Record>>>;

    /// Embedding dimensionality this store was opened with.
    fn ndims(&self) -> usize;
}
