//! Persistent storage modules for record data.

pub mod flat_file;
pub mod record_store;
pub mod sqlite;
pub mod sqlite_vec_loader;

use std::sync::Arc;

pub use flat_file::FlatFileRecordStore;
pub use record_store::{RecordStore, StoreFuture};
pub use sqlite::SqliteRecordStore;
pub use sqlite_vec_loader::init_sqlite_vec_extension;

use crate::rag::core::config::{RagConfig, StorageBackend};
use crate::rag::core::errors::RagResult;

/// Construct the record store selected by configuration.
///
/// Backend choice is a startup decision, not a runtime capability probe:
/// a deployment either runs on sqlite-vec or on the flat-file scan store.
///
/// # Errors
/// Returns an error if the selected backend cannot be initialized.
pub async fn build_record_store(config: &RagConfig) -> RagResult<Arc<dyn RecordStore>> {
    match config.storage.backend {
        StorageBackend::Sqlite => Ok(Arc::new(
            SqliteRecordStore::new(&config.storage, config.embedding.ndims).await?,
        )),
        StorageBackend::FlatFile => Ok(Arc::new(FlatFileRecordStore::open(
            &config.storage.flat_file_path,
            config.embedding.ndims,
        )?)),
    }
}
