//! `SQLite` record store backed by the sqlite-vec extension.
//!
//! Records live in a plain row table (insertion order preserved via rowid)
//! and their embeddings in a parallel `vec0` virtual table that answers
//! nearest-neighbor queries. Both tables are written in one transaction so
//! each `add` call is all-or-nothing.

use tokio_rusqlite::Connection;
use tracing::debug;

use crate::rag::core::config::StorageConfig;
use crate::rag::core::errors::{RagError, RagResult};
use crate::rag::core::ids::RecordId;
use crate::rag::core::metadata::RecordMetadata;
use crate::rag::core::record::{Record, ScoredResult};
use crate::rag::storage::record_store::{RecordStore, StoreFuture};

/// `SQLite` + sqlite-vec implementation of [`RecordStore`].
pub struct SqliteRecordStore {
    conn: Connection,
    table: String,
    ndims: usize,
}

impl SqliteRecordStore {
    /// Open the database and create the record tables.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened, the sqlite-vec
    /// extension is missing, or the schema cannot be created.
    ///
    /// # Note
    /// Call `init_sqlite_vec_extension()` once before the first store is
    /// opened.
    pub async fn new(config: &StorageConfig, ndims: usize) -> RagResult<Self> {
        let conn = Connection::open(&config.sqlite_path).await?;
        let store = Self {
            conn,
            table: config.record_table.clone(),
            ndims,
        };
        store.init_schema().await?;
        Ok(store)
    }

    /// Open an in-memory database, mainly for tests.
    ///
    /// # Errors
    /// Returns an error if the sqlite-vec extension is missing or the
    /// schema cannot be created.
    pub async fn open_in_memory(table: &str, ndims: usize) -> RagResult<Self> {
        let conn = Connection::open_in_memory().await?;
        let store = Self {
            conn,
            table: table.to_string(),
            ndims,
        };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> RagResult<()> {
        let vec_available = self
            .conn
            .call(|conn| {
                let probe: Result<String, rusqlite::Error> =
                    conn.query_row("SELECT vec_version()", [], |row| row.get(0));
                Ok(probe.is_ok())
            })
            .await?;
        if !vec_available {
            return Err(RagError::SqliteVecUnavailable);
        }

        let table = self.table.clone();
        let ndims = self.ndims;
        self.conn
            .call(move |conn| {
                conn.execute_batch(&format!(
                    "CREATE TABLE IF NOT EXISTS {table} (
                        id TEXT PRIMARY KEY,
                        embedding BLOB NOT NULL,
                        metadata_json TEXT NOT NULL
                    );
                    CREATE VIRTUAL TABLE IF NOT EXISTS {table}_vec
                        USING vec0(embedding float[{ndims}]);"
                ))?;
                Ok(())
            })
            .await?;

        debug!("sqlite record store ready (table {})", self.table);
        Ok(())
    }

    fn check_dimension(&self, len: usize) -> RagResult<()> {
        if len == self.ndims {
            Ok(())
        } else {
            Err(RagError::DimensionMismatch {
                expected: self.ndims,
                got: len,
            })
        }
    }
}

fn vector_to_blob(vector: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

fn blob_to_vector(blob: &[u8]) -> RagResult<Vec<f32>> {
    if blob.len() % 4 != 0 {
        return Err(RagError::StoreRead(format!(
            "embedding blob has invalid length {}",
            blob.len()
        )));
    }
    Ok(blob
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

impl RecordStore for SqliteRecordStore {
    fn add(&self, records: Vec<Record>) -> StoreFuture<'_, RagResult<()>> {
        Box::pin(async move {
            for record in &records {
                self.check_dimension(record.embedding.len())?;
            }
            if records.is_empty() {
                return Ok(());
            }

            let table = self.table.clone();
            let mut rows = Vec::with_capacity(records.len());
            for record in &records {
                let metadata_json = serde_json::to_string(&record.metadata)?;
                rows.push((record.id, vector_to_blob(&record.embedding), metadata_json));
            }

            self.conn
                .call(move |conn| {
                    let tx = conn.transaction()?;
                    {
                        let mut insert_row = tx.prepare(&format!(
                            "INSERT INTO {table} (id, embedding, metadata_json)
                             VALUES (?1, ?2, ?3)"
                        ))?;
                        let mut insert_vec = tx.prepare(&format!(
                            "INSERT INTO {table}_vec (rowid, embedding) VALUES (?1, ?2)"
                        ))?;
                        for (id, blob, metadata_json) in rows {
                            insert_row.execute(rusqlite::params![id, blob, metadata_json])?;
                            let rowid = tx.last_insert_rowid();
                            insert_vec.execute(rusqlite::params![rowid, blob])?;
                        }
                    }
                    tx.commit()?;
                    Ok(())
                })
                .await
                .map_err(|err| RagError::StoreWrite(err.to_string()))?;
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
            self.check_dimension(query.len())?;
            if k == 0 {
                return Ok(Vec::new());
            }

            let table = self.table.clone();
            let blob = vector_to_blob(&query);
            let limit = i64::try_from(k)
                .map_err(|_| RagError::InvalidConfig("top_k exceeds i64".to_string()))?;
            let rows = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT r.id, r.metadata_json, v.distance
                         FROM {table}_vec v
                         JOIN {table} r ON r.rowid = v.rowid
                         WHERE v.embedding MATCH ?1 AND k = ?2
                         ORDER BY v.distance"
                    ))?;
                    let rows = stmt
                        .query_map(rusqlite::params![blob, limit], |row| {
                            let id: RecordId = row.get(0)?;
                            let metadata_json: String = row.get(1)?;
                            let distance: f64 = row.get(2)?;
                            Ok((id, metadata_json, distance))
                        })?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(rows)
                })
                .await
                .map_err(|err| RagError::StoreRead(err.to_string()))?;

            let mut results = Vec::with_capacity(rows.len());
            for (id, metadata_json, distance) in rows {
                let metadata: RecordMetadata = serde_json::from_str(&metadata_json)?;
                // Distance is ascending-better; convert to a descending-better
                // similarity so all stores expose the same convention.
                results.push(ScoredResult {
                    id,
                    score: 1.0 / (1.0 + distance),
                    metadata,
                });
            }
            Ok(results)
        })
    }

    fn all_records(&self) -> StoreFuture<'_, RagResult<Vec<Record>>> {
        Box::pin(async move {
            let table = self.table.clone();
            let rows = self
                .conn
                .call(move |conn| {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT id, embedding, metadata_json FROM {table} ORDER BY rowid"
                    ))?;
                    let rows = stmt
                        .query_map([], |row| {
                            let id: RecordId = row.get(0)?;
                            let blob: Vec<u8> = row.get(1)?;
                            let metadata_json: String = row.get(2)?;
                            Ok((id, blob, metadata_json))
                        })?
                        .collect::<Result<Vec<_>, rusqlite::Error>>()?;
                    Ok(rows)
                })
                .await
                .map_err(|err| RagError::StoreRead(err.to_string()))?;

            let mut records = Vec::with_capacity(rows.len());
            for (id, blob, metadata_json) in rows {
                let metadata: RecordMetadata = serde_json::from_str(&metadata_json)?;
                records.push(Record {
                    id,
                    embedding: blob_to_vector(&blob)?,
                    metadata,
                });
            }
            Ok(records)
        })
    }

    fn ndims(&self) -> usize {
        self.ndims
    }
}
