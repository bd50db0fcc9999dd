//! Ingestion pipeline: chunk, embed, store.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use crate::rag::core::config::ChunkingConfig;
use crate::rag::core::errors::{RagError, RagResult};
use crate::rag::core::ids::DocumentId;
use crate::rag::core::metadata::RecordMetadata;
use crate::rag::core::record::Record;
use crate::rag::embedding::embedder::Embedder;
use crate::rag::ingest::chunker::chunk_text;
use crate::rag::storage::record_store::RecordStore;

/// Outcome of one document ingestion.
#[derive(Clone, Debug)]
pub struct IngestReport {
    /// Id assigned to the source document.
    pub document_id: DocumentId,
    /// Number of chunks added to the store.
    pub added_chunks: usize,
}

/// Turns raw document text into stored, embedded records.
pub struct DocumentIngestor {
    store: Arc<dyn RecordStore>,
    embedder: Arc<dyn Embedder>,
    config: ChunkingConfig,
}

impl DocumentIngestor {
    /// Create an ingestor over the given store and embedder.
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        embedder: Arc<dyn Embedder>,
        config: ChunkingConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Chunk `text`, embed every chunk, and append the records.
    ///
    /// Embedding failures propagate; nothing is stored for a document whose
    /// embedding request failed. A document that yields no chunks reports
    /// zero additions and is not an error.
    ///
    /// # Errors
    /// Returns an error if embedding or storage fails.
    pub async fn ingest_document(
        &self,
        source: &str,
        text: &str,
        extra: HashMap<String, String>,
    ) -> RagResult<IngestReport> {
        let document_id = DocumentId::new();
        let chunks = chunk_text(text, &self.config)?;
        if chunks.is_empty() {
            info!("document {source} produced no chunks");
            return Ok(IngestReport {
                document_id,
                added_chunks: 0,
            });
        }

        let embeddings = self.embedder.embed_texts(chunks.clone()).await?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::InvalidRecord(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let mut records = Vec::with_capacity(chunks.len());
        for (index, (chunk, embedding)) in chunks.into_iter().zip(embeddings).enumerate() {
            let mut extra = extra.clone();
            extra.insert("document_id".to_string(), document_id.to_string());
            let metadata = RecordMetadata::new(chunk)
                .with_source(source)
                .with_chunk_index(index)
                .with_extra(extra);
            records.push(Record::new(embedding, metadata)?);
        }

        let added_chunks = records.len();
        self.store.add(records).await?;
        info!("ingested {added_chunks} chunks from {source}");

        Ok(IngestReport {
            document_id,
            added_chunks,
        })
    }
}
