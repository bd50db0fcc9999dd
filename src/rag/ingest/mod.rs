//! Document ingestion: chunking and the embed-and-store pipeline.

pub mod chunker;
pub mod pipeline;

pub use chunker::chunk_text;
pub use pipeline::{DocumentIngestor, IngestReport};
