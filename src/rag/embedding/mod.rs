//! Embedding model modules.

pub mod embedder;
pub mod lazy;

pub use embedder::{EmbedFuture, Embedder, OllamaEmbedder};
pub use lazy::{InitState, LazyEmbedder};
