//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::rag::engine::RagEngine;

/// Shared application state.
///
/// Built once at startup; handlers receive it by `Arc`, never through a
/// global.
pub struct AppState {
    /// The RAG engine serving retrieval and generation.
    pub engine: Arc<RagEngine>,
}

impl AppState {
    /// Create the application state around an engine.
    #[must_use]
    pub fn new(engine: Arc<RagEngine>) -> Arc<Self> {
        Arc::new(Self { engine })
    }
}
