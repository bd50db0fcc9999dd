//! Lazily initialized embedder with an explicit lifecycle.
//!
//! The model client is not built until the first embedding request. The
//! barrier guarantees that concurrent first-callers observe exactly one
//! initialization attempt; a failed attempt is sticky and reported to every
//! subsequent caller.

use std::sync::RwLock;

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::rag::core::config::EmbeddingConfig;
use crate::rag::core::errors::{RagError, RagResult};
use crate::rag::embedding::embedder::{EmbedFuture, Embedder, OllamaEmbedder};

/// Lifecycle state of the lazy embedder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InitState {
    /// No initialization attempted yet.
    Uninitialized,
    /// An initialization attempt is in flight.
    Loading,
    /// The model client is ready.
    Ready,
    /// Initialization failed; the message is reported to all callers.
    Failed(String),
}

/// Embedder that defers model-client construction until first use.
pub struct LazyEmbedder {
    config: EmbeddingConfig,
    cell: OnceCell<OllamaEmbedder>,
    state: RwLock<InitState>,
}

impl LazyEmbedder {
    /// Create a lazy embedder; no client is built yet.
    #[must_use]
    pub const fn new(config: EmbeddingConfig) -> Self {
        Self {
            config,
            cell: OnceCell::const_new(),
            state: RwLock::new(InitState::Uninitialized),
        }
    }

    /// Current lifecycle state, for diagnostics.
    #[must_use]
    pub fn state(&self) -> InitState {
        self.state
            .read()
            .map_or(InitState::Uninitialized, |guard| guard.clone())
    }

    fn set_state(&self, next: InitState) {
        if let Ok(mut guard) = self.state.write() {
            *guard = next;
        }
    }

    async fn model(&self) -> RagResult<&OllamaEmbedder> {
        if let InitState::Failed(message) = self.state() {
            return Err(RagError::InvalidConfig(format!(
                "embedding model failed to initialize: {message}"
            )));
        }

        self.cell
            .get_or_try_init(|| async {
                self.set_state(InitState::Loading);
                debug!("initializing embedding model client");
                match OllamaEmbedder::new(&self.config) {
                    Ok(model) => {
                        self.set_state(InitState::Ready);
                        Ok(model)
                    }
                    Err(err) => {
                        warn!("embedding model initialization failed: {err}");
                        self.set_state(InitState::Failed(err.to_string()));
                        Err(err)
                    }
                }
            })
            .await
    }
}

impl Embedder for LazyEmbedder {
    fn embed_text(&self, text: &str) -> EmbedFuture<'_, RagResult<Vec<f32>>> {
        let text = text.to_string();
        Box::pin(async move { self.model().await?.embed_text(&text).await })
    }

    fn embed_texts(&self, texts: Vec<String>) -> EmbedFuture<'_, RagResult<Vec<Vec<f32>>>> {
        Box::pin(async move { self.model().await?.embed_texts(texts).await })
    }

    fn ndims(&self) -> usize {
        self.config.ndims
    }
}
