//! RAG engine orchestration.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::rag::core::config::RagConfig;
use crate::rag::core::errors::RagResult;
use crate::rag::core::record::ScoredResult;
use crate::rag::embedding::embedder::Embedder;
use crate::rag::embedding::lazy::LazyEmbedder;
use crate::rag::generation::generator::{Generator, OllamaGenerator};
use crate::rag::ingest::pipeline::{DocumentIngestor, IngestReport};
use crate::rag::prompt::context_builder::{PromptParts, build_prompt, enforce_budget};
use crate::rag::prompt::personas::Persona;
use crate::rag::retrieval::fusion::FusionRanker;
use crate::rag::retrieval::keyword::KeywordRanker;
use crate::rag::retrieval::orchestrator::{RetrievalOrchestrator, RetrievalStrategy};
use crate::rag::retrieval::semantic::SemanticRanker;
use crate::rag::storage::build_record_store;
use crate::rag::storage::record_store::RecordStore;

/// A generated answer with the passages that grounded it.
#[derive(Clone, Debug)]
pub struct GroundedAnswer {
    /// The generated answer text.
    pub answer: String,
    /// Passages used as context, best first.
    pub passages: Vec<ScoredResult>,
    /// Persona the answer was generated under.
    pub persona: Persona,
}

/// Backend dependencies for the RAG engine.
///
/// Constructed once at process startup and handed to the engine
/// explicitly; request handlers never look anything up globally.
pub struct RagBackends {
    /// Record store implementation.
    pub store: Arc<dyn RecordStore>,
    /// Embedding model wrapper.
    pub embedder: Arc<dyn Embedder>,
    /// Completion model wrapper.
    pub generator: Arc<dyn Generator>,
}

impl RagBackends {
    /// Build the default backends from config.
    ///
    /// The embedder is lazy: the model client is not constructed until the
    /// first embedding request.
    ///
    /// # Errors
    /// Returns an error if any backend cannot be initialized.
    pub async fn from_config(config: &RagConfig) -> RagResult<Self> {
        let store = build_record_store(config).await?;
        let embedder = Arc::new(LazyEmbedder::new(config.embedding.clone()));
        let generator = Arc::new(OllamaGenerator::new(&config.llm)?);

        Ok(Self {
            store,
            embedder,
            generator,
        })
    }
}

/// Retrieval-augmented generation engine.
pub struct RagEngine {
    config: RagConfig,
    embedder: Arc<dyn Embedder>,
    generator: Arc<dyn Generator>,
    orchestrator: RetrievalOrchestrator,
    ingestor: DocumentIngestor,
}

impl RagEngine {
    /// Create a new engine over pre-built backends.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid.
    pub fn new(config: RagConfig, backends: RagBackends) -> RagResult<Self> {
        config.validate()?;

        let semantic = SemanticRanker::new(Arc::clone(&backends.store));
        let keyword = KeywordRanker::new(Arc::clone(&backends.store));
        let fusion = FusionRanker::new(semantic.clone(), keyword.clone());
        let orchestrator =
            RetrievalOrchestrator::new(semantic, keyword, fusion, config.retrieval.clone());
        let ingestor = DocumentIngestor::new(
            Arc::clone(&backends.store),
            Arc::clone(&backends.embedder),
            config.chunking.clone(),
        );

        Ok(Self {
            config,
            embedder: backends.embedder,
            generator: backends.generator,
            orchestrator,
            ingestor,
        })
    }

    /// Create a new engine with default backends from config.
    ///
    /// # Errors
    /// Returns an error if backends cannot be initialized.
    pub async fn from_config(config: RagConfig) -> RagResult<Self> {
        let backends = RagBackends::from_config(&config).await?;
        Self::new(config, backends)
    }

    /// Ingest one document's text into the store.
    ///
    /// # Errors
    /// Returns an error if embedding or storage fails.
    pub async fn ingest_document(
        &self,
        source: &str,
        text: &str,
        extra: HashMap<String, String>,
    ) -> RagResult<IngestReport> {
        self.ingestor.ingest_document(source, text, extra).await
    }

    /// Retrieve passages for a question with the default policy.
    ///
    /// # Errors
    /// Returns an error if embedding, ranking, or storage access fails; an
    /// embedding failure is propagated, never papered over with a zero
    /// vector.
    pub async fn retrieve(
        &self,
        question: &str,
        top_k: Option<usize>,
    ) -> RagResult<Vec<ScoredResult>> {
        self.retrieve_with(RetrievalStrategy::Auto, question, top_k)
            .await
    }

    /// Retrieve passages with an explicitly selected strategy.
    ///
    /// Keyword-only retrieval never touches the embedder, which keeps it
    /// available as a degraded mode when the embedding provider is down.
    ///
    /// # Errors
    /// Returns an error if embedding, ranking, or storage access fails.
    pub async fn retrieve_with(
        &self,
        strategy: RetrievalStrategy,
        question: &str,
        top_k: Option<usize>,
    ) -> RagResult<Vec<ScoredResult>> {
        let top_k = top_k.unwrap_or(self.config.retrieval.top_k);

        if strategy == RetrievalStrategy::Keyword {
            return self
                .orchestrator
                .retrieve_with(strategy, &[], question, top_k)
                .await;
        }

        let query_vector = self.embedder.embed_text(question).await?;
        debug!("embedded query ({} dims)", query_vector.len());
        self.orchestrator
            .retrieve_with(strategy, &query_vector, question, top_k)
            .await
    }

    /// Answer a question grounded in retrieved passages.
    ///
    /// # Errors
    /// Returns an error if retrieval or generation fails.
    pub async fn ask(
        &self,
        question: &str,
        persona: Persona,
        top_k: Option<usize>,
    ) -> RagResult<GroundedAnswer> {
        let passages = self.retrieve(question, top_k).await?;
        let parts = PromptParts {
            persona,
            passages,
            question: question.to_string(),
        };
        let parts = enforce_budget(parts, self.config.prompt.max_context_chars);
        let prompt = build_prompt(&parts);

        let answer = self.generator.generate(&prompt).await?;
        info!(
            "answered question with {} grounding passages",
            parts.passages.len()
        );

        Ok(GroundedAnswer {
            answer,
            passages: parts.passages,
            persona,
        })
    }

    /// Engine configuration.
    #[must_use]
    pub const fn config(&self) -> &RagConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rag::core::errors::RagError;
    use crate::rag::embedding::embedder::EmbedFuture;
    use crate::rag::generation::generator::GenerateFuture;
    use crate::rag::storage::flat_file::FlatFileRecordStore;

    /// Deterministic embedder: axis-aligned by leading keyword.
    struct StubEmbedder;

    fn stub_vector(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let cats = if lower.contains("cats") { 1.0 } else { 0.0 };
        let dogs = if lower.contains("dogs") { 1.0 } else { 0.0 };
        vec![cats, dogs]
    }

    impl Embedder for StubEmbedder {
        fn embed_text(&self, text: &str) -> EmbedFuture<'_, RagResult<Vec<f32>>> {
            let vector = stub_vector(text);
            Box::pin(async move { Ok(vector) })
        }

        fn embed_texts(&self, texts: Vec<String>) -> EmbedFuture<'_, RagResult<Vec<Vec<f32>>>> {
            let vectors = texts.iter().map(|t| stub_vector(t)).collect();
            Box::pin(async move { Ok(vectors) })
        }

        fn ndims(&self) -> usize {
            2
        }
    }

    /// Generator that echoes its prompt, for asserting prompt contents.
    struct EchoGenerator;

    impl Generator for EchoGenerator {
        fn generate(&self, prompt: &str) -> GenerateFuture<'_, RagResult<String>> {
            let prompt = prompt.to_string();
            Box::pin(async move { Ok(prompt) })
        }
    }

    /// Embedder that always fails.
    struct FailingEmbedder;

    impl Embedder for FailingEmbedder {
        fn embed_text(&self, _text: &str) -> EmbedFuture<'_, RagResult<Vec<f32>>> {
            Box::pin(async { Err(RagError::InvalidConfig("embedder offline".to_string())) })
        }

        fn embed_texts(&self, _texts: Vec<String>) -> EmbedFuture<'_, RagResult<Vec<Vec<f32>>>> {
            Box::pin(async { Err(RagError::InvalidConfig("embedder offline".to_string())) })
        }

        fn ndims(&self) -> usize {
            2
        }
    }

    fn test_config() -> RagConfig {
        let mut config = RagConfig::default();
        config.embedding.ndims = 2;
        config
    }

    fn test_engine(embedder: Arc<dyn Embedder>) -> RagEngine {
        let backends = RagBackends {
            store: Arc::new(FlatFileRecordStore::in_memory(2)),
            embedder,
            generator: Arc::new(EchoGenerator),
        };
        RagEngine::new(test_config(), backends).expect("engine")
    }

    #[tokio::test]
    async fn test_ingest_then_retrieve() {
        let engine = test_engine(Arc::new(StubEmbedder));
        let report = engine
            .ingest_document(
                "pets.txt",
                "cats are great pets\n\ndogs are loyal companions",
                HashMap::new(),
            )
            .await
            .expect("ingest");
        assert_eq!(report.added_chunks, 2);

        let passages = engine.retrieve("tell me about cats", None).await.expect("retrieve");
        assert!(!passages.is_empty());
        assert_eq!(passages[0].metadata.text, "cats are great pets");
    }

    #[tokio::test]
    async fn test_ask_grounds_prompt_in_passages() {
        let engine = test_engine(Arc::new(StubEmbedder));
        engine
            .ingest_document("pets.txt", "cats are great pets", HashMap::new())
            .await
            .expect("ingest");

        let grounded = engine
            .ask("what about cats?", Persona::Yoda, None)
            .await
            .expect("ask");
        // EchoGenerator returns the prompt itself.
        assert!(grounded.answer.contains("cats are great pets"));
        assert!(grounded.answer.starts_with(Persona::Yoda.instruction()));
        assert_eq!(grounded.persona, Persona::Yoda);
        assert!(!grounded.passages.is_empty());
    }

    #[tokio::test]
    async fn test_ask_with_empty_store_omits_context() {
        let engine = test_engine(Arc::new(StubEmbedder));
        let grounded = engine
            .ask("anything", Persona::Default, None)
            .await
            .expect("ask");
        assert!(!grounded.answer.contains("Context from documents"));
        assert!(grounded.passages.is_empty());
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates_for_semantic() {
        let engine = test_engine(Arc::new(FailingEmbedder));
        let err = engine.retrieve("question", None).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn test_keyword_strategy_survives_embedder_outage() {
        // Seed through a working engine sharing the same store.
        let store: Arc<dyn RecordStore> = Arc::new(FlatFileRecordStore::in_memory(2));
        let seeder = RagEngine::new(
            test_config(),
            RagBackends {
                store: Arc::clone(&store),
                embedder: Arc::new(StubEmbedder),
                generator: Arc::new(EchoGenerator),
            },
        )
        .expect("engine");
        seeder
            .ingest_document("pets.txt", "cats are great pets", HashMap::new())
            .await
            .expect("ingest");

        let degraded = RagEngine::new(
            test_config(),
            RagBackends {
                store,
                embedder: Arc::new(FailingEmbedder),
                generator: Arc::new(EchoGenerator),
            },
        )
        .expect("engine");

        let passages = degraded
            .retrieve_with(RetrievalStrategy::Keyword, "cats", None)
            .await
            .expect("keyword retrieval");
        assert_eq!(passages[0].metadata.text, "cats are great pets");
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = test_config();
        config.retrieval.top_k = 0;
        let backends = RagBackends {
            store: Arc::new(FlatFileRecordStore::in_memory(2)),
            embedder: Arc::new(StubEmbedder),
            generator: Arc::new(EchoGenerator),
        };
        assert!(RagEngine::new(config, backends).is_err());
    }
}
