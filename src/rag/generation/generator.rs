//! Completion model wrapper for Rig + Ollama.

use std::future::Future;
use std::pin::Pin;

use reqwest::Client as ReqwestClient;
use rig::client::CompletionClient;
use rig::completion::CompletionModel;
use rig::message::AssistantContent;
use rig::providers::ollama;

use crate::rag::core::config::LlmConfig;
use crate::rag::core::errors::{RagError, RagResult};

/// Boxed future type for generation operations.
pub type GenerateFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait abstraction over completion models.
pub trait Generator: Send + Sync {
    /// Generate a completion for the prompt.
    ///
    /// # Errors
    /// Returns an error if the completion request fails.
    fn generate(&self, prompt: &str) -> GenerateFuture<'_, RagResult<String>>;
}

/// Split generated text into fixed-size chunks for incremental delivery.
///
/// The original backend streams this way: generate the full answer, then
/// hand it out piecewise. Kept for callers that want chunked output.
#[must_use]
pub fn chunk_generated(text: &str, chunk_size: usize) -> Vec<String> {
    if chunk_size == 0 {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

type OllamaCompletionModel = ollama::CompletionModel<ReqwestClient>;

/// Ollama completion model using the Rig provider.
#[derive(Clone)]
pub struct OllamaGenerator {
    model: OllamaCompletionModel,
    temperature: f64,
    max_tokens: Option<u64>,
}

impl OllamaGenerator {
    /// Create a new Ollama generator from config.
    ///
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn new(config: &LlmConfig) -> RagResult<Self> {
        let builder = ollama::Client::<ReqwestClient>::builder().api_key(rig::client::Nothing);
        let builder = if let Some(base_url) = &config.base_url {
            builder.base_url(base_url)
        } else {
            builder
        };
        let client = builder.build().map_err(RagError::from)?;
        let model = client.completion_model(config.model.clone());
        Ok(Self {
            model,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }
}

fn extract_text(choice: &rig::OneOrMany<AssistantContent>) -> String {
    let mut out = String::new();
    for content in choice.iter() {
        if let AssistantContent::Text(text) = content {
            out.push_str(&text.text);
        }
    }
    out
}

impl Generator for OllamaGenerator {
    fn generate(&self, prompt: &str) -> GenerateFuture<'_, RagResult<String>> {
        let prompt = prompt.to_string();
        Box::pin(async move {
            let request = self
                .model
                .completion_request(prompt)
                .temperature(self.temperature)
                .max_tokens_opt(self.max_tokens)
                .build();
            let response = self.model.completion(request).await?;
            Ok(extract_text(&response.choice))
        })
    }
}
