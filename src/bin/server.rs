//! TalkFlow server binary.
//! Run with: cargo run --bin talkflow-server

use std::sync::Arc;

use anyhow::Context;

use talkflow::rag::core::config::{RagConfig, StorageBackend};
use talkflow::rag::engine::RagEngine;
use talkflow::rag::storage::init_sqlite_vec_extension;
use talkflow::server::{AppState, DEFAULT_PORT, run_server};

/// Apply environment overrides on top of the default configuration.
fn config_from_env() -> anyhow::Result<RagConfig> {
    let mut config = RagConfig::default();

    if let Ok(backend) = std::env::var("TALKFLOW_STORAGE") {
        config.storage.backend = match backend.as_str() {
            "sqlite" => StorageBackend::Sqlite,
            "flat_file" => StorageBackend::FlatFile,
            other => anyhow::bail!("unknown TALKFLOW_STORAGE backend: {other}"),
        };
    }
    if let Ok(path) = std::env::var("TALKFLOW_DB_PATH") {
        config.storage.sqlite_path = path.clone().into();
        config.storage.flat_file_path = path.into();
    }
    if let Ok(model) = std::env::var("TALKFLOW_EMBED_MODEL") {
        config.embedding.model = model;
    }
    if let Ok(ndims) = std::env::var("TALKFLOW_EMBED_NDIMS") {
        config.embedding.ndims = ndims
            .parse()
            .context("TALKFLOW_EMBED_NDIMS must be a positive integer")?;
    }
    if let Ok(model) = std::env::var("TALKFLOW_LLM_MODEL") {
        config.llm.model = model;
    }
    if let Ok(url) = std::env::var("TALKFLOW_OLLAMA_URL") {
        config.embedding.base_url = Some(url.clone());
        config.llm.base_url = Some(url);
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt().with_env_filter("info").try_init();

    let config = config_from_env()?;
    if config.storage.backend == StorageBackend::Sqlite {
        init_sqlite_vec_extension();
    }

    let engine = RagEngine::from_config(config)
        .await
        .context("failed to initialize RAG engine")?;
    let state = AppState::new(Arc::new(engine));

    let port = std::env::var("TALKFLOW_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    run_server(state, port)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {e}"))
}
