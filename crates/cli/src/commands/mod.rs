//! Command handlers for the askpdf CLI.
//!
//! This module organizes all CLI commands into separate submodules and
//! holds the shared wiring from configuration to a ready [`Tutor`].

pub mod ask;
pub mod build;
pub mod context;
pub mod stats;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use build::BuildCommand;
pub use context::ContextCommand;
pub use stats::StatsCommand;

use askpdf_core::{config::AppConfig, config::ProviderConfig, AppResult};
use askpdf_llm::create_client;
use askpdf_rag::{
    create_provider, BundleStore, EmbeddingConfig, RetrievalScope, RetrieverConfig, Tutor,
};

/// Map the loaded settings onto an embedding provider configuration.
fn embedding_config(config: &AppConfig) -> EmbeddingConfig {
    EmbeddingConfig {
        provider: config.embedding.provider.clone(),
        model: config.embedding.model.clone(),
        dimensions: config.embedding.dimensions,
        endpoint: config.embedding.endpoint.clone(),
        ..EmbeddingConfig::default()
    }
}

/// Map the loaded settings onto a retriever configuration.
fn retriever_config(config: &AppConfig, window_only: bool) -> RetrieverConfig {
    RetrieverConfig {
        top_k: config.retrieval.top_k,
        window_behind: config.retrieval.window_behind,
        window_ahead: config.retrieval.window_ahead,
        scope: if window_only || config.retrieval.window_only {
            RetrievalScope::WindowOnly
        } else {
            RetrievalScope::FullDocument
        },
    }
}

/// Build a tutor that can index and retrieve but not answer.
pub(crate) async fn make_tutor(config: &AppConfig, window_only: bool) -> AppResult<Tutor> {
    let embedder = create_provider(&embedding_config(config)).await?;
    Ok(Tutor::new(
        BundleStore::new(config.bundles_dir()),
        embedder,
        retriever_config(config, window_only),
    ))
}

/// Build a tutor with an LLM client attached for answering.
pub(crate) async fn make_answering_tutor(config: &AppConfig) -> AppResult<Tutor> {
    let tutor = make_tutor(config, false).await?;

    // Resolve endpoint from the provider configuration, if any
    let provider_config = config.get_provider_config(&config.provider)?;
    let endpoint = provider_config.as_ref().and_then(|pc| match pc {
        ProviderConfig::Groq { endpoint, .. } => endpoint.clone(),
        ProviderConfig::Ollama { endpoint, .. } => Some(endpoint.clone()),
    });

    let api_key = config.resolve_api_key(&config.provider)?;
    let client = create_client(&config.provider, endpoint.as_deref(), api_key.as_deref())?;

    Ok(tutor.with_answerer(client, &config.model))
}
