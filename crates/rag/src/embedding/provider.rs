//! Embedding provider trait and factory.

use crate::embedding::config::EmbeddingConfig;
use askpdf_core::{AppError, AppResult};
use std::sync::Arc;

/// Trait for embedding providers.
///
/// Implementations must be deterministic: identical input text yields an
/// identical vector for a given provider and model. Empty or
/// whitespace-only text embeds to the zero vector of the configured
/// dimensionality, never an error.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "trigram", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
pub async fn create_provider(config: &EmbeddingConfig) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "trigram" => {
            let provider = super::providers::trigram::TrigramProvider::new(config.dimensions);
            Ok(Arc::new(provider))
        }

        "ollama" => {
            let provider = super::providers::ollama::OllamaProvider::new(config.clone()).await?;
            Ok(Arc::new(provider))
        }

        _ => Err(AppError::Config(format!(
            "Unknown embedding provider: '{}'. Supported providers: trigram, ollama",
            config.provider
        ))),
    }
}
