//! Ollama embedding provider.
//!
//! Provides semantic embeddings via Ollama's local API using models like
//! nomic-embed-text. Requests are retried with exponential backoff, and
//! the returned dimensionality is verified against the configuration.

use crate::embedding::config::EmbeddingConfig;
use crate::embedding::provider::EmbeddingProvider;
use askpdf_core::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Ollama API endpoint for embeddings
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Maximum retry attempts for failed requests
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Ollama embedding provider using the local API.
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    /// HTTP client for API requests
    client: Arc<Client>,
    /// Ollama API base URL
    base_url: String,
    /// Model name (e.g., "nomic-embed-text")
    model: String,
    /// Expected embedding dimensions
    dimensions: usize,
}

/// Request payload for the Ollama embeddings API.
#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest {
    model: String,
    prompt: String,
}

/// Response from the Ollama embeddings API.
#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Error response from the Ollama API.
#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create new Ollama provider with configuration.
    ///
    /// Endpoint resolution: `config.endpoint`, then the `OLLAMA_URL`
    /// environment variable, then localhost. The connection is verified
    /// before the provider is returned.
    ///
    /// # Errors
    /// * `AppError::Embedding` - If Ollama is not reachable or the model
    ///   returns a different dimensionality than configured
    pub async fn new(config: EmbeddingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Embedding(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        let base_url = config
            .endpoint
            .clone()
            .or_else(|| std::env::var("OLLAMA_URL").ok())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let provider = Self {
            client: Arc::new(client),
            base_url,
            model: config.model.clone(),
            dimensions: config.dimensions,
        };

        // Verify Ollama is running and model is available
        provider.verify_connection().await?;

        Ok(provider)
    }

    /// Verify Ollama connection and model availability.
    #[instrument(skip(self), fields(model = %self.model))]
    async fn verify_connection(&self) -> AppResult<()> {
        debug!("Verifying Ollama connection at {}", self.base_url);

        let test_text = "test connection";
        match self.embed_with_retries(test_text, MAX_RETRIES).await {
            Ok(embedding) => {
                if embedding.len() != self.dimensions {
                    return Err(AppError::Embedding(format!(
                        "Ollama model '{}' returned {} dimensions, expected {}",
                        self.model,
                        embedding.len(),
                        self.dimensions
                    )));
                }
                debug!("Ollama connection verified, model '{}' ready", self.model);
                Ok(())
            }
            Err(e) => {
                error!("Failed to connect to Ollama: {}", e);
                Err(AppError::Embedding(format!(
                    "Ollama not available at {}. Ensure Ollama is running and model '{}' is installed. Run: ollama pull {}",
                    self.base_url, self.model, self.model
                )))
            }
        }
    }

    /// Embed single text with retry logic.
    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed_with_retries(&self, text: &str, retries: u32) -> AppResult<Vec<f32>> {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt < retries {
            match self.embed_single(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    attempt += 1;
                    last_error = Some(e);

                    if attempt < retries {
                        let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                        warn!(
                            "Embedding failed (attempt {}/{}), retrying in {}ms",
                            attempt, retries, backoff_ms
                        );
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::Embedding("Unknown embedding error".to_string())))
    }

    /// Embed single text (no retries).
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn embed_single(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);

        let request = EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        debug!("Sending embedding request to {}", url);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to send request to Ollama: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error_response) = serde_json::from_str::<ErrorResponse>(&error_text) {
                return Err(AppError::Embedding(format!(
                    "Ollama API error ({}): {}",
                    status, error_response.error
                )));
            }

            return Err(AppError::Embedding(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let response_body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AppError::Embedding(format!("Failed to parse Ollama response: {}", e)))?;

        if response_body.embedding.len() != self.dimensions {
            return Err(AppError::Embedding(format!(
                "Unexpected embedding dimensions: got {}, expected {}",
                response_body.embedding.len(),
                self.dimensions
            )));
        }

        debug!(
            "Successfully generated {} dimensional embedding",
            response_body.embedding.len()
        );

        Ok(response_body.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, texts), fields(batch_size = texts.len(), provider = "ollama", model = %self.model))]
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        debug!("Embedding batch of {} texts", texts.len());

        // Ollama has no batch API, so texts are embedded sequentially.
        // Empty texts map to the zero vector to keep positions aligned.
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            if text.trim().is_empty() {
                embeddings.push(vec![0.0; self.dimensions]);
                continue;
            }

            let embedding = self.embed_with_retries(text, MAX_RETRIES).await?;
            embeddings.push(embedding);
        }

        Ok(embeddings)
    }

    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Ok(vec![0.0; self.dimensions]);
        }

        self.embed_with_retries(text, MAX_RETRIES).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> EmbeddingConfig {
        EmbeddingConfig {
            provider: "ollama".to_string(),
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
            ..Default::default()
        }
    }

    /// Helper to check if Ollama is running locally.
    async fn is_ollama_running() -> bool {
        let client = Client::builder()
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        let url = format!("{}/api/tags", DEFAULT_OLLAMA_URL);
        client.get(&url).send().await.is_ok()
    }

    #[tokio::test]
    async fn test_ollama_provider_creation() {
        // This test requires Ollama to be running locally
        if std::env::var("OLLAMA_URL").is_err() && !is_ollama_running().await {
            println!("Skipping test: Ollama not running");
            return;
        }

        let config = create_test_config();
        let result = OllamaProvider::new(config).await;
        assert!(
            result.is_ok(),
            "Failed to create Ollama provider: {:?}",
            result.err()
        );
    }

    #[tokio::test]
    async fn test_embed_single() {
        if std::env::var("OLLAMA_URL").is_err() && !is_ollama_running().await {
            println!("Skipping test: Ollama not running");
            return;
        }

        let config = create_test_config();
        let provider = OllamaProvider::new(config).await.unwrap();

        let embedding = provider.embed("Hello, world!").await.unwrap();

        assert_eq!(embedding.len(), 768);
        assert!(
            embedding.iter().any(|&x| x != 0.0),
            "Embedding should not be all zeros"
        );
    }

    #[tokio::test]
    async fn test_embed_empty_text_is_zero_vector() {
        if std::env::var("OLLAMA_URL").is_err() && !is_ollama_running().await {
            println!("Skipping test: Ollama not running");
            return;
        }

        let config = create_test_config();
        let provider = OllamaProvider::new(config).await.unwrap();

        let embedding = provider.embed("").await.unwrap();
        assert_eq!(embedding.len(), 768);
        assert!(embedding.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_embed_batch_preserves_positions() {
        if std::env::var("OLLAMA_URL").is_err() && !is_ollama_running().await {
            println!("Skipping test: Ollama not running");
            return;
        }

        let config = create_test_config();
        let provider = OllamaProvider::new(config).await.unwrap();

        let texts = vec![
            "First page".to_string(),
            "".to_string(),
            "Third page".to_string(),
        ];

        let embeddings = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 3);
        assert!(embeddings[0].iter().any(|&x| x != 0.0));
        assert!(embeddings[1].iter().all(|&x| x == 0.0));
        assert!(embeddings[2].iter().any(|&x| x != 0.0));
    }
}
