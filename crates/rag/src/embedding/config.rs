//! Embedding configuration types.

use serde::{Deserialize, Serialize};

/// Configuration for an embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbeddingConfig {
    /// Provider name: "trigram" or "ollama"
    pub provider: String,

    /// Model identifier (provider-specific)
    pub model: String,

    /// Embedding vector dimensions
    pub dimensions: usize,

    /// Whether to normalize embeddings to unit length
    #[serde(default = "default_normalize")]
    pub normalize: bool,

    /// Maximum batch size for embedding requests
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Provider endpoint override (for ollama)
    #[serde(default)]
    pub endpoint: Option<String>,
}

fn default_normalize() -> bool {
    true
}

fn default_batch_size() -> usize {
    100
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "trigram".to_string(),
            model: "trigram-v1".to_string(),
            dimensions: 384,
            normalize: true,
            batch_size: 100,
            endpoint: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "trigram");
        assert_eq!(config.model, "trigram-v1");
        assert_eq!(config.dimensions, 384);
        assert!(config.normalize);
        assert_eq!(config.batch_size, 100);
        assert!(config.endpoint.is_none());
    }
}
