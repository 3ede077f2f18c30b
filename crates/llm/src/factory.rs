//! LLM provider factory.
//!
//! This module provides a factory for creating LLM clients based on
//! application configuration. It handles provider resolution and secret
//! injection.

use crate::client::LlmClient;
use crate::providers::{GroqClient, OllamaClient};
use askpdf_core::{AppError, AppResult};
use std::sync::Arc;

/// Create an LLM client based on the provider name.
///
/// This function performs the following:
/// 1. Matches the provider string to a known provider type
/// 2. Checks that required secrets are present
/// 3. Creates the appropriate client implementation
///
/// # Arguments
/// * `provider` - Provider identifier ("groq", "ollama")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - Optional API key (for providers that require it)
///
/// # Returns
/// A reference-counted trait object implementing `LlmClient`
///
/// # Errors
/// Returns `AppError::Config` if the provider is unknown or a required
/// API key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "groq" => {
            let api_key = api_key.ok_or_else(|| {
                AppError::Config(
                    "Groq provider requires an API key (set GROQ_API_KEY)".to_string(),
                )
            })?;
            let client = match endpoint {
                Some(url) => GroqClient::with_base_url(api_key, url)?,
                None => GroqClient::new(api_key)?,
            };
            Ok(Arc::new(client))
        }
        "ollama" => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            let client = OllamaClient::with_base_url(base_url);
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!("Unknown provider: {}", provider))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_groq_client() {
        let client = create_client("groq", None, Some("test-key"));
        assert!(client.is_ok());
        assert_eq!(client.unwrap().provider_name(), "groq");
    }

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_create_ollama_with_custom_endpoint() {
        let client = create_client("ollama", Some("http://localhost:8080"), None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_groq_requires_api_key() {
        match create_client("groq", None, None) {
            Err(AppError::Config(msg)) => assert!(msg.contains("API key")),
            other => panic!("Expected config error for Groq without API key, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(AppError::Config(msg)) => assert!(msg.contains("Unknown provider")),
            other => panic!("Expected config error for unknown provider, got {:?}", other.map(|_| ())),
        }
    }
}
