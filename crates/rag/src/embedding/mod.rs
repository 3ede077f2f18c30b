//! Embedding generation for page texts and questions.
//!
//! Provider-agnostic embedding with a deterministic local default
//! (trigram) and an optional Ollama-backed semantic provider.

pub mod config;
pub mod provider;
pub mod providers;

pub use config::EmbeddingConfig;
pub use provider::{create_provider, EmbeddingProvider};
