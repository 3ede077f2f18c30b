//! LLM integration crate for the askpdf CLI.
//!
//! This crate provides a provider-agnostic abstraction for interacting with
//! Large Language Models (LLMs). It supports multiple providers through a
//! unified trait-based interface.
//!
//! # Providers
//! - **Groq**: Hosted open models behind an OpenAI-compatible API (default)
//! - **Ollama**: Local LLM runtime
//!
//! # Example
//! ```no_run
//! use askpdf_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Hello, world!", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;

// Re-export main types
pub use client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
pub use factory::create_client;
pub use providers::{GroqClient, OllamaClient};
