//! Shared type definitions for the retrieval pipeline.

use askpdf_llm::LlmUsage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Statistics from a bundle build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildStats {
    /// Number of pages indexed
    pub page_count: usize,

    /// Embedding vector dimensionality
    pub dimensions: usize,

    /// Duration in seconds
    pub duration_secs: f64,
}

/// Statistics for a persisted bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleStats {
    /// Bundle name
    pub name: String,

    /// Number of pages in the bundle
    pub page_count: usize,

    /// Embedding vector dimensionality
    pub dimensions: usize,

    /// Size of the index artifact in bytes
    pub index_bytes: u64,

    /// Size of the embedding matrix artifact in bytes
    pub embeds_bytes: u64,

    /// Size of the page-text artifact in bytes
    pub pages_bytes: u64,

    /// When the bundle was last written
    pub built_at: Option<DateTime<Utc>>,
}

/// A generated answer for a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// Natural language answer from the LLM
    pub text: String,

    /// Model that generated the answer
    pub model: String,

    /// Token usage for the completion
    pub usage: LlmUsage,

    /// Size of the context block the answer was grounded in
    pub context_chars: usize,
}
