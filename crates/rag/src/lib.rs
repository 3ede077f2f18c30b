//! Page-focused retrieval over a single PDF document.
//!
//! This crate turns a PDF into a persisted bundle of page texts and page
//! embeddings, then answers questions about a specific page by retrieving
//! the nearest pages within a window around it and prompting an LLM with
//! the result.
//!
//! The pipeline:
//!
//! 1. [`document`] extracts one text string per PDF page.
//! 2. [`indexer`] embeds every page and builds a flat [`index`].
//! 3. [`bundle`] persists index, embedding matrix, and page texts.
//! 4. [`retriever`] assembles a context block around a focus page.
//! 5. [`answer`] prompts the LLM with the context block.
//!
//! [`tutor::Tutor`] is the facade that ties the stages together.

pub mod answer;
pub mod bundle;
pub mod document;
pub mod embedding;
pub mod index;
pub mod indexer;
pub mod retriever;
pub mod tutor;
pub mod types;


pub use answer::{answer_prompt, Answerer};
pub use bundle::{Bundle, BundleStore};
pub use embedding::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use index::{FlatIndex, Neighbor};
pub use indexer::{IndexBuild, Indexer};
pub use retriever::{context_window, RetrievalScope, Retriever, RetrieverConfig};
pub use tutor::Tutor;
pub use types::{Answer, BuildStats, BundleStats};
