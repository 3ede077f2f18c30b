//! High-level facade over the question-answering pipeline.
//!
//! A [`Tutor`] owns the bundle store, the indexer, and the retriever, and
//! optionally an LLM-backed answerer. Commands talk to this type rather
//! than wiring the pipeline stages together themselves.

use crate::answer::Answerer;
use crate::bundle::BundleStore;
use crate::document;
use crate::embedding::EmbeddingProvider;
use crate::indexer::Indexer;
use crate::retriever::{Retriever, RetrieverConfig};
use crate::types::{Answer, BuildStats, BundleStats};
use askpdf_core::{AppError, AppResult};
use askpdf_llm::LlmClient;
use std::path::Path;
use std::sync::Arc;

/// One document-question-answering pipeline.
pub struct Tutor {
    store: BundleStore,
    indexer: Indexer,
    retriever: Retriever,
    answerer: Option<Answerer>,
}

impl Tutor {
    /// Create a tutor without answering capability.
    ///
    /// Building bundles and retrieving context work immediately; `ask`
    /// requires [`Tutor::with_answerer`].
    pub fn new(
        store: BundleStore,
        embedder: Arc<dyn EmbeddingProvider>,
        config: RetrieverConfig,
    ) -> Self {
        Self {
            store,
            indexer: Indexer::new(Arc::clone(&embedder)),
            retriever: Retriever::new(embedder, config),
            answerer: None,
        }
    }

    /// Attach an LLM client for answering questions.
    pub fn with_answerer(mut self, client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        self.answerer = Some(Answerer::new(client, model));
        self
    }

    /// Extract a PDF, embed its pages, and persist the result as `name`.
    pub async fn build(&self, pdf_path: &Path, name: &str) -> AppResult<BuildStats> {
        tracing::info!("Building bundle '{}' from {}", name, pdf_path.display());
        let pages = document::extract_pages(pdf_path)?;
        self.build_from_pages(&pages, name).await
    }

    /// Embed already-extracted pages and persist the result as `name`.
    pub async fn build_from_pages(&self, pages: &[String], name: &str) -> AppResult<BuildStats> {
        let build = self.indexer.build(pages).await?;
        self.store.save(name, &build.bundle)?;
        Ok(build.stats)
    }

    /// Retrieve the context block for a question about a page of `name`.
    pub async fn context(
        &self,
        name: &str,
        focus_page: usize,
        question: &str,
        k: Option<usize>,
    ) -> AppResult<String> {
        let bundle = self.store.load(name)?;
        self.retriever
            .get_context(&bundle, focus_page, question, k)
            .await
    }

    /// Answer a question about a page of `name` using the attached LLM.
    pub async fn ask(
        &self,
        name: &str,
        focus_page: usize,
        question: &str,
        k: Option<usize>,
    ) -> AppResult<Answer> {
        let answerer = self.answerer.as_ref().ok_or_else(|| {
            AppError::Config("LLM client not configured".to_string())
        })?;

        let context = self.context(name, focus_page, question, k).await?;
        answerer.ask(&context, question).await
    }

    /// Artifact sizes and shape of the bundle stored as `name`.
    pub fn stats(&self, name: &str) -> AppResult<BundleStats> {
        self.store.stat(name)
    }

    /// Whether a bundle named `name` has been built.
    pub fn exists(&self, name: &str) -> bool {
        self.store.exists(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::providers::TrigramProvider;
    use tempfile::TempDir;

    fn tutor(root: &Path) -> Tutor {
        Tutor::new(
            BundleStore::new(root),
            Arc::new(TrigramProvider::new(64)),
            RetrieverConfig::default(),
        )
    }

    fn pages() -> Vec<String> {
        vec![
            "Chapter one introduces the subject".to_string(),
            "Chapter two develops the theory".to_string(),
            "Chapter three applies it".to_string(),
        ]
    }

    #[tokio::test]
    async fn test_build_then_context() {
        let temp = TempDir::new().unwrap();
        let tutor = tutor(temp.path());

        let stats = tutor.build_from_pages(&pages(), "book").await.unwrap();
        assert_eq!(stats.page_count, 3);
        assert!(tutor.exists("book"));

        let context = tutor
            .context("book", 1, "what does chapter two cover?", None)
            .await
            .unwrap();
        assert!(context.starts_with("=== Focus Page 1 ===\nChapter two develops the theory"));
    }

    #[tokio::test]
    async fn test_context_for_missing_bundle() {
        let temp = TempDir::new().unwrap();
        let tutor = tutor(temp.path());

        let err = tutor.context("ghost", 0, "anything", None).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_ask_without_llm_is_config_error() {
        let temp = TempDir::new().unwrap();
        let tutor = tutor(temp.path());
        tutor.build_from_pages(&pages(), "book").await.unwrap();

        let err = tutor.ask("book", 0, "why?", None).await.unwrap_err();
        match err {
            AppError::Config(msg) => assert!(msg.contains("LLM client not configured")),
            other => panic!("Expected Config, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stats_after_build() {
        let temp = TempDir::new().unwrap();
        let tutor = tutor(temp.path());
        tutor.build_from_pages(&pages(), "book").await.unwrap();

        let stats = tutor.stats("book").unwrap();
        assert_eq!(stats.page_count, 3);
        assert_eq!(stats.dimensions, 64);
    }
}
