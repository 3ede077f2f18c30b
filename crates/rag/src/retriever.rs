//! Page retrieval around a focus page.
//!
//! Questions are always asked about a particular page of the document.
//! Retrieval embeds the question, finds the nearest page embeddings, and
//! keeps only hits that fall inside a window of pages around the focus
//! page. The focus page text plus the surviving hits become the context
//! block handed to the LLM.

use crate::bundle::Bundle;
use crate::embedding::EmbeddingProvider;
use crate::index::{squared_l2, Neighbor};
use askpdf_core::{AppError, AppResult};
use std::ops::Range;
use std::sync::Arc;

/// How the candidate set for a search is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalScope {
    /// Search the whole document, then drop hits outside the window.
    ///
    /// Pages far from the focus compete for the top-k slots even though
    /// they can never be returned, so fewer than k hits may survive.
    FullDocument,

    /// Search only the pages inside the window.
    WindowOnly,
}

impl Default for RetrievalScope {
    fn default() -> Self {
        RetrievalScope::FullDocument
    }
}

/// Tuning knobs for retrieval.
#[derive(Debug, Clone)]
pub struct RetrieverConfig {
    /// Number of nearest pages to request
    pub top_k: usize,

    /// Pages before the focus page included in the window
    pub window_behind: usize,

    /// Pages from the focus page forward included in the window
    /// (exclusive bound, so 11 means the focus page plus ten after it)
    pub window_ahead: usize,

    /// Candidate selection strategy
    pub scope: RetrievalScope,
}

impl Default for RetrieverConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            window_behind: 10,
            window_ahead: 11,
            scope: RetrievalScope::default(),
        }
    }
}

/// The page range eligible for retrieval around `focus`, clamped to the
/// document bounds.
pub fn context_window(focus: usize, page_count: usize, config: &RetrieverConfig) -> Range<usize> {
    let start = focus.saturating_sub(config.window_behind);
    let end = page_count.min(focus.saturating_add(config.window_ahead));
    start..end
}

/// Retrieves context blocks for questions about a page.
#[derive(Debug, Clone)]
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    config: RetrieverConfig,
}

impl Retriever {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, config: RetrieverConfig) -> Self {
        Self { embedder, config }
    }

    pub fn config(&self) -> &RetrieverConfig {
        &self.config
    }

    /// Assemble the context block for a question about `focus_page`.
    ///
    /// `k` overrides the configured `top_k` when given. The focus page is
    /// always included under its own header; it is not removed from the
    /// related hits, so a focus page that is also a nearest neighbor
    /// appears twice.
    ///
    /// # Errors
    /// * `AppError::Input` - focus page out of range, or k is zero
    /// * `AppError::Integrity` - embedder and bundle dimensions disagree
    pub async fn get_context(
        &self,
        bundle: &Bundle,
        focus_page: usize,
        question: &str,
        k: Option<usize>,
    ) -> AppResult<String> {
        let page_count = bundle.pages.len();
        if focus_page >= page_count {
            return Err(AppError::Input(format!(
                "Page {} out of range (document has {} pages)",
                focus_page, page_count
            )));
        }

        let k = k.unwrap_or(self.config.top_k);
        if k == 0 {
            return Err(AppError::Input("k must be at least 1".to_string()));
        }

        let query = self.embedder.embed(question).await?;
        if query.len() != bundle.index.dim() {
            return Err(AppError::Integrity(format!(
                "Question embedding has {} dims but the bundle was built with {}",
                query.len(),
                bundle.index.dim()
            )));
        }

        let window = context_window(focus_page, page_count, &self.config);

        let hits = match self.config.scope {
            RetrievalScope::FullDocument => {
                let mut hits = bundle.index.search(&query, k)?;
                hits.retain(|hit| window.contains(&hit.position));
                hits
            }
            RetrievalScope::WindowOnly => {
                let mut hits: Vec<Neighbor> = window
                    .clone()
                    .map(|position| Neighbor {
                        position,
                        distance: squared_l2(&query, &bundle.embeddings[position]),
                    })
                    .collect();
                hits.sort_by(|a, b| {
                    a.distance
                        .partial_cmp(&b.distance)
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                hits.truncate(k);
                hits
            }
        };

        tracing::debug!(
            "Retrieved {} of {} requested pages in window {}..{} around page {}",
            hits.len(),
            k,
            window.start,
            window.end,
            focus_page
        );

        let retrieved: Vec<&str> = hits
            .iter()
            .map(|hit| bundle.pages[hit.position].as_str())
            .collect();

        Ok(format!(
            "=== Focus Page {} ===\n{}\n\n=== Related Context ===\n{}",
            focus_page,
            bundle.pages[focus_page],
            retrieved.join("\n\n")
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::FlatIndex;

    /// Embedder that parses the text itself as a comma-separated vector,
    /// so tests can place queries exactly.
    #[derive(Debug)]
    struct StubEmbedder {
        dims: usize,
    }

    #[async_trait::async_trait]
    impl EmbeddingProvider for StubEmbedder {
        fn provider_name(&self) -> &str {
            "stub"
        }

        fn model_name(&self) -> &str {
            "stub"
        }

        fn dimensions(&self) -> usize {
            self.dims
        }

        async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|t| parse_vector(t, self.dims)).collect())
        }
    }

    fn parse_vector(text: &str, dims: usize) -> Vec<f32> {
        let mut vector = vec![0.0; dims];
        for (i, part) in text.split(',').take(dims).enumerate() {
            vector[i] = part.trim().parse().unwrap_or(0.0);
        }
        vector
    }

    fn make_bundle(rows: &[Vec<f32>]) -> Bundle {
        let dims = rows[0].len();
        let mut index = FlatIndex::new(dims);
        for row in rows {
            index.add(row).unwrap();
        }
        Bundle {
            index,
            embeddings: rows.to_vec(),
            pages: (0..rows.len()).map(|i| format!("page {}", i)).collect(),
        }
    }

    /// `count` pages along the x axis, with `special` positions moved to
    /// the y axis so a y-axis query finds exactly those.
    fn axis_bundle(count: usize, special: &[usize]) -> Bundle {
        let rows: Vec<Vec<f32>> = (0..count)
            .map(|i| {
                if special.contains(&i) {
                    vec![0.0, 1.0, 0.0]
                } else {
                    vec![1.0, 0.0, 0.0]
                }
            })
            .collect();
        make_bundle(&rows)
    }

    fn retriever(config: RetrieverConfig) -> Retriever {
        Retriever::new(Arc::new(StubEmbedder { dims: 3 }), config)
    }

    #[test]
    fn test_window_at_document_start() {
        let config = RetrieverConfig::default();
        assert_eq!(context_window(0, 100, &config), 0..11);
        assert_eq!(context_window(5, 100, &config), 0..16);
    }

    #[test]
    fn test_window_at_document_end() {
        let config = RetrieverConfig::default();
        assert_eq!(context_window(99, 100, &config), 89..100);
        assert_eq!(context_window(95, 100, &config), 85..100);
    }

    #[test]
    fn test_window_in_middle() {
        let config = RetrieverConfig::default();
        assert_eq!(context_window(50, 100, &config), 40..61);
    }

    #[test]
    fn test_window_covers_tiny_document() {
        let config = RetrieverConfig::default();
        assert_eq!(context_window(0, 3, &config), 0..3);
        assert_eq!(context_window(2, 3, &config), 0..3);
    }

    #[tokio::test]
    async fn test_focus_page_out_of_range() {
        let bundle = axis_bundle(3, &[]);
        let err = retriever(RetrieverConfig::default())
            .get_context(&bundle, 3, "0,1,0", None)
            .await
            .unwrap_err();

        match err {
            AppError::Input(msg) => {
                assert!(msg.contains("Page 3"));
                assert!(msg.contains("3 pages"));
            }
            other => panic!("Expected Input, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_k_rejected() {
        let bundle = axis_bundle(3, &[]);
        let err = retriever(RetrieverConfig::default())
            .get_context(&bundle, 0, "0,1,0", Some(0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
    }

    #[tokio::test]
    async fn test_context_starts_with_focus_header() {
        let bundle = axis_bundle(3, &[]);
        let context = retriever(RetrieverConfig::default())
            .get_context(&bundle, 1, "0,1,0", None)
            .await
            .unwrap();

        assert!(context.starts_with("=== Focus Page 1 ===\npage 1\n\n=== Related Context ===\n"));
    }

    #[tokio::test]
    async fn test_hits_outside_window_are_dropped() {
        // Page 20 matches the query best but sits outside the window
        // around page 0, so it takes a top-k slot and is then dropped.
        let bundle = axis_bundle(30, &[20]);
        let context = retriever(RetrieverConfig::default())
            .get_context(&bundle, 0, "0,1,0", None)
            .await
            .unwrap();

        assert!(!context.contains("page 20"));
        // The remaining four slots went to in-window ties
        assert!(context.contains("page 0"));
        assert!(context.contains("page 3"));
        assert!(!context.contains("page 4"));
    }

    #[tokio::test]
    async fn test_window_only_searches_inside_window() {
        let bundle = axis_bundle(30, &[20]);
        let config = RetrieverConfig {
            scope: RetrievalScope::WindowOnly,
            ..RetrieverConfig::default()
        };
        let context = retriever(config)
            .get_context(&bundle, 0, "0,1,0", None)
            .await
            .unwrap();

        // All five slots filled from inside the window
        assert!(!context.contains("page 20"));
        assert!(context.contains("page 4"));
        assert!(!context.contains("page 5"));
    }

    #[tokio::test]
    async fn test_related_section_can_be_empty() {
        // Every good match lives outside the window
        let bundle = axis_bundle(30, &[20, 21, 22, 23, 24]);
        let context = retriever(RetrieverConfig::default())
            .get_context(&bundle, 0, "0,1,0", None)
            .await
            .unwrap();

        assert!(context.ends_with("=== Related Context ===\n"));
    }

    #[tokio::test]
    async fn test_focus_page_may_repeat_in_related() {
        let bundle = axis_bundle(5, &[1]);
        let context = retriever(RetrieverConfig::default())
            .get_context(&bundle, 1, "0,1,0", None)
            .await
            .unwrap();

        // Once as the focus header, once as the nearest neighbor
        assert_eq!(context.matches("page 1").count(), 2);
    }

    #[tokio::test]
    async fn test_k_override_limits_hits() {
        let bundle = axis_bundle(8, &[]);
        let context = retriever(RetrieverConfig::default())
            .get_context(&bundle, 0, "1,0,0", Some(2))
            .await
            .unwrap();

        let related = context.split("=== Related Context ===\n").nth(1).unwrap();
        assert_eq!(related.split("\n\n").count(), 2);
    }

    #[tokio::test]
    async fn test_dimension_mismatch_is_integrity_error() {
        let bundle = axis_bundle(3, &[]);
        let retriever = Retriever::new(
            Arc::new(StubEmbedder { dims: 7 }),
            RetrieverConfig::default(),
        );

        let err = retriever
            .get_context(&bundle, 0, "0,1,0", None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Integrity(_)));
    }
}
