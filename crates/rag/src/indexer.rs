//! Turning page texts into a searchable bundle.

use crate::bundle::Bundle;
use crate::embedding::EmbeddingProvider;
use crate::index::FlatIndex;
use crate::types::BuildStats;
use askpdf_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Instant;

/// A freshly built bundle plus timing information.
#[derive(Debug, Clone)]
pub struct IndexBuild {
    pub bundle: Bundle,
    pub stats: BuildStats,
}

/// Builds bundles by embedding every page of a document.
#[derive(Debug, Clone)]
pub struct Indexer {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl Indexer {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    /// Embed the given pages and index them in page order.
    ///
    /// Every page is kept, including empty ones, so that index positions
    /// stay equal to page numbers.
    ///
    /// # Errors
    /// * `AppError::Input` - the page list is empty
    /// * `AppError::Integrity` - the embedder returned a wrong shape
    pub async fn build(&self, pages: &[String]) -> AppResult<IndexBuild> {
        if pages.is_empty() {
            return Err(AppError::Input(
                "Cannot build an index from zero pages".to_string(),
            ));
        }

        let started = Instant::now();
        let dimensions = self.embedder.dimensions();

        tracing::info!(
            "Embedding {} pages with {}/{} ({} dims)",
            pages.len(),
            self.embedder.provider_name(),
            self.embedder.model_name(),
            dimensions
        );

        let embeddings = self.embedder.embed_batch(pages).await?;

        if embeddings.len() != pages.len() {
            return Err(AppError::Integrity(format!(
                "Embedder returned {} rows for {} pages",
                embeddings.len(),
                pages.len()
            )));
        }

        let mut index = FlatIndex::new(dimensions);
        for (position, row) in embeddings.iter().enumerate() {
            if row.len() != dimensions {
                return Err(AppError::Integrity(format!(
                    "Embedding for page {} has {} dims, expected {}",
                    position,
                    row.len(),
                    dimensions
                )));
            }
            index.add(row)?;
        }

        let duration_secs = started.elapsed().as_secs_f64();
        tracing::info!(
            "Indexed {} pages in {:.2}s",
            pages.len(),
            duration_secs
        );

        let stats = BuildStats {
            page_count: pages.len(),
            dimensions,
            duration_secs,
        };

        Ok(IndexBuild {
            bundle: Bundle {
                index,
                embeddings,
                pages: pages.to_vec(),
            },
            stats,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::providers::TrigramProvider;

    fn indexer() -> Indexer {
        Indexer::new(Arc::new(TrigramProvider::new(64)))
    }

    #[tokio::test]
    async fn test_build_indexes_every_page() {
        let pages = vec![
            "Introduction to thermodynamics".to_string(),
            "The first law of thermodynamics".to_string(),
            "Entropy and the second law".to_string(),
        ];

        let build = indexer().build(&pages).await.unwrap();

        assert_eq!(build.bundle.pages, pages);
        assert_eq!(build.bundle.embeddings.len(), 3);
        assert_eq!(build.bundle.index.len(), 3);
        assert_eq!(build.bundle.index.dim(), 64);
        assert_eq!(build.stats.page_count, 3);
        assert_eq!(build.stats.dimensions, 64);
    }

    #[tokio::test]
    async fn test_build_keeps_empty_pages() {
        let pages = vec![
            "Some real content".to_string(),
            String::new(),
            "More content after a blank page".to_string(),
        ];

        let build = indexer().build(&pages).await.unwrap();

        // The blank page occupies its position as a zero vector
        assert_eq!(build.bundle.index.len(), 3);
        assert!(build.bundle.embeddings[1].iter().all(|v| *v == 0.0));
    }

    #[tokio::test]
    async fn test_build_rejects_empty_document() {
        let err = indexer().build(&[]).await.unwrap_err();
        assert!(matches!(err, AppError::Input(_)));
    }
}
