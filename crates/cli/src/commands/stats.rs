//! Stats command handler.
//!
//! Shows the shape and on-disk footprint of a persisted bundle.

use clap::Args;
use askpdf_core::{config::AppConfig, AppResult};
use askpdf_rag::BundleStore;

/// Show bundle statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Bundle name (from 'askpdf build')
    pub bundle: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command for bundle '{}'", self.bundle);
        tracing::debug!("Stats options: {:?}", self);

        // Stats only touch the store, so no embedder or LLM is set up
        let store = BundleStore::new(config.bundles_dir());
        let stats = store.stat(&self.bundle)?;

        if self.json {
            let output = serde_json::json!({
                "bundle": stats.name,
                "pageCount": stats.page_count,
                "dimensions": stats.dimensions,
                "indexBytes": stats.index_bytes,
                "embedsBytes": stats.embeds_bytes,
                "pagesBytes": stats.pages_bytes,
                "builtAt": stats.built_at.map(|t| t.to_rfc3339()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("Bundle: {}", stats.name);
            println!("  Pages: {}", stats.page_count);
            println!("  Dimensions: {}", stats.dimensions);
            println!("  Index artifact: {} bytes", stats.index_bytes);
            println!("  Embedding matrix: {} bytes", stats.embeds_bytes);
            println!("  Page texts: {} bytes", stats.pages_bytes);
            if let Some(built_at) = stats.built_at {
                println!("  Built: {}", built_at.to_rfc3339());
            }
        }

        Ok(())
    }
}
