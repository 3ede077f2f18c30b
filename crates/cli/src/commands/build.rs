//! Build command handler.
//!
//! Extracts a PDF's pages, embeds them, and persists the bundle.

use clap::Args;
use askpdf_core::{config::AppConfig, AppResult};
use std::path::PathBuf;

use super::make_tutor;

/// Extract, embed, and index a PDF into a bundle
#[derive(Args, Debug)]
pub struct BuildCommand {
    /// Path to the PDF file to index
    pub pdf: PathBuf,

    /// Bundle name to save under (an existing bundle of the same name
    /// is replaced)
    #[arg(short, long, default_value = "textbook")]
    pub name: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl BuildCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing build command for bundle '{}'", self.name);
        tracing::debug!("Build options: {:?}", self);

        let tutor = make_tutor(config, false).await?;
        let stats = tutor.build(&self.pdf, &self.name).await?;

        if self.json {
            let output = serde_json::json!({
                "bundle": self.name,
                "pageCount": stats.page_count,
                "dimensions": stats.dimensions,
                "durationSecs": stats.duration_secs,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Indexed {} pages ({} dims) into bundle '{}' in {:.2}s",
                stats.page_count, stats.dimensions, self.name, stats.duration_secs
            );
        }

        Ok(())
    }
}
