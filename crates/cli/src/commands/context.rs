//! Context command handler.
//!
//! Prints the assembled context block for a question without calling the
//! LLM, so retrieval quality can be inspected on its own.

use clap::Args;
use askpdf_core::{config::AppConfig, AppResult};

use super::make_tutor;

/// Print the retrieved context block without calling the LLM
#[derive(Args, Debug)]
pub struct ContextCommand {
    /// Bundle name (from 'askpdf build')
    pub bundle: String,

    /// The question driving retrieval
    pub question: String,

    /// Focus page number (0-based)
    #[arg(long, default_value = "0")]
    pub page: usize,

    /// Number of nearest pages to retrieve (default from config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Rank only pages inside the window instead of the whole document
    #[arg(long)]
    pub window_only: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ContextCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(
            "Executing context command for bundle '{}' page {}",
            self.bundle,
            self.page
        );
        tracing::debug!("Context options: {:?}", self);

        let tutor = make_tutor(config, self.window_only).await?;
        let context = tutor
            .context(&self.bundle, self.page, &self.question, self.top_k)
            .await?;

        if self.json {
            let output = serde_json::json!({
                "bundle": self.bundle,
                "focusPage": self.page,
                "contextChars": context.len(),
                "context": context,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", context);
        }

        Ok(())
    }
}
