//! Ask command handler.
//!
//! Retrieves context around the focus page and asks the configured LLM.

use clap::Args;
use askpdf_core::{config::AppConfig, AppResult};

use super::make_answering_tutor;

/// Ask a question about a page of an indexed PDF
#[derive(Args, Debug)]
pub struct AskCommand {
    /// Bundle name (from 'askpdf build')
    pub bundle: String,

    /// The question to ask about the focus page
    pub question: String,

    /// Focus page number (0-based)
    #[arg(long, default_value = "0")]
    pub page: usize,

    /// Number of nearest pages to retrieve (default from config)
    #[arg(short = 'k', long)]
    pub top_k: Option<usize>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AskCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!(
            "Executing ask command for bundle '{}' page {}",
            self.bundle,
            self.page
        );
        tracing::debug!("Ask options: {:?}", self);

        let tutor = make_answering_tutor(config).await?;
        let answer = tutor
            .ask(&self.bundle, self.page, &self.question, self.top_k)
            .await?;

        if self.json {
            let output = serde_json::json!({
                "answer": answer.text,
                "model": answer.model,
                "provider": config.provider,
                "focusPage": self.page,
                "contextChars": answer.context_chars,
                "usage": {
                    "promptTokens": answer.usage.prompt_tokens,
                    "completionTokens": answer.usage.completion_tokens,
                    "totalTokens": answer.usage.total_tokens
                }
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!("{}", answer.text);

            // Usage goes to stderr so stdout stays just the answer
            tracing::debug!(
                "Token usage - Prompt: {}, Completion: {}, Total: {}",
                answer.usage.prompt_tokens,
                answer.usage.completion_tokens,
                answer.usage.total_tokens
            );
        }

        Ok(())
    }
}
