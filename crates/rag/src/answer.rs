//! Answer generation from a retrieved context block.

use crate::types::Answer;
use askpdf_core::AppResult;
use askpdf_llm::{LlmClient, LlmRequest};
use std::sync::Arc;

/// Build the tutoring prompt for a context block and question.
///
/// The instruction pins the model to the retrieved text so it cannot
/// wander off into general knowledge.
pub fn answer_prompt(context: &str, question: &str) -> String {
    format!(
        "You are a tutor. Use ONLY the text below to answer clearly.\n\n{}\n\nQuestion: {}",
        context, question
    )
}

/// Sends tutoring prompts to an LLM and shapes the reply.
#[derive(Clone)]
pub struct Answerer {
    client: Arc<dyn LlmClient>,
    model: String,
}

impl Answerer {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model a question grounded in the given context block.
    pub async fn ask(&self, context: &str, question: &str) -> AppResult<Answer> {
        let prompt = answer_prompt(context, question);

        tracing::debug!(
            "Sending prompt to {} ({} chars)",
            self.client.provider_name(),
            prompt.len()
        );

        let request = LlmRequest::new(prompt, &self.model);
        let response = self.client.complete(&request).await?;

        let model = if response.model.is_empty() {
            self.model.clone()
        } else {
            response.model
        };

        Ok(Answer {
            text: response.content,
            model,
            usage: response.usage,
            context_chars: context.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use askpdf_llm::{LlmResponse, LlmUsage};
    use std::sync::Mutex;

    #[derive(Debug)]
    struct EchoClient {
        last_prompt: Mutex<Option<String>>,
    }

    #[async_trait::async_trait]
    impl LlmClient for EchoClient {
        fn provider_name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
            *self.last_prompt.lock().unwrap() = Some(request.prompt.clone());
            Ok(LlmResponse {
                content: "the answer".to_string(),
                model: String::new(),
                usage: LlmUsage::default(),
                done: true,
            })
        }
    }

    #[test]
    fn test_prompt_format() {
        let prompt = answer_prompt("CONTEXT BLOCK", "What is entropy?");
        assert_eq!(
            prompt,
            "You are a tutor. Use ONLY the text below to answer clearly.\n\nCONTEXT BLOCK\n\nQuestion: What is entropy?"
        );
    }

    #[tokio::test]
    async fn test_ask_sends_full_prompt() {
        let client = Arc::new(EchoClient {
            last_prompt: Mutex::new(None),
        });
        let answerer = Answerer::new(client.clone(), "test-model");

        let answer = answerer.ask("some context", "why?").await.unwrap();

        assert_eq!(answer.text, "the answer");
        // Blank model in the response falls back to the configured one
        assert_eq!(answer.model, "test-model");
        assert_eq!(answer.context_chars, "some context".len());

        let prompt = client.last_prompt.lock().unwrap().clone().unwrap();
        assert!(prompt.contains("some context"));
        assert!(prompt.ends_with("Question: why?"));
    }
}
