//! Groq LLM provider implementation.
//!
//! Groq serves open models behind an OpenAI-compatible chat completions
//! API: https://console.groq.com/docs/api-reference
//!
//! Transient failures (connect errors, timeouts, 429, 5xx) are retried
//! with exponential backoff; client errors fail immediately.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmUsage};
use askpdf_core::{AppError, AppResult};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Groq API base URL (OpenAI-compatible)
const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1";
const CHAT_COMPLETIONS_ENDPOINT: &str = "/chat/completions";

/// Maximum retry attempts for transient failures
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 250;

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Chat completions request payload.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

/// A single chat message.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Chat completions response payload.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

/// Outcome of a single API call, used by the retry loop.
enum CallError {
    Transient(AppError),
    Fatal(AppError),
}

/// Groq LLM client.
pub struct GroqClient {
    /// Base URL for the Groq API
    base_url: String,

    /// API key (Bearer token)
    api_key: String,

    /// HTTP client
    client: reqwest::Client,
}

impl GroqClient {
    /// Create a new Groq client with the default endpoint.
    pub fn new(api_key: impl Into<String>) -> AppResult<Self> {
        Self::with_base_url(api_key, DEFAULT_GROQ_URL)
    }

    /// Create a new Groq client with a custom base URL.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client for Groq: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            client,
        })
    }

    /// Convert LlmRequest to the chat completions format.
    fn to_chat_request(&self, request: &LlmRequest) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);

        if let Some(ref system) = request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }

        messages.push(ChatMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            top_p: request.top_p,
        }
    }

    /// Convert a chat completions response to LlmResponse.
    fn convert_response(&self, response: ChatResponse) -> AppResult<LlmResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Llm("Groq response contained no choices".to_string()))?;

        let usage = response
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        Ok(LlmResponse {
            content: choice.message.content,
            model: response.model,
            usage,
            done: true,
        })
    }

    /// Perform one completion with retries on transient failures.
    async fn complete_with_retries(&self, request: &ChatRequest) -> AppResult<LlmResponse> {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt < MAX_RETRIES {
            match self.complete_once(request).await {
                Ok(response) => return Ok(response),
                Err(CallError::Fatal(e)) => return Err(e),
                Err(CallError::Transient(e)) => {
                    attempt += 1;
                    last_error = Some(e);

                    if attempt < MAX_RETRIES {
                        let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                        warn!(
                            "Groq request failed (attempt {}/{}), retrying in {}ms",
                            attempt, MAX_RETRIES, backoff_ms
                        );
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| AppError::Llm("Unknown Groq error".to_string())))
    }

    /// Perform a single completion call (no retries).
    async fn complete_once(&self, request: &ChatRequest) -> Result<LlmResponse, CallError> {
        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_ENDPOINT);

        debug!("Sending completion request to {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let err = AppError::Llm(format!("Failed to send request to Groq: {}", e));
                if e.is_connect() || e.is_timeout() {
                    CallError::Transient(err)
                } else {
                    CallError::Fatal(err)
                }
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let err = AppError::Llm(format!("Groq API error ({}): {}", status, error_text));

            return Err(if is_transient_status(status) {
                CallError::Transient(err)
            } else {
                CallError::Fatal(err)
            });
        }

        let chat_response: ChatResponse = response.json().await.map_err(|e| {
            CallError::Fatal(AppError::Llm(format!("Failed to parse Groq response: {}", e)))
        })?;

        self.convert_response(chat_response).map_err(CallError::Fatal)
    }
}

/// Whether an HTTP status is worth retrying.
fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait::async_trait]
impl LlmClient for GroqClient {
    fn provider_name(&self) -> &str {
        "groq"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::info!("Sending completion request to Groq");
        tracing::debug!("Request: {:?}", request);

        let chat_request = self.to_chat_request(request);
        let response = self.complete_with_retries(&chat_request).await?;

        tracing::info!("Received completion from Groq");

        Ok(response)
    }
}
