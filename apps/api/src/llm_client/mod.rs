/// LLM Client — the single point of entry for all chat completion calls.
///
/// ARCHITECTURAL RULE: No other module may call the provider API directly.
/// Interview turns and résumé analysis go through the `ChatModel` trait,
/// which `LlmClient` implements against any OpenAI-compatible endpoint.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const MAX_ATTEMPTS: u32 = 3;
/// First retry waits this long; each later retry doubles it (1s, 2s).
const BACKOFF_BASE: Duration = Duration::from_secs(1);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One message of a chat completion request. Also the unit of the interview log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Anything that can turn a message list into a reply.
///
/// Carried in `AppState` as `Arc<dyn ChatModel>` so handlers and the interview
/// controller can be exercised with a scripted model in tests.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, messages: &[ChatMessage], temperature: f32)
        -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

impl ChatCompletionResponse {
    /// Trimmed text of the first choice, if it carries any.
    fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: Option<ProviderErrorBody>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// How a single request failed.
enum Attempt {
    Retry(LlmError),
    Fail(LlmError),
}

/// Chat completion client for OpenAI-compatible providers (Mistral, Groq, OpenAI).
/// Retries transport errors, 429 and 5xx with exponential backoff; the error of
/// the last attempt is returned once the attempts run out.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    backoff_base: Duration,
}

impl LlmClient {
    pub fn new(
        api_url: String,
        api_key: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_url,
            api_key,
            model,
            backoff_base: BACKOFF_BASE,
        })
    }

    #[cfg(test)]
    fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_once(&self, body: &ChatCompletionRequest<'_>) -> Result<String, Attempt> {
        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| Attempt::Retry(LlmError::Http(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("LLM API returned {}: {}", status, body);
            let error = LlmError::Api {
                status: status.as_u16(),
                message: provider_error_message(body),
            };
            return Err(if is_retryable(status) {
                Attempt::Retry(error)
            } else {
                Attempt::Fail(error)
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| Attempt::Retry(LlmError::Http(e)))?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&body).map_err(|e| Attempt::Fail(LlmError::Parse(e)))?;

        if let Some(usage) = &parsed.usage {
            debug!(
                "LLM call succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        parsed
            .text()
            .map(str::to_string)
            .ok_or(Attempt::Fail(LlmError::EmptyContent))
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String, LlmError> {
        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages,
            temperature,
        };

        let mut attempt = 1;
        loop {
            let error = match self.send_once(&request_body).await {
                Ok(text) => return Ok(text),
                Err(Attempt::Fail(e)) => return Err(e),
                Err(Attempt::Retry(e)) => e,
            };
            if attempt >= MAX_ATTEMPTS {
                warn!("LLM call gave up after {} attempts: {}", attempt, error);
                return Err(error);
            }

            let delay = backoff_delay(self.backoff_base, attempt);
            warn!(
                "LLM call attempt {} failed ({}), retrying after {}ms...",
                attempt,
                error,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Wait before retry number `retry` (1-based): base, 2×base, 4×base, ...
fn backoff_delay(base: Duration, retry: u32) -> Duration {
    base * (1u32 << retry.saturating_sub(1))
}

fn is_retryable(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Pulls the human-readable message out of a provider error body, if it has one.
fn provider_error_message(body: String) -> String {
    match serde_json::from_str::<ProviderError>(&body) {
        Ok(ProviderError {
            error: Some(inner), ..
        }) => inner.message,
        Ok(ProviderError {
            message: Some(message),
            ..
        }) => message,
        _ => body,
    }
}
