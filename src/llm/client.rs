//! HTTP client for Azure OpenAI and OpenAI-compatible chat completions.

use super::{CompletionClient, CompletionRequest, LlmError};
use crate::config::{Config, LlmProvider, get_config};
use crate::usage::{RateLimiter, TokenUsageTracker};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
/// Backoff stops doubling after this many retries.
const MAX_BACKOFF_DOUBLINGS: u32 = 6;

/// Chat-completion client with usage accounting, a local request budget, and retries.
pub struct ChatCompletionClient {
    pub(crate) client: Client,
    pub(crate) url: String,
    pub(crate) provider: LlmProvider,
    pub(crate) model: String,
    pub(crate) api_key: Option<String>,
    pub(crate) usage: Arc<TokenUsageTracker>,
    pub(crate) limiter: RateLimiter,
    pub(crate) max_retries: u32,
    pub(crate) retry_backoff: Duration,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl ChatCompletionClient {
    /// Build a client from the global configuration.
    pub fn new(usage: Arc<TokenUsageTracker>) -> Result<Self, LlmError> {
        Self::from_config(get_config(), usage)
    }

    /// Build a client from an explicit configuration.
    pub fn from_config(config: &Config, usage: Arc<TokenUsageTracker>) -> Result<Self, LlmError> {
        let client = Client::builder()
            .user_agent(concat!("careerlens/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let url = completions_url(
            config.llm_provider,
            &config.llm_endpoint,
            &config.llm_deployment,
            &config.llm_api_version,
        )?;
        tracing::debug!(
            provider = ?config.llm_provider,
            model = %config.llm_deployment,
            has_api_key = config.llm_api_key.is_some(),
            "Initialized chat completion client"
        );

        Ok(Self {
            client,
            url,
            provider: config.llm_provider,
            model: config.llm_deployment.clone(),
            api_key: config.llm_api_key.clone(),
            usage,
            limiter: RateLimiter::per_minute(config.llm_max_requests_per_minute),
            max_retries: config.llm_max_retries,
            retry_backoff: Duration::from_secs(1),
        })
    }

    fn request_builder(&self) -> reqwest::RequestBuilder {
        let builder = self.client.post(&self.url);
        match (&self.api_key, self.provider) {
            (Some(key), LlmProvider::Azure) => builder.header("api-key", key),
            (Some(key), LlmProvider::OpenAI) => builder.bearer_auth(key),
            (None, _) => builder,
        }
    }
}

#[async_trait]
impl CompletionClient for ChatCompletionClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
        if !self.limiter.allow_request().await {
            tracing::warn!(model = %self.model, "Completion request rejected by local rate limit");
            return Err(LlmError::RateLimited);
        }

        let body = ChatRequest {
            model: match self.provider {
                LlmProvider::OpenAI => Some(self.model.as_str()),
                LlmProvider::Azure => None,
            },
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: request.json_mode.then_some(ResponseFormat {
                kind: "json_object",
            }),
        };

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = retry_delay(self.retry_backoff, attempt);
                tracing::warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying completion request"
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.request_builder().json(&body).send().await {
                Ok(response) => response,
                Err(err) => {
                    last_error = Some(LlmError::Http(err));
                    continue;
                }
            };

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                tracing::warn!(status = status.as_u16(), "Completion endpoint throttled or failed");
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                    .map(|envelope| envelope.error.message)
                    .unwrap_or(body);
                tracing::error!(status = status.as_u16(), %message, "Completion request failed");
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let payload: ChatResponse = response.json().await?;
            if let Some(usage) = payload.usage {
                self.usage
                    .add_usage(&self.model, usage.prompt_tokens, usage.completion_tokens);
            }
            let content = payload
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .filter(|content| !content.trim().is_empty())
                .ok_or(LlmError::EmptyContent)?;
            tracing::debug!(model = %self.model, chars = content.len(), "Completion received");
            return Ok(content);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited))
    }
}

/// Exponential backoff before retry number `attempt` (1-based), capped at 64x the base.
fn retry_delay(base: Duration, attempt: u32) -> Duration {
    let doublings = attempt.saturating_sub(1).min(MAX_BACKOFF_DOUBLINGS);
    base.saturating_mul(1 << doublings)
}

fn completions_url(
    provider: LlmProvider,
    endpoint: &str,
    deployment: &str,
    api_version: &str,
) -> Result<String, LlmError> {
    let mut base =
        reqwest::Url::parse(endpoint).map_err(|err| LlmError::InvalidUrl(err.to_string()))?;
    let path = base.path().trim_end_matches('/').to_string();
    base.set_path(&path);
    let base = base.as_str().trim_end_matches('/').to_string();

    Ok(match provider {
        LlmProvider::Azure => format!(
            "{base}/openai/deployments/{deployment}/chat/completions?api-version={api_version}"
        ),
        LlmProvider::OpenAI if base.ends_with("/v1") => format!("{base}/chat/completions"),
        LlmProvider::OpenAI => format!("{base}/v1/chat/completions"),
    })
}
