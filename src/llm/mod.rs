//! Chat-completion access for every LLM-backed feature.
//!
//! Resume analysis, interview questions, answer evaluation, and resume tailoring all go through
//! the [`CompletionClient`] trait so tests can substitute scripted responses. JSON-mode helpers
//! tolerate models that wrap their output in markdown fences.

mod client;
pub mod prompts;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use client::ChatCompletionClient;

/// Errors raised by completion backends.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Endpoint URL could not be parsed.
    #[error("Invalid LLM endpoint: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider answered with a non-success status.
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error body or extracted message.
        message: String,
    },
    /// Output could not be decoded as the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
    /// Local request budget is exhausted.
    #[error("Rate limit exceeded; try again shortly")]
    RateLimited,
    /// Provider returned no message content.
    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A single-turn chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System message steering the model.
    pub system: String,
    /// User message.
    pub prompt: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Completion token cap.
    pub max_tokens: u32,
    /// Ask the provider for a JSON object response.
    pub json_mode: bool,
}

impl CompletionRequest {
    /// Request with temperature 0.7, 1000 tokens, and free-text output.
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            temperature: 0.7,
            max_tokens: 1000,
            json_mode: false,
        }
    }

    /// Override the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the completion token cap.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Request a JSON object response.
    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }
}

/// Interface implemented by chat-completion backends.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run the request and return the assistant message text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;
}

/// Run `request` in JSON mode and deserialize the answer into `T`.
pub async fn complete_json<T: DeserializeOwned>(
    client: &dyn CompletionClient,
    request: CompletionRequest,
) -> Result<T, LlmError> {
    let text = client.complete(request.json()).await?;
    let cleaned = strip_json_fences(&text);
    if cleaned.is_empty() {
        return Err(LlmError::EmptyContent);
    }
    Ok(serde_json::from_str(cleaned)?)
}

/// Remove surrounding markdown code fences (```json ... ```) from model output.
pub fn strip_json_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest.trim_start_matches("json"),
    };
    body.trim_end().trim_end_matches("```").trim()
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted completion client shared by unit tests.

    use super::{CompletionClient, CompletionRequest, LlmError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned responses in order and records every request.
    #[derive(Default)]
    pub(crate) struct ScriptedClient {
        responses: Mutex<VecDeque<Result<String, String>>>,
        pub(crate) requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedClient {
        pub(crate) fn new<I, S>(responses: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                responses: Mutex::new(VecDeque::from([Err("boom".to_string())])),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn recorded(&self) -> Vec<CompletionRequest> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedClient {
        async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError> {
            self.requests.lock().unwrap().push(request);
            match self.responses.lock().unwrap().pop_front() {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(LlmError::Api {
                    status: 500,
                    message,
                }),
                None => Err(LlmError::EmptyContent),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::ScriptedClient;
    use super::*;
    use serde::Deserialize;

    #[test]
    fn strips_fenced_json() {
        assert_eq!(strip_json_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_json_fences("```\n{\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_json_fences("  {\"a\":1}  "), "{\"a\":1}");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Score {
        score: u8,
    }

    #[tokio::test]
    async fn complete_json_forces_json_mode_and_parses() {
        let client = ScriptedClient::new(["```json\n{\"score\": 7}\n```"]);
        let parsed: Score = complete_json(&client, CompletionRequest::new("sys", "rate this"))
            .await
            .expect("parsed json");
        assert_eq!(parsed, Score { score: 7 });
        assert!(client.recorded()[0].json_mode);
    }

    #[tokio::test]
    async fn complete_json_surfaces_parse_errors() {
        let client = ScriptedClient::new(["not json"]);
        let result: Result<Score, _> =
            complete_json(&client, CompletionRequest::new("sys", "rate this")).await;
        assert!(matches!(result, Err(LlmError::Parse(_))));
    }
}
