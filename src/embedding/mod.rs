//! Embedding providers used to vectorise resumes and job postings.

use crate::config::{Config, EmbeddingProvider, get_config};
use crate::usage::TokenUsageTracker;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Placeholder sent for blank inputs, which providers reject.
const EMPTY_INPUT: &str = "empty";

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Endpoint URL could not be parsed.
    #[error("Invalid embedding endpoint: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("Embedding request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Provider responded with a non-success status.
    #[error("Unexpected embedding response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned by the provider.
        status: StatusCode,
        /// Response body.
        body: String,
    },
    /// Returned vectors do not match the configured dimension.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Configured dimension.
        expected: usize,
        /// Dimension returned by the provider.
        actual: usize,
    },
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient {
    /// Produce an embedding vector for each supplied text, in input order.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;

    /// Dimensionality of the vectors this client produces.
    fn dimension(&self) -> usize;
}

/// Azure OpenAI / OpenAI embeddings client that batches requests.
pub struct HttpEmbeddingClient {
    pub(crate) client: Client,
    pub(crate) url: String,
    pub(crate) provider: EmbeddingProvider,
    pub(crate) model: String,
    pub(crate) api_key: Option<String>,
    pub(crate) dimension: usize,
    pub(crate) batch_size: usize,
    pub(crate) batch_delay: Duration,
    pub(crate) usage: Arc<TokenUsageTracker>,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
    #[serde(default)]
    usage: Option<EmbeddingUsage>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[derive(Deserialize)]
struct EmbeddingUsage {
    #[serde(default)]
    prompt_tokens: u64,
}

impl HttpEmbeddingClient {
    /// Build a client from an explicit configuration.
    pub fn from_config(
        config: &Config,
        usage: Arc<TokenUsageTracker>,
    ) -> Result<Self, EmbeddingClientError> {
        let client = Client::builder()
            .user_agent(concat!("careerlens/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()?;
        let url = embeddings_url(
            config.embedding_provider,
            &config.embedding_endpoint,
            &config.embedding_model,
            &config.llm_api_version,
        )?;

        Ok(Self {
            client,
            url,
            provider: config.embedding_provider,
            model: config.embedding_model.clone(),
            api_key: config.embedding_api_key.clone(),
            dimension: config.embedding_dimension,
            batch_size: config.embedding_batch_size.max(1),
            batch_delay: config.embedding_batch_delay,
            usage,
        })
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        let body = EmbeddingRequest {
            input: batch,
            model: match self.provider {
                EmbeddingProvider::OpenAI => Some(self.model.as_str()),
                _ => None,
            },
        };
        let mut request = self.client.post(&self.url).json(&body);
        if let Some(key) = &self.api_key {
            request = match self.provider {
                EmbeddingProvider::OpenAI => request.bearer_auth(key),
                _ => request.header("api-key", key),
            };
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = EmbeddingClientError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Embedding request failed");
            return Err(error);
        }

        let mut payload: EmbeddingResponse = response.json().await?;
        if payload.data.len() != batch.len() {
            return Err(EmbeddingClientError::GenerationFailed(format!(
                "expected {} vectors, received {}",
                batch.len(),
                payload.data.len()
            )));
        }
        if let Some(usage) = payload.usage {
            if self.model.to_lowercase().contains("embedding") {
                self.usage.add_usage(&self.model, usage.prompt_tokens, 0);
            } else {
                self.usage.add_embedding_tokens(usage.prompt_tokens);
            }
        }

        payload.data.sort_by_key(|datum| datum.index);
        payload
            .data
            .into_iter()
            .map(|datum| {
                if datum.embedding.len() == self.dimension {
                    Ok(datum.embedding)
                } else {
                    Err(EmbeddingClientError::DimensionMismatch {
                        expected: self.dimension,
                        actual: datum.embedding.len(),
                    })
                }
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        let inputs: Vec<String> = texts
            .into_iter()
            .map(|text| {
                if text.trim().is_empty() {
                    EMPTY_INPUT.to_string()
                } else {
                    text
                }
            })
            .collect();

        let mut vectors = Vec::with_capacity(inputs.len());
        for (index, batch) in inputs.chunks(self.batch_size).enumerate() {
            if index > 0 && !self.batch_delay.is_zero() {
                tokio::time::sleep(self.batch_delay).await;
            }
            tracing::debug!(
                batch = index,
                size = batch.len(),
                model = %self.model,
                "Embedding batch"
            );
            vectors.extend(self.embed_batch(batch).await?);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Deterministic offline embedding client that hashes bytes into vector slots.
pub struct HashEmbeddingClient {
    dimension: usize,
}

impl HashEmbeddingClient {
    /// Construct a hashing client producing vectors of `dimension` floats.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn encode(text: &str, dimension: usize) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; dimension];

        for (idx, byte) in text.to_lowercase().bytes().enumerate() {
            let position = (idx + usize::from(byte)) % dimension;
            embedding[position] += f32::from(byte) / 255.0;
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();

        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

#[async_trait]
impl EmbeddingClient for HashEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        Ok(texts
            .iter()
            .map(|text| {
                let text = if text.trim().is_empty() { EMPTY_INPUT } else { text };
                Self::encode(text, self.dimension)
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Build an embedding client suitable for the current configuration.
pub fn get_embedding_client(
    usage: Arc<TokenUsageTracker>,
) -> Result<Box<dyn EmbeddingClient + Send + Sync>, EmbeddingClientError> {
    let config = get_config();
    tracing::debug!(
        provider = ?config.embedding_provider,
        model = %config.embedding_model,
        dimension = config.embedding_dimension,
        "Selecting embedding client"
    );
    Ok(match config.embedding_provider {
        EmbeddingProvider::Hash => Box::new(HashEmbeddingClient::new(config.embedding_dimension)),
        EmbeddingProvider::Azure | EmbeddingProvider::OpenAI => {
            Box::new(HttpEmbeddingClient::from_config(config, usage)?)
        }
    })
}

fn embeddings_url(
    provider: EmbeddingProvider,
    endpoint: &str,
    model: &str,
    api_version: &str,
) -> Result<String, EmbeddingClientError> {
    let parsed = reqwest::Url::parse(endpoint)
        .map_err(|err| EmbeddingClientError::InvalidUrl(err.to_string()))?;
    let base = parsed.as_str().trim_end_matches('/');
    Ok(match provider {
        EmbeddingProvider::OpenAI if base.ends_with("/v1") => format!("{base}/embeddings"),
        EmbeddingProvider::OpenAI => format!("{base}/v1/embeddings"),
        _ => format!("{base}/openai/deployments/{model}/embeddings?api-version={api_version}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    fn http_client(server: &MockServer) -> HttpEmbeddingClient {
        let mut config = test_config(&server.base_url());
        config.embedding_provider = EmbeddingProvider::Azure;
        config.embedding_dimension = 2;
        HttpEmbeddingClient::from_config(&config, Arc::new(TokenUsageTracker::new()))
            .expect("client")
    }

    #[tokio::test]
    async fn batches_requests_and_orders_by_index() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/openai/deployments/text-embedding-test/embeddings")
                    .header("api-key", "test-key");
                then.status(200).json_body(json!({
                    "data": [
                        { "embedding": [0.0, 1.0], "index": 1 },
                        { "embedding": [1.0, 0.0], "index": 0 }
                    ],
                    "usage": { "prompt_tokens": 12, "total_tokens": 12 }
                }));
            })
            .await;

        let mut client = http_client(&server);
        client.batch_size = 2;
        let vectors = client
            .generate_embeddings(vec!["a".into(), "b".into(), "c".into(), "d".into()])
            .await
            .expect("vectors");

        mock.assert_hits_async(2).await;
        assert_eq!(vectors.len(), 4);
        assert_eq!(vectors[0], vec![1.0, 0.0]);
        assert_eq!(vectors[1], vec![0.0, 1.0]);
        assert_eq!(client.usage.summary().embedding_tokens, 24);
    }

    #[tokio::test]
    async fn blank_inputs_are_replaced() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).json_body_partial(r#"{"input": ["empty"]}"#);
                then.status(200)
                    .json_body(json!({ "data": [{ "embedding": [0.5, 0.5], "index": 0 }] }));
            })
            .await;

        let client = http_client(&server);
        client
            .generate_embeddings(vec!["   ".into()])
            .await
            .expect("vectors");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn dimension_mismatch_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200)
                    .json_body(json!({ "data": [{ "embedding": [0.1, 0.2, 0.3], "index": 0 }] }));
            })
            .await;

        let err = http_client(&server)
            .generate_embeddings(vec!["text".into()])
            .await
            .expect_err("mismatch");
        assert!(matches!(
            err,
            EmbeddingClientError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[tokio::test]
    async fn hash_client_is_deterministic_and_normalized() {
        let client = HashEmbeddingClient::new(16);
        let first = client
            .generate_embeddings(vec!["Rust engineer".into(), "".into()])
            .await
            .expect("vectors");
        let second = client
            .generate_embeddings(vec!["rust ENGINEER".into()])
            .await
            .expect("vectors");

        assert_eq!(first[0], second[0]);
        let norm: f32 = first[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!(first[1].iter().any(|v| *v > 0.0));
    }
}
