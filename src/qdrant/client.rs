//! HTTP client for the job collection in Qdrant.

use crate::config::Config;
use crate::qdrant::payload::search_scope_filter;
use crate::qdrant::types::{CollectionsEnvelope, JobHit, JobPoint, QdrantError, QueryEnvelope};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::json;

/// Payload fields indexed for filtering.
const KEYWORD_INDEXES: [&str; 3] = ["search_id", "job_id", "company"];

/// Thin REST client over the Qdrant endpoints the matcher needs.
pub struct QdrantService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
}

impl QdrantService {
    /// Build a client from an explicit configuration.
    pub fn from_config(config: &Config) -> Result<Self, QdrantError> {
        let parsed = reqwest::Url::parse(&config.qdrant_url)
            .map_err(|err| QdrantError::InvalidUrl(err.to_string()))?;
        let base_url = parsed.as_str().trim_end_matches('/').to_string();
        let client = Client::builder()
            .user_agent(concat!("careerlens/", env!("CARGO_PKG_VERSION")))
            .build()?;

        tracing::debug!(
            url = %base_url,
            has_api_key = config.qdrant_api_key.as_deref().is_some_and(|key| !key.is_empty()),
            "Initialized Qdrant HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.qdrant_api_key.clone(),
        })
    }

    /// Make sure the job collection exists with cosine distance and keyword indexes.
    ///
    /// An existing collection is left untouched; index creation failures are logged only.
    pub async fn ensure_job_collection(
        &self,
        collection: &str,
        vector_size: u64,
    ) -> Result<(), QdrantError> {
        let probe = self
            .request(Method::GET, &format!("collections/{collection}"))
            .send()
            .await?;
        match probe.status() {
            StatusCode::OK => {
                tracing::debug!(collection, "Job collection present");
            }
            StatusCode::NOT_FOUND => {
                tracing::info!(collection, vector_size, "Creating job collection");
                let response = self
                    .request(Method::PUT, &format!("collections/{collection}"))
                    .json(&json!({ "vectors": { "size": vector_size, "distance": "Cosine" } }))
                    .send()
                    .await?;
                expect_success(response, "create collection").await?;
            }
            _ => {
                expect_success(probe, "collection lookup").await?;
            }
        }

        for field in KEYWORD_INDEXES {
            let response = self
                .request(Method::PUT, &format!("collections/{collection}/index"))
                .json(&json!({ "field_name": field, "field_schema": "keyword" }))
                .send()
                .await?;
            let status = response.status();
            if !status.is_success() && status != StatusCode::CONFLICT {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(
                    collection,
                    field,
                    %status,
                    body = %body,
                    "Payload index not created"
                );
            }
        }
        Ok(())
    }

    /// Write job points and wait until Qdrant has applied them.
    pub async fn upsert_jobs(
        &self,
        collection: &str,
        points: Vec<JobPoint>,
    ) -> Result<usize, QdrantError> {
        if points.is_empty() {
            return Ok(0);
        }
        let count = points.len();
        let points: Vec<_> = points
            .into_iter()
            .map(|point| {
                json!({ "id": point.id, "vector": point.vector, "payload": point.payload })
            })
            .collect();

        let response = self
            .request(Method::PUT, &format!("collections/{collection}/points"))
            .query(&[("wait", true)])
            .json(&json!({ "points": points }))
            .send()
            .await?;
        expect_success(response, "upsert").await?;

        tracing::debug!(collection, points = count, "Job points upserted");
        Ok(count)
    }

    /// Nearest postings to `vector` among those written by `search_id`.
    ///
    /// Points without a `job_id` payload are skipped.
    pub async fn query_search_run(
        &self,
        collection: &str,
        vector: Vec<f32>,
        search_id: &str,
        limit: usize,
    ) -> Result<Vec<JobHit>, QdrantError> {
        let response = self
            .request(Method::POST, &format!("collections/{collection}/points/query"))
            .json(&json!({
                "query": vector,
                "limit": limit,
                "with_payload": ["job_id"],
                "filter": search_scope_filter(search_id),
            }))
            .send()
            .await?;
        let envelope: QueryEnvelope = expect_success(response, "query").await?.json().await?;

        let hits: Vec<JobHit> = envelope
            .result
            .into_points()
            .into_iter()
            .filter_map(|point| {
                let job_id = point.payload?.job_id?;
                Some(JobHit {
                    job_id,
                    score: point.score,
                })
            })
            .collect();
        tracing::debug!(collection, search_id, hits = hits.len(), "Vector query finished");
        Ok(hits)
    }

    /// Names of every collection, used as the reachability probe.
    pub async fn collection_names(&self) -> Result<Vec<String>, QdrantError> {
        let response = self.request(Method::GET, "collections").send().await?;
        let envelope: CollectionsEnvelope = expect_success(response, "list collections")
            .await?
            .json()
            .await?;
        Ok(envelope
            .result
            .collections
            .into_iter()
            .map(|collection| collection.name)
            .collect())
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.client.request(method, url);
        match self.api_key.as_deref().filter(|key| !key.is_empty()) {
            Some(key) => builder.header("api-key", key),
            None => builder,
        }
    }
}

async fn expect_success(
    response: Response,
    operation: &'static str,
) -> Result<Response, QdrantError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let error = QdrantError::UnexpectedStatus {
        operation,
        status,
        body,
    };
    tracing::error!(error = %error, "Qdrant request failed");
    Err(error)
}
