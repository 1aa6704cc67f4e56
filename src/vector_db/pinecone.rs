//! Pinecone serverless index over the REST API
//!
//! The control plane (`api.pinecone.io`) lists, describes and creates
//! indexes. Each index has its own data-plane host, resolved once from the
//! control plane and cached for the life of the store.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::{
    IndexSpec, RetrievedPassage, VectorRecord, VectorStore, CHUNK_KEY, SOURCE_KEY, TEXT_KEY,
};
use crate::errors::{MedQueryError, Result};

const API_VERSION: &str = "2024-07";
const READY_POLL_INTERVAL: Duration = Duration::from_secs(2);
const READY_POLL_ATTEMPTS: u32 = 30;

/// Knowledge base stored in a Pinecone serverless index
pub struct PineconeStore {
    client: Client,
    api_key: String,
    index_name: String,
    control_url: String,
    host: OnceCell<String>,
}

#[derive(Debug, Deserialize)]
struct IndexList {
    #[serde(default)]
    indexes: Vec<IndexDescription>,
}

#[derive(Debug, Deserialize)]
struct IndexDescription {
    name: String,
    #[serde(default)]
    host: String,
    #[serde(default)]
    status: Option<IndexStatus>,
}

#[derive(Debug, Deserialize)]
struct IndexStatus {
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

#[derive(Debug, Deserialize)]
struct QueryMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: HashMap<String, JsonValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    total_vector_count: u64,
}

impl PineconeStore {
    pub fn new(api_key: &str, index_name: &str, control_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.to_string(),
            index_name: index_name.to_string(),
            control_url: control_url.trim_end_matches('/').to_string(),
            host: OnceCell::new(),
        }
    }

    fn authed(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
    }

    async fn list_indexes(&self) -> Result<Vec<IndexDescription>> {
        let url = format!("{}/indexes", self.control_url);
        let response = self.authed(self.client.get(&url)).send().await?;
        let list: IndexList = check_status(response, "list indexes").await?.json().await?;
        Ok(list.indexes)
    }

    async fn describe_index(&self, name: &str) -> Result<Option<IndexDescription>> {
        let url = format!("{}/indexes/{}", self.control_url, name);
        let response = self.authed(self.client.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let description = check_status(response, "describe index").await?.json().await?;
        Ok(Some(description))
    }

    async fn create_index(&self, spec: &IndexSpec) -> Result<()> {
        let url = format!("{}/indexes", self.control_url);
        let body = json!({
            "name": spec.name,
            "dimension": spec.dimension,
            "metric": spec.metric,
            "spec": {
                "serverless": { "cloud": spec.cloud, "region": spec.region }
            }
        });
        let response = self.authed(self.client.post(&url)).json(&body).send().await?;
        check_status(response, "create index").await?;
        Ok(())
    }

    /// Poll until a freshly created index reports ready
    async fn wait_until_ready(&self, name: &str) -> Result<()> {
        for _ in 0..READY_POLL_ATTEMPTS {
            if let Some(description) = self.describe_index(name).await? {
                if description.status.map(|s| s.ready).unwrap_or(false) {
                    return Ok(());
                }
            }
            tokio::time::sleep(READY_POLL_INTERVAL).await;
        }
        Err(MedQueryError::Timeout {
            duration_ms: (READY_POLL_INTERVAL * READY_POLL_ATTEMPTS).as_millis() as u64,
        })
    }

    /// Data-plane base URL, looked up on first use
    async fn data_url(&self) -> Result<&str> {
        let host = self
            .host
            .get_or_try_init(|| async {
                let description = self.describe_index(&self.index_name).await?.ok_or_else(|| {
                    MedQueryError::VectorStoreError(format!(
                        "Index '{}' does not exist; run `medquery ingest` first",
                        self.index_name
                    ))
                })?;
                if description.host.is_empty() {
                    return Err(MedQueryError::VectorStoreError(format!(
                        "Index '{}' has no data-plane host yet",
                        description.name
                    )));
                }
                tracing::debug!(index = %description.name, host = %description.host, "resolved index host");
                Ok(data_plane_url(&description.host))
            })
            .await?;
        Ok(host.as_str())
    }
}

#[async_trait]
impl VectorStore for PineconeStore {
    async fn ensure_index(&self, spec: &IndexSpec) -> Result<bool> {
        let existing = self.list_indexes().await?;
        if existing.iter().any(|index| index.name == spec.name) {
            tracing::debug!(index = %spec.name, "index already exists");
            return Ok(false);
        }

        self.create_index(spec).await?;
        tracing::info!(index = %spec.name, dimension = spec.dimension, metric = %spec.metric, "created index");
        self.wait_until_ready(&spec.name).await?;
        Ok(true)
    }

    async fn connect_existing(&self) -> Result<()> {
        self.data_url().await.map(|_| ())
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let vectors: Vec<JsonValue> = records
            .iter()
            .map(|record| {
                json!({
                    "id": record.id,
                    "values": record.values,
                    "metadata": {
                        TEXT_KEY: record.text,
                        SOURCE_KEY: record.source,
                        CHUNK_KEY: record.chunk,
                    }
                })
            })
            .collect();

        let url = format!("{}/vectors/upsert", self.data_url().await?);
        let response = self
            .authed(self.client.post(&url))
            .json(&json!({ "vectors": vectors }))
            .send()
            .await?;
        let result: UpsertResponse = check_status(response, "upsert").await?.json().await?;
        Ok(result.upserted_count)
    }

    async fn similarity_search(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedPassage>> {
        let url = format!("{}/query", self.data_url().await?);
        let body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });
        let response = self.authed(self.client.post(&url)).json(&body).send().await?;
        let result: QueryResponse = check_status(response, "query").await?.json().await?;

        Ok(result.matches.into_iter().map(passage_from_match).collect())
    }

    async fn vector_count(&self) -> Result<u64> {
        let url = format!("{}/describe_index_stats", self.data_url().await?);
        let response = self.authed(self.client.post(&url)).json(&json!({})).send().await?;
        let stats: IndexStats = check_status(response, "describe index stats").await?.json().await?;
        Ok(stats.total_vector_count)
    }

    fn backend_name(&self) -> &'static str {
        "pinecone"
    }
}

async fn check_status(response: reqwest::Response, operation: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(MedQueryError::VectorStoreError(format!(
        "Pinecone {} failed ({}): {}",
        operation,
        status,
        body.trim()
    )))
}

fn data_plane_url(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", host.trim_end_matches('/'))
    }
}

fn passage_from_match(m: QueryMatch) -> RetrievedPassage {
    let text = m
        .metadata
        .get(TEXT_KEY)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let source = m
        .metadata
        .get(SOURCE_KEY)
        .and_then(|v| v.as_str())
        .map(str::to_string);

    RetrievedPassage {
        id: m.id,
        text,
        score: m.score,
        source,
    }
}
