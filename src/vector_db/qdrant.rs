// Qdrant backend for the knowledge-base index
use async_trait::async_trait;
use qdrant_client::qdrant::{
    point_id::PointIdOptions, value::Kind, CreateCollectionBuilder, Distance, PointId,
    PointStruct, SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue,
    VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use std::collections::HashMap;

use super::{
    IndexSpec, RetrievedPassage, VectorRecord, VectorStore, CHUNK_KEY, SOURCE_KEY, TEXT_KEY,
};
use crate::errors::{MedQueryError, Result};

/// Knowledge base stored in a Qdrant collection
pub struct QdrantStore {
    client: Qdrant,
    collection: String,
}

impl QdrantStore {
    pub fn new(url: &str, api_key: Option<String>, collection: &str) -> Result<Self> {
        let client = Qdrant::from_url(url).api_key(api_key).build()?;
        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_index(&self, spec: &IndexSpec) -> Result<bool> {
        if self.client.collection_exists(&spec.name).await? {
            tracing::debug!(collection = %spec.name, "collection already exists");
            return Ok(false);
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&spec.name).vectors_config(VectorParamsBuilder::new(
                    spec.dimension as u64,
                    distance_for(&spec.metric)?,
                )),
            )
            .await?;

        tracing::info!(collection = %spec.name, dimension = spec.dimension, "created collection");
        Ok(true)
    }

    async fn connect_existing(&self) -> Result<()> {
        if self.client.collection_exists(&self.collection).await? {
            Ok(())
        } else {
            Err(MedQueryError::VectorStoreError(format!(
                "Collection '{}' does not exist; run `medquery ingest` first",
                self.collection
            )))
        }
    }

    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let points: Vec<PointStruct> = records
            .iter()
            .map(|record| {
                let mut payload = HashMap::new();
                payload.insert(TEXT_KEY.to_string(), QdrantValue::from(record.text.clone()));
                payload.insert(SOURCE_KEY.to_string(), QdrantValue::from(record.source.clone()));
                payload.insert(CHUNK_KEY.to_string(), QdrantValue::from(record.chunk as i64));
                PointStruct::new(record.id.clone(), record.values.clone(), payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await?;

        Ok(records.len())
    }

    async fn similarity_search(&self, vector: &[f32], top_k: usize) -> Result<Vec<RetrievedPassage>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, vector.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await?;

        Ok(response
            .result
            .into_iter()
            .map(|point| RetrievedPassage {
                id: point_id_to_string(&point.id),
                text: point
                    .payload
                    .get(TEXT_KEY)
                    .and_then(string_value)
                    .unwrap_or_default(),
                source: point.payload.get(SOURCE_KEY).and_then(string_value),
                score: point.score,
            })
            .collect())
    }

    async fn vector_count(&self) -> Result<u64> {
        let info = self.client.collection_info(&self.collection).await?;
        Ok(info.result.and_then(|r| r.points_count).unwrap_or(0))
    }

    fn backend_name(&self) -> &'static str {
        "qdrant"
    }
}

fn distance_for(metric: &str) -> Result<Distance> {
    match metric {
        "cosine" => Ok(Distance::Cosine),
        "euclidean" => Ok(Distance::Euclid),
        "dotproduct" => Ok(Distance::Dot),
        other => Err(MedQueryError::ConfigError(format!(
            "Unsupported metric for qdrant: {}",
            other
        ))),
    }
}

fn string_value(value: &QdrantValue) -> Option<String> {
    match value.kind.as_ref()? {
        Kind::StringValue(s) => Some(s.clone()),
        Kind::IntegerValue(i) => Some(i.to_string()),
        _ => None,
    }
}

fn point_id_to_string(point_id: &Option<PointId>) -> String {
    match point_id.as_ref().and_then(|id| id.point_id_options.as_ref()) {
        Some(PointIdOptions::Num(n)) => n.to_string(),
        Some(PointIdOptions::Uuid(u)) => u.clone(),
        None => "unknown".to_string(),
    }
}
