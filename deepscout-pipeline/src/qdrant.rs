//! Qdrant vector index adapter
//!
//! Implements the `VectorIndex` capability over Qdrant's REST API. Each
//! stored point carries the chunk embedding and a payload merging `content`
//! with the document's metadata map; search splits `content` back out of the
//! payload. Collections use the cosine distance and are created lazily on
//! first write.

use async_trait::async_trait;
use deepscout_core::{
    Document, ErrorContext, ScoutError, ScoutResult, SearchResult, VectorIndex,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

/// Vector index backed by a Qdrant server
pub struct QdrantIndex {
    client: reqwest::Client,
    base_url: String,
    vector_size: usize,
}

#[derive(Debug, Serialize)]
struct PointStruct {
    id: String,
    vector: Vec<f32>,
    payload: Value,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    id: Value,
    score: f32,
    #[serde(default)]
    payload: Option<Value>,
}

impl QdrantIndex {
    /// Create a new index client for the given endpoint.
    ///
    /// `vector_size` must match the embedding provider's dimension; it is
    /// used when a collection is first created.
    pub fn new(base_url: impl Into<String>, vector_size: usize) -> Self {
        let base_url = base_url.into();
        info!("Created Qdrant index client for {}", base_url);
        Self {
            client: reqwest::Client::new(),
            base_url,
            vector_size,
        }
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/collections/{}",
            self.base_url.trim_end_matches('/'),
            collection
        )
    }

    fn network_error(e: reqwest::Error, operation: &str) -> ScoutError {
        ScoutError::Network {
            message: format!("Qdrant request failed: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("qdrant").with_operation(operation),
        }
    }

    async fn store_error(
        response: reqwest::Response,
        collection: &str,
        operation: &str,
    ) -> ScoutError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        ScoutError::VectorStore {
            message: format!("Qdrant returned {}: {}", status, body),
            collection: Some(collection.to_string()),
            source: None,
            context: ErrorContext::new("qdrant").with_operation(operation),
        }
    }

    /// Qdrant only accepts integer or UUID point ids, so document ids map to
    /// deterministic UUIDs and the original id travels in the payload
    fn point_id(document_id: &str) -> String {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, document_id.as_bytes()).to_string()
    }

    /// Build upsert points, embedding the payload contract: `content` merged
    /// with the metadata map
    fn build_points(documents: &[Document]) -> ScoutResult<Vec<PointStruct>> {
        documents
            .iter()
            .map(|doc| {
                let vector = doc.vector.clone().ok_or_else(|| ScoutError::VectorStore {
                    message: format!("Document {} has no vector to index", doc.id),
                    collection: None,
                    source: None,
                    context: ErrorContext::new("qdrant").with_operation("build_points"),
                })?;

                let mut payload = serde_json::Map::new();
                payload.insert("content".to_string(), Value::String(doc.content.clone()));
                payload.insert("document_id".to_string(), Value::String(doc.id.clone()));
                for (key, value) in &doc.metadata {
                    payload.insert(key.clone(), Value::String(value.clone()));
                }

                Ok(PointStruct {
                    id: Self::point_id(&doc.id),
                    vector,
                    payload: Value::Object(payload),
                })
            })
            .collect()
    }

    /// Split a scored point back into a document: `content` and the original
    /// document id come out of the payload, everything else becomes metadata
    fn hit_to_result(hit: ScoredPoint) -> SearchResult {
        let mut metadata = HashMap::new();
        let mut content = String::new();
        let mut document_id = None;

        if let Some(Value::Object(payload)) = hit.payload {
            for (key, value) in payload {
                match key.as_str() {
                    "content" => {
                        if let Value::String(text) = value {
                            content = text;
                        }
                    }
                    "document_id" => {
                        if let Value::String(id) = value {
                            document_id = Some(id);
                        }
                    }
                    _ => {
                        let rendered = match value {
                            Value::String(s) => s,
                            other => other.to_string(),
                        };
                        metadata.insert(key, rendered);
                    }
                }
            }
        }

        let id = document_id.unwrap_or_else(|| match hit.id {
            Value::String(s) => s,
            other => other.to_string(),
        });

        SearchResult {
            document: Document {
                id,
                content,
                metadata,
                vector: None,
            },
            score: hit.score,
        }
    }

    fn build_filter(filters: Option<&HashMap<String, String>>) -> Option<Value> {
        let filters = filters?;
        if filters.is_empty() {
            return None;
        }
        let must: Vec<Value> = filters
            .iter()
            .map(|(key, value)| json!({ "key": key, "match": { "value": value } }))
            .collect();
        Some(json!({ "must": must }))
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self, name: &str) -> ScoutResult<()> {
        let url = self.collection_url(name);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::network_error(e, "ensure_collection"))?;

        if response.status().is_success() {
            return Ok(());
        }

        debug!("Creating Qdrant collection {}", name);
        let body = json!({
            "vectors": { "size": self.vector_size, "distance": "Cosine" }
        });

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::network_error(e, "ensure_collection"))?;

        // A concurrent writer may have created it between the two calls
        if response.status().is_success() || response.status() == reqwest::StatusCode::CONFLICT {
            Ok(())
        } else {
            Err(Self::store_error(response, name, "ensure_collection").await)
        }
    }

    async fn upsert(&self, documents: &[Document], collection: &str) -> ScoutResult<()> {
        if documents.is_empty() {
            return Ok(());
        }

        self.ensure_collection(collection).await?;

        let points = Self::build_points(documents)?;
        let url = format!("{}/points?wait=true", self.collection_url(collection));

        let response = self
            .client
            .put(&url)
            .json(&json!({ "points": points }))
            .send()
            .await
            .map_err(|e| Self::network_error(e, "upsert"))?;

        if response.status().is_success() {
            debug!(
                "Upserted {} points into collection {}",
                documents.len(),
                collection
            );
            Ok(())
        } else {
            Err(Self::store_error(response, collection, "upsert").await)
        }
    }

    async fn similarity_search(
        &self,
        vector: &[f32],
        collection: &str,
        top_k: usize,
        filters: Option<&HashMap<String, String>>,
    ) -> ScoutResult<Vec<SearchResult>> {
        let url = format!("{}/points/search", self.collection_url(collection));

        let mut body = json!({
            "vector": vector,
            "limit": top_k,
            "with_payload": true,
        });
        if let Some(filter) = Self::build_filter(filters) {
            body["filter"] = filter;
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| Self::network_error(e, "similarity_search"))?;

        if !response.status().is_success() {
            return Err(Self::store_error(response, collection, "similarity_search").await);
        }

        let parsed: SearchResponse =
            response.json().await.map_err(|e| ScoutError::VectorStore {
                message: format!("Failed to parse search response: {}", e),
                collection: Some(collection.to_string()),
                source: Some(Box::new(e)),
                context: ErrorContext::new("qdrant").with_operation("similarity_search"),
            })?;

        Ok(parsed.result.into_iter().map(Self::hit_to_result).collect())
    }

    async fn delete(&self, id: &str, collection: &str) -> ScoutResult<()> {
        let url = format!("{}/points/delete?wait=true", self.collection_url(collection));

        let response = self
            .client
            .post(&url)
            .json(&json!({ "points": [Self::point_id(id)] }))
            .send()
            .await
            .map_err(|e| Self::network_error(e, "delete"))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::store_error(response, collection, "delete").await)
        }
    }
}
