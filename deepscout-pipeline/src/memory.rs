//! In-memory vector index
//!
//! Brute-force cosine similarity over per-collection document maps. Useful
//! for tests and small local runs where a Qdrant server is not available.

use async_trait::async_trait;
use deepscout_core::{
    Document, ErrorContext, ScoutError, ScoutResult, SearchResult, VectorIndex,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Vector index that keeps everything in process memory
pub struct InMemoryIndex {
    collections: RwLock<HashMap<String, HashMap<String, Document>>>,
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents currently stored in a collection
    pub async fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, HashMap::len)
    }
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

fn matches_filters(document: &Document, filters: Option<&HashMap<String, String>>) -> bool {
    match filters {
        None => true,
        Some(filters) => filters
            .iter()
            .all(|(key, value)| document.metadata.get(key) == Some(value)),
    }
}

#[async_trait]
impl VectorIndex for InMemoryIndex {
    async fn ensure_collection(&self, name: &str) -> ScoutResult<()> {
        self.collections
            .write()
            .await
            .entry(name.to_string())
            .or_default();
        Ok(())
    }

    async fn upsert(&self, documents: &[Document], collection: &str) -> ScoutResult<()> {
        for doc in documents {
            if doc.vector.is_none() {
                return Err(ScoutError::VectorStore {
                    message: format!("Document {} has no vector to index", doc.id),
                    collection: Some(collection.to_string()),
                    source: None,
                    context: ErrorContext::new("memory_index").with_operation("upsert"),
                });
            }
        }

        let mut collections = self.collections.write().await;
        let entries = collections.entry(collection.to_string()).or_default();
        for doc in documents {
            entries.insert(doc.id.clone(), doc.clone());
        }
        Ok(())
    }

    async fn similarity_search(
        &self,
        vector: &[f32],
        collection: &str,
        top_k: usize,
        filters: Option<&HashMap<String, String>>,
    ) -> ScoutResult<Vec<SearchResult>> {
        let collections = self.collections.read().await;
        let entries = match collections.get(collection) {
            Some(entries) => entries,
            None => return Ok(Vec::new()),
        };

        let mut scored: Vec<SearchResult> = entries
            .values()
            .filter(|doc| matches_filters(doc, filters))
            .filter_map(|doc| {
                let doc_vector = doc.vector.as_ref()?;
                Some(SearchResult {
                    score: cosine_similarity(vector, doc_vector),
                    document: doc.clone(),
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete(&self, id: &str, collection: &str) -> ScoutResult<()> {
        let mut collections = self.collections.write().await;
        if let Some(entries) = collections.get_mut(collection) {
            entries.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, vector: Vec<f32>) -> Document {
        Document::new(id, format!("content of {}", id)).with_vector(vector)
    }

    #[test]
    fn cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn search_orders_by_score_and_caps() {
        let index = InMemoryIndex::new();
        index
            .upsert(
                &[
                    doc("far", vec![0.0, 1.0]),
                    doc("near", vec![1.0, 0.0]),
                    doc("mid", vec![1.0, 1.0]),
                ],
                "papers",
            )
            .await
            .unwrap();

        let results = index
            .similarity_search(&[1.0, 0.0], "papers", 2, None)
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.id, "near");
        assert_eq!(results[1].document.id, "mid");
    }

    #[tokio::test]
    async fn search_applies_metadata_filters() {
        let index = InMemoryIndex::new();
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), "arxiv".to_string());

        index
            .upsert(
                &[
                    Document::new("a", "x")
                        .with_metadata(metadata)
                        .with_vector(vec![1.0, 0.0]),
                    doc("b", vec![1.0, 0.0]),
                ],
                "papers",
            )
            .await
            .unwrap();

        let mut filters = HashMap::new();
        filters.insert("source".to_string(), "arxiv".to_string());
        let results = index
            .similarity_search(&[1.0, 0.0], "papers", 10, Some(&filters))
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, "a");
    }

    #[tokio::test]
    async fn search_on_missing_collection_is_empty() {
        let index = InMemoryIndex::new();
        let results = index
            .similarity_search(&[1.0], "nope", 5, None)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_by_id_and_delete_removes() {
        let index = InMemoryIndex::new();
        index.upsert(&[doc("a", vec![1.0])], "c").await.unwrap();
        index.upsert(&[doc("a", vec![0.5])], "c").await.unwrap();
        assert_eq!(index.len("c").await, 1);

        index.delete("a", "c").await.unwrap();
        assert_eq!(index.len("c").await, 0);
    }

    #[tokio::test]
    async fn upsert_rejects_missing_vector() {
        let index = InMemoryIndex::new();
        let result = index.upsert(&[Document::new("a", "x")], "c").await;
        assert!(result.is_err());
    }
}
