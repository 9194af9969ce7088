//! Capability trait definitions
//!
//! External collaborators are modeled as constructor-injected traits so the
//! workflow and pipeline can be exercised against fakes in tests.

use crate::error::ScoutResult;
use crate::types::*;
use async_trait::async_trait;
use std::collections::HashMap;

/// Converts text to fixed-length numeric vectors, singly or batched
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text
    async fn embed(&self, text: &str) -> ScoutResult<Vec<f32>>;

    /// Generate embeddings for multiple texts
    async fn embed_batch(&self, texts: &[String]) -> ScoutResult<Vec<Vec<f32>>>;

    /// Dimension of the vectors this provider produces
    fn dimension(&self) -> usize;
}

/// Per-named-collection vector store supporting upsert and similarity search.
///
/// Collections are created lazily on first write; creation failure surfaces
/// as an error on the triggering write. The canonical parameter order for
/// searches is `vector, collection, top_k, filters`.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Idempotently create a collection with the cosine metric and the
    /// provider's vector size
    async fn ensure_collection(&self, name: &str) -> ScoutResult<()>;

    /// Insert or replace documents in a collection
    async fn upsert(&self, documents: &[Document], collection: &str) -> ScoutResult<()>;

    /// Similarity search, ordered by descending score, capped at `top_k`
    async fn similarity_search(
        &self,
        vector: &[f32],
        collection: &str,
        top_k: usize,
        filters: Option<&HashMap<String, String>>,
    ) -> ScoutResult<Vec<SearchResult>>;

    /// Delete a single point by id
    async fn delete(&self, id: &str, collection: &str) -> ScoutResult<()>;
}

/// Text-generation capability backing classification, planning, paper
/// filtering, and answer synthesis
#[async_trait]
pub trait ResearchModel: Send + Sync {
    /// Categorize a raw user request
    async fn classify(&self, query: &str) -> ScoutResult<Classification>;

    /// Produce a bounded research plan from the extracted intent
    async fn plan(&self, intent: &str) -> ScoutResult<ResearchPlan>;

    /// Select the ids of the most relevant candidate papers for a query,
    /// judging by title and abstract and preferring recent work
    async fn select_papers(
        &self,
        query: &str,
        candidates: &[PaperMeta],
    ) -> ScoutResult<Vec<String>>;

    /// Synthesize a final answer from the aggregated step results
    async fn synthesize(&self, query: &str, results: &[serde_json::Value])
        -> ScoutResult<String>;
}

/// Paper search and fetch capability
#[async_trait]
pub trait PaperSource: Send + Sync {
    /// Search for candidate papers matching a query
    async fn search(&self, query: &str) -> ScoutResult<Vec<PaperMeta>>;

    /// Fetch the full text and metadata of a paper by id
    async fn fetch(&self, id: &str) -> ScoutResult<FetchedPaper>;
}

/// Web-search capability producing structured output
#[async_trait]
pub trait WebSearcher: Send + Sync {
    async fn search(&self, query: &str) -> ScoutResult<serde_json::Value>;
}
