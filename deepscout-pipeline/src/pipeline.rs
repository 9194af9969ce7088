//! Document ingestion and retrieval pipeline
//!
//! Ties normalization, chunking, embedding, and the vector index together.
//! Ingestion is best-effort per chunk and reports a boolean instead of
//! failing the caller; retrieval degrades to an empty result set on error so
//! a broken backend never takes down a research run.

use crate::processing::{chunk, normalize, truncate_chars};
use deepscout_core::{
    Document, EmbeddingProvider, PipelineConfig, ScoutResult, SearchResult, VectorIndex,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Normalize-chunk-embed-index pipeline over injected capabilities
pub struct DocumentPipeline {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    config: PipelineConfig,
}

impl DocumentPipeline {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            embedder,
            index,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Ingest a document into a collection.
    ///
    /// The content is normalized, truncated to `max_length` characters,
    /// chunked, embedded, and upserted chunk by chunk. A failing chunk is
    /// logged and skipped. Returns `true` only if every chunk was stored;
    /// never returns an error.
    pub async fn ingest(
        &self,
        document_id: &str,
        content: &str,
        metadata: &HashMap<String, String>,
        collection: &str,
        max_length: usize,
    ) -> bool {
        match self
            .ingest_chunks(document_id, content, metadata, collection, max_length)
            .await
        {
            Ok(all_stored) => all_stored,
            Err(e) => {
                warn!("Ingestion of document {} failed: {}", document_id, e);
                false
            }
        }
    }

    async fn ingest_chunks(
        &self,
        document_id: &str,
        content: &str,
        metadata: &HashMap<String, String>,
        collection: &str,
        max_length: usize,
    ) -> ScoutResult<bool> {
        let normalized = normalize(content);
        let truncated = truncate_chars(&normalized, max_length);
        if truncated.is_empty() {
            debug!("Document {} is empty after normalization", document_id);
            return Ok(true);
        }

        let chunks = chunk(&truncated, self.config.chunk_size);
        let total = chunks.len();
        let mut stored = 0usize;

        self.index.ensure_collection(collection).await?;

        for (i, text) in chunks.into_iter().enumerate() {
            let chunk_id = format!("{}:{}", document_id, i);
            match self.embed_and_store(&chunk_id, &text, metadata, collection, i).await {
                Ok(()) => stored += 1,
                Err(e) => {
                    warn!(
                        "Chunk {}/{} of document {} failed: {}",
                        i + 1,
                        total,
                        document_id,
                        e
                    );
                }
            }
        }

        info!(
            "Ingested document {} into {}: {}/{} chunks stored",
            document_id, collection, stored, total
        );
        Ok(stored == total)
    }

    async fn embed_and_store(
        &self,
        chunk_id: &str,
        text: &str,
        metadata: &HashMap<String, String>,
        collection: &str,
        chunk_index: usize,
    ) -> ScoutResult<()> {
        let vector = self.embedder.embed(text).await?;

        let mut chunk_metadata = metadata.clone();
        chunk_metadata.insert("chunk_index".to_string(), chunk_index.to_string());

        let document = Document::new(chunk_id, text)
            .with_metadata(chunk_metadata)
            .with_vector(vector);
        self.index.upsert(&[document], collection).await
    }

    /// Similarity search for a query string.
    ///
    /// Any embedding or backend failure is logged and degrades to an empty
    /// result set.
    pub async fn search(
        &self,
        query: &str,
        collection: &str,
        top_k: usize,
        filters: Option<&HashMap<String, String>>,
    ) -> Vec<SearchResult> {
        let vector = match self.embedder.embed(query).await {
            Ok(vector) => vector,
            Err(e) => {
                warn!("Query embedding failed: {}", e);
                return Vec::new();
            }
        };

        match self
            .index
            .similarity_search(&vector, collection, top_k, filters)
            .await
        {
            Ok(results) => {
                debug!(
                    "Search in {} returned {} results for: {}",
                    collection,
                    results.len(),
                    query
                );
                results
            }
            Err(e) => {
                warn!("Similarity search in {} failed: {}", collection, e);
                Vec::new()
            }
        }
    }

    /// Search with the configured result count and no filters
    pub async fn retrieve(&self, query: &str, collection: &str) -> Vec<SearchResult> {
        self.search(query, collection, self.config.top_k, None).await
    }
}
