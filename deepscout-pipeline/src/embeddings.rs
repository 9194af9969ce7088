//! OpenAI embedding provider adapter
//!
//! Talks to the `/v1/embeddings` endpoint over HTTP. The API key comes from
//! the configuration or the `OPENAI_API_KEY` environment variable; the base
//! URL can be overridden for compatible endpoints.

use async_trait::async_trait;
use deepscout_core::{
    EmbeddingConfig, EmbeddingProvider, ErrorContext, ScoutError, ScoutResult,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Embedding provider backed by the OpenAI embeddings API
pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    model: String,
    api_key: String,
    base_url: String,
    dimension: usize,
}

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddings {
    /// Create a new provider from configuration
    pub fn new(config: &EmbeddingConfig) -> ScoutResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| ScoutError::Config {
                message: "OpenAI API key not found".to_string(),
                source: None,
                context: ErrorContext::new("openai_embeddings")
                    .with_operation("new")
                    .with_suggestion("Set embedding.api_key or the OPENAI_API_KEY environment variable"),
            })?;

        let base_url = config
            .base_url
            .clone()
            .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        debug!(
            "Created OpenAI embeddings client - model: {}, endpoint: {}, dimension: {}",
            config.model, base_url, config.dimension
        );

        Ok(Self {
            client: reqwest::Client::new(),
            model: config.model.clone(),
            api_key,
            base_url,
            dimension: config.dimension,
        })
    }

    async fn request_embeddings(&self, inputs: &[String]) -> ScoutResult<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingsRequest {
                model: &self.model,
                input: inputs,
            })
            .send()
            .await
            .map_err(|e| ScoutError::Network {
                message: format!("Failed to reach embeddings endpoint: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("openai_embeddings").with_operation("request"),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Embeddings API returned {}: {}", status, body);
            return Err(ScoutError::Embedding {
                message: format!("Embeddings API returned {}: {}", status, body),
                provider: Some("openai".to_string()),
                source: None,
                context: ErrorContext::new("openai_embeddings").with_operation("request"),
            });
        }

        let parsed: EmbeddingsResponse =
            response.json().await.map_err(|e| ScoutError::Embedding {
                message: format!("Failed to parse embeddings response: {}", e),
                provider: Some("openai".to_string()),
                source: Some(Box::new(e)),
                context: ErrorContext::new("openai_embeddings").with_operation("parse_response"),
            })?;

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> ScoutResult<Vec<f32>> {
        let inputs = [text.to_string()];
        let mut vectors = self.request_embeddings(&inputs).await?;
        vectors.pop().ok_or_else(|| ScoutError::Embedding {
            message: "No embedding data returned".to_string(),
            provider: Some("openai".to_string()),
            source: None,
            context: ErrorContext::new("openai_embeddings").with_operation("embed"),
        })
    }

    async fn embed_batch(&self, texts: &[String]) -> ScoutResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.request_embeddings(texts).await?;
        if vectors.len() != texts.len() {
            return Err(ScoutError::Embedding {
                message: format!(
                    "Embedding count mismatch: requested {}, received {}",
                    texts.len(),
                    vectors.len()
                ),
                provider: Some("openai".to_string()),
                source: None,
                context: ErrorContext::new("openai_embeddings").with_operation("embed_batch"),
            });
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
