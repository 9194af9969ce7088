//! Core data type definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A document (or document chunk) held by the vector backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier (a point id in the vector backend)
    pub id: String,
    /// Text content
    pub content: String,
    /// Flat metadata map, merged into the backend payload alongside content
    pub metadata: HashMap<String, String>,
    /// Embedding vector, attached once computed
    pub vector: Option<Vec<f32>>,
}

impl Document {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: HashMap::new(),
            vector: None,
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_vector(mut self, vector: Vec<f32>) -> Self {
        self.vector = Some(vector);
        self
    }
}

/// Similarity search hit, ordered by descending score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub document: Document,
    pub score: f32,
}

/// How the classifier categorized a user request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClassificationKind {
    /// Specific, clear research request
    Valid,
    /// Shows research intent but too broad to act on
    General,
    /// Unclear, incomplete, or not a research request
    NeedMoreInfo,
}

/// Result of classifying a user request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    #[serde(rename = "type")]
    pub kind: ClassificationKind,
    /// Precise research intent, present for `valid` classifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_intent: Option<String>,
    /// Message to send back to the user for non-`valid` classifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_message: Option<String>,
}

/// Kind of action a plan step performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    PaperSearch,
    WebSearch,
}

impl std::fmt::Display for StepAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepAction::PaperSearch => write!(f, "paper_search"),
            StepAction::WebSearch => write!(f, "web_search"),
        }
    }
}

/// One entry of a research plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    pub action: StepAction,
    /// Search query and description of what this step should accomplish
    pub query: String,
}

/// Ordered sequence of research steps produced by the planner
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResearchPlan {
    pub steps: Vec<PlanStep>,
}

impl ResearchPlan {
    /// Enforce the policy cap on plan length, keeping the leading steps
    pub fn truncated(mut self, max_steps: usize) -> Self {
        self.steps.truncate(max_steps);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

/// Candidate paper metadata returned by the paper-search capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperMeta {
    pub id: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Full paper content fetched by id from the paper-fetch capability
#[derive(Debug, Clone)]
pub struct FetchedPaper {
    pub id: String,
    pub content: String,
    pub metadata: HashMap<String, String>,
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoutConfig {
    pub embedding: EmbeddingConfig,
    pub vector_index: VectorIndexConfig,
    pub pipeline: PipelineConfig,
    pub workflow: WorkflowConfig,
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider type (openai, etc.)
    pub provider: String,
    /// Embedding model name
    pub model: String,
    /// API key (optional, can be set via environment)
    pub api_key: Option<String>,
    /// Base URL for custom endpoints
    pub base_url: Option<String>,
    /// Dimension of the embedding vectors
    pub dimension: usize,
    /// Batch size for batched embedding calls
    pub batch_size: usize,
}

/// Vector index backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexConfig {
    /// Backend type (qdrant, memory)
    pub provider: String,
    /// Backend endpoint URL
    pub url: String,
}

/// Document pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Chunk size for text splitting (in characters)
    pub chunk_size: usize,
    /// Cap on normalized document length before chunking (in characters)
    pub max_document_length: usize,
    /// Number of top results to retrieve
    pub top_k: usize,
}

/// Workflow coordinator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Policy cap on the number of plan steps executed per run
    pub max_plan_steps: usize,
    /// Cap on papers selected and ingested per paper-research step
    pub max_papers_per_step: usize,
}
