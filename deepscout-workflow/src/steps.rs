//! Research step executors
//!
//! Each plan entry becomes one `ResearchStep`. A step reads its assigned
//! query from shared state, performs its research action, and writes its
//! result under its own `(run, agent)` result key. Steps never write outside
//! that namespace.

use crate::keys::{AgentId, RunId, StateKey};
use crate::state::{ScopedStateStore, StateDelta};
use deepscout_core::{
    not_found_error, PaperSource, ResearchModel, ScoutResult, SearchResult, WebSearcher,
};
use deepscout_pipeline::DocumentPipeline;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One executable unit of a research plan
pub enum ResearchStep {
    PaperResearch(PaperResearchStep),
    WebResearch(WebResearchStep),
}

impl ResearchStep {
    pub fn agent_id(&self) -> AgentId {
        match self {
            ResearchStep::PaperResearch(step) => step.agent_id,
            ResearchStep::WebResearch(step) => step.agent_id,
        }
    }

    pub fn run_id(&self) -> RunId {
        match self {
            ResearchStep::PaperResearch(step) => step.run_id,
            ResearchStep::WebResearch(step) => step.run_id,
        }
    }

    /// Execute the step against shared state
    pub async fn execute(self, store: Arc<ScopedStateStore>) -> ScoutResult<()> {
        match self {
            ResearchStep::PaperResearch(step) => step.execute(store).await,
            ResearchStep::WebResearch(step) => step.execute(store).await,
        }
    }
}

async fn read_string(store: &ScopedStateStore, key: StateKey) -> ScoutResult<String> {
    match store.read(&key).await {
        Some(Value::String(s)) => Ok(s),
        _ => Err(not_found_error!(key.encode(), "research_step")),
    }
}

/// Step that searches academic papers, ingests them, and retrieves snippets
pub struct PaperResearchStep {
    pub run_id: RunId,
    pub agent_id: AgentId,
    pub model: Arc<dyn ResearchModel>,
    pub papers: Arc<dyn PaperSource>,
    pub pipeline: Arc<DocumentPipeline>,
    pub max_papers: usize,
    pub max_document_length: usize,
}

impl PaperResearchStep {
    async fn execute(self, store: Arc<ScopedStateStore>) -> ScoutResult<()> {
        let query = read_string(&store, StateKey::Query {
            run: self.run_id,
            agent: self.agent_id,
        })
        .await?;
        let collection =
            read_string(&store, StateKey::CollectionName { run: self.run_id }).await?;

        info!("Paper research step {} starting: {}", self.agent_id, query);

        let candidates = self.papers.search(&query).await?;
        debug!("Found {} candidate papers", candidates.len());

        let mut selected = self.model.select_papers(&query, &candidates).await?;
        selected.truncate(self.max_papers);

        store
            .append(StateDelta::new().set(
                StateKey::PaperIds {
                    run: self.run_id,
                    agent: self.agent_id,
                },
                json!(selected),
            ))
            .await;

        for id in &selected {
            let paper = match self.papers.fetch(id).await {
                Ok(paper) => paper,
                Err(e) => {
                    warn!("Skipping paper {}: {}", id, e);
                    continue;
                }
            };

            let stored = self
                .pipeline
                .ingest(
                    &paper.id,
                    &paper.content,
                    &paper.metadata,
                    &collection,
                    self.max_document_length,
                )
                .await;
            if !stored {
                warn!("Paper {} was only partially ingested", paper.id);
            }
        }

        let snippets = self.pipeline.retrieve(&query, &collection).await;
        let result = json!({
            "action": "paper_search",
            "query": query,
            "paper_ids": selected,
            "snippets": snippets_to_value(&snippets),
        });

        store
            .append(StateDelta::new().set(
                StateKey::StepResult {
                    run: self.run_id,
                    agent: self.agent_id,
                },
                result,
            ))
            .await;
        info!(
            "Paper research step {} done: {} snippets",
            self.agent_id,
            snippets.len()
        );
        Ok(())
    }
}

fn snippets_to_value(results: &[SearchResult]) -> Value {
    let snippets: Vec<Value> = results
        .iter()
        .map(|r| {
            json!({
                "id": r.document.id,
                "score": r.score,
                "content": r.document.content,
                "metadata": r.document.metadata,
            })
        })
        .collect();
    Value::Array(snippets)
}

/// Step that runs a web search and records the structured output
pub struct WebResearchStep {
    pub run_id: RunId,
    pub agent_id: AgentId,
    pub web: Arc<dyn WebSearcher>,
}

impl WebResearchStep {
    async fn execute(self, store: Arc<ScopedStateStore>) -> ScoutResult<()> {
        let query = read_string(&store, StateKey::Query {
            run: self.run_id,
            agent: self.agent_id,
        })
        .await?;

        info!("Web research step {} starting: {}", self.agent_id, query);
        let output = self.web.search(&query).await?;

        let result = json!({
            "action": "web_search",
            "query": query,
            "output": output,
        });

        store
            .append(StateDelta::new().set(
                StateKey::StepResult {
                    run: self.run_id,
                    agent: self.agent_id,
                },
                result,
            ))
            .await;
        info!("Web research step {} done", self.agent_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepscout_core::Document;
    use std::collections::HashMap;

    fn _assert_send(step: ResearchStep, store: Arc<ScopedStateStore>) {
        fn takes_send<T: Send>(_: T) {}
        takes_send(step.execute(store));
    }

    #[test]
    fn snippets_render_as_flat_objects() {
        let mut metadata = HashMap::new();
        metadata.insert("source".to_string(), "arxiv".to_string());
        let results = vec![SearchResult {
            document: Document::new("p1:0", "chunk").with_metadata(metadata),
            score: 0.9,
        }];

        let value = snippets_to_value(&results);
        assert_eq!(value[0]["id"], "p1:0");
        assert_eq!(value[0]["content"], "chunk");
        assert_eq!(value[0]["metadata"]["source"], "arxiv");
    }
}
