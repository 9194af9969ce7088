//! Workflow coordinator
//!
//! Drives one user request through the stage machine: classify, plan,
//! execute in parallel, aggregate, answer. Stage boundaries are strict; no
//! stage starts before the previous one finished. Capability failures in
//! classify, plan, or synthesize abort the run; a failing research step only
//! loses that step's contribution.

use crate::aggregate::aggregate;
use crate::fanout::run_parallel;
use crate::keys::{AgentId, RunId, StateKey};
use crate::state::{ScopedStateStore, StateDelta};
use crate::steps::{PaperResearchStep, ResearchStep, WebResearchStep};
use deepscout_core::{
    ClassificationKind, PaperSource, ResearchModel, ScoutResult, StepAction, WebSearcher,
    WorkflowConfig,
};
use deepscout_pipeline::DocumentPipeline;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

const DEFAULT_REJECTION_MESSAGE: &str =
    "Could you clarify what you would like me to research?";

/// Terminal outcome of one workflow run
#[derive(Debug)]
pub enum WorkflowOutcome {
    /// The request was not a clear research request; no research ran
    Rejected { message: String },
    /// Research completed and an answer was synthesized
    Answered {
        run_id: RunId,
        answer: String,
        steps_completed: usize,
        steps_failed: usize,
    },
}

/// Orchestrates the research stages over injected capabilities
pub struct WorkflowCoordinator {
    model: Arc<dyn ResearchModel>,
    papers: Arc<dyn PaperSource>,
    web: Arc<dyn WebSearcher>,
    pipeline: Arc<DocumentPipeline>,
    store: Arc<ScopedStateStore>,
    config: WorkflowConfig,
}

impl WorkflowCoordinator {
    pub fn new(
        model: Arc<dyn ResearchModel>,
        papers: Arc<dyn PaperSource>,
        web: Arc<dyn WebSearcher>,
        pipeline: Arc<DocumentPipeline>,
        store: Arc<ScopedStateStore>,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            model,
            papers,
            web,
            pipeline,
            store,
            config,
        }
    }

    pub fn store(&self) -> &Arc<ScopedStateStore> {
        &self.store
    }

    /// Run one user request to its terminal outcome
    pub async fn run(&self, query: &str) -> ScoutResult<WorkflowOutcome> {
        // Classifying
        let classification = self.model.classify(query).await?;
        self.store
            .append(
                StateDelta::new()
                    .set(StateKey::Classification, serde_json::to_value(&classification)?),
            )
            .await;

        if classification.kind != ClassificationKind::Valid {
            let message = classification
                .next_message
                .unwrap_or_else(|| DEFAULT_REJECTION_MESSAGE.to_string());
            info!("Request rejected by classifier: {}", message);
            return Ok(WorkflowOutcome::Rejected { message });
        }

        // The extracted intent becomes the working query for the rest of the
        // run
        let working_query = classification
            .user_intent
            .unwrap_or_else(|| query.to_string());

        // Planning
        let plan = self
            .model
            .plan(&working_query)
            .await?
            .truncated(self.config.max_plan_steps);
        self.store
            .append(StateDelta::new().set(StateKey::ResearchPlan, serde_json::to_value(&plan)?))
            .await;
        info!("Plan has {} steps", plan.len());

        // Executing
        let run_id = RunId::new();
        let collection = run_id.to_string();

        let mut delta =
            StateDelta::new().set(StateKey::CollectionName { run: run_id }, json!(collection));
        let mut steps = Vec::with_capacity(plan.len());
        for entry in &plan.steps {
            let agent_id = AgentId::new();
            delta = delta.set(
                StateKey::Query { run: run_id, agent: agent_id },
                Value::String(entry.query.clone()),
            );
            steps.push(self.build_step(entry.action, run_id, agent_id));
        }
        self.store.append(delta).await;

        let outcomes = run_parallel(steps, self.store.clone()).await;
        let steps_failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        let steps_completed = outcomes.len() - steps_failed;
        if steps_failed > 0 {
            warn!("{} of {} steps failed", steps_failed, outcomes.len());
        }

        // Aggregating
        let results = aggregate(&self.store, run_id).await;

        // Answering
        let answer = self.model.synthesize(&working_query, &results).await?;
        info!("Run {} answered with {} step results", run_id, results.len());

        Ok(WorkflowOutcome::Answered {
            run_id,
            answer,
            steps_completed,
            steps_failed,
        })
    }

    fn build_step(&self, action: StepAction, run_id: RunId, agent_id: AgentId) -> ResearchStep {
        match action {
            StepAction::PaperSearch => ResearchStep::PaperResearch(PaperResearchStep {
                run_id,
                agent_id,
                model: self.model.clone(),
                papers: self.papers.clone(),
                pipeline: self.pipeline.clone(),
                max_papers: self.config.max_papers_per_step,
                max_document_length: self.pipeline.config().max_document_length,
            }),
            StepAction::WebSearch => ResearchStep::WebResearch(WebResearchStep {
                run_id,
                agent_id,
                web: self.web.clone(),
            }),
        }
    }
}
