//! Parallel step execution
//!
//! Spawns every step of a plan as its own task and waits for all of them.
//! The join barrier always completes: a failing step yields an error outcome
//! and its siblings keep running. Nothing becomes visible to the aggregator
//! until the barrier is past.

use crate::keys::AgentId;
use crate::state::ScopedStateStore;
use crate::steps::ResearchStep;
use deepscout_core::{ScoutError, ScoutResult};
use std::sync::Arc;
use tracing::{info, warn};

/// Terminal status of one fanned-out step
pub struct StepOutcome {
    pub agent_id: AgentId,
    pub result: ScoutResult<()>,
}

/// Execute all steps concurrently and join them.
///
/// Outcomes are returned in the order the steps were given, regardless of
/// completion order.
pub async fn run_parallel(
    steps: Vec<ResearchStep>,
    store: Arc<ScopedStateStore>,
) -> Vec<StepOutcome> {
    let total = steps.len();
    info!("Fanning out {} research steps", total);

    let handles: Vec<_> = steps
        .into_iter()
        .map(|step| {
            let agent_id = step.agent_id();
            let store = store.clone();
            (agent_id, tokio::spawn(step.execute(store)))
        })
        .collect();

    let mut outcomes = Vec::with_capacity(total);
    for (agent_id, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(ScoutError::internal(
                format!("research step task aborted: {}", e),
                "fan_out",
            )),
        };
        if let Err(e) = &result {
            warn!("Step {} failed: {}", agent_id, e);
        }
        outcomes.push(StepOutcome { agent_id, result });
    }

    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
    info!("Fan-out complete: {}/{} steps succeeded", total - failed, total);
    outcomes
}
