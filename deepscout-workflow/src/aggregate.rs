//! Step result aggregation
//!
//! After the fan-out barrier, collects every step result of a run in the
//! order the results were first committed and writes the combined list back
//! under the run's aggregate key.

use crate::keys::{RunId, StateKey};
use crate::state::{ScopedStateStore, StateDelta};
use serde_json::Value;
use tracing::info;

/// Collect the step results of `run_id` into its aggregate key.
///
/// Only `StepResult` keys of the exact run contribute; the aggregate key
/// itself is a different variant and can never be re-collected. Steps that
/// wrote no result are simply absent.
pub async fn aggregate(store: &ScopedStateStore, run_id: RunId) -> Vec<Value> {
    let snapshot = store.snapshot().await;

    let collected: Vec<Value> = snapshot
        .iter()
        .filter_map(|(key, value)| match key {
            StateKey::StepResult { run, .. } if *run == run_id => Some(value.clone()),
            _ => None,
        })
        .collect();

    info!(
        "Aggregated {} step results for run {}",
        collected.len(),
        run_id
    );
    store
        .append(
            StateDelta::new().set(
                StateKey::RunResults { run: run_id },
                Value::Array(collected.clone()),
            ),
        )
        .await;
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::AgentId;
    use serde_json::json;

    #[tokio::test]
    async fn collects_only_matching_run_in_commit_order() {
        let store = ScopedStateStore::new();
        let run = RunId::new();
        let other_run = RunId::new();
        let first = AgentId::new();
        let second = AgentId::new();

        store
            .append(StateDelta::new().set(
                StateKey::StepResult { run, agent: first },
                json!({"n": 1}),
            ))
            .await;
        store
            .append(StateDelta::new().set(
                StateKey::StepResult { run: other_run, agent: AgentId::new() },
                json!({"n": 99}),
            ))
            .await;
        store
            .append(StateDelta::new().set(
                StateKey::StepResult { run, agent: second },
                json!({"n": 2}),
            ))
            .await;

        let results = aggregate(&store, run).await;
        assert_eq!(results, vec![json!({"n": 1}), json!({"n": 2})]);

        let stored = store.read(&StateKey::RunResults { run }).await.unwrap();
        assert_eq!(stored, json!([{"n": 1}, {"n": 2}]));
    }

    #[tokio::test]
    async fn aggregate_key_is_never_recollected() {
        let store = ScopedStateStore::new();
        let run = RunId::new();
        store
            .append(StateDelta::new().set(
                StateKey::StepResult { run, agent: AgentId::new() },
                json!("only"),
            ))
            .await;

        let first = aggregate(&store, run).await;
        let second = aggregate(&store, run).await;
        assert_eq!(first, second);
        assert_eq!(second.len(), 1);
    }

    #[tokio::test]
    async fn empty_run_aggregates_to_empty_list() {
        let store = ScopedStateStore::new();
        let run = RunId::new();
        let results = aggregate(&store, run).await;
        assert!(results.is_empty());
        assert_eq!(
            store.read(&StateKey::RunResults { run }).await,
            Some(json!([]))
        );
    }
}
