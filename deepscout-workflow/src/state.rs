//! Event-sourced shared state
//!
//! Writers submit deltas; the store appends them to a log and replays them
//! into a key-value map. Later deltas overwrite earlier values, nothing is
//! ever deleted, and iteration follows the append order of each key's first
//! occurrence. Appends are serialized through a single write lock, so readers
//! only ever observe fully committed deltas.

use crate::keys::StateKey;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

/// One atomic batch of key-value writes
#[derive(Debug, Clone, Default)]
pub struct StateDelta {
    entries: Vec<(StateKey, Value)>,
}

impl StateDelta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: StateKey, value: Value) -> Self {
        self.entries.push((key, value));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(StateKey, Value)> {
        self.entries.iter()
    }
}

/// Materialized view of the delta log
#[derive(Debug, Clone, Default)]
pub struct StateMap {
    values: std::collections::HashMap<StateKey, Value>,
    order: Vec<StateKey>,
}

impl StateMap {
    /// Reducer: fold one delta into the map.
    ///
    /// Every entry overwrites any previous value under its key; a key enters
    /// the iteration order at its first write and stays there.
    pub fn apply(&mut self, delta: &StateDelta) {
        for (key, value) in delta.iter() {
            if !self.values.contains_key(key) {
                self.order.push(*key);
            }
            self.values.insert(*key, value.clone());
        }
    }

    pub fn get(&self, key: &StateKey) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate entries in first-occurrence append order
    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &Value)> {
        self.order.iter().map(move |key| (key, &self.values[key]))
    }
}

#[derive(Debug, Default)]
struct StoreState {
    log: Vec<StateDelta>,
    materialized: StateMap,
}

/// Shared state store for one workflow execution context
#[derive(Debug, Default)]
pub struct ScopedStateStore {
    inner: RwLock<StoreState>,
}

impl ScopedStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta to the log and fold it into the materialized view
    pub async fn append(&self, delta: StateDelta) {
        if delta.is_empty() {
            return;
        }
        let mut inner = self.inner.write().await;
        inner.materialized.apply(&delta);
        debug!(
            "State append: {} entries, log length {}",
            delta.iter().count(),
            inner.log.len() + 1
        );
        inner.log.push(delta);
    }

    /// Read the committed value under a key
    pub async fn read(&self, key: &StateKey) -> Option<Value> {
        self.inner.read().await.materialized.get(key).cloned()
    }

    /// Clone the committed view for scanning
    pub async fn snapshot(&self) -> StateMap {
        self.inner.read().await.materialized.clone()
    }

    /// Number of committed deltas
    pub async fn log_len(&self) -> usize {
        self.inner.read().await.log.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{AgentId, RunId};
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn apply_overwrites_and_keeps_first_occurrence_order() {
        let run = RunId::new();
        let a = AgentId::new();
        let b = AgentId::new();
        let key_a = StateKey::StepResult { run, agent: a };
        let key_b = StateKey::StepResult { run, agent: b };

        let mut map = StateMap::default();
        map.apply(&StateDelta::new().set(key_a, json!(1)));
        map.apply(&StateDelta::new().set(key_b, json!(2)));
        map.apply(&StateDelta::new().set(key_a, json!(3)));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&key_a), Some(&json!(3)));

        let order: Vec<&StateKey> = map.iter().map(|(key, _)| key).collect();
        assert_eq!(order, vec![&key_a, &key_b]);
    }

    #[test]
    fn apply_handles_multi_entry_deltas() {
        let run = RunId::new();
        let agent = AgentId::new();

        let mut map = StateMap::default();
        map.apply(
            &StateDelta::new()
                .set(StateKey::Query { run, agent }, json!("q"))
                .set(StateKey::CollectionName { run }, json!(run.to_string())),
        );

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&StateKey::Query { run, agent }), Some(&json!("q")));
    }

    #[tokio::test]
    async fn read_returns_latest_committed_value() {
        let store = ScopedStateStore::new();
        store
            .append(StateDelta::new().set(StateKey::Classification, json!("first")))
            .await;
        store
            .append(StateDelta::new().set(StateKey::Classification, json!("second")))
            .await;

        assert_eq!(
            store.read(&StateKey::Classification).await,
            Some(json!("second"))
        );
        assert_eq!(store.log_len().await, 2);
    }

    #[tokio::test]
    async fn empty_delta_is_not_logged() {
        let store = ScopedStateStore::new();
        store.append(StateDelta::new()).await;
        assert_eq!(store.log_len().await, 0);
    }

    #[tokio::test]
    async fn concurrent_appends_all_land() {
        let store = Arc::new(ScopedStateStore::new());
        let run = RunId::new();

        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            let agent = AgentId::new();
            handles.push(tokio::spawn(async move {
                store
                    .append(
                        StateDelta::new()
                            .set(StateKey::StepResult { run, agent }, json!(agent.to_string())),
                    )
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.log_len().await, 16);
        assert_eq!(store.snapshot().await.len(), 16);
    }
}
