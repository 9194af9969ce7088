//! Typed state keys
//!
//! Every shared-state read and write goes through the `StateKey` enum, so a
//! key can never collide with another by string prefix. Keys encode to a
//! stable string form (used in logs and error messages) and parse back
//! losslessly.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of one workflow execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of one research step within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Closed set of shared-state keys.
///
/// Per-run and per-step values carry their scope in the key, so two runs (or
/// two steps of one run) never read each other's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKey {
    /// Output of the classify stage
    Classification,
    /// Output of the plan stage
    ResearchPlan,
    /// Query assigned to one step of a run
    Query { run: RunId, agent: AgentId },
    /// Vector collection used by all steps of a run
    CollectionName { run: RunId },
    /// Paper ids selected by the filter sub-stage of one paper step
    PaperIds { run: RunId, agent: AgentId },
    /// Result written by one step
    StepResult { run: RunId, agent: AgentId },
    /// Aggregated results of a run
    RunResults { run: RunId },
}

impl StateKey {
    pub fn encode(&self) -> String {
        match self {
            StateKey::Classification => "classification".to_string(),
            StateKey::ResearchPlan => "research_plan".to_string(),
            StateKey::Query { run, agent } => format!("query:{}:{}", run, agent),
            StateKey::CollectionName { run } => format!("collection_name:{}", run),
            StateKey::PaperIds { run, agent } => format!("paper_ids:{}:{}", run, agent),
            StateKey::StepResult { run, agent } => format!("results:{}:{}", run, agent),
            StateKey::RunResults { run } => format!("results:{}", run),
        }
    }

    pub fn parse(s: &str) -> Option<StateKey> {
        match s {
            "classification" => return Some(StateKey::Classification),
            "research_plan" => return Some(StateKey::ResearchPlan),
            _ => {}
        }

        let mut parts = s.splitn(2, ':');
        let prefix = parts.next()?;
        let rest = parts.next()?;

        match prefix {
            "query" | "paper_ids" | "results" => {
                let mut scope = rest.splitn(2, ':');
                let run = RunId::parse(scope.next()?)?;
                match scope.next() {
                    Some(agent) => {
                        let agent = AgentId::parse(agent)?;
                        Some(match prefix {
                            "query" => StateKey::Query { run, agent },
                            "paper_ids" => StateKey::PaperIds { run, agent },
                            _ => StateKey::StepResult { run, agent },
                        })
                    }
                    None if prefix == "results" => Some(StateKey::RunResults { run }),
                    None => None,
                }
            }
            "collection_name" => Some(StateKey::CollectionName {
                run: RunId::parse(rest)?,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_parse_round_trip() {
        let run = RunId::new();
        let agent = AgentId::new();
        let keys = [
            StateKey::Classification,
            StateKey::ResearchPlan,
            StateKey::Query { run, agent },
            StateKey::CollectionName { run },
            StateKey::PaperIds { run, agent },
            StateKey::StepResult { run, agent },
            StateKey::RunResults { run },
        ];
        for key in keys {
            assert_eq!(StateKey::parse(&key.encode()), Some(key));
        }
    }

    #[test]
    fn step_result_and_run_results_never_collide() {
        let run = RunId::new();
        let agent = AgentId::new();
        let step = StateKey::StepResult { run, agent };
        let aggregate = StateKey::RunResults { run };

        assert_ne!(step, aggregate);
        assert_ne!(step.encode(), aggregate.encode());
        assert!(step.encode().starts_with(&aggregate.encode()));
    }

    #[test]
    fn parse_rejects_malformed_keys() {
        assert_eq!(StateKey::parse("query"), None);
        assert_eq!(StateKey::parse("query:not-a-uuid:also-not"), None);
        assert_eq!(StateKey::parse("collection_name:"), None);
        assert_eq!(StateKey::parse("unknown:prefix"), None);
        assert_eq!(StateKey::parse(""), None);
    }

    #[test]
    fn query_requires_both_scopes() {
        let run = RunId::new();
        assert_eq!(StateKey::parse(&format!("query:{}", run)), None);
        assert_eq!(StateKey::parse(&format!("paper_ids:{}", run)), None);
    }
}
