//! DeepScout Workflow - Multi-stage research orchestration
//!
//! The coordinator takes a user request through classification, planning,
//! parallel research steps, aggregation, and answer synthesis. All
//! cross-stage communication goes through an event-sourced state store keyed
//! by a closed `StateKey` enum; external capabilities (model, paper source,
//! web search, document pipeline) are injected at construction.

pub mod aggregate;
pub mod coordinator;
pub mod fanout;
pub mod keys;
pub mod state;
pub mod steps;

pub use aggregate::aggregate;
pub use coordinator::{WorkflowCoordinator, WorkflowOutcome};
pub use fanout::{run_parallel, StepOutcome};
pub use keys::{AgentId, RunId, StateKey};
pub use state::{ScopedStateStore, StateDelta, StateMap};
pub use steps::{PaperResearchStep, ResearchStep, WebResearchStep};
