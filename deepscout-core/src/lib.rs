//! DeepScout Core - Core data structures and trait definitions
//!
//! This module defines the shared abstractions of the DeepScout research
//! workflow: the document and plan data model, the capability traits through
//! which external collaborators (text generation, paper search/fetch, web
//! search, embeddings, vector storage) are injected, and the workspace-wide
//! configuration, error, and logging facilities.

pub mod config;
pub mod error;
pub mod logging;
pub mod traits;
pub mod types;

pub use error::*;
pub use logging::*;
pub use traits::*;
pub use types::*;

// Re-export commonly used external types
pub use async_trait::async_trait;
pub use tokio;
pub use tracing;
