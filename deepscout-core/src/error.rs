//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ScoutResult<T> = Result<T, ScoutError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the DeepScout system
#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("State error: {message}")]
    State {
        message: String,
        context: ErrorContext,
    },

    #[error("Workflow error: {message}")]
    Workflow {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Capability error: {message}")]
    Capability {
        message: String,
        capability: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Embedding error: {message}")]
    Embedding {
        message: String,
        provider: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Vector store error: {message}")]
    VectorStore {
        message: String,
        collection: Option<String>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl ScoutError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            ScoutError::State { context, .. } => Some(context),
            ScoutError::Workflow { context, .. } => Some(context),
            ScoutError::Capability { context, .. } => Some(context),
            ScoutError::Embedding { context, .. } => Some(context),
            ScoutError::VectorStore { context, .. } => Some(context),
            ScoutError::Config { context, .. } => Some(context),
            ScoutError::Network { context, .. } => Some(context),
            ScoutError::NotFound { context, .. } => Some(context),
            ScoutError::Internal { context, .. } => Some(context),
            _ => None,
        }
    }

    /// Check if error is recoverable by degrading instead of aborting
    pub fn is_recoverable(&self) -> bool {
        match self {
            ScoutError::Network { .. } => true,
            ScoutError::Embedding { .. } => true,
            ScoutError::VectorStore { .. } => true,
            ScoutError::Config { .. } => false,
            ScoutError::NotFound { .. } => false,
            _ => false,
        }
    }

    /// Create a capability error for a named external capability
    pub fn capability<M: Into<String>, C: Into<String>>(message: M, capability: C) -> Self {
        let capability = capability.into();
        ScoutError::Capability {
            message: message.into(),
            source: None,
            context: ErrorContext::new(&capability),
            capability,
        }
    }

    /// Create a state error
    pub fn state<M: Into<String>>(message: M, component: &str) -> Self {
        ScoutError::State {
            message: message.into(),
            context: ErrorContext::new(component),
        }
    }

    /// Create an internal error
    pub fn internal<M: Into<String>>(message: M, component: &str) -> Self {
        ScoutError::Internal {
            message: message.into(),
            source: None,
            context: ErrorContext::new(component),
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::ScoutError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::ScoutError::Config {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::ScoutError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Verify the key or identifier exists before reading it"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_context_builder() {
        let context = ErrorContext::new("pipeline")
            .with_operation("ingest")
            .with_suggestion("Retry with a smaller document");

        assert_eq!(context.component, "pipeline");
        assert_eq!(context.operation.as_deref(), Some("ingest"));
        assert_eq!(context.recovery_suggestions.len(), 1);
    }

    #[test]
    fn capability_error_carries_context() {
        let err = ScoutError::capability("model timed out", "research_model");
        assert!(err.context().is_some());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn recoverable_classification() {
        let network = ScoutError::Network {
            message: "connection refused".to_string(),
            source: None,
            context: ErrorContext::new("qdrant"),
        };
        assert!(network.is_recoverable());

        let missing = not_found_error!("query:run:agent", "state");
        assert!(!missing.is_recoverable());
    }
}
