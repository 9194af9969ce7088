//! Configuration management

use crate::error::ScoutResult;
use crate::types::ScoutConfig;
use crate::{config_error, ErrorContext, ScoutError};

use std::path::Path;

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            embedding: crate::types::EmbeddingConfig {
                provider: "openai".to_string(),
                model: "text-embedding-3-small".to_string(),
                api_key: None,
                base_url: None,
                dimension: 1536,
                batch_size: 100,
            },
            vector_index: crate::types::VectorIndexConfig {
                provider: "qdrant".to_string(),
                url: "http://localhost:6333".to_string(),
            },
            pipeline: crate::types::PipelineConfig {
                chunk_size: 300,
                max_document_length: 3000,
                top_k: 10,
            },
            workflow: crate::types::WorkflowConfig {
                max_plan_steps: 3,
                max_papers_per_step: 2,
            },
        }
    }
}

impl ScoutConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ScoutResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| config_error!(format!("Failed to read config file: {}", e), "config", e))?;

        let config: ScoutConfig = toml::from_str(&content).map_err(|e| {
            config_error!(format!("Failed to parse config: {}", e), "config", e)
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ScoutResult<()> {
        if self.embedding.dimension == 0 {
            return Err(ScoutError::Config {
                message: "Embedding dimension must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set embedding.dimension to a positive value"),
            });
        }

        if self.pipeline.chunk_size == 0 {
            return Err(ScoutError::Config {
                message: "Pipeline chunk_size must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set pipeline.chunk_size to a positive value"),
            });
        }

        if self.pipeline.top_k == 0 {
            return Err(ScoutError::Config {
                message: "Pipeline top_k must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set pipeline.top_k to a positive value"),
            });
        }

        if self.workflow.max_papers_per_step == 0 {
            return Err(ScoutError::Config {
                message: "Workflow max_papers_per_step must be greater than 0".to_string(),
                source: None,
                context: ErrorContext::new("config")
                    .with_operation("validate")
                    .with_suggestion("Set workflow.max_papers_per_step to a positive value"),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = ScoutConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.workflow.max_plan_steps, 3);
        assert_eq!(config.pipeline.chunk_size, 300);
    }

    #[test]
    fn rejects_zero_dimension() {
        let mut config = ScoutConfig::default();
        config.embedding.dimension = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_toml_file() {
        let config = ScoutConfig::default();
        let content = toml::to_string_pretty(&config).unwrap();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();

        let loaded = ScoutConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded.embedding.model, config.embedding.model);
        assert_eq!(loaded.vector_index.url, config.vector_index.url);
    }
}
