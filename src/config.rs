use crate::document::DocumentOptions;
use crate::document::parser::DEFAULT_MAX_INPUT_BYTES;
use std::env;
use std::fmt;
use thiserror::Error;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ALLOW_DTD: bool = false;
const DEFAULT_NODES_LIMIT: u32 = u32::MAX;
const MIN_INPUT_BYTES: usize = 64;
const MAX_INPUT_BYTES: usize = 268_435_456; // 256MB

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Runtime settings for value factories, read from `XMLFACTORY_*` variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactoryConfig {
    pub log_level: String,
    pub allow_dtd: bool,
    pub nodes_limit: u32,
    pub max_input_bytes: usize,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        let log_level = env::var("XMLFACTORY_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        let allow_dtd = env::var("XMLFACTORY_ALLOW_DTD")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(DEFAULT_ALLOW_DTD);

        let nodes_limit = env::var("XMLFACTORY_NODES_LIMIT")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(DEFAULT_NODES_LIMIT);

        let max_input_bytes = env::var("XMLFACTORY_MAX_INPUT_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_INPUT_BYTES);

        Self {
            log_level,
            allow_dtd,
            nodes_limit,
            max_input_bytes,
        }
    }
}

impl FactoryConfig {
    /// Reads the environment and validates the result.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self::default();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        if self.nodes_limit == 0 {
            return Err(ConfigError::ValidationFailed(
                "Nodes limit must be at least 1".to_string(),
            ));
        }

        if self.max_input_bytes < MIN_INPUT_BYTES {
            return Err(ConfigError::ValidationFailed(
                "Max input size must be at least 64 bytes".to_string(),
            ));
        }
        if self.max_input_bytes > MAX_INPUT_BYTES {
            return Err(ConfigError::ValidationFailed(
                "Max input size cannot exceed 256MB".to_string(),
            ));
        }

        Ok(())
    }

    pub fn document_options(&self) -> DocumentOptions {
        DocumentOptions {
            allow_dtd: self.allow_dtd,
            nodes_limit: self.nodes_limit,
            max_input_bytes: self.max_input_bytes,
        }
    }
}

impl fmt::Display for FactoryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "XML Factory Configuration:")?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        writeln!(f, "  Allow DTD: {}", self.allow_dtd)?;
        writeln!(f, "  Nodes Limit: {}", self.nodes_limit)?;
        writeln!(f, "  Max Input Size: {} bytes", self.max_input_bytes)?;
        Ok(())
    }
}
