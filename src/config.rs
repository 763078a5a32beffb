use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use validator::Validate;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Parse error for {field}: {value} - {source}")]
    Parse {
        field: String,
        value: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Extraction configuration with validation
#[derive(Clone, Debug, Validate, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Drop classes that were never created during reshaping before extraction
    pub check_for_refactored: bool,

    /// Class that is part of every extraction and receives the study filter
    #[validate(length(min = 1, message = "Study class cannot be empty"))]
    pub study_class: String,

    /// Property holding a node's display value
    #[validate(length(min = 1, message = "Label property cannot be empty"))]
    pub label_property: String,

    /// Suffix tagging a class as optional (outer-join) for the extractor
    #[validate(length(min = 1, message = "Optional marker cannot be empty"))]
    pub optional_marker: String,

    /// Separator of sort orders stored as a single string
    pub sort_order_delimiter: char,

    /// Name extracted columns by class short label instead of label
    pub use_short_label: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            check_for_refactored: true,
            study_class: "Study".to_string(),
            label_property: "rdfs:label".to_string(),
            optional_marker: "**".to_string(),
            sort_order_delimiter: ',',
            use_short_label: true,
        }
    }
}

impl ExtractionConfig {
    /// Create configuration from environment variables with validation
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            check_for_refactored: parse_env_var("CLINIGRAPH_CHECK_FOR_REFACTORED", "true")?,
            study_class: env_var_or("CLINIGRAPH_STUDY_CLASS", "Study")?,
            label_property: env_var_or("CLINIGRAPH_LABEL_PROPERTY", "rdfs:label")?,
            optional_marker: env_var_or("CLINIGRAPH_OPTIONAL_MARKER", "**")?,
            sort_order_delimiter: parse_env_var("CLINIGRAPH_SORT_ORDER_DELIMITER", ",")?,
            use_short_label: parse_env_var("CLINIGRAPH_USE_SHORT_LABEL", "true")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Create configuration from YAML file
    pub fn from_yaml_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Parse {
            field: "yaml_file".to_string(),
            value: "file read failed".to_string(),
            source: Box::new(e),
        })?;

        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            field: "yaml_content".to_string(),
            value: content,
            source: Box::new(e),
        })?;

        config.validate()?;
        Ok(config)
    }
}

/// Read an environment variable, falling back to `default` only when it is unset
fn env_var_or(key: &str, default: &str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) => Ok(value),
        Err(env::VarError::NotPresent) => Ok(default.to_string()),
        Err(e) => Err(e.into()),
    }
}

/// Parse an environment variable with a default value
fn parse_env_var<T: std::str::FromStr>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let value = env_var_or(key, default)?;
    value.parse().map_err(|e| ConfigError::Parse {
        field: key.to_string(),
        value,
        source: Box::new(e),
    })
}
