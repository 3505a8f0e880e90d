//! Core error types for taskpilot-core.
//!
//! This module defines the error hierarchy using thiserror so that the CLI
//! (and any other embedder) can report failures with useful context.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for taskpilot-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// No usable data directory
    #[error("Could not determine data directory: {0}")]
    NoDataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two records share an id
    #[error("Duplicate {entity} id: {id}")]
    DuplicateId { entity: String, id: String },

    /// A record points at something that is not in the snapshot
    #[error("{entity} '{id}' references unknown {target} '{target_id}'")]
    UnknownReference {
        entity: String,
        id: String,
        target: String,
        target_id: String,
    },

    /// Task level and parent do not line up
    #[error("Invalid hierarchy for task '{task_id}': {message}")]
    InvalidHierarchy { task_id: String, message: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Scoring weights that would break the ranking guarantees
    #[error("Invalid scoring weights: {0}")]
    InvalidWeights(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CoreError {
    fn from(err: toml::de::Error) -> Self {
        CoreError::Config(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
