//! Core error types for stillpoint-core.
//!
//! The recommendation engine itself is best-effort and almost never fails;
//! these errors cover the surfaces around it (catalog files, history files,
//! configuration) and the single caller-triggered failure, an invalid limit.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for stillpoint-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Catalog-related errors
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// History-related errors
    #[error("History error: {0}")]
    History(#[from] HistoryError),

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
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Caller passed an argument outside its domain
    #[error("Invalid argument '{field}': {message}")]
    InvalidArgument { field: String, message: String },
}

/// Catalog file errors.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Two activities share an id
    #[error("Duplicate activity id in catalog: {0}")]
    DuplicateId(String),

    /// An activity was declared without an id
    #[error("Catalog activity at position {0} has an empty id")]
    EmptyId(usize),

    /// Catalog file could not be parsed
    #[error("Failed to parse catalog: {0}")]
    Parse(String),
}

/// History file errors.
#[derive(Error, Debug)]
pub enum HistoryError {
    /// Top-level JSON value is not an array of entries
    #[error("History must be a JSON array, found {0}")]
    NotAnArray(&'static str),

    /// History file is not valid JSON at all
    #[error("Failed to parse history: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::de::Error> for CatalogError {
    fn from(err: toml::de::Error) -> Self {
        CatalogError::Parse(err.to_string())
    }
}

impl From<toml::ser::Error> for CoreError {
    fn from(err: toml::ser::Error) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
