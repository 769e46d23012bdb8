//! Error types for the policy comparison engine
//!
//! Errors are split by the stage that raises them: configuration registration,
//! trace validation, and the origin that serves misses. `BenchError` wraps all of
//! them for callers that only need a single error type.

use thiserror::Error;

/// Rejection of a policy configuration at registration time
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration with the same name is already registered
    #[error("Duplicate configuration name: {0}")]
    DuplicateName(String),

    /// Configuration names must be non-empty
    #[error("Configuration name must not be empty")]
    EmptyName,

    /// Capacity must be strictly positive for capacity-bounded kinds
    #[error("Invalid capacity for '{name}': {value} (must be greater than 0)")]
    InvalidCapacity { name: String, value: i64 },

    /// TTL must be strictly positive for TTL-bounded kinds
    #[error("Invalid TTL for '{name}': {value} (must be greater than 0)")]
    InvalidTtl { name: String, value: i64 },

    /// A parameter required by the policy kind was not supplied
    #[error("Configuration '{name}' is missing required parameter '{parameter}'")]
    MissingParameter {
        name: String,
        parameter: &'static str,
    },

    /// A parameter was supplied that the policy kind does not use
    #[error("Configuration '{name}' does not accept parameter '{parameter}' for kind {kind}")]
    UnexpectedParameter {
        name: String,
        parameter: &'static str,
        kind: &'static str,
    },

    /// Catalog document could not be parsed
    #[error("Catalog parse error: {0}")]
    Parse(String),
}

/// Malformed trace input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TraceError {
    /// Trace entry without a key
    #[error("Trace entry {index} has an empty key")]
    EmptyKey { index: usize },

    /// Timestamp went backwards
    #[error("Trace entry {index} is out of order: timestamp {current} precedes {previous}")]
    NonMonotonic {
        index: usize,
        previous: u64,
        current: u64,
    },

    /// Trace source could not be read
    #[error("Trace I/O error: {0}")]
    Io(String),

    /// Trace line could not be decoded
    #[error("Trace parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Synthetic trace parameters are unusable
    #[error("Invalid trace generator parameters: {0}")]
    Generator(String),
}

/// Failure reported by the origin that serves cache misses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Origin failed to serve '{key}': {message}")]
pub struct OriginError {
    pub key: String,
    pub message: String,
}

impl OriginError {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Main error type for the comparison engine
#[derive(Error, Debug)]
pub enum BenchError {
    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid trace
    #[error(transparent)]
    Trace(#[from] TraceError),

    /// A single run failed part-way through
    #[error("Run '{config}' failed: {source}")]
    RunFailure {
        config: String,
        #[source]
        source: OriginError,
    },

    /// Invalid engine settings
    #[error("Settings error: {0}")]
    Settings(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, BenchError>;
