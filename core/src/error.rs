//! Error types for query construction and execution.
//!
//! # Design
//! Nothing in this crate recovers from a failure. Every variant surfaces to
//! the caller as-is; transport failures keep the original error as their
//! source so callers can downcast to the concrete transport error.

use std::path::PathBuf;

use thiserror::Error;

/// Errors returned while building or running a `Query`.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The method is not one of GET, DELETE, POST or PUT.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The request payload could not be serialized to JSON.
    #[error("payload serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    /// The injected transport failed. Never retried here.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A required configuration key is absent.
    #[error("missing configuration key: {0}")]
    ConfigurationMissing(&'static str),

    /// A configuration value is present but unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The audit log could not be appended to.
    #[error("failed to write query log {path}: {source}")]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A response body could not be decoded into the requested type.
    #[error("deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QueryError>;
