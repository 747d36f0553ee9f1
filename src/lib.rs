//! Audit-Intel: a web3 audit contest collector
//!
//! This crate periodically scrapes audit contest pages, extracts the reported
//! findings into typed records, persists them to SQLite, and serves them
//! through a small read API.

pub mod api;
pub mod collector;
pub mod config;
pub mod output;
pub mod scheduler;
pub mod storage;

use thiserror::Error;

/// Main error type for Audit-Intel operations
///
/// Anything surfacing as an `AuditError` from a collection run is treated as
/// unexpected by the scheduler and triggers the backoff interval.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Collection error: {0}")]
    Collect(#[from] CollectError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("API server error: {0}")]
    Server(String),

    #[error("Collector panicked: {0}")]
    Panic(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Transport or HTTP-level failure while fetching a page
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Transport error for {url}: {message}")]
    Transport { url: String, message: String },
}

/// A fetched page does not have the shape the extractor expects
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Document is empty")]
    EmptyDocument,

    #[error("None of the expected containers found ({selectors})")]
    MissingContainer { selectors: String },
}

/// An extracted record is missing a required field
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field '{0}' is missing or empty")]
    MissingField(&'static str),
}

/// Failure of a single contest within a collection batch
///
/// These never abort the batch; the collector logs them and moves on.
#[derive(Debug, Error)]
pub enum CollectError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Result type alias for Audit-Intel operations
pub type Result<T> = std::result::Result<T, AuditError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use collector::{
    AuditReport, Code4renaCollector, Collector, ContestSummary, FindingRecord, Severity,
};
pub use config::Config;
pub use storage::{SharedStorage, SqliteStorage, Storage};
