//! Error types for the unisearch library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! crate-wide [`SearchError`] enum.

use thiserror::Error;

/// The main error type for search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Record store errors (query execution, connectivity).
    #[error("Store error: {0}")]
    Store(String),

    /// Query-related errors (malformed filters, invalid pagination).
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid weights, limits).
    #[error("Config error: {0}")]
    Config(String),

    /// A fan-out leg or count estimate exceeded its deadline.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Analytics sink errors. These are logged and swallowed by the
    /// orchestrator, never surfaced to callers.
    #[error("Analytics error: {0}")]
    Analytics(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error.
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`SearchError`].
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Create a new store error.
    pub fn store<S: Into<String>>(msg: S) -> Self {
        SearchError::Store(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        SearchError::Query(msg.into())
    }

    /// Create a new config error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SearchError::Config(msg.into())
    }

    /// Create a new timeout error.
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        SearchError::Timeout(msg.into())
    }

    /// Create a new analytics error.
    pub fn analytics<S: Into<String>>(msg: S) -> Self {
        SearchError::Analytics(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        SearchError::Other(msg.into())
    }
}
