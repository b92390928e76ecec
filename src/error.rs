//! Error types for the caching library
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for key resolution, configuration and backends.
///
/// Miss signaling (`NotFound`, `Expired`) is deliberately part of the same
/// enum as structural failures (`Backend`, `Serialization`): backends report
/// both through the same `Result`, and the decorator layer separates them
/// with [`CacheError::is_miss`].
#[derive(Error, Debug)]
pub enum CacheError {
    /// Bad or missing decorator options, or a malformed key template.
    /// Raised at decoration time, never at call time.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// A key could not be derived from the call arguments
    #[error("key resolution failed: {0}")]
    KeyResolution(String),

    /// Key not present in the backend
    #[error("key not found: {0}")]
    NotFound(String),

    /// Key was present but its TTL has elapsed
    #[error("key expired: {0}")]
    Expired(String),

    /// Structural backend failure (storage unavailable, remote store broken)
    #[error("backend failure: {0}")]
    Backend(String),

    /// Value failed to cross the backend serialization boundary
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CacheError {
    // == Miss Classification ==
    /// Returns true for ordinary miss signaling as opposed to structural
    /// failure. Misses mean "proceed to compute"; structural errors are
    /// suppress-or-propagate decisions controlled by `ignore_errors`.
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::NotFound(_) | CacheError::Expired(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the caching library.
pub type Result<T> = std::result::Result<T, CacheError>;
