//! Backend Module
//!
//! The pluggable store capability and the built-in variants: plain
//! in-memory, TTL-expiring, and LRU-bounded.

mod expiring;
mod lru;
mod memory;
mod stats;


use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use serde_json::Value;

use crate::error::Result;

// Re-export public types
pub use expiring::ExpiringCache;
pub use lru::{LruCache, DEFAULT_MAX_ITEMS};
pub use memory::InMemoryCache;
pub use stats::CacheStats;

// == Lookup ==
/// Tagged result of a backend `get`.
///
/// `Miss` is a value, not an error, so backends that signal absence
/// without failing (the in-memory default) stay distinguishable from
/// structural failures. Backends that surface misses as errors return
/// `NotFound`/`Expired` instead and never produce `Miss`.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// The key was present; carries the stored value
    Hit(Value),
    /// The key was absent
    Miss,
}

impl Lookup {
    /// Returns true for `Hit`.
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    /// Extracts the stored value, if any.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Miss => None,
        }
    }
}

// == Cache Backend Trait ==
/// Uniform store capability consumed by the decorator layer.
///
/// Each operation is individually atomic with respect to the others on the
/// same instance: implementations guard their state with a lock scoped to
/// the instance and held only for the duration of the single call. There
/// is no cross-operation transaction; a decorator's read-then-store
/// sequence may interleave with concurrent calls (last write wins).
///
/// External stores (a memcached-style remote cache, a persistent store)
/// plug in by implementing this trait.
pub trait CacheBackend: Send + Sync {
    /// Looks up a key. Misses are reported either as `Lookup::Miss` or as
    /// a `NotFound`/`Expired` error depending on the variant; anything
    /// else in the error channel is a structural failure.
    fn get(&self, key: &str) -> Result<Lookup>;

    /// Stores a value under a key, overwriting any previous value.
    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Removes an entry. Deleting an absent key fails with `NotFound`.
    fn delete(&self, key: &str) -> Result<()>;

    /// Drops every entry.
    fn clear(&self) -> Result<()>;
}

// == Shared Backend Handle ==
/// A backend shared between decorators.
pub type SharedBackend = Arc<dyn CacheBackend>;

// == Default Backend ==
// Process-wide backend used by decorators built without an explicit
// `backend` option. Lazily constructed to an `InMemoryCache` on first use
// and replaceable wholesale.

static DEFAULT_BACKEND: OnceLock<RwLock<SharedBackend>> = OnceLock::new();

fn default_slot() -> &'static RwLock<SharedBackend> {
    DEFAULT_BACKEND.get_or_init(|| RwLock::new(Arc::new(InMemoryCache::new())))
}

/// Returns the process-wide default backend, constructing the initial
/// `InMemoryCache` on first use.
pub fn default_backend() -> SharedBackend {
    default_slot()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replaces the process-wide default backend. Decorators already bound to
/// the previous default keep their reference; only future decorator
/// construction observes the replacement.
pub fn set_default_backend(backend: SharedBackend) {
    *default_slot().write().unwrap_or_else(PoisonError::into_inner) = backend;
}
