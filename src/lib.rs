//! memocache - declarative caching and invalidation for function calls
//!
//! Wraps a computation with a key-derivation rule and a pluggable backend
//! store: results are memoized under keys derived from the call's
//! arguments, and a companion decorator can evict an entry before a
//! related function executes.
//!
//! ```
//! use memocache::{CacheOptions, CallArgs};
//! use std::sync::Arc;
//!
//! let deco = CacheOptions::new()
//!     .cache_key("{0}")
//!     .backend(Arc::new(memocache::InMemoryCache::new()))
//!     .build()
//!     .unwrap();
//!
//! let args = CallArgs::new().positional("user:42");
//! let profile: String = deco.call(&args, || "expensive lookup".to_string()).unwrap();
//! ```

pub mod backend;
pub mod decorator;
pub mod error;
pub mod key;
pub mod options;

pub use backend::{
    default_backend, set_default_backend, CacheBackend, CacheStats, ExpiringCache, InMemoryCache,
    Lookup, LruCache, SharedBackend,
};
pub use decorator::{CacheDecorator, DecoratorConfig, OperationMode};
pub use error::{CacheError, Result};
pub use key::{CallArgs, KeySpec};
pub use options::CacheOptions;
