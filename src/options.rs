//! Options Module
//!
//! The validated option bag binding one decorator to one backend and one
//! key-resolution mode. All validation happens when the decorator is
//! built, never at call time.

use std::sync::Arc;
use std::time::Duration;

use crate::backend::{ExpiringCache, LruCache, SharedBackend};
use crate::decorator::{CacheDecorator, DecoratorConfig, OperationMode};
use crate::error::{CacheError, Result};
use crate::key::KeySource;

// Named in configuration errors so callers learn the recognized set.
const RECOGNIZED_OPTIONS: &str =
    "cache_key, expire_key, backend, ignore_errors, max_age, max_items";

// == Cache Options ==
/// Builder for a [`CacheDecorator`].
///
/// Exactly one of `cache_key` / `expire_key` selects the operation mode.
/// `max_age` and `max_items` give the decorator a dedicated
/// [`ExpiringCache`] or [`LruCache`]; otherwise it binds to the supplied
/// `backend`, falling back to the process-wide default.
#[derive(Default)]
pub struct CacheOptions {
    cache_key: Option<KeySource>,
    expire_key: Option<KeySource>,
    backend: Option<SharedBackend>,
    ignore_errors: Option<bool>,
    max_age: Option<Duration>,
    max_items: Option<usize>,
}

impl std::fmt::Debug for CacheOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheOptions")
            .field("cache_key", &self.cache_key)
            .field("expire_key", &self.expire_key)
            .field("backend", &self.backend.as_ref().map(|_| ".."))
            .field("ignore_errors", &self.ignore_errors)
            .field("max_age", &self.max_age)
            .field("max_items", &self.max_items)
            .finish()
    }
}

impl CacheOptions {
    // == Constructor ==
    /// Starts an empty option bag.
    pub fn new() -> Self {
        Self::default()
    }

    // == Key Selection ==
    /// Caches the target's result under this key (cache-on-call mode).
    /// Accepts key text (literal or template) or a ready [`crate::KeySpec`].
    pub fn cache_key(mut self, key: impl Into<KeySource>) -> Self {
        self.cache_key = Some(key.into());
        self
    }

    /// Deletes this key before every call (evict-before-call mode).
    pub fn expire_key(mut self, key: impl Into<KeySource>) -> Self {
        self.expire_key = Some(key.into());
        self
    }

    // == Backend Selection ==
    /// Binds the decorator to an explicit backend instance.
    pub fn backend(mut self, backend: SharedBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Gives the decorator a dedicated [`ExpiringCache`] with this TTL.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Gives the decorator a dedicated [`LruCache`] with this capacity.
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    // == Flags ==
    /// Whether structural backend failures are suppressed (default true).
    pub fn ignore_errors(mut self, ignore: bool) -> Self {
        self.ignore_errors = Some(ignore);
        self
    }

    // == Build ==
    /// Validates the bag and produces the decorator.
    pub fn build(mut self) -> Result<CacheDecorator> {
        let (source, mode) = match (self.cache_key.take(), self.expire_key.take()) {
            (Some(_), Some(_)) => {
                return Err(CacheError::Configuration(
                    "cache_key and expire_key are mutually exclusive on one decorator"
                        .to_string(),
                ));
            }
            (Some(source), None) => (source, OperationMode::CacheOnCall),
            (None, Some(source)) => (source, OperationMode::EvictBeforeCall),
            (None, None) => {
                return Err(CacheError::Configuration(format!(
                    "expecting one of {RECOGNIZED_OPTIONS} as an option, \
                     with at least cache_key or expire_key"
                )));
            }
        };

        let backend = self.select_backend()?;

        Ok(CacheDecorator::from_config(DecoratorConfig {
            key: source.into_spec()?,
            mode,
            backend,
            ignore_errors: self.ignore_errors.unwrap_or(true),
        }))
    }

    fn select_backend(&self) -> Result<SharedBackend> {
        if self.backend.is_some() && (self.max_age.is_some() || self.max_items.is_some()) {
            return Err(CacheError::Configuration(
                "max_age/max_items configure a dedicated backend and cannot be combined \
                 with an explicit backend"
                    .to_string(),
            ));
        }

        match (self.max_age, self.max_items) {
            (Some(_), Some(_)) => Err(CacheError::Configuration(
                "max_age selects an ExpiringCache and max_items an LruCache; supply one"
                    .to_string(),
            )),
            (Some(max_age), None) => Ok(Arc::new(ExpiringCache::new(max_age))),
            (None, Some(max_items)) => Ok(Arc::new(LruCache::new(max_items))),
            (None, None) => Ok(self
                .backend
                .clone()
                .unwrap_or_else(crate::backend::default_backend)),
        }
    }
}
