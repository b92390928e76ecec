//! Decorator Module
//!
//! The per-function orchestration object: resolve key, consult or evict
//! the backend, invoke the target on miss, store the result.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::backend::{Lookup, SharedBackend};
use crate::error::Result;
use crate::key::{CallArgs, KeySpec};

// == Operation Mode ==
/// What a decorator does before invoking its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationMode {
    /// Serve from cache on hit, compute and store on miss
    CacheOnCall,
    /// Delete the resolved key, then always invoke the target
    EvictBeforeCall,
}

// == Decorator Config ==
/// Everything a decorator holds: constructed once at decoration time,
/// immutable thereafter, shared by all invocations.
#[derive(Clone)]
pub struct DecoratorConfig {
    pub key: KeySpec,
    pub mode: OperationMode,
    pub backend: SharedBackend,
    pub ignore_errors: bool,
}

impl fmt::Debug for DecoratorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorConfig")
            .field("key", &self.key)
            .field("mode", &self.mode)
            .field("ignore_errors", &self.ignore_errors)
            .finish_non_exhaustive()
    }
}

// == Cache Decorator ==
/// Wraps calls to one target function with caching or eviction.
///
/// Built via [`crate::CacheOptions`]. One instance serves every call to
/// the wrapped function; key resolution and backend access happen fresh
/// on each call.
///
/// Key resolution failures always propagate, whatever `ignore_errors`
/// says: without a key there is no meaningful cache operation. Structural
/// backend failures are governed by `ignore_errors`: suppressed (the
/// target still runs, its fresh result is returned) or propagated.
#[derive(Debug)]
pub struct CacheDecorator {
    config: DecoratorConfig,
}

impl CacheDecorator {
    // == Constructor ==
    /// Builds a decorator from an already-validated config.
    pub fn from_config(config: DecoratorConfig) -> Self {
        Self { config }
    }

    /// The decorator's operation mode.
    pub fn mode(&self) -> OperationMode {
        self.config.mode
    }

    /// The backend this decorator is bound to.
    pub fn backend(&self) -> &SharedBackend {
        &self.config.backend
    }

    // == Call ==
    /// Runs one invocation of the wrapped function.
    ///
    /// `args` is the capture used for key resolution; `target` is the
    /// actual computation, invoked at most once.
    pub fn call<R, F>(&self, args: &CallArgs, target: F) -> Result<R>
    where
        R: Serialize + DeserializeOwned,
        F: FnOnce() -> R,
    {
        match self.config.mode {
            OperationMode::CacheOnCall => self.cache_on_call(args, target),
            OperationMode::EvictBeforeCall => self.evict_before_call(args, target),
        }
    }

    // == Cache-On-Call Path ==
    fn cache_on_call<R, F>(&self, args: &CallArgs, target: F) -> Result<R>
    where
        R: Serialize + DeserializeOwned,
        F: FnOnce() -> R,
    {
        let key = self.config.key.resolve(args)?;

        match self.config.backend.get(&key) {
            Ok(Lookup::Hit(value)) => match serde_json::from_value(value) {
                Ok(cached) => {
                    debug!("cache hit for key {}", key);
                    return Ok(cached);
                }
                Err(err) => {
                    // Stored under this key by something with another type;
                    // treat like any structural failure
                    if !self.config.ignore_errors {
                        return Err(err.into());
                    }
                    warn!("ignoring undecodable cached value for key {}: {}", key, err);
                }
            },
            Ok(Lookup::Miss) => {
                debug!("cache miss for key {}", key);
            }
            Err(err) if err.is_miss() => {
                debug!("cache miss for key {}: {}", key, err);
            }
            Err(err) => {
                if !self.config.ignore_errors {
                    return Err(err);
                }
                warn!("ignoring backend error reading key {}: {}", key, err);
            }
        }

        let result = target();

        match serde_json::to_value(&result) {
            Ok(value) => {
                if let Err(err) = self.config.backend.set(&key, value) {
                    if !self.config.ignore_errors {
                        return Err(err);
                    }
                    warn!("ignoring backend error storing key {}: {}", key, err);
                } else {
                    debug!("stored result under key {}", key);
                }
            }
            Err(err) => {
                if !self.config.ignore_errors {
                    return Err(err.into());
                }
                warn!("ignoring unserializable result for key {}: {}", key, err);
            }
        }

        Ok(result)
    }

    // == Evict-Before-Call Path ==
    fn evict_before_call<R, F>(&self, args: &CallArgs, target: F) -> Result<R>
    where
        F: FnOnce() -> R,
    {
        let key = self.config.key.resolve(args)?;

        match self.config.backend.delete(&key) {
            Ok(()) => debug!("evicted key {}", key),
            // Nothing to expire is not an error, whatever ignore_errors says
            Err(err) if err.is_miss() => debug!("nothing to evict under key {}", key),
            Err(err) => {
                if !self.config.ignore_errors {
                    return Err(err);
                }
                warn!("ignoring backend error evicting key {}: {}", key, err);
            }
        }

        Ok(target())
    }
}
