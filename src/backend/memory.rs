//! In-Memory Backend Module
//!
//! The simplest backend: an unbounded map with no expiry or eviction.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::backend::{CacheBackend, CacheStats, Lookup};
use crate::error::{CacheError, Result};

// == Memory State ==
/// Entries plus read counters, guarded as one unit.
#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, Value>,
    stats: CacheStats,
}

// == In-Memory Cache ==
/// Unbounded in-memory store. Entries only leave via `delete` or `clear`.
///
/// This is the process-wide default backend. Unlike the other variants,
/// `get` on an absent key is not an error: it returns [`Lookup::Miss`] so
/// callers can tell "never cached" apart from a backend failure.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    state: Mutex<MemoryState>,
}

impl InMemoryCache {
    // == Constructor ==
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the performance counters.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let mut stats = state.stats;
        stats.total_entries = state.entries.len();
        stats
    }
}

impl CacheBackend for InMemoryCache {
    fn get(&self, key: &str) -> Result<Lookup> {
        let mut state = self.lock();
        match state.entries.get(key) {
            Some(value) => {
                let value = value.clone();
                state.stats.record_hit();
                Ok(Lookup::Hit(value))
            }
            None => {
                state.stats.record_miss();
                Ok(Lookup::Miss)
            }
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.lock().entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        if self.lock().entries.remove(key).is_some() {
            Ok(())
        } else {
            Err(CacheError::NotFound(key.to_string()))
        }
    }

    fn clear(&self) -> Result<()> {
        self.lock().entries.clear();
        Ok(())
    }
}
