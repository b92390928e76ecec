//! LRU Backend Module
//!
//! Bounded store that evicts the least-recently-used entry when a new key
//! arrives at capacity.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::debug;

use crate::backend::{CacheBackend, CacheStats, Lookup};
use crate::error::{CacheError, Result};

// == Public Constants ==
/// Capacity used when none is configured.
pub const DEFAULT_MAX_ITEMS: usize = 32;

// == LRU State ==
/// Entries plus their recency order, guarded as one unit so eviction
/// decisions and the map never drift apart.
///
/// The order deque holds most-recent at the front, least-recent at the
/// back. Ties break by strict insertion/access order.
#[derive(Debug)]
struct LruState {
    entries: HashMap<String, Value>,
    order: VecDeque<String>,
    max_items: usize,
    stats: CacheStats,
}

impl LruState {
    /// Marks a key as most recently used.
    fn touch(&mut self, key: &str) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.to_string());
    }

    /// Drops the least recently used entry, returning its key.
    fn evict_oldest(&mut self) -> Option<String> {
        let key = self.order.pop_back()?;
        self.entries.remove(&key);
        Some(key)
    }

    /// Removes a key from both the map and the recency order.
    fn remove(&mut self, key: &str) -> Option<Value> {
        let value = self.entries.remove(key)?;
        self.order.retain(|k| k != key);
        Some(value)
    }
}

// == LRU Cache ==
/// Recency-ordered store bounded by `max_items`.
///
/// `get` on a present key promotes it to most-recently-used; `get` on an
/// absent key fails with `NotFound` rather than returning a miss value.
/// Overwriting an existing key counts as an access and never evicts.
#[derive(Debug)]
pub struct LruCache {
    state: Mutex<LruState>,
}

impl LruCache {
    // == Constructor ==
    /// Creates a cache holding at most `max_items` entries. A capacity of
    /// zero is treated as one: the store always admits the newest entry.
    pub fn new(max_items: usize) -> Self {
        Self {
            state: Mutex::new(LruState {
                entries: HashMap::new(),
                order: VecDeque::new(),
                max_items: max_items.max(1),
                stats: CacheStats::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruState> {
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

impl Default for LruCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITEMS)
    }
}

impl CacheBackend for LruCache {
    fn get(&self, key: &str) -> Result<Lookup> {
        let mut state = self.lock();
        match state.entries.get(key) {
            Some(value) => {
                let value = value.clone();
                state.touch(key);
                state.stats.record_hit();
                Ok(Lookup::Hit(value))
            }
            None => {
                state.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut state = self.lock();

        // Overwrites never evict; only a new key at capacity does
        if !state.entries.contains_key(key) && state.entries.len() >= state.max_items {
            if let Some(evicted) = state.evict_oldest() {
                state.stats.record_eviction();
                debug!("evicted least-recently-used key {}", evicted);
            }
        }

        state.entries.insert(key.to_string(), value);
        state.touch(key);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        if self.lock().remove(key).is_some() {
            Ok(())
        } else {
            Err(CacheError::NotFound(key.to_string()))
        }
    }

    fn clear(&self) -> Result<()> {
        let mut state = self.lock();
        state.entries.clear();
        state.order.clear();
        Ok(())
    }
}
