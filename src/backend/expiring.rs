//! Expiring Backend Module
//!
//! TTL-based store: every entry carries an expiry instant fixed when the
//! entry is created. Expiry is enforced lazily on read; there is no
//! background sweep.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;
use tracing::debug;

use crate::backend::{CacheBackend, CacheStats, Lookup};
use crate::error::{CacheError, Result};

// == Expiring Entry ==
/// A stored value plus the instant it stops being servable.
#[derive(Debug, Clone)]
struct ExpiringEntry {
    value: Value,
    expires_at: Instant,
}

impl ExpiringEntry {
    fn new(value: Value, max_age: Duration) -> Self {
        Self {
            value,
            expires_at: Instant::now() + max_age,
        }
    }

    /// An entry is expired once the current time reaches `expires_at`,
    /// so `max_age` of zero expires immediately.
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

// == Expiring State ==
/// Entries plus read/expiry counters, guarded as one unit.
#[derive(Debug, Default)]
struct ExpiringState {
    entries: HashMap<String, ExpiringEntry>,
    stats: CacheStats,
}

// == Expiring Cache ==
/// Store whose entries live for a fixed `max_age` from creation.
///
/// Overwriting a live entry updates the value without extending its
/// expiry; the window restarts only when the entry had already expired or
/// been removed. Reads never refresh expiry.
#[derive(Debug)]
pub struct ExpiringCache {
    max_age: Duration,
    state: Mutex<ExpiringState>,
}

impl ExpiringCache {
    // == Constructor ==
    /// Creates a cache whose entries expire `max_age` after creation.
    pub fn new(max_age: Duration) -> Self {
        Self {
            max_age,
            state: Mutex::new(ExpiringState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ExpiringState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the number of entries still physically present, including
    /// expired ones not yet collected by a read.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// Returns true if no entries are physically present.
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    // == Stats ==
    /// Returns a snapshot of the performance counters. Expired reads count
    /// both as a miss and as an expiration.
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        let mut stats = state.stats;
        stats.total_entries = state.entries.len();
        stats
    }
}

impl CacheBackend for ExpiringCache {
    fn get(&self, key: &str) -> Result<Lookup> {
        let mut state = self.lock();
        match state.entries.get(key) {
            None => {
                state.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
            Some(entry) if entry.is_expired() => {
                state.entries.remove(key);
                state.stats.record_miss();
                state.stats.record_expiration();
                debug!("removed expired entry for key {}", key);
                Err(CacheError::Expired(key.to_string()))
            }
            Some(entry) => {
                let value = entry.value.clone();
                state.stats.record_hit();
                Ok(Lookup::Hit(value))
            }
        }
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let mut state = self.lock();
        match state.entries.get_mut(key) {
            // Live entry: update the value, keep the original expiry
            Some(entry) if !entry.is_expired() => {
                entry.value = value;
            }
            // Absent or already expired: start a fresh window
            _ => {
                state
                    .entries
                    .insert(key.to_string(), ExpiringEntry::new(value, self.max_age));
            }
        }
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
