//! Cache Statistics Module
//!
//! Tracks per-backend performance metrics: hits, misses, and policy
//! removals (capacity evictions and TTL expiries).

use serde::Serialize;

// == Cache Stats ==
/// Performance counters for one backend instance.
///
/// Counters cover reads and policy removals only; explicit `delete` and
/// `clear` calls are caller requests, not cache behavior, and are not
/// counted.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    /// Number of reads served from the store
    pub hits: u64,
    /// Number of reads that found nothing servable (absent or expired)
    pub misses: u64,
    /// Number of entries removed by the LRU capacity policy
    pub evictions: u64,
    /// Number of entries collected after their TTL elapsed
    pub expirations: u64,
    /// Number of entries present when the snapshot was taken
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Record Hit ==
    /// Increments the hit counter.
    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Increments the miss counter.
    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    // == Record Eviction ==
    /// Increments the eviction counter.
    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Record Expiration ==
    /// Increments the expiration counter.
    pub(crate) fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
