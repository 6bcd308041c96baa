//! Lock-free counter bank shared between cache operations, eviction
//! callbacks, and instrument polls.
//!
//! One atomic per tracked signal. Increments use `Relaxed` ordering:
//! counters are observational, each is read atomically on its own, and
//! cross-counter consistency is not required by any backend.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::reason::EvictionReason;

/// Per-instance monotonic counters for lookup and eviction signals.
///
/// `record_*` methods are lock-free and safe to call concurrently from
/// unbounded threads, including eviction-callback threads racing foreground
/// cache operations. Counters are never decremented.
#[derive(Debug, Default)]
pub struct CounterBank {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    token_expired: AtomicU64,
    capacity: AtomicU64,
}

impl CounterBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the hit counter.
    #[inline]
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the miss counter.
    #[inline]
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment the eviction counter for `reason`.
    ///
    /// Reasons that do not count as evictions (see
    /// [`EvictionReason::is_counted`]) are ignored.
    #[inline]
    pub fn record_eviction(&self, reason: EvictionReason) {
        match reason {
            EvictionReason::Expired => {
                self.expired.fetch_add(1, Ordering::Relaxed);
            }
            EvictionReason::TokenExpired => {
                self.token_expired.fetch_add(1, Ordering::Relaxed);
            }
            EvictionReason::Capacity => {
                self.capacity.fetch_add(1, Ordering::Relaxed);
            }
            EvictionReason::None | EvictionReason::Removed | EvictionReason::Replaced => {}
        }
    }

    /// Snapshot current counter values.
    ///
    /// Each counter is loaded atomically; the snapshot as a whole is not a
    /// cross-counter consistent cut.
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            token_expired: self.token_expired.load(Ordering::Relaxed),
            capacity: self.capacity.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    ///
    /// Bench/test support only; the production path never resets.
    pub fn reset(&self) {
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.expired.store(0, Ordering::Relaxed);
        self.token_expired.store(0, Ordering::Relaxed);
        self.capacity.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time view of a [`CounterBank`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub hits: u64,
    pub misses: u64,

    pub expired: u64,
    pub token_expired: u64,
    pub capacity: u64,
}

impl CounterSnapshot {
    /// Total lookups observed (hits plus misses).
    #[inline]
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }

    /// Total counted evictions across all reasons.
    #[inline]
    pub fn evictions(&self) -> u64 {
        self.expired + self.token_expired + self.capacity
    }

    /// Eviction count for one counted reason.
    ///
    /// Returns 0 for reasons that are never counted.
    pub fn evictions_for(&self, reason: EvictionReason) -> u64 {
        match reason {
            EvictionReason::Expired => self.expired,
            EvictionReason::TokenExpired => self.token_expired,
            EvictionReason::Capacity => self.capacity,
            EvictionReason::None | EvictionReason::Removed | EvictionReason::Replaced => 0,
        }
    }

    /// Hit ratio over all lookups, or 0.0 before the first lookup.
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.lookups();
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}
