// ==============================================
// DECORATOR CONCURRENCY TESTS (integration)
// ==============================================
//
// Race drills for the lock-free counting path. These require
// multi-threaded execution and cannot live inline.

mod common;

use std::sync::{Arc, Barrier};
use std::thread;

use common::ScriptedCache;
use meterkit::builder::MeteredCacheBuilder;
use meterkit::decorator::MeteredCache;
use meterkit::registry::MeterRegistry;

type Inner = Arc<ScriptedCache<u64, u64>>;
type Cache = MeteredCache<Inner, u64, u64>;

fn metered(inner: ScriptedCache<u64, u64>) -> (Arc<Cache>, Inner, Arc<MeterRegistry>) {
    let inner = Arc::new(inner);
    let registry = Arc::new(MeterRegistry::new());
    let cache = MeteredCacheBuilder::new()
        .name("concurrency")
        .try_build(inner.clone(), registry.clone())
        .unwrap();
    (Arc::new(cache), inner, registry)
}

// ==============================================
// Lost-Update Freedom
// ==============================================
//
// N threads of M lookups each must land exactly N*M increments across
// hits and misses.

mod lookup_totals {
    use super::*;

    #[test]
    fn interleaved_lookups_lose_no_updates() {
        let threads: u64 = 8;
        // threads * per_thread divides the 128-key space evenly, so the
        // hit/miss split is exact
        let per_thread: u64 = 4_096;

        let (cache, _inner, _registry) = metered(ScriptedCache::unbounded());
        for k in 0..64 {
            cache.insert(k, k).unwrap();
        }

        let barrier = Arc::new(Barrier::new(threads as usize));
        let handles: Vec<_> = (0..threads)
            .map(|tid| {
                let cache = cache.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..per_thread {
                        // half the key space is resident, half is not
                        let key = (tid * per_thread + i) % 128;
                        let _ = cache.get(&key).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snap = cache.snapshot().unwrap();
        assert_eq!(
            snap.lookups(),
            threads * per_thread,
            "hits + misses must equal the exact number of lookups"
        );
        assert_eq!(snap.hits, threads * per_thread / 2);
        assert_eq!(snap.misses, threads * per_thread / 2);
    }
}

// ==============================================
// Eviction Callbacks vs Foreground Operations
// ==============================================
//
// Background expiry sweeps fire listeners concurrently with foreground
// lookups and inserts; every notification must land exactly once.

mod callback_races {
    use super::*;

    #[test]
    fn background_expiry_races_foreground_lookups() {
        let entries: u64 = 2_000;
        let (cache, inner, _registry) = metered(ScriptedCache::unbounded());

        for k in 0..entries {
            cache.insert(k, k).unwrap();
        }

        let barrier = Arc::new(Barrier::new(3));

        let sweeper = {
            let inner = inner.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for k in 0..entries {
                    if k % 2 == 0 {
                        inner.expire(&k);
                    } else {
                        inner.expire_token(&k);
                    }
                }
            })
        };

        let reader = {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for k in 0..entries {
                    let _ = cache.get(&k).unwrap();
                }
            })
        };

        let writer = {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for k in entries..entries + 500 {
                    cache.insert(k, k).unwrap();
                }
            })
        };

        sweeper.join().unwrap();
        reader.join().unwrap();
        writer.join().unwrap();

        let snap = cache.snapshot().unwrap();
        assert_eq!(snap.expired, entries / 2);
        assert_eq!(snap.token_expired, entries / 2);
        assert_eq!(snap.lookups(), entries);
    }

    #[test]
    fn concurrent_capacity_churn_counts_every_eviction() {
        let capacity = 16;
        let threads: u64 = 4;
        let per_thread: u64 = 1_000;

        let (cache, inner, _registry) = metered(ScriptedCache::with_capacity(capacity));

        let barrier = Arc::new(Barrier::new(threads as usize));
        let handles: Vec<_> = (0..threads)
            .map(|tid| {
                let cache = cache.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    for i in 0..per_thread {
                        // distinct key ranges so every insert is a new entry
                        cache.insert(tid * per_thread + i, i).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let inserted = threads * per_thread;
        let resident = inner.len() as u64;
        let snap = cache.snapshot().unwrap();
        assert_eq!(
            snap.capacity,
            inserted - resident,
            "every entry that left under pressure must be counted exactly once"
        );
        assert_eq!(resident, capacity as u64);
    }

    #[test]
    fn polling_runs_concurrently_with_operations() {
        let (cache, _inner, registry) = metered(ScriptedCache::unbounded());
        let barrier = Arc::new(Barrier::new(2));

        let poller = {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..200 {
                    let metrics = registry.collect();
                    assert_eq!(metrics.len(), 2);
                }
            })
        };

        let worker = {
            let cache = cache.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                for k in 0..2_000u64 {
                    cache.insert(k, k).unwrap();
                    let _ = cache.get(&k).unwrap();
                }
            })
        };

        poller.join().unwrap();
        worker.join().unwrap();

        // the final poll observes everything that happened before it
        let snap = cache.snapshot().unwrap();
        assert_eq!(snap.hits, 2_000);
    }
}
