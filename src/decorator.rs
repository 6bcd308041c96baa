//! Metered cache decorator.
//!
//! ## Architecture
//!
//! ```text
//!   get/insert/remove ──► state check ──► delegate to wrapped cache
//!                                   │
//!                                   ├─ hit/miss counted on atomics
//!                                   └─ insert attaches a one-shot
//!                                      eviction listener
//!
//!   wrapped cache (any thread) ──► listener ──► classify ──► count
//! ```
//!
//! ## Concurrency
//!
//! Counting is lock-free; no cache operation ever blocks on metrics
//! machinery. The wrapped cache handle sits behind a read-mostly
//! `RwLock<Option<C>>` solely so disposal can drop it race-free; the
//! counting path and eviction listeners never acquire that lock, so no
//! lock cycle exists between `dispose` and a listener running on another
//! thread.
//!
//! ## Disposal
//!
//! `dispose` is idempotent under arbitrary concurrency: one caller wins
//! the `Active → Disposing` transition and tears down (optionally drops
//! the wrapped cache, unregisters instruments, releases the reserved
//! name), everyone else returns immediately. Operations that overlap the
//! `Disposing` window complete against the last consistent state;
//! operations arriving after `Disposed` get a [`DisposedError`]. Eviction
//! listeners that fire during or after disposal are safe no-ops once the
//! state has reached `Disposed`.

use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::builder::MeteredCacheBuilder;
use crate::counters::{CounterBank, CounterSnapshot};
use crate::error::DisposedError;
use crate::lifecycle::{DisposalCell, DisposalState};
use crate::tags::TagSet;
use crate::traits::{
    EvictionListener, InsertOptions, InstrumentId, ObservableRegistry, ObservedCache,
};

/// Shared per-instance state: counters, base tags, disposal phase.
///
/// Reachable from the decorator, from both poll closures, and (weakly)
/// from every outstanding eviction listener.
#[derive(Debug)]
pub(crate) struct MeterCore {
    pub(crate) bank: CounterBank,
    pub(crate) tags: TagSet,
    pub(crate) state: DisposalCell,
}

impl MeterCore {
    pub(crate) fn new(tags: TagSet) -> Self {
        Self {
            bank: CounterBank::new(),
            tags,
            state: DisposalCell::new(),
        }
    }
}

/// Transparent metrics decorator over a cache `C`.
///
/// Delegates `get`/`insert`/`remove` to the wrapped cache unchanged while
/// counting hits, misses, and cache-initiated evictions. Construct through
/// [`MeteredCacheBuilder`].
///
/// # Example
///
/// ```ignore
/// let registry = Arc::new(MeterRegistry::new());
/// let cache = MeteredCacheBuilder::new()
///     .name("sessions")
///     .try_build(inner, registry.clone())?;
///
/// cache.insert("k1", session)?;
/// assert!(cache.get(&"k1")?.is_some());
/// ```
pub struct MeteredCache<C, K, V> {
    inner: RwLock<Option<C>>,
    core: Arc<MeterCore>,
    registry: Arc<dyn ObservableRegistry>,
    instruments: [InstrumentId; 2],
    name: Option<String>,
    dispose_inner: bool,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<C, K, V> MeteredCache<C, K, V> {
    /// Start configuring a new decorator.
    pub fn builder() -> MeteredCacheBuilder {
        MeteredCacheBuilder::new()
    }

    pub(crate) fn from_parts(
        inner: C,
        core: Arc<MeterCore>,
        registry: Arc<dyn ObservableRegistry>,
        instruments: [InstrumentId; 2],
        name: Option<String>,
        dispose_inner: bool,
    ) -> Self {
        Self {
            inner: RwLock::new(Some(inner)),
            core,
            registry,
            instruments,
            name,
            dispose_inner,
            _marker: PhantomData,
        }
    }

    /// The configured cache name, if any.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Current lifecycle phase.
    pub fn state(&self) -> DisposalState {
        self.core.state.state()
    }

    /// Returns `true` once disposal has completed.
    pub fn is_disposed(&self) -> bool {
        self.core.state.is_disposed()
    }

    /// In-process view of the instance counters.
    pub fn snapshot(&self) -> Result<CounterSnapshot, DisposedError> {
        self.ensure_usable()?;
        Ok(self.core.bank.snapshot())
    }

    /// Tear down this instance exactly once.
    ///
    /// The winning caller drops the wrapped cache when configured to,
    /// unregisters both instruments, and releases the reserved cache name.
    /// Concurrent and repeated calls return immediately with no error and
    /// no double effects. Also invoked from `Drop`.
    pub fn dispose(&self) {
        if !self.core.state.begin() {
            return;
        }
        if self.dispose_inner {
            // Waits for in-flight operations holding the read lock, then
            // drops the wrapped cache outside any other lock.
            let inner = self.inner.write().take();
            drop(inner);
        }
        for id in self.instruments {
            self.registry.unregister(id);
        }
        if let Some(name) = self.name.as_deref() {
            self.registry.release_scope(name);
        }
        self.core.state.finish();
        log::debug!(
            "metered cache {} disposed",
            self.name.as_deref().unwrap_or("<unnamed>")
        );
    }

    fn ensure_usable(&self) -> Result<(), DisposedError> {
        if self.core.state.is_disposed() {
            Err(DisposedError::new(self.name.as_deref()))
        } else {
            Ok(())
        }
    }
}

impl<C, K, V> MeteredCache<C, K, V>
where
    C: ObservedCache<K, V>,
    K: 'static,
    V: 'static,
{
    /// Look up `key` in the wrapped cache, counting a hit or a miss.
    ///
    /// Returns the delegate's result unchanged. Never blocks beyond the
    /// wrapped cache's own lookup cost.
    pub fn get(&self, key: &K) -> Result<Option<V>, DisposedError> {
        self.ensure_usable()?;
        let guard = self.inner.read();
        let cache = guard
            .as_ref()
            .ok_or_else(|| DisposedError::new(self.name.as_deref()))?;

        let found = cache.try_get(key);
        if found.is_some() {
            self.core.bank.record_hit();
        } else {
            self.core.bank.record_miss();
        }
        Ok(found)
    }

    /// Insert `key`/`value`, attaching a one-shot eviction listener.
    ///
    /// The wrapped cache fires the listener exactly once when the entry
    /// later leaves it; counted reasons increment the eviction counter.
    pub fn insert(&self, key: K, value: V) -> Result<(), DisposedError> {
        self.ensure_usable()?;
        let guard = self.inner.read();
        let cache = guard
            .as_ref()
            .ok_or_else(|| DisposedError::new(self.name.as_deref()))?;

        let options = InsertOptions::new().on_eviction(eviction_listener(&self.core));
        cache.insert(key, value, options);
        Ok(())
    }

    /// Remove `key` from the wrapped cache.
    ///
    /// Not counted itself; the resulting notification fires with
    /// [`EvictionReason::Removed`](crate::reason::EvictionReason::Removed)
    /// and is excluded by the classifier.
    pub fn remove(&self, key: &K) -> Result<(), DisposedError> {
        self.ensure_usable()?;
        let guard = self.inner.read();
        let cache = guard
            .as_ref()
            .ok_or_else(|| DisposedError::new(self.name.as_deref()))?;

        cache.remove(key);
        Ok(())
    }
}

impl<C, K, V> Drop for MeteredCache<C, K, V> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<C, K, V> std::fmt::Debug for MeteredCache<C, K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MeteredCache")
            .field("name", &self.name)
            .field("state", &self.core.state.state())
            .finish()
    }
}

/// Build the per-insert eviction listener for `core`.
///
/// The listener holds the core weakly: once the decorator is gone the
/// listener degrades to a no-op, and after `Disposed` it records nothing.
/// Any panic inside is caught at this boundary so nothing propagates back
/// into the wrapped cache's removal machinery.
fn eviction_listener<K: 'static, V: 'static>(core: &Arc<MeterCore>) -> EvictionListener<K, V> {
    let core = Arc::downgrade(core);
    Box::new(move |_key, _value, reason| {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            if let Some(core) = core.upgrade() {
                if !core.state.is_disposed() && reason.is_counted() {
                    core.bank.record_eviction(reason);
                }
            }
        }));
        if outcome.is_err() {
            log::error!("eviction listener panicked; eviction not recorded");
        }
    })
}
