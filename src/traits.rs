//! # Collaborator Interfaces
//!
//! This module defines the two seams the decorator sits between: the cache
//! being observed and the metrics backend receiving readings. Both are
//! expressed as minimal capability traits so any conforming implementation
//! can be plugged in without inheriting from a concrete type.
//!
//! ## Architecture
//!
//! ```text
//!   caller ──► MeteredCache ──► ObservedCache (wrapped cache)
//!                   │                  │
//!                   │                  └─ eviction listener, fired once
//!                   │                     per entry on any thread
//!                   ▼
//!              CounterBank ◄── increments
//!                   ▲
//!                   │ snapshot at poll time
//!         ObservableRegistry (metrics backend, pulls at its own cadence)
//! ```
//!
//! ## Trait Summary
//!
//! | Trait                | Consumed by          | Purpose                      |
//! |----------------------|----------------------|------------------------------|
//! | `ObservedCache`      | `MeteredCache`       | get/insert/remove delegate   |
//! | `ObservableRegistry` | `InstrumentPublisher`| pull-based instrument surface|
//!
//! ## Eviction Listener Contract
//!
//! The wrapped cache invokes the listener handed over in [`InsertOptions`]
//! exactly once per stored entry, when that entry leaves the cache, passing
//! the owned key, the owned value, and the [`EvictionReason`]. Invocation
//! may happen on any thread, with no ordering relative to other operations
//! beyond happening after the corresponding insert.

use std::sync::Arc;

use crate::reason::EvictionReason;
use crate::tags::Tag;

/// One-shot notification fired when a stored entry leaves the cache.
pub type EvictionListener<K, V> = Box<dyn FnOnce(K, V, EvictionReason) + Send>;

/// Per-insert options handed to the wrapped cache.
///
/// Currently carries only the eviction listener; the decorator attaches one
/// on every insert.
pub struct InsertOptions<K: 'static, V: 'static> {
    eviction_listener: Option<EvictionListener<K, V>>,
}

impl<K: 'static, V: 'static> Default for InsertOptions<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: 'static, V: 'static> InsertOptions<K, V> {
    pub fn new() -> Self {
        Self {
            eviction_listener: None,
        }
    }

    /// Attach a one-shot eviction listener.
    pub fn on_eviction(mut self, listener: EvictionListener<K, V>) -> Self {
        self.eviction_listener = Some(listener);
        self
    }

    /// Take the listener out, leaving `None` behind.
    ///
    /// The wrapped cache calls this once while storing the entry.
    pub fn take_eviction_listener(&mut self) -> Option<EvictionListener<K, V>> {
        self.eviction_listener.take()
    }
}

impl<K: 'static, V: 'static> std::fmt::Debug for InsertOptions<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsertOptions")
            .field("eviction_listener", &self.eviction_listener.is_some())
            .finish()
    }
}

/// Minimal capability interface of the cache being observed.
///
/// Implementations take `&self` and are expected to synchronize internally;
/// the decorator is accessed concurrently from arbitrary threads. Values
/// are returned owned, so implementations typically store `Arc`ed or
/// cheaply cloneable values.
pub trait ObservedCache<K: 'static, V: 'static> {
    /// Look up a key, returning its value if present.
    fn try_get(&self, key: &K) -> Option<V>;

    /// Insert or overwrite an entry.
    ///
    /// The cache must store the eviction listener from `options` (if any)
    /// with the entry and honor the exactly-once contract described in the
    /// module docs. Overwriting an existing key releases the old entry with
    /// [`EvictionReason::Replaced`].
    fn insert(&self, key: K, value: V, options: InsertOptions<K, V>);

    /// Remove an entry, releasing it with [`EvictionReason::Removed`] if it
    /// existed.
    fn remove(&self, key: &K);
}

impl<K: 'static, V: 'static, C> ObservedCache<K, V> for Arc<C>
where
    C: ObservedCache<K, V> + ?Sized,
{
    fn try_get(&self, key: &K) -> Option<V> {
        (**self).try_get(key)
    }

    fn insert(&self, key: K, value: V, options: InsertOptions<K, V>) {
        (**self).insert(key, value, options)
    }

    fn remove(&self, key: &K) {
        (**self).remove(key)
    }
}

/// Handle to a registered observable instrument, used for unregistration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstrumentId(u64);

impl InstrumentId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// One polled value with its composed tags.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub value: u64,
    pub tags: Vec<Tag>,
}

impl Reading {
    pub fn new(value: u64, tags: Vec<Tag>) -> Self {
        Self { value, tags }
    }
}

/// Callback invoked by the backend at its own cadence to pull readings.
pub type PollCallback = Box<dyn Fn() -> Vec<Reading> + Send + Sync>;

/// Pull-based metrics backend interface.
///
/// Registration happens once at decorator construction, never per
/// operation. The backend owns the polling thread and cadence; the
/// decorator never pushes.
pub trait ObservableRegistry: Send + Sync {
    /// Register a pull-based counter instrument.
    ///
    /// `poll` is invoked by the backend whenever it wants fresh readings.
    /// Concurrent registration from many threads must be safe.
    fn register_observable_counter(
        &self,
        name: &str,
        unit: &str,
        description: &str,
        poll: PollCallback,
    ) -> InstrumentId;

    /// Remove a previously registered instrument.
    ///
    /// Unknown ids are ignored.
    fn unregister(&self, id: InstrumentId);

    /// Reserve a cache name within this registry.
    ///
    /// Returns `false` if the name is already reserved; registering two
    /// instances under one name would make their readings
    /// indistinguishable, so the duplicate is rejected at construction.
    fn reserve_scope(&self, name: &str) -> bool;

    /// Release a name reserved with [`reserve_scope`](Self::reserve_scope).
    fn release_scope(&self, name: &str);
}
