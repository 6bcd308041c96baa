// Shared test support: a scripted wrapped cache that honors the
// eviction-listener contract with explicit, caller-controlled reasons.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::sync::Mutex;

use meterkit::reason::EvictionReason;
use meterkit::traits::{EvictionListener, InsertOptions, ObservedCache};

struct Entry<K, V> {
    value: V,
    listener: Option<EvictionListener<K, V>>,
}

struct State<K, V> {
    entries: HashMap<K, Entry<K, V>>,
    order: VecDeque<K>,
}

/// In-memory cache with FIFO capacity eviction and scripted expiry.
///
/// Fires each entry's eviction listener exactly once, after the internal
/// lock is released, with the reason that removed it: `Capacity` on
/// pressure, `Replaced` on overwrite, `Removed` on explicit removal, and
/// `Expired`/`TokenExpired` via the test-only `expire`/`expire_token`
/// hooks.
pub struct ScriptedCache<K, V> {
    state: Mutex<State<K, V>>,
    capacity: Option<usize>,
}

impl<K, V> ScriptedCache<K, V>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone + 'static,
{
    pub fn unbounded() -> Self {
        Self {
            state: Mutex::new(State {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: None,
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
            capacity: Some(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expire an entry, firing its listener with `Expired`.
    pub fn expire(&self, key: &K) {
        self.release(key, EvictionReason::Expired);
    }

    /// Expire an entry, firing its listener with `TokenExpired`.
    pub fn expire_token(&self, key: &K) {
        self.release(key, EvictionReason::TokenExpired);
    }

    fn release(&self, key: &K, reason: EvictionReason) {
        let removed = {
            let mut state = self.state.lock().unwrap();
            state.order.retain(|k| k != key);
            state.entries.remove(key)
        };
        if let Some(entry) = removed {
            if let Some(listener) = entry.listener {
                listener(key.clone(), entry.value, reason);
            }
        }
    }
}

impl<K, V> ObservedCache<K, V> for ScriptedCache<K, V>
where
    K: Eq + Hash + Clone + 'static,
    V: Clone + 'static,
{
    fn try_get(&self, key: &K) -> Option<V> {
        self.state
            .lock()
            .unwrap()
            .entries
            .get(key)
            .map(|entry| entry.value.clone())
    }

    fn insert(&self, key: K, value: V, mut options: InsertOptions<K, V>) {
        let listener = options.take_eviction_listener();
        // fired outside the lock, like a real cache's async notifications
        let mut fired: Vec<(K, V, Option<EvictionListener<K, V>>, EvictionReason)> = Vec::new();

        {
            let mut state = self.state.lock().unwrap();
            if let Some(old) = state.entries.remove(&key) {
                fired.push((key.clone(), old.value, old.listener, EvictionReason::Replaced));
            } else {
                if let Some(capacity) = self.capacity {
                    while state.entries.len() >= capacity {
                        let Some(oldest) = state.order.pop_front() else {
                            break;
                        };
                        if let Some(victim) = state.entries.remove(&oldest) {
                            fired.push((
                                oldest,
                                victim.value,
                                victim.listener,
                                EvictionReason::Capacity,
                            ));
                        }
                    }
                }
                state.order.push_back(key.clone());
            }
            state.entries.insert(key, Entry { value, listener });
        }

        for (key, value, listener, reason) in fired {
            if let Some(listener) = listener {
                listener(key, value, reason);
            }
        }
    }

    fn remove(&self, key: &K) {
        self.release(key, EvictionReason::Removed);
    }
}
