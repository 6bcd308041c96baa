//! In-process reference implementation of [`ObservableRegistry`].
//!
//! Holds the instrument table and the reserved cache-name set behind one
//! `RwLock`. Polling (`collect`) takes the read lock only, so many
//! backends or scrape handlers can pull concurrently while decorators
//! keep operating; registration and teardown take the write lock briefly.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::traits::{InstrumentId, ObservableRegistry, PollCallback, Reading};

struct Instrument {
    name: String,
    unit: String,
    description: String,
    poll: PollCallback,
}

#[derive(Default)]
struct RegistryInner {
    next_id: u64,
    instruments: FxHashMap<u64, Instrument>,
    scopes: FxHashSet<String>,
}

/// Process-shared pull registry for observable instruments.
///
/// Construct one per application (or per test), share it via `Arc`, and
/// pass it to every [`MeteredCacheBuilder`](crate::builder::MeteredCacheBuilder).
/// Call [`collect`](Self::collect) from the export path at whatever cadence
/// the backend wants.
#[derive(Default)]
pub struct MeterRegistry {
    inner: RwLock<RegistryInner>,
}

/// One instrument's identity and polled readings from a [`collect`](MeterRegistry::collect) pass.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedMetric {
    pub name: String,
    pub unit: String,
    pub description: String,
    pub readings: Vec<Reading>,
}

impl MeterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently registered instruments.
    pub fn instrument_count(&self) -> usize {
        self.inner.read().instruments.len()
    }

    /// Poll every registered instrument once and return the readings.
    ///
    /// Instruments are returned sorted by name for stable output. Poll
    /// callbacks only read atomic counters and compose tags, so holding the
    /// read lock across the pass is safe and keeps the pass consistent with
    /// concurrent unregistration.
    pub fn collect(&self) -> Vec<CollectedMetric> {
        let inner = self.inner.read();
        let mut metrics: Vec<CollectedMetric> = inner
            .instruments
            .values()
            .map(|instrument| CollectedMetric {
                name: instrument.name.clone(),
                unit: instrument.unit.clone(),
                description: instrument.description.clone(),
                readings: (instrument.poll)(),
            })
            .collect();
        metrics.sort_by(|a, b| a.name.cmp(&b.name));
        metrics
    }
}

impl ObservableRegistry for MeterRegistry {
    fn register_observable_counter(
        &self,
        name: &str,
        unit: &str,
        description: &str,
        poll: PollCallback,
    ) -> InstrumentId {
        let mut inner = self.inner.write();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.instruments.insert(
            id,
            Instrument {
                name: name.to_string(),
                unit: unit.to_string(),
                description: description.to_string(),
                poll,
            },
        );
        InstrumentId::new(id)
    }

    fn unregister(&self, id: InstrumentId) {
        self.inner.write().instruments.remove(&id.raw());
    }

    fn reserve_scope(&self, name: &str) -> bool {
        self.inner.write().scopes.insert(name.to_string())
    }

    fn release_scope(&self, name: &str) {
        self.inner.write().scopes.remove(name);
    }
}

impl std::fmt::Debug for MeterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("MeterRegistry")
            .field("instruments", &inner.instruments.len())
            .field("scopes", &inner.scopes.len())
            .finish()
    }
}
