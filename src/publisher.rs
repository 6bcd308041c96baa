//! Observable-instrument registration for one cache instance.
//!
//! Instruments are registered once at construction time, never per
//! operation. Each poll closure closes over its own instance's counter
//! bank and tag set only, so instances sharing a registry can never
//! contaminate each other's readings. All allocation happens at poll
//! time, at the backend's cadence; the cache hot path only touches
//! atomics.

use std::sync::Arc;

use crate::decorator::MeterCore;
use crate::reason::EvictionReason;
use crate::tags::{REASON_KEY, RESULT_HIT, RESULT_KEY, RESULT_MISS};
use crate::traits::{InstrumentId, ObservableRegistry, Reading};

/// Instrument name for lookup outcomes, tagged `result=hit|miss`.
pub const LOOKUP_INSTRUMENT: &str = "cache_lookups_total";

/// Instrument name for counted evictions, tagged `reason=<reason>`.
pub const EVICTION_INSTRUMENT: &str = "cache_evictions_total";

/// Register the lookup and eviction counters for `core` on `registry`.
///
/// Returns the instrument handles in `[lookup, eviction]` order for later
/// unregistration during disposal.
pub(crate) fn register_instruments(
    registry: &dyn ObservableRegistry,
    core: &Arc<MeterCore>,
) -> [InstrumentId; 2] {
    let lookup_core = Arc::clone(core);
    let lookup = registry.register_observable_counter(
        LOOKUP_INSTRUMENT,
        "{lookup}",
        "Cache lookups by result",
        Box::new(move || {
            let snap = lookup_core.bank.snapshot();
            vec![
                Reading::new(snap.hits, lookup_core.tags.compose(RESULT_KEY, RESULT_HIT)),
                Reading::new(snap.misses, lookup_core.tags.compose(RESULT_KEY, RESULT_MISS)),
            ]
        }),
    );

    let eviction_core = Arc::clone(core);
    let eviction = registry.register_observable_counter(
        EVICTION_INSTRUMENT,
        "{eviction}",
        "Cache-initiated evictions by reason",
        Box::new(move || {
            let snap = eviction_core.bank.snapshot();
            EvictionReason::COUNTED
                .iter()
                .map(|&reason| {
                    Reading::new(
                        snap.evictions_for(reason),
                        eviction_core.tags.compose(REASON_KEY, reason.as_str()),
                    )
                })
                .collect()
        }),
    );

    [lookup, eviction]
}
