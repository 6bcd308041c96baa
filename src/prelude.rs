pub use crate::builder::MeteredCacheBuilder;
pub use crate::counters::{CounterBank, CounterSnapshot};
pub use crate::decorator::MeteredCache;
pub use crate::error::{ConfigError, DisposedError};
pub use crate::exporter::PrometheusTextExporter;
pub use crate::lifecycle::DisposalState;
pub use crate::reason::EvictionReason;
pub use crate::registry::{CollectedMetric, MeterRegistry};
pub use crate::tags::{Tag, TagSet};
pub use crate::traits::{
    EvictionListener, InsertOptions, InstrumentId, ObservableRegistry, ObservedCache, PollCallback,
    Reading,
};
