//! meterkit: transparent hit/miss/eviction metrics for key-value caches.
//!
//! Wrap any cache exposing `try_get`/`insert`/`remove` in a
//! [`MeteredCache`](decorator::MeteredCache) and its lookup and eviction
//! counters become pull-based observable instruments on a shared
//! [`ObservableRegistry`](traits::ObservableRegistry).
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod counters;
pub mod decorator;
pub mod error;
pub mod exporter;
pub mod lifecycle;
pub mod prelude;
pub mod publisher;
pub mod reason;
pub mod registry;
pub mod tags;
pub mod traits;
