//! Disposal state machine for the cache decorator.
//!
//! `Active → Disposing → Disposed`, monotonic, entered exactly once via
//! compare-and-swap. Any number of threads may race `begin`; exactly one
//! wins and performs teardown, the rest observe the transition.

use std::sync::atomic::{AtomicU8, Ordering};

const ACTIVE: u8 = 0;
const DISPOSING: u8 = 1;
const DISPOSED: u8 = 2;

/// Lifecycle phase of a metered cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisposalState {
    Active,
    Disposing,
    Disposed,
}

/// Atomic holder for a [`DisposalState`].
#[derive(Debug, Default)]
pub struct DisposalCell(AtomicU8);

impl DisposalCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(ACTIVE))
    }

    /// Current state.
    pub fn state(&self) -> DisposalState {
        match self.0.load(Ordering::Acquire) {
            ACTIVE => DisposalState::Active,
            DISPOSING => DisposalState::Disposing,
            _ => DisposalState::Disposed,
        }
    }

    /// Returns `true` once the state has reached `Disposed`.
    #[inline]
    pub fn is_disposed(&self) -> bool {
        self.0.load(Ordering::Acquire) == DISPOSED
    }

    /// Attempt the `Active → Disposing` transition.
    ///
    /// Returns `true` for exactly one caller, which then owns teardown and
    /// must call [`finish`](Self::finish). All other callers get `false`.
    pub fn begin(&self) -> bool {
        self.0
            .compare_exchange(ACTIVE, DISPOSING, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Complete the `Disposing → Disposed` transition.
    ///
    /// Only the thread that won [`begin`](Self::begin) may call this.
    pub fn finish(&self) {
        self.0.store(DISPOSED, Ordering::Release);
    }
}
