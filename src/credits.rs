// ABOUTME: Session credit ledger for image generation
// ABOUTME: Gates every real generation attempt against a fixed budget

use log::{info, warn};
use parking_lot::Mutex;
use std::sync::Arc;

struct LedgerState {
    remaining: u32,
    max: u32,
    warned_exhausted: bool,
}

/// Process-wide counter of remaining generation credits.
///
/// Cloning shares the underlying state, so one ledger instance can gate the
/// scheduler, the provider client's caller, and any host-side credit display
/// at once. `commit` is the only mutator that decreases the balance; the
/// mutex keeps concurrent resolutions from double-spending a unit.
#[derive(Clone)]
pub struct CreditLedger {
    inner: Arc<Mutex<LedgerState>>,
}

impl CreditLedger {
    pub fn new(max: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(LedgerState {
                remaining: max,
                max,
                warned_exhausted: false,
            })),
        }
    }

    /// Current balance.
    pub fn remaining(&self) -> u32 {
        self.inner.lock().remaining
    }

    /// Session budget.
    pub fn max(&self) -> u32 {
        self.inner.lock().max
    }

    /// Check whether `n` credits are available. The balance is not touched;
    /// a reservation is confirmed only by the `commit` that follows a
    /// successful provider call.
    pub fn try_reserve(&self, n: u32) -> bool {
        let mut state = self.inner.lock();
        if state.remaining >= n {
            true
        } else {
            if !state.warned_exhausted {
                warn!(
                    "Image credit budget exhausted ({} used); remaining slides fall back to placeholders",
                    state.max
                );
                state.warned_exhausted = true;
            }
            false
        }
    }

    /// Spend `n` credits after a confirmed provider success. Floored at zero.
    pub fn commit(&self, n: u32) {
        let mut state = self.inner.lock();
        state.remaining = state.remaining.saturating_sub(n);
        info!(
            "Committed {} image credit(s), {} of {} remaining",
            n, state.remaining, state.max
        );
    }

    /// Restore the full budget and clear the exhaustion warning. Invoked by
    /// the host at session boundaries only.
    pub fn reset(&self) {
        let mut state = self.inner.lock();
        state.remaining = state.max;
        state.warned_exhausted = false;
    }
}
