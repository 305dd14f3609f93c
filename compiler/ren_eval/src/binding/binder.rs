//! Symbol-to-index scratch map used while binding.
//!
//! A `Binder` remembers, for the duration of one bind operation, which
//! frame index each symbol maps to. A positive index is a live slot; a
//! negative one means "known, but must not be bound or picked up"
//! (specialized or hidden parameters). Zero is never stored: it is the
//! "not present" answer of [`Binder::get_or_zero`].
//!
//! Every claim is counted in a thread-local tally so tests can check that
//! all bind paths, including failing ones, release what they took.

use std::cell::Cell;

use ren_ir::Symbol;
use rustc_hash::FxHashMap;

thread_local! {
    static LIVE_CLAIMS: Cell<usize> = const { Cell::new(0) };
}

/// Number of symbol claims currently held by binders on this thread.
pub fn live_binder_claims() -> usize {
    LIVE_CLAIMS.with(Cell::get)
}

fn adjust_claims(delta: isize) {
    LIVE_CLAIMS.with(|claims| claims.set(claims.get().saturating_add_signed(delta)));
}

/// A symbol was added twice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("symbol {0:?} is already claimed")]
pub struct AlreadyClaimed(pub Symbol);

/// Claims left behind at shutdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[error("binder shut down with {0} outstanding claims")]
pub struct OutstandingClaims(pub usize);

/// Scratch map from symbol to frame index.
#[derive(Debug, Default)]
pub struct Binder {
    map: FxHashMap<Symbol, i32>,
}

impl Binder {
    pub fn new() -> Self {
        Binder {
            map: FxHashMap::default(),
        }
    }

    /// Claim `symbol` with `index`. Fails if it is already claimed.
    pub fn add(&mut self, symbol: Symbol, index: i32) -> Result<(), AlreadyClaimed> {
        if self.try_add(symbol, index) {
            Ok(())
        } else {
            Err(AlreadyClaimed(symbol))
        }
    }

    /// Claim `symbol` unless it is already claimed.
    pub fn try_add(&mut self, symbol: Symbol, index: i32) -> bool {
        debug_assert!(index != 0, "binder index 0 means absent");
        if self.map.contains_key(&symbol) {
            return false;
        }
        self.map.insert(symbol, index);
        adjust_claims(1);
        true
    }

    /// Claimed index, or 0 if unclaimed.
    #[inline]
    pub fn get_or_zero(&self, symbol: Symbol) -> i32 {
        self.map.get(&symbol).copied().unwrap_or(0)
    }

    /// Release a claim, returning its index (0 if it was not claimed).
    pub fn remove(&mut self, symbol: Symbol) -> i32 {
        match self.map.remove(&symbol) {
            Some(index) => {
                adjust_claims(-1);
                index
            }
            None => 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Finish a bind span. Every claim should have been removed already;
    /// any that remain are released and reported.
    pub fn shutdown(mut self) -> Result<(), OutstandingClaims> {
        let outstanding = self.release_all();
        if outstanding == 0 {
            Ok(())
        } else {
            tracing::warn!(outstanding, "binder shut down with live claims");
            Err(OutstandingClaims(outstanding))
        }
    }

    fn release_all(&mut self) -> usize {
        let outstanding = self.map.len();
        if outstanding > 0 {
            self.map.clear();
            adjust_claims(-isize::try_from(outstanding).unwrap_or(isize::MAX));
        }
        outstanding
    }
}

impl Drop for Binder {
    fn drop(&mut self) {
        let outstanding = self.release_all();
        if outstanding > 0 {
            tracing::trace!(outstanding, "binder dropped with live claims");
        }
    }
}
