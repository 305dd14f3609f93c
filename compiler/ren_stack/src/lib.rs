//! Stack safety utilities for recursive evaluation.
//!
//! The evaluator is recursive descent: every nested call, group and argument
//! step recurses on the native stack. Two tools keep that safe:
//!
//! - [`ensure_sufficient_stack`] grows the native stack on demand (via
//!   `stacker`) so deep but finite nesting never crashes the process.
//! - [`DepthCounter`] bounds the interpreter's own nesting so runaway
//!   recursion becomes a catchable [`DepthExceeded`] condition instead of
//!   unbounded memory growth.
//!
//! # Platform Support
//!
//! - **Native targets**: Uses the `stacker` crate to grow the stack on demand.
//! - **WASM targets**: No-op passthrough (WASM has its own stack management).
//!
//! # Configuration
//!
//! - **Red zone**: 100KB - If less than this remains, we grow the stack
//! - **Growth size**: 1MB - Each growth allocates this much additional space

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Minimum stack space to keep available (100KB red zone).
const RED_ZONE: usize = 100 * 1024;

/// Stack space to allocate when growing (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Ensure sufficient stack space is available before executing `f`.
///
/// If the remaining stack is below the red zone threshold, this will
/// allocate additional stack space before calling `f`.
///
/// ```text
/// fn eval_step(&mut self, feed: &FeedRef, out: &mut Cell) -> EvalResult<()> {
///     ensure_sufficient_stack(|| {
///         // ... recursive evaluation ...
///     })
/// }
/// ```
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// WASM version - just call directly (WASM has its own stack management).
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Nesting limit was reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepthExceeded {
    /// The configured limit.
    pub limit: usize,
}

impl fmt::Display for DepthExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "maximum nesting depth exceeded (limit: {})", self.limit)
    }
}

impl std::error::Error for DepthExceeded {}

/// Shared nesting counter with an optional limit.
///
/// Cloning shares the count. Each [`DepthCounter::enter`] hands back a
/// [`DepthToken`] that decrements the count when dropped, so early returns
/// and `?` propagation always rebalance it.
#[derive(Clone, Debug, Default)]
pub struct DepthCounter {
    depth: Rc<Cell<usize>>,
    limit: Option<usize>,
}

impl DepthCounter {
    /// Create a counter. `None` means unlimited.
    pub fn new(limit: Option<usize>) -> Self {
        DepthCounter {
            depth: Rc::new(Cell::new(0)),
            limit,
        }
    }

    /// Current nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth.get()
    }

    /// The configured limit, if any.
    #[inline]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Enter one level of nesting.
    ///
    /// The level is NOT entered on overflow.
    pub fn enter(&self) -> Result<DepthToken, DepthExceeded> {
        let current = self.depth.get();
        if let Some(limit) = self.limit {
            if current >= limit {
                return Err(DepthExceeded { limit });
            }
        }
        self.depth.set(current.saturating_add(1));
        Ok(DepthToken {
            depth: Rc::clone(&self.depth),
        })
    }
}

/// One entered nesting level; leaving happens on drop.
#[derive(Debug)]
pub struct DepthToken {
    depth: Rc<Cell<usize>>,
}

impl Drop for DepthToken {
    fn drop(&mut self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}
