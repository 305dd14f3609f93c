//! Virtual-binding patch allocation.
//!
//! Patches let a block be read with extra names in scope without copying
//! or rebinding it. `let` adds a single-name patch in front of the feed's
//! chain; `use`/`for-each` add a whole-frame patch in front of a block's
//! chain. When a block that already carries a chain is evaluated inside a
//! different chain, the two are merged so the block's own names stay
//! nearest.

use std::rc::Rc;

use ren_ir::{Cell, FrameRef, Patch, Specifier, Symbol};

/// Split a chain into the node a new patch should link to and the terminal
/// frame it should record.
fn link_target(chain: &Specifier) -> (Option<Rc<Patch>>, Option<FrameRef>) {
    match chain {
        Specifier::Empty => (None, None),
        Specifier::Frame(frame) => (None, Some(frame.clone())),
        Specifier::Patch(head) => (Some(head.clone()), None),
    }
}

/// Fresh single-name patch holding null, in front of `chain`.
///
/// The terminal is inherited from a frame chain; for a patch chain it is
/// found through the successors, and stays unset (to be filled lazily)
/// when the chain has none.
pub fn make_single_patch(symbol: Symbol, chain: &Specifier) -> Rc<Patch> {
    let (next, terminal) = link_target(chain);
    Patch::single(symbol, Cell::null(), next, terminal)
}

/// Specifier for a `let` of `symbol` read through `chain`.
pub fn make_local_patch(symbol: Symbol, chain: &Specifier) -> Specifier {
    Specifier::Patch(make_single_patch(symbol, chain))
}

/// Whole-frame patch exposing `frame`'s current keys, in front of `chain`.
pub fn make_frame_patch(frame: FrameRef, chain: &Specifier) -> Rc<Patch> {
    let (next, terminal) = link_target(chain);
    Patch::frame(frame, next, terminal)
}

/// Chain that reads `inner`'s patches first, then `outer`'s.
///
/// Returns the chain and whether `inner` was reused as-is. `inner` is reused
/// when `outer` contributes nothing new: it is empty, a bare frame, or its
/// head is already part of `inner`. Otherwise `inner`'s patches are copied
/// (sharing their storage) onto `outer`, keeping `inner`'s terminal.
pub fn merge(inner: &Specifier, outer: &Specifier) -> (Specifier, bool) {
    let head = match inner {
        Specifier::Patch(head) => head,
        Specifier::Empty => return (outer.clone(), false),
        Specifier::Frame(_) => return (inner.clone(), true),
    };
    let outer_head = match outer {
        Specifier::Empty => return (inner.clone(), true),
        Specifier::Frame(frame) => {
            head.fill_terminal(frame);
            return (inner.clone(), true);
        }
        Specifier::Patch(outer_head) => outer_head,
    };

    if inner.patches().any(|patch| std::ptr::eq(patch, Rc::as_ptr(outer_head))) {
        tracing::trace!("merge reused inner chain");
        return (inner.clone(), true);
    }

    let terminal = head.terminal();
    let kinds: Vec<_> = inner.patches().map(|patch| patch.kind().clone()).collect();
    tracing::trace!(copied = kinds.len(), "merge copying inner chain");
    let mut merged = outer_head.clone();
    for (position, kind) in kinds.into_iter().enumerate().rev() {
        let node_terminal = if position == 0 { terminal.clone() } else { None };
        merged = Patch::with_kind(kind, Some(merged), node_terminal);
    }
    (Specifier::Patch(merged), false)
}

/// Specifier for a block found in a feed: the block's own chain wins, the
/// feed's chain fills in what the block lacks.
pub fn derive_specifier(cell_specifier: &Specifier, feed_specifier: &Specifier) -> Specifier {
    match cell_specifier {
        Specifier::Empty => feed_specifier.clone(),
        Specifier::Frame(_) => cell_specifier.clone(),
        Specifier::Patch(_) => merge(cell_specifier, feed_specifier).0,
    }
}
