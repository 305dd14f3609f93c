//! Binding resolution: from a word plus a specifier to a storage slot.
//!
//! Resolution order:
//! 1. A direct binding read through an empty chain is answered in O(1).
//! 2. Otherwise the specifier's patch chain is walked head to tail; the
//!    nearest patch that names the word wins. The outcome is cached on the
//!    word and trusted only while the chain head is the same node.
//! 3. With no patch match, the word's own binding decides. Relative words
//!    combine with the chain's terminal call frame; specific words are
//!    redirected to a more-derived frame when the terminal (or the object a
//!    method was called through) extends the bound frame.

use std::rc::Rc;

use ren_ir::{
    Binding, CacheState, CachedSlot, Cell, FrameRef, Heart, Patch, PatchKind, Specifier, Word,
};

/// Upper bound on `ancestor` links followed when testing derivation.
pub const MAX_ANCESTRY_DEPTH: usize = 64;

/// Why a word could not be resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("word is not bound")]
    Unbound,
    #[error("word's frame is no longer accessible")]
    Inaccessible,
}

/// Storage a word resolved to.
#[derive(Clone, Debug)]
pub enum Slot {
    /// 1-based variable of a frame.
    Frame { frame: FrameRef, index: usize },
    /// A single-name patch.
    Patch(Rc<Patch>),
}

impl Slot {
    pub fn get(&self) -> Cell {
        match self {
            Slot::Frame { frame, index } => frame.get(*index).unwrap_or_else(Cell::null),
            Slot::Patch(patch) => patch.value().unwrap_or_else(Cell::null),
        }
    }

    /// Overwrite the slot. False if the slot no longer exists.
    pub fn set(&self, value: Cell) -> bool {
        match self {
            Slot::Frame { frame, index } => frame.set(*index, value),
            Slot::Patch(patch) => patch.set_value(value),
        }
    }

    /// Binding that addresses this slot directly.
    pub fn to_binding(&self) -> (Binding, usize) {
        match self {
            Slot::Frame { frame, index } => (Binding::Specific(frame.clone()), *index),
            Slot::Patch(patch) => (Binding::Let(patch.clone()), 1),
        }
    }

    fn accessible(self) -> Result<Slot, ResolveError> {
        match &self {
            Slot::Frame { frame, .. } if !frame.is_accessible() => Err(ResolveError::Inaccessible),
            _ => Ok(self),
        }
    }
}

/// Resolve `word` read through `specifier`.
pub fn resolve(word: &Word, specifier: &Specifier) -> Result<Slot, ResolveError> {
    if let Some(head) = specifier.head() {
        if let Some(slot) = lookup_patches(word, head) {
            return slot.accessible();
        }
    }
    resolve_binding(word, specifier)
}

/// Find the nearest patch naming `word`, consulting and refreshing its cache.
fn lookup_patches(word: &Word, head: &Rc<Patch>) -> Option<Slot> {
    let cache = word.cache();
    let state = cache.get();
    if state.is_for(head) {
        match state {
            CacheState::Miss { .. } => return None,
            CacheState::Hit { slot, .. } => {
                if let Some(slot) = upgrade_cached(&slot) {
                    return Some(slot);
                }
            }
            CacheState::Unchecked => {}
        }
    }

    let found = walk_patches(word, head);
    let head_weak = Rc::downgrade(head);
    let state = match &found {
        Some(Slot::Frame { frame, index }) => CacheState::Hit {
            head: head_weak,
            slot: CachedSlot::Frame {
                frame: frame.downgrade(),
                index: *index,
            },
        },
        Some(Slot::Patch(patch)) => CacheState::Hit {
            head: head_weak,
            slot: CachedSlot::Patch(Rc::downgrade(patch)),
        },
        None => CacheState::Miss { head: head_weak },
    };
    cache.set(state);
    found
}

fn upgrade_cached(slot: &CachedSlot) -> Option<Slot> {
    match slot {
        CachedSlot::Frame { frame, index } => frame.upgrade().map(|frame| Slot::Frame {
            frame,
            index: *index,
        }),
        CachedSlot::Patch(patch) => patch.upgrade().map(Slot::Patch),
    }
}

/// Uncached walk of a chain, head first.
pub fn walk_patches(word: &Word, head: &Rc<Patch>) -> Option<Slot> {
    let mut current = Some(head);
    while let Some(patch) = current {
        match patch.kind() {
            PatchKind::Single { symbol, .. } if *symbol == word.symbol => {
                tracing::trace!(symbol = ?word.symbol, "resolved through single patch");
                return Some(Slot::Patch(patch.clone()));
            }
            PatchKind::Frame { frame, len } => {
                if let Some(index) = frame.find_within(word.symbol, *len) {
                    tracing::trace!(symbol = ?word.symbol, index, "resolved through frame patch");
                    return Some(Slot::Frame {
                        frame: frame.clone(),
                        index,
                    });
                }
            }
            PatchKind::Single { .. } => {}
        }
        current = patch.next();
    }
    None
}

fn resolve_binding(word: &Word, specifier: &Specifier) -> Result<Slot, ResolveError> {
    match word.binding() {
        Binding::Unbound => Err(ResolveError::Unbound),
        Binding::Let(patch) => Ok(Slot::Patch(patch.clone())),
        Binding::Relative(paramlist) => {
            let terminal = specifier.terminal().ok_or(ResolveError::Unbound)?;
            match terminal.paramlist() {
                Some(frame_params) if frame_params.ptr_eq(paramlist) => {
                    Slot::Frame {
                        frame: terminal,
                        index: word.index(),
                    }
                    .accessible()
                }
                _ => {
                    tracing::trace!(symbol = ?word.symbol, "relative word read through foreign frame");
                    Err(ResolveError::Unbound)
                }
            }
        }
        Binding::Specific(frame) => {
            let (frame, index) = match specifier.terminal() {
                Some(terminal) => redirect_to_derived(frame, word, &terminal),
                None => (frame.clone(), word.index()),
            };
            Slot::Frame { frame, index }.accessible()
        }
    }
}

/// Pick the most-derived frame among the terminal and its coupling that
/// extends `bound`, or `bound` itself.
fn redirect_to_derived(bound: &FrameRef, word: &Word, terminal: &FrameRef) -> (FrameRef, usize) {
    for candidate in std::iter::once(terminal.clone()).chain(terminal.coupling()) {
        if derives_from(&candidate, bound) {
            let index = match candidate.key(word.index()) {
                Some(key) if key.symbol == word.symbol => Some(word.index()),
                _ => candidate.find(word.symbol),
            };
            if let Some(index) = index {
                return (candidate, index);
            }
        }
    }
    (bound.clone(), word.index())
}

/// Whether `candidate` is a strict descendant of `base`.
pub fn derives_from(candidate: &FrameRef, base: &FrameRef) -> bool {
    let mut current = candidate.ancestor();
    let mut steps = 0;
    while let Some(frame) = current {
        if frame.ptr_eq(base) {
            return true;
        }
        steps += 1;
        if steps >= MAX_ANCESTRY_DEPTH {
            tracing::warn!(limit = MAX_ANCESTRY_DEPTH, "ancestry walk hit its bound");
            return false;
        }
        current = frame.ancestor();
    }
    false
}

/// A copy of `word` bound directly to the slot it resolves to through
/// `specifier`, so it can leave the specifier behind.
///
/// Words relative to a call frame capture that frame, which then survives
/// the end of its call. Unresolvable words are returned unchanged.
pub fn derelativize(word: &Word, specifier: &Specifier) -> Word {
    if specifier.head().is_none() && !matches!(word.binding(), Binding::Relative(_)) {
        return word.clone();
    }
    match resolve(word, specifier) {
        Ok(slot) => {
            if let Slot::Frame { frame, .. } = &slot {
                if frame.paramlist().is_some() {
                    frame.reify();
                }
            }
            let (binding, index) = slot.to_binding();
            word.with_binding(binding, index)
        }
        Err(_) => word.clone(),
    }
}

/// [`derelativize`] applied to a cell; non-words are returned as-is.
pub fn derelativize_cell(cell: &Cell, specifier: &Specifier) -> Cell {
    match cell.heart() {
        Heart::Word(word) => {
            let bound = derelativize(word, specifier);
            let mut copy = cell.clone();
            *copy.heart_mut() = Heart::Word(bound);
            copy
        }
        _ => cell.clone(),
    }
}

#[cfg(test)]
mod tests;
