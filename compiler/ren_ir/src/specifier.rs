//! Specifiers and virtual-binding patches.
//!
//! A [`Specifier`] travels with a block or a feed and says how the words in
//! it should be read: through nothing, through one frame, or through a chain
//! of [`Patch`] nodes that override names without touching the shared array.
//!
//! Patches are immutable once published. The one exception is the chain's
//! terminal frame, which may be written once, lazily, the first time the
//! chain is evaluated inside a frame.

use std::cell::{OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::cell::Cell;
use crate::frame::{FrameRef, WeakFrame};
use crate::symbol::Symbol;

/// How words inside an array are resolved.
#[derive(Clone, Default)]
pub enum Specifier {
    /// No context; words resolve through their own bindings only.
    #[default]
    Empty,
    /// A concrete frame that relative words are read through.
    Frame(FrameRef),
    /// A patch chain, possibly ending in a frame.
    Patch(Rc<Patch>),
}

impl Specifier {
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Specifier::Empty)
    }

    /// First patch of the chain.
    pub fn head(&self) -> Option<&Rc<Patch>> {
        match self {
            Specifier::Patch(head) => Some(head),
            _ => None,
        }
    }

    /// Frame at the end of the chain, if one is known yet.
    pub fn terminal(&self) -> Option<FrameRef> {
        match self {
            Specifier::Empty => None,
            Specifier::Frame(frame) => Some(frame.clone()),
            Specifier::Patch(head) => head.terminal(),
        }
    }

    /// Patches from head to tail.
    pub fn patches(&self) -> PatchIter<'_> {
        PatchIter {
            current: self.head().map(Rc::as_ref),
        }
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Specifier) -> bool {
        match (self, other) {
            (Specifier::Empty, Specifier::Empty) => true,
            (Specifier::Frame(a), Specifier::Frame(b)) => a.ptr_eq(b),
            (Specifier::Patch(a), Specifier::Patch(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Specifier::Empty => f.write_str("Specifier::Empty"),
            Specifier::Frame(frame) => write!(f, "Specifier::Frame({frame:?})"),
            Specifier::Patch(head) => {
                write!(f, "Specifier::Patch(depth={})", self.patches().count())?;
                if head.terminal().is_some() {
                    f.write_str("+frame")?;
                }
                Ok(())
            }
        }
    }
}

/// What a patch overrides.
#[derive(Clone)]
pub enum PatchKind {
    /// One name with its own storage. Copies made by merging share the storage.
    Single {
        symbol: Symbol,
        var: Rc<RefCell<Cell>>,
    },
    /// Every visible key among the first `len` keys of `frame`.
    Frame { frame: FrameRef, len: usize },
}

/// Node of a virtual-binding chain.
pub struct Patch {
    kind: PatchKind,
    next: Option<Rc<Patch>>,
    terminal: OnceCell<FrameRef>,
}

impl Patch {
    /// Single-name patch holding `value`.
    pub fn single(
        symbol: Symbol,
        value: Cell,
        next: Option<Rc<Patch>>,
        terminal: Option<FrameRef>,
    ) -> Rc<Patch> {
        Patch::with_kind(
            PatchKind::Single {
                symbol,
                var: Rc::new(RefCell::new(value)),
            },
            next,
            terminal,
        )
    }

    /// Whole-frame patch exposing the frame's current keys.
    pub fn frame(frame: FrameRef, next: Option<Rc<Patch>>, terminal: Option<FrameRef>) -> Rc<Patch> {
        let len = frame.len();
        Patch::with_kind(PatchKind::Frame { frame, len }, next, terminal)
    }

    /// Node with an explicit payload.
    pub fn with_kind(
        kind: PatchKind,
        next: Option<Rc<Patch>>,
        terminal: Option<FrameRef>,
    ) -> Rc<Patch> {
        let cell = OnceCell::new();
        if let Some(frame) = terminal {
            let _ = cell.set(frame);
        }
        Rc::new(Patch {
            kind,
            next,
            terminal: cell,
        })
    }

    #[inline]
    pub fn kind(&self) -> &PatchKind {
        &self.kind
    }

    #[inline]
    pub fn next(&self) -> Option<&Rc<Patch>> {
        self.next.as_ref()
    }

    /// Terminal frame of the chain starting here.
    ///
    /// The nearest node with a terminal wins, so a node filled lazily after
    /// its successors were built still answers for the whole chain.
    pub fn terminal(&self) -> Option<FrameRef> {
        let mut current = Some(self);
        while let Some(patch) = current {
            if let Some(frame) = patch.terminal.get() {
                return Some(frame.clone());
            }
            current = patch.next.as_deref();
        }
        None
    }

    /// Write the terminal once if the chain has none. Returns whether it was written.
    pub fn fill_terminal(&self, frame: &FrameRef) -> bool {
        if self.terminal().is_some() {
            return false;
        }
        self.terminal.set(frame.clone()).is_ok()
    }

    /// The single name this patch binds, if it is a single-name patch.
    pub fn symbol(&self) -> Option<Symbol> {
        match &self.kind {
            PatchKind::Single { symbol, .. } => Some(*symbol),
            PatchKind::Frame { .. } => None,
        }
    }

    /// Value of a single-name patch.
    pub fn value(&self) -> Option<Cell> {
        match &self.kind {
            PatchKind::Single { var, .. } => Some(var.borrow().clone()),
            PatchKind::Frame { .. } => None,
        }
    }

    /// Overwrite the value of a single-name patch.
    pub fn set_value(&self, value: Cell) -> bool {
        match &self.kind {
            PatchKind::Single { var, .. } => {
                *var.borrow_mut() = value;
                true
            }
            PatchKind::Frame { .. } => false,
        }
    }

    /// Whether two single-name patches share storage.
    pub fn shares_storage(&self, other: &Patch) -> bool {
        match (&self.kind, &other.kind) {
            (PatchKind::Single { var: a, .. }, PatchKind::Single { var: b, .. }) => {
                Rc::ptr_eq(a, b)
            }
            (
                PatchKind::Frame { frame: a, len: la },
                PatchKind::Frame { frame: b, len: lb },
            ) => a.ptr_eq(b) && la == lb,
            _ => false,
        }
    }
}

impl fmt::Debug for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            PatchKind::Single { symbol, .. } => write!(f, "Patch(single {symbol:?})"),
            PatchKind::Frame { frame, len } => write!(f, "Patch(frame {frame:?}, len={len})"),
        }
    }
}

/// Iterator over a patch chain, head first.
pub struct PatchIter<'a> {
    current: Option<&'a Patch>,
}

impl<'a> Iterator for PatchIter<'a> {
    type Item = &'a Patch;

    fn next(&mut self) -> Option<Self::Item> {
        let patch = self.current?;
        self.current = patch.next.as_deref();
        Some(patch)
    }
}

/// Where a cached patch lookup landed.
#[derive(Clone, Debug)]
pub enum CachedSlot {
    /// Variable of a whole-frame patch.
    Frame { frame: WeakFrame, index: usize },
    /// A single-name patch.
    Patch(Weak<Patch>),
}

/// Result of the last patch-chain walk for a word.
#[derive(Clone, Debug, Default)]
pub enum CacheState {
    /// Never resolved through a chain.
    #[default]
    Unchecked,
    /// The chain headed by `head` overrides the word at `slot`.
    Hit { head: Weak<Patch>, slot: CachedSlot },
    /// No patch in the chain headed by `head` matches the word.
    Miss { head: Weak<Patch> },
}

impl CacheState {
    /// Chain head this state was computed for.
    pub fn head(&self) -> Option<&Weak<Patch>> {
        match self {
            CacheState::Unchecked => None,
            CacheState::Hit { head, .. } | CacheState::Miss { head } => Some(head),
        }
    }

    /// Whether this state was computed for the chain starting at `head`.
    ///
    /// The weak handle keeps the allocation alive, so a recycled address can
    /// never be mistaken for the cached head.
    pub fn is_for(&self, head: &Rc<Patch>) -> bool {
        self.head()
            .is_some_and(|cached| std::ptr::eq(cached.as_ptr(), Rc::as_ptr(head)))
    }
}

/// Per-word resolution cache, shared by every clone of a word.
#[derive(Clone, Default)]
pub struct ResolveCache(Rc<RefCell<CacheState>>);

impl ResolveCache {
    pub fn get(&self) -> CacheState {
        self.0.borrow().clone()
    }

    pub fn set(&self, state: CacheState) {
        *self.0.borrow_mut() = state;
    }

    pub fn clear(&self) {
        self.set(CacheState::Unchecked);
    }
}

impl fmt::Debug for ResolveCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(state) => match &*state {
                CacheState::Unchecked => f.write_str("ResolveCache(unchecked)"),
                CacheState::Hit { .. } => f.write_str("ResolveCache(hit)"),
                CacheState::Miss { .. } => f.write_str("ResolveCache(miss)"),
            },
            Err(_) => f.write_str("ResolveCache(<borrowed>)"),
        }
    }
}
