//! Variable frames.
//!
//! A frame owns parallel `keys` and `vars` arrays. `vars[0]` is the
//! archetype slot, so `len(keys) == len(vars) - 1` and variable indices are
//! 1-based. Objects, per-call argument frames and virtual contexts created
//! by `use`/`for-each` are all frames.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use bitflags::bitflags;

use crate::action::ParamListRef;
use crate::cell::Cell;
use crate::symbol::Symbol;
use crate::typeset::Kind;

bitflags! {
    /// Per-key flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct KeyFlags: u8 {
        /// Not visible to `bind`, pickups or whole-frame views (locals, return).
        const HIDDEN = 1 << 0;
    }
}

/// A frame key: the variable's name and flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Key {
    pub symbol: Symbol,
    pub flags: KeyFlags,
}

impl Key {
    pub fn new(symbol: Symbol) -> Self {
        Key {
            symbol,
            flags: KeyFlags::empty(),
        }
    }

    pub fn hidden(symbol: Symbol) -> Self {
        Key {
            symbol,
            flags: KeyFlags::HIDDEN,
        }
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.flags.contains(KeyFlags::HIDDEN)
    }
}

/// What a frame is for.
#[derive(Clone, Debug)]
pub enum FrameKind {
    /// Object created by `make`.
    Object,
    /// Argument frame of one invocation.
    Call {
        /// Parameter list of the underlying action.
        paramlist: ParamListRef,
        /// Object the invoked method was fetched through.
        coupling: Option<FrameRef>,
    },
    /// Locals introduced by virtual binding (`use`, `for-each`).
    Context,
}

/// Frame storage.
#[derive(Debug)]
pub struct FrameData {
    kind: FrameKind,
    keys: Vec<Key>,
    vars: Vec<Cell>,
    /// Frame whose keys this one extends (`make parent [...]`).
    ancestor: Option<FrameRef>,
    /// False once a call frame's invocation has ended without capture.
    accessible: bool,
    /// Captured by a closure; survives the end of its call.
    reified: bool,
}

/// Single-threaded shared handle to a frame.
#[repr(transparent)]
pub struct FrameRef(Rc<RefCell<FrameData>>);

/// Non-owning frame handle.
#[derive(Clone, Debug, Default)]
pub struct WeakFrame(Weak<RefCell<FrameData>>);

impl FrameRef {
    /// Create a frame with the given keys, all variables null.
    pub fn with_keys(kind: FrameKind, keys: Vec<Key>) -> Self {
        let archetype = match kind {
            FrameKind::Call { .. } => Cell::datatype(Kind::Frame),
            FrameKind::Object | FrameKind::Context => Cell::datatype(Kind::Object),
        };
        let mut vars = Vec::with_capacity(keys.len() + 1);
        vars.push(archetype);
        vars.resize(keys.len() + 1, Cell::null());
        FrameRef(Rc::new(RefCell::new(FrameData {
            kind,
            keys,
            vars,
            ancestor: None,
            accessible: true,
            reified: false,
        })))
    }

    /// Empty object.
    pub fn object() -> Self {
        FrameRef::with_keys(FrameKind::Object, Vec::new())
    }

    /// Object extending this one: same leading keys and values, `ancestor` set.
    #[must_use]
    pub fn derive(&self) -> FrameRef {
        let data = self.0.borrow();
        FrameRef(Rc::new(RefCell::new(FrameData {
            kind: FrameKind::Object,
            keys: data.keys.clone(),
            vars: data.vars.clone(),
            ancestor: Some(self.clone()),
            accessible: true,
            reified: false,
        })))
    }

    pub fn kind(&self) -> FrameKind {
        self.0.borrow().kind.clone()
    }

    /// Number of keys (not counting the archetype slot).
    #[inline]
    pub fn len(&self) -> usize {
        self.0.borrow().keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Key at a 1-based index.
    pub fn key(&self, index: usize) -> Option<Key> {
        let data = self.0.borrow();
        index.checked_sub(1).and_then(|i| data.keys.get(i).copied())
    }

    /// Snapshot of all keys.
    pub fn keys(&self) -> Vec<Key> {
        self.0.borrow().keys.clone()
    }

    /// Variable at a 1-based index.
    pub fn get(&self, index: usize) -> Option<Cell> {
        if index == 0 {
            return None;
        }
        self.0.borrow().vars.get(index).cloned()
    }

    /// Overwrite the variable at a 1-based index. False if out of range.
    pub fn set(&self, index: usize, value: Cell) -> bool {
        if index == 0 {
            return false;
        }
        match self.0.borrow_mut().vars.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// The archetype cell in slot 0.
    pub fn archetype(&self) -> Cell {
        self.0
            .borrow()
            .vars
            .first()
            .cloned()
            .unwrap_or_else(Cell::void)
    }

    /// Append a key with a value, returning its 1-based index.
    pub fn append(&self, key: Key, value: Cell) -> usize {
        let mut data = self.0.borrow_mut();
        data.keys.push(key);
        data.vars.push(value);
        data.keys.len()
    }

    /// 1-based index of the first visible key spelled `symbol`.
    pub fn find(&self, symbol: Symbol) -> Option<usize> {
        self.find_within(symbol, usize::MAX)
    }

    /// Like [`find`](Self::find) but only among the first `len` keys.
    pub fn find_within(&self, symbol: Symbol, len: usize) -> Option<usize> {
        let data = self.0.borrow();
        data.keys
            .iter()
            .take(len)
            .position(|key| key.symbol == symbol && !key.is_hidden())
            .map(|i| i + 1)
    }

    /// The frame this one was derived from.
    pub fn ancestor(&self) -> Option<FrameRef> {
        self.0.borrow().ancestor.clone()
    }

    /// Parameter list of a call frame.
    pub fn paramlist(&self) -> Option<ParamListRef> {
        match &self.0.borrow().kind {
            FrameKind::Call { paramlist, .. } => Some(paramlist.clone()),
            _ => None,
        }
    }

    /// Coupling object of a call frame.
    pub fn coupling(&self) -> Option<FrameRef> {
        match &self.0.borrow().kind {
            FrameKind::Call { coupling, .. } => coupling.clone(),
            _ => None,
        }
    }

    #[inline]
    pub fn is_accessible(&self) -> bool {
        self.0.borrow().accessible
    }

    #[inline]
    pub fn is_reified(&self) -> bool {
        self.0.borrow().reified
    }

    /// Mark as captured so it survives the end of its call.
    pub fn reify(&self) {
        self.0.borrow_mut().reified = true;
    }

    /// End of a call: storage becomes inaccessible unless captured.
    pub fn decay(&self) {
        let mut data = self.0.borrow_mut();
        if !data.reified {
            data.accessible = false;
        }
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(&self, other: &FrameRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakFrame {
        WeakFrame(Rc::downgrade(&self.0))
    }
}

impl WeakFrame {
    pub fn upgrade(&self) -> Option<FrameRef> {
        self.0.upgrade().map(FrameRef)
    }

    /// Identity comparison against a live frame.
    pub fn points_to(&self, frame: &FrameRef) -> bool {
        std::ptr::eq(self.0.as_ptr(), Rc::as_ptr(&frame.0))
    }
}

impl Clone for FrameRef {
    #[inline]
    fn clone(&self) -> Self {
        FrameRef(Rc::clone(&self.0))
    }
}

impl fmt::Debug for FrameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(data) => write!(
                f,
                "FrameRef({:p}, {}, len={})",
                Rc::as_ptr(&self.0),
                match data.kind {
                    FrameKind::Object => "object",
                    FrameKind::Call { .. } => "call",
                    FrameKind::Context => "context",
                },
                data.keys.len()
            ),
            Err(_) => write!(f, "FrameRef({:p}, <borrowed>)", Rc::as_ptr(&self.0)),
        }
    }
}

#[cfg(test)]
mod tests;
