//! Argument fulfillment and dispatch.
//!
//! A call runs through an explicit state machine held in its [`Level`]:
//!
//! ```text
//! Entry -> Fulfilling{param} -> Pickups -> Typecheck -> Dispatch
//!                                             ^            |
//!                                             +-- Redo ----+--> Done | Thrown
//! ```
//!
//! - `fulfill` walks the parameter list in order, copying specialized slots
//!   from the exemplar and gathering everything else from the feed.
//! - Refinements named in a path (`f/b/c`) arrive as "pickups"; ones that
//!   are not next in line are left pending and gathered afterward, in path
//!   order.
//! - `typecheck` runs only once every slot is filled.
//! - Dispatch hands the frame to the phase's dispatcher. Adaptations and
//!   specializations answer `Redo` with a new phase instead of a value.

mod dispatch;
mod fulfill;
pub mod paramlist;
mod typecheck;

use std::collections::VecDeque;

use bitflags::bitflags;
use ren_ir::{Action, ActionCell, Cell, FeedRef, FrameKind, FrameRef, Symbol};
use smallvec::SmallVec;

pub use paramlist::make_paramlist;

/// Where a call currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum State {
    Entry,
    /// Gathering the 1-based parameter `param`.
    Fulfilling { param: usize },
    /// Gathering refinement arguments left pending during the walk.
    Pickups,
    Typecheck,
    Dispatch,
    Done,
    Thrown,
    /// The phase changed; `recheck` says whether the frame is checked again.
    Redo { recheck: bool },
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct LevelFlags: u8 {
        /// Invoked left-binding; `left` holds the pending output.
        const INFIX = 1 << 0;
    }
}

/// What a dispatcher asks the engine to do next.
#[derive(Clone, Debug)]
pub enum Bounce {
    /// The call produced a value.
    Value(Cell),
    /// Unwind toward a matching `catch` or call frame.
    Thrown { label: Cell, value: Cell },
    /// Run the frame again under the (new) phase.
    Redo { recheck: bool },
    /// Store `value` in the variable named by `target`, then produce it.
    WriteBack { target: Cell, value: Cell },
    /// Produce nothing; the prior output stays, marked stale.
    Vanished,
}

/// One call in progress.
#[derive(Debug)]
pub struct Level {
    pub feed: FeedRef,
    /// Action as invoked; its exemplar decides which slots are preset.
    pub original: Action,
    /// Action whose dispatcher runs next.
    pub phase: Action,
    pub frame: FrameRef,
    pub label: Option<Symbol>,
    /// Object a method was called through.
    pub coupling: Option<FrameRef>,
    pub state: State,
    /// 1-based refinement indices requested by a path, in path order.
    pub pickups: VecDeque<usize>,
    /// Infix left-hand value, consumed by the first unspecialized parameter.
    pub left: Option<Cell>,
    /// 1-based refinements whose argument was gathered. A used refinement
    /// may still hold null, so this is what tells it from an unused one.
    pub used: SmallVec<[usize; 4]>,
    pub flags: LevelFlags,
    pub out: Cell,
}

impl Level {
    /// Fresh level for invoking `action` from `feed`. `prior` is the output
    /// before the call; it is what remains if the call vanishes.
    pub fn new(feed: FeedRef, action: &ActionCell, label: Option<Symbol>, prior: Cell) -> Self {
        let paramlist = action.action.paramlist().clone();
        let keys = paramlist.keys();
        let frame = FrameRef::with_keys(
            FrameKind::Call {
                paramlist,
                coupling: action.coupling.clone(),
            },
            keys,
        );
        Level {
            feed,
            original: action.action.clone(),
            phase: action.action.clone(),
            frame,
            label: label.or_else(|| action.label()),
            coupling: action.coupling.clone(),
            state: State::Entry,
            pickups: VecDeque::new(),
            left: None,
            used: SmallVec::new(),
            flags: LevelFlags::empty(),
            out: prior,
        }
    }

    /// Mark the call as left-binding with `left` as its first argument.
    #[must_use]
    pub fn infix(mut self, left: Option<Cell>) -> Self {
        self.flags.insert(LevelFlags::INFIX);
        self.left = left;
        self
    }

    #[inline]
    pub fn is_infix(&self) -> bool {
        self.flags.contains(LevelFlags::INFIX)
    }

    /// Argument in 1-based slot `index`; null for slots that do not exist.
    pub fn arg(&self, index: usize) -> Cell {
        self.frame.get(index).unwrap_or_else(Cell::null)
    }

    /// Whether the refinement in slot `index` was used.
    pub fn refinement(&self, index: usize) -> bool {
        self.used.contains(&index) || !self.arg(index).is_null()
    }

    pub(crate) fn mark_used(&mut self, index: usize) {
        if !self.used.contains(&index) {
            self.used.push(index);
        }
    }
}
