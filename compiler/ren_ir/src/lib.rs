//! Ren IR - values and storage shared by the scanner and the evaluator
//!
//! This crate contains the data structures every other Ren crate speaks:
//! - Symbols and the interning table
//! - Value cells (`Cell`) with words, arrays, actions and frames
//! - Variable frames and parameter lists
//! - Specifiers and virtual-binding patches
//! - Feeds (cursors over arrays)
//!
//! # Design Philosophy
//!
//! - **Intern names**: strings become `Symbol(u32)`, compared by value
//! - **Share bodies**: arrays are reference counted and never copied to run
//! - **Single-threaded**: `Rc`/`RefCell` throughout; the interner alone is `Sync`

mod action;
mod array;
mod cell;
mod feed;
mod frame;
mod interner;
mod specifier;
mod symbol;
mod typeset;

pub use action::{
    Action, ActionData, Dispatcher, NativeId, Param, ParamClass, ParamFlags, ParamList,
    ParamListRef,
};
pub use array::ArrayRef;
pub use cell::{ActionCell, ArrayKind, Binding, Cell, CellFlags, Heart, Word, WordKind};
pub use feed::{Feed, FeedRef, Varargs};
pub use frame::{FrameData, FrameKind, FrameRef, Key, KeyFlags, WeakFrame};
pub use interner::{InternError, SharedSymbols, SymbolTable};
pub use specifier::{CacheState, CachedSlot, Patch, PatchIter, PatchKind, ResolveCache, Specifier};
pub use symbol::{sym, Symbol};
pub use typeset::{Kind, TypeSet};
