//! The tagged value cell.
//!
//! A [`Cell`] is a `Heart` (what the value is) plus a quoting depth and a
//! handful of flags. Cells are cheap to clone: everything that is not a
//! scalar is a reference-counted handle to shared storage.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::action::{Action, ParamListRef};
use crate::array::ArrayRef;
use crate::feed::Varargs;
use crate::frame::FrameRef;
use crate::specifier::{Patch, ResolveCache, Specifier};
use crate::symbol::Symbol;
use crate::typeset::Kind;

bitflags! {
    /// Per-cell flags.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct CellFlags: u8 {
        /// Action is invoked left-binding: the pending output is its first argument.
        const INFIX = 1 << 0;
        /// Infix action waits until the enclosing argument is complete.
        const DEFER = 1 << 1;
        /// Output slot holds the result of an earlier step, not the latest one.
        const STALE = 1 << 2;
    }
}

/// Spelling variant of a word.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WordKind {
    /// `foo`
    Word,
    /// `foo:`
    Set,
    /// `:foo`
    Get,
    /// `@foo`
    Sym,
    /// `/foo`
    Refinement,
}

/// Spelling variant of an array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    /// `[...]`
    Block,
    /// `(...)`
    Group,
    /// `@[...]`
    SymBlock,
    /// `@(...)`
    SymGroup,
    /// `a/b/c`
    Path,
    /// `a/b/c:`
    SetPath,
}

/// What a word is bound to.
#[derive(Clone, Debug, Default)]
pub enum Binding {
    /// No binding.
    #[default]
    Unbound,
    /// Bound directly to a concrete frame.
    Specific(FrameRef),
    /// Bound to a callable's parameter list; needs a frame to resolve.
    Relative(ParamListRef),
    /// Bound to the storage of a single-variable patch.
    Let(Rc<Patch>),
}

impl Binding {
    /// True for `Unbound`.
    pub fn is_unbound(&self) -> bool {
        matches!(self, Binding::Unbound)
    }
}

/// A name cell's payload: symbol, binding, slot index and resolution cache.
///
/// `index` is meaningful only when `binding` is not `Unbound`.
#[derive(Clone, Debug)]
pub struct Word {
    pub kind: WordKind,
    pub symbol: Symbol,
    binding: Binding,
    index: usize,
    cache: ResolveCache,
}

impl Word {
    /// Create an unbound word.
    pub fn new(kind: WordKind, symbol: Symbol) -> Self {
        Word {
            kind,
            symbol,
            binding: Binding::Unbound,
            index: 0,
            cache: ResolveCache::default(),
        }
    }

    /// The word's binding.
    #[inline]
    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Slot index within the binding (1-based for frames).
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Same-chain resolution cache shared by clones of this word.
    #[inline]
    pub fn cache(&self) -> &ResolveCache {
        &self.cache
    }

    /// Rebind in place. Clones made before the rebind keep their old cache.
    pub fn rebind(&mut self, binding: Binding, index: usize) {
        self.binding = binding;
        self.index = index;
        self.cache = ResolveCache::default();
    }

    /// A copy of this word with a different binding.
    #[must_use]
    pub fn with_binding(&self, binding: Binding, index: usize) -> Self {
        let mut word = Word::new(self.kind, self.symbol);
        word.rebind(binding, index);
        word
    }

    /// A copy of this word with a different spelling variant.
    #[must_use]
    pub fn with_kind(&self, kind: WordKind) -> Self {
        let mut word = self.clone();
        word.kind = kind;
        word
    }
}

/// An action value: the callable plus the object it was fetched through.
#[derive(Clone, Debug)]
pub struct ActionCell {
    pub action: Action,
    /// Object a method was picked from; derived objects override through it.
    pub coupling: Option<FrameRef>,
    /// Word the action was last fetched through.
    pub label: Option<Symbol>,
}

impl ActionCell {
    /// Name to report the action under: the fetching word, else its own.
    pub fn label(&self) -> Option<Symbol> {
        self.label.or_else(|| self.action.label())
    }
}

/// What a cell holds.
#[derive(Clone, Debug)]
pub enum Heart {
    /// No value at all (result of an empty block).
    Void,
    Null,
    Blank,
    Logic(bool),
    Integer(i64),
    Text(Rc<str>),
    Tag(Rc<str>),
    Word(Word),
    Array(ArrayKind, ArrayRef, Specifier),
    Action(ActionCell),
    Object(FrameRef),
    Frame(FrameRef),
    Datatype(Kind),
    Varargs(Varargs),
}

/// Tagged value cell.
#[derive(Clone, Debug)]
pub struct Cell {
    heart: Heart,
    quotes: u8,
    flags: CellFlags,
}

impl Cell {
    /// Wrap a heart with no quotes and no flags.
    #[inline]
    pub fn new(heart: Heart) -> Self {
        Cell {
            heart,
            quotes: 0,
            flags: CellFlags::empty(),
        }
    }

    pub fn void() -> Self {
        Cell::new(Heart::Void)
    }

    pub fn null() -> Self {
        Cell::new(Heart::Null)
    }

    pub fn blank() -> Self {
        Cell::new(Heart::Blank)
    }

    pub fn logic(value: bool) -> Self {
        Cell::new(Heart::Logic(value))
    }

    /// Marker held by a pure refinement that was supplied.
    pub fn okay() -> Self {
        Cell::logic(true)
    }

    pub fn integer(value: i64) -> Self {
        Cell::new(Heart::Integer(value))
    }

    pub fn text(value: &str) -> Self {
        Cell::new(Heart::Text(Rc::from(value)))
    }

    pub fn tag(value: &str) -> Self {
        Cell::new(Heart::Tag(Rc::from(value)))
    }

    pub fn word(kind: WordKind, symbol: Symbol) -> Self {
        Cell::new(Heart::Word(Word::new(kind, symbol)))
    }

    pub fn from_word(word: Word) -> Self {
        Cell::new(Heart::Word(word))
    }

    pub fn array(kind: ArrayKind, array: ArrayRef, specifier: Specifier) -> Self {
        Cell::new(Heart::Array(kind, array, specifier))
    }

    pub fn block(array: ArrayRef, specifier: Specifier) -> Self {
        Cell::array(ArrayKind::Block, array, specifier)
    }

    pub fn action(action: Action, coupling: Option<FrameRef>) -> Self {
        Cell::new(Heart::Action(ActionCell {
            action,
            coupling,
            label: None,
        }))
    }

    pub fn object(frame: FrameRef) -> Self {
        Cell::new(Heart::Object(frame))
    }

    pub fn frame(frame: FrameRef) -> Self {
        Cell::new(Heart::Frame(frame))
    }

    pub fn datatype(kind: Kind) -> Self {
        Cell::new(Heart::Datatype(kind))
    }

    pub fn varargs(varargs: Varargs) -> Self {
        Cell::new(Heart::Varargs(varargs))
    }

    /// Output placeholder before any step has produced a value.
    pub fn fresh_output() -> Self {
        let mut cell = Cell::void();
        cell.mark_stale();
        cell
    }

    #[inline]
    pub fn heart(&self) -> &Heart {
        &self.heart
    }

    #[inline]
    pub fn heart_mut(&mut self) -> &mut Heart {
        &mut self.heart
    }

    #[inline]
    pub fn quotes(&self) -> u8 {
        self.quotes
    }

    #[inline]
    pub fn flags(&self) -> CellFlags {
        self.flags
    }

    /// Datatype of the value, `Quoted` when the quoting depth is nonzero.
    pub fn kind(&self) -> Kind {
        if self.quotes > 0 {
            return Kind::Quoted;
        }
        Kind::of_heart(&self.heart)
    }

    /// Add `depth` levels of quoting.
    #[must_use]
    pub fn quoted(mut self, depth: u8) -> Self {
        self.quotes = self.quotes.saturating_add(depth);
        self
    }

    /// Remove one level of quoting.
    #[must_use]
    pub fn unquoted(mut self) -> Self {
        self.quotes = self.quotes.saturating_sub(1);
        self
    }

    pub fn is_void(&self) -> bool {
        matches!(self.heart, Heart::Void)
    }

    pub fn is_null(&self) -> bool {
        self.quotes == 0 && matches!(self.heart, Heart::Null)
    }

    /// Null and `false` are falsey; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        if self.quotes > 0 {
            return true;
        }
        !matches!(self.heart, Heart::Null | Heart::Logic(false) | Heart::Void)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match (&self.heart, self.quotes) {
            (Heart::Integer(i), 0) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match (&self.heart, self.quotes) {
            (Heart::Text(t), 0) => Some(t),
            _ => None,
        }
    }

    pub fn as_word(&self) -> Option<&Word> {
        match &self.heart {
            Heart::Word(word) if self.quotes == 0 => Some(word),
            _ => None,
        }
    }

    pub fn as_action(&self) -> Option<&ActionCell> {
        match &self.heart {
            Heart::Action(action) if self.quotes == 0 => Some(action),
            _ => None,
        }
    }

    /// Array payload of any array kind.
    pub fn as_array(&self) -> Option<(ArrayKind, &ArrayRef, &Specifier)> {
        match &self.heart {
            Heart::Array(kind, array, specifier) if self.quotes == 0 => {
                Some((*kind, array, specifier))
            }
            _ => None,
        }
    }

    /// Array payload of a plain block.
    pub fn as_block(&self) -> Option<(&ArrayRef, &Specifier)> {
        match self.as_array() {
            Some((ArrayKind::Block, array, specifier)) => Some((array, specifier)),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&FrameRef> {
        match &self.heart {
            Heart::Object(frame) if self.quotes == 0 => Some(frame),
            _ => None,
        }
    }

    pub fn as_varargs(&self) -> Option<&Varargs> {
        match &self.heart {
            Heart::Varargs(varargs) if self.quotes == 0 => Some(varargs),
            _ => None,
        }
    }

    #[inline]
    pub fn is_stale(&self) -> bool {
        self.flags.contains(CellFlags::STALE)
    }

    #[inline]
    pub fn mark_stale(&mut self) {
        self.flags.insert(CellFlags::STALE);
    }

    #[inline]
    pub fn clear_stale(&mut self) {
        self.flags.remove(CellFlags::STALE);
    }

    #[inline]
    pub fn is_infix(&self) -> bool {
        self.flags.contains(CellFlags::INFIX)
    }

    #[inline]
    pub fn is_deferred(&self) -> bool {
        self.flags.contains(CellFlags::DEFER)
    }

    /// Copy with the given flags set.
    #[must_use]
    pub fn with_flags(mut self, flags: CellFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    /// Copy with only value-level flags (drops STALE).
    #[must_use]
    pub fn fresh(mut self) -> Self {
        self.clear_stale();
        self
    }

    /// Record `symbol` as the label of an action value; other values pass through.
    pub fn labeled(mut self, symbol: Symbol) -> Self {
        if let Heart::Action(action) = &mut self.heart {
            action.label = Some(symbol);
        }
        self
    }
}

/// Structural equality for scalars, words by spelling, series deep,
/// frames and actions by identity.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        if self.quotes != other.quotes {
            return false;
        }
        match (&self.heart, &other.heart) {
            (Heart::Void, Heart::Void)
            | (Heart::Null, Heart::Null)
            | (Heart::Blank, Heart::Blank) => true,
            (Heart::Logic(a), Heart::Logic(b)) => a == b,
            (Heart::Integer(a), Heart::Integer(b)) => a == b,
            (Heart::Text(a), Heart::Text(b)) | (Heart::Tag(a), Heart::Tag(b)) => a == b,
            (Heart::Word(a), Heart::Word(b)) => a.kind == b.kind && a.symbol == b.symbol,
            (Heart::Array(ka, a, _), Heart::Array(kb, b, _)) => {
                ka == kb && (a.ptr_eq(b) || *a.borrow() == *b.borrow())
            }
            (Heart::Action(a), Heart::Action(b)) => a.action.ptr_eq(&b.action),
            (Heart::Object(a), Heart::Object(b)) | (Heart::Frame(a), Heart::Frame(b)) => {
                a.ptr_eq(b)
            }
            (Heart::Datatype(a), Heart::Datatype(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for WordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WordKind::Word => "word",
            WordKind::Set => "set-word",
            WordKind::Get => "get-word",
            WordKind::Sym => "sym-word",
            WordKind::Refinement => "refinement",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests;
