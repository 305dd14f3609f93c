//! Interned symbol identifier.

use std::fmt;

/// Interned name.
///
/// A plain 32-bit index into the [`SymbolTable`](crate::SymbolTable).
/// Equality is identity: two words spell the same name iff their symbols
/// compare equal.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct Symbol(u32);

impl Symbol {
    /// Create from raw u32 value.
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Symbol(raw)
    }

    /// Get raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Index into the symbol table's string storage.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

impl Default for Symbol {
    fn default() -> Self {
        sym::EMPTY
    }
}

/// Well-known symbols, pre-interned by every [`SymbolTable`](crate::SymbolTable).
///
/// These must match the order of `PRE_INTERNED`.
pub mod sym {
    use super::Symbol;

    pub const EMPTY: Symbol = Symbol(0);
    pub const LET: Symbol = Symbol(1);
    pub const RETURN: Symbol = Symbol(2);

    /// Spellings of the pre-interned symbols, in index order.
    pub(crate) const PRE_INTERNED: &[&str] = &["", "let", "return"];
}
