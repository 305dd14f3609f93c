//! String interner for symbols.
//!
//! Provides O(1) interning and lookup. Interned strings are leaked so that
//! lookups can hand out `&'static str` without holding the lock.

use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::symbol::{sym, Symbol};

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InternError {
    /// Table exceeded capacity (over 4 billion symbols).
    #[error("symbol table exceeded capacity: {count} symbols, max is {max}", max = u32::MAX)]
    Overflow { count: usize },
}

struct Storage {
    /// Map from spelling to symbol index.
    map: FxHashMap<&'static str, u32>,
    /// Spellings in index order.
    strings: Vec<&'static str>,
}

/// Symbol table.
///
/// # Thread Safety
/// Uses a `RwLock` so one table can be shared by several interpreters.
pub struct SymbolTable {
    storage: RwLock<Storage>,
}

impl SymbolTable {
    /// Create a new table with the well-known symbols pre-interned.
    pub fn new() -> Self {
        let mut storage = Storage {
            map: FxHashMap::default(),
            strings: Vec::with_capacity(256),
        };
        for (index, &spelling) in sym::PRE_INTERNED.iter().enumerate() {
            let index = u32::try_from(index).unwrap_or(u32::MAX);
            storage.map.insert(spelling, index);
            storage.strings.push(spelling);
        }
        SymbolTable {
            storage: RwLock::new(storage),
        }
    }

    /// Try to intern a string, returning its symbol or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Symbol, InternError> {
        // Fast path: already interned
        if let Some(&index) = self.storage.read().map.get(s) {
            return Ok(Symbol::from_raw(index));
        }

        let mut guard = self.storage.write();

        // Double-check after acquiring write lock
        if let Some(&index) = guard.map.get(s) {
            return Ok(Symbol::from_raw(index));
        }

        let index = u32::try_from(guard.strings.len()).map_err(|_| InternError::Overflow {
            count: guard.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        guard.strings.push(leaked);
        guard.map.insert(leaked, index);
        Ok(Symbol::from_raw(index))
    }

    /// Intern a string, returning its symbol.
    ///
    /// # Panics
    /// Panics if the table exceeds capacity. Use `try_intern` for fallible interning.
    #[inline]
    pub fn intern(&self, s: &str) -> Symbol {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up the spelling of a symbol.
    ///
    /// Unknown symbols (from another table) spell as the empty string.
    pub fn lookup(&self, symbol: Symbol) -> &'static str {
        self.storage
            .read()
            .strings
            .get(symbol.index())
            .copied()
            .unwrap_or("")
    }

    /// Look up a symbol without interning.
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.storage.read().map.get(s).copied().map(Symbol::from_raw)
    }

    /// Number of interned symbols.
    pub fn len(&self) -> usize {
        self.storage.read().strings.len()
    }

    /// Always false: the well-known symbols are present from construction.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared symbol table.
#[derive(Clone, Default)]
pub struct SharedSymbols(Arc<SymbolTable>);

impl SharedSymbols {
    /// Create a fresh shared table.
    pub fn new() -> Self {
        SharedSymbols(Arc::new(SymbolTable::new()))
    }
}

impl Deref for SharedSymbols {
    type Target = SymbolTable;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests;
