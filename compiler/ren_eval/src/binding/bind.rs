//! Bind operations.
//!
//! - [`bind`] rewrites words in place to point at a concrete frame.
//! - [`bind_relative`] rewrites words in a freshly copied body to point at a
//!   parameter list; they need a call frame to be read.
//! - [`copy_deep_derelativized`] copies a body, fixing every word that
//!   resolves through the given specifier to its slot.
//! - [`virtual_bind_new_context`] exposes a new frame to a block through a
//!   patch, without touching the block's array.

use ren_ir::{
    ArrayRef, Binding, Cell, FrameKind, FrameRef, Heart, Key, ParamListRef, Specifier, Symbol,
    SymbolTable, WordKind,
};

use super::binder::Binder;
use super::patch::{derive_specifier, make_frame_patch};
use super::resolve::derelativize_cell;
use crate::errors::{duplicate_binding, not_a_word, EvalError};

/// What [`bind`] touches.
#[derive(Clone, Copy, Debug, Default)]
pub struct BindOptions {
    /// Recurse into nested arrays.
    pub deep: bool,
    /// Append keys for words the frame does not have yet.
    pub add_new: bool,
    /// With `add_new`, only set-words introduce keys.
    pub set_words_only: bool,
}

impl BindOptions {
    pub fn deep() -> Self {
        BindOptions {
            deep: true,
            ..BindOptions::default()
        }
    }

    /// Deep bind that adds a key for every set-word (script and object bodies).
    pub fn collecting() -> Self {
        BindOptions {
            deep: true,
            add_new: true,
            set_words_only: true,
        }
    }
}

/// Claims made on a binder for one bind span, released on every exit.
struct Claims {
    binder: Binder,
    symbols: Vec<Symbol>,
}

impl Claims {
    fn new() -> Self {
        Claims {
            binder: Binder::new(),
            symbols: Vec::new(),
        }
    }

    fn try_add(&mut self, symbol: Symbol, index: usize) -> bool {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        let added = self.binder.try_add(symbol, index);
        if added {
            self.symbols.push(symbol);
        }
        added
    }

    fn index_of(&self, symbol: Symbol) -> Option<usize> {
        usize::try_from(self.binder.get_or_zero(symbol))
            .ok()
            .filter(|index| *index > 0)
    }

    fn finish(self) {
        let Claims {
            mut binder,
            symbols,
        } = self;
        for symbol in symbols {
            binder.remove(symbol);
        }
        if let Err(err) = binder.shutdown() {
            tracing::warn!(%err, "bind span left claims behind");
        }
    }
}

/// Bind every word in `array` whose spelling is a visible key of `frame`.
///
/// Returns the number of words rebound.
pub fn bind(array: &ArrayRef, frame: &FrameRef, options: BindOptions) -> usize {
    let mut claims = Claims::new();
    for (offset, key) in frame.keys().iter().enumerate() {
        if !key.is_hidden() {
            claims.try_add(key.symbol, offset + 1);
        }
    }

    if options.add_new {
        let mut fresh = Vec::new();
        collect_words(array, options.deep, options.set_words_only, &mut fresh);
        for symbol in fresh {
            if claims.index_of(symbol).is_none() {
                let index = frame.append(Key::new(symbol), Cell::null());
                claims.try_add(symbol, index);
            }
        }
    }

    let bound = rebind_words(array, options.deep, &mut |symbol| {
        claims
            .index_of(symbol)
            .map(|index| (Binding::Specific(frame.clone()), index))
    });
    claims.finish();
    bound
}

/// Bind every word spelled like a parameter (hidden ones included) relative to `paramlist`.
pub fn bind_relative(array: &ArrayRef, paramlist: &ParamListRef) -> usize {
    let mut claims = Claims::new();
    for (offset, param) in paramlist.params().iter().enumerate() {
        claims.try_add(param.symbol, offset + 1);
    }
    let bound = rebind_words(array, true, &mut |symbol| {
        claims
            .index_of(symbol)
            .map(|index| (Binding::Relative(paramlist.clone()), index))
    });
    claims.finish();
    bound
}

fn rebind_words(
    array: &ArrayRef,
    deep: bool,
    target: &mut dyn FnMut(Symbol) -> Option<(Binding, usize)>,
) -> usize {
    let mut bound = 0;
    let mut nested = Vec::new();
    {
        let mut cells = array.borrow_mut();
        for cell in cells.iter_mut() {
            match cell.heart_mut() {
                Heart::Word(word) => {
                    if let Some((binding, index)) = target(word.symbol) {
                        word.rebind(binding, index);
                        bound += 1;
                    }
                }
                Heart::Array(_, inner, _) if deep => nested.push(inner.clone()),
                _ => {}
            }
        }
    }
    for inner in nested {
        bound += rebind_words(&inner, deep, target);
    }
    bound
}

fn collect_words(array: &ArrayRef, deep: bool, set_words_only: bool, out: &mut Vec<Symbol>) {
    for cell in array.borrow().iter() {
        match cell.heart() {
            Heart::Word(word) if !set_words_only || word.kind == WordKind::Set => {
                if !out.contains(&word.symbol) {
                    out.push(word.symbol);
                }
            }
            Heart::Array(_, inner, _) if deep => collect_words(inner, deep, set_words_only, out),
            _ => {}
        }
    }
}

/// Spellings of the set-words at the top level of `array`, first occurrence order.
pub fn collect_set_words(array: &ArrayRef) -> Vec<Symbol> {
    let mut out = Vec::new();
    collect_words(array, false, true, &mut out);
    out
}

/// Deep copy of `array` with every word fixed to the slot it resolves to
/// through `specifier`. Nested arrays in the copy carry no specifier.
pub fn copy_deep_derelativized(array: &ArrayRef, specifier: &Specifier) -> ArrayRef {
    let cells = array.to_vec();
    let copied = cells
        .iter()
        .map(|cell| match cell.heart() {
            Heart::Word(_) => derelativize_cell(cell, specifier),
            Heart::Array(kind, inner, inner_specifier) => {
                let inner_specifier = derive_specifier(inner_specifier, specifier);
                let mut copy = cell.clone();
                *copy.heart_mut() = Heart::Array(
                    *kind,
                    copy_deep_derelativized(inner, &inner_specifier),
                    Specifier::Empty,
                );
                copy
            }
            _ => cell.clone(),
        })
        .collect();
    ArrayRef::from_vec(copied)
}

/// Expose a fresh frame holding `vars` to `body` through a whole-frame patch.
///
/// `vars` is a word or a block of words. The body's array is shared, not
/// copied; only the returned block's specifier differs.
pub fn virtual_bind_new_context(
    body: &Cell,
    vars: &Cell,
    symbols: &SymbolTable,
) -> Result<(Cell, FrameRef), EvalError> {
    let Some((array, body_specifier)) = body.as_block() else {
        return Err(EvalError::new(format!(
            "expected a block body, got {}",
            body.kind()
        )));
    };

    let names: Vec<Cell> = match vars.heart() {
        Heart::Word(_) => vec![vars.clone()],
        Heart::Array(_, words, _) => words.to_vec(),
        _ => return Err(not_a_word(vars.kind().name())),
    };

    let mut claims = Claims::new();
    let mut keys = Vec::with_capacity(names.len());
    for name in &names {
        let Some(word) = name.as_word() else {
            claims.finish();
            return Err(not_a_word(name.kind().name()));
        };
        if !claims.try_add(word.symbol, keys.len() + 1) {
            claims.finish();
            return Err(duplicate_binding(symbols.lookup(word.symbol)));
        }
        keys.push(Key::new(word.symbol));
    }
    claims.finish();

    let frame = FrameRef::with_keys(FrameKind::Context, keys);
    let patch = make_frame_patch(frame.clone(), body_specifier);
    tracing::trace!(vars = names.len(), "virtual bind of new context");
    let cell = Cell::block(array.clone(), Specifier::Patch(patch));
    Ok((cell, frame))
}

#[cfg(test)]
mod tests;
