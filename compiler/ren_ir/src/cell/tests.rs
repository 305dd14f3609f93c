use super::*;
use pretty_assertions::assert_eq;

use crate::symbol::Symbol;

fn sym(n: u32) -> Symbol {
    Symbol::from_raw(n)
}

#[test]
fn test_quoting_changes_kind() {
    let cell = Cell::integer(10).quoted(2);
    assert_eq!(cell.kind(), Kind::Quoted);
    assert_eq!(cell.quotes(), 2);
    let once = cell.unquoted();
    assert_eq!(once.kind(), Kind::Quoted);
    let plain = once.unquoted();
    assert_eq!(plain.kind(), Kind::Integer);
    assert_eq!(plain.as_integer(), Some(10));
}

#[test]
fn test_truthiness() {
    assert!(!Cell::null().is_truthy());
    assert!(!Cell::logic(false).is_truthy());
    assert!(Cell::logic(true).is_truthy());
    assert!(Cell::integer(0).is_truthy());
    assert!(Cell::null().quoted(1).is_truthy());
}

#[test]
fn test_stale_flag() {
    let mut out = Cell::fresh_output();
    assert!(out.is_stale());
    assert!(out.is_void());
    out = Cell::integer(1).with_flags(CellFlags::STALE);
    assert!(out.is_stale());
    out.clear_stale();
    assert!(!out.is_stale());
    assert_eq!(out, Cell::integer(1));
}

#[test]
fn test_word_equality_ignores_binding() {
    let a = Word::new(WordKind::Word, sym(7));
    let b = a.with_binding(Binding::Specific(FrameRef::object()), 1);
    assert_eq!(Cell::from_word(a.clone()), Cell::from_word(b));
    assert_ne!(
        Cell::from_word(a.clone()),
        Cell::from_word(a.with_kind(WordKind::Set))
    );
}

#[test]
fn test_rebind_resets_cache_for_that_word_only() {
    use crate::specifier::{CacheState, Patch};

    let mut word = Word::new(WordKind::Word, sym(3));
    let clone = word.clone();
    let head = Patch::single(sym(9), Cell::null(), None, None);
    clone.cache().set(CacheState::Miss {
        head: std::rc::Rc::downgrade(&head),
    });
    assert!(word.cache().get().is_for(&head));

    word.rebind(Binding::Specific(FrameRef::object()), 1);
    assert!(matches!(word.cache().get(), CacheState::Unchecked));
    assert!(clone.cache().get().is_for(&head));
    assert!(clone.binding().is_unbound());
    assert_eq!(word.index(), 1);
}

#[test]
fn test_blocks_compare_deeply() {
    let a = ArrayRef::from_vec(vec![Cell::integer(1), Cell::text("x")]);
    let b = ArrayRef::from_vec(vec![Cell::integer(1), Cell::text("x")]);
    assert_eq!(
        Cell::block(a, Specifier::Empty),
        Cell::block(b, Specifier::Empty)
    );
}
