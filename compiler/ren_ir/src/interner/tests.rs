use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_intern_is_identity() {
    let table = SymbolTable::new();
    let a = table.intern("append");
    let b = table.intern("append");
    let c = table.intern("insert");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(table.lookup(a), "append");
}

#[test]
fn test_pre_interned_symbols() {
    let table = SymbolTable::new();
    assert_eq!(table.intern("let"), sym::LET);
    assert_eq!(table.intern("return"), sym::RETURN);
    assert_eq!(table.lookup(sym::EMPTY), "");
}

#[test]
fn test_get_does_not_intern() {
    let table = SymbolTable::new();
    let before = table.len();
    assert_eq!(table.get("never-seen"), None);
    assert_eq!(table.len(), before);
}

#[test]
fn test_shared_table_sees_same_symbols() {
    let shared = SharedSymbols::new();
    let other = shared.clone();
    let x = shared.intern("x");
    assert_eq!(other.get("x"), Some(x));
}
