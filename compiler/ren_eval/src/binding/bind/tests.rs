use super::*;
use pretty_assertions::assert_eq;

use ren_ir::{Param, ParamClass, ParamList, TypeSet, Word};

use crate::binding::binder::live_binder_claims;
use crate::binding::resolve::{resolve, ResolveError};
use crate::errors::EvalErrorKind;

fn scan(source: &str, symbols: &SymbolTable) -> ArrayRef {
    ren_lexer::scan(source, symbols).unwrap_or_else(|e| panic!("scan failed: {e}"))
}

fn word_at(array: &ArrayRef, path: &[usize]) -> Word {
    let (last, outer) = path.split_last().unwrap_or_else(|| panic!("empty path"));
    let mut current = array.clone();
    for index in outer {
        let cell = current.get(*index).unwrap_or_else(|| panic!("no cell at {index}"));
        current = match cell.heart() {
            Heart::Array(_, inner, _) => inner.clone(),
            _ => panic!("cell at {index} is not an array"),
        };
    }
    match current.get(*last).map(|cell| cell.heart().clone()) {
        Some(Heart::Word(word)) => word,
        other => panic!("expected a word, got {other:?}"),
    }
}

fn bound_to(word: &Word, frame: &FrameRef) -> bool {
    matches!(word.binding(), Binding::Specific(target) if target.ptr_eq(frame))
}

fn object_with(symbols: &SymbolTable, names: &[&str]) -> FrameRef {
    let frame = FrameRef::object();
    for name in names {
        frame.append(Key::new(symbols.intern(name)), Cell::null());
    }
    frame
}

#[test]
fn test_deep_bind_reaches_nested_blocks() {
    let symbols = SymbolTable::new();
    let array = scan("a [a b (a)] c", &symbols);
    let frame = object_with(&symbols, &["a"]);

    let bound = bind(&array, &frame, BindOptions::deep());
    assert_eq!(bound, 3);
    assert!(bound_to(&word_at(&array, &[0]), &frame));
    assert!(bound_to(&word_at(&array, &[1, 0]), &frame));
    assert!(bound_to(&word_at(&array, &[1, 2, 0]), &frame));
    assert!(word_at(&array, &[1, 1]).binding().is_unbound());
}

#[test]
fn test_shallow_bind_stays_at_top_level() {
    let symbols = SymbolTable::new();
    let array = scan("a [a]", &symbols);
    let frame = object_with(&symbols, &["a"]);

    assert_eq!(bind(&array, &frame, BindOptions::default()), 1);
    assert!(word_at(&array, &[1, 0]).binding().is_unbound());
}

#[test]
fn test_collecting_bind_adds_set_words_only() {
    let symbols = SymbolTable::new();
    let array = scan("x: 1 y [z: 2] print x", &symbols);
    let frame = FrameRef::object();

    bind(&array, &frame, BindOptions::collecting());
    let names: Vec<_> = frame.keys().iter().map(|key| symbols.lookup(key.symbol)).collect();
    assert_eq!(names, vec!["x", "z"]);
    assert!(bound_to(&word_at(&array, &[5]), &frame));
    assert!(word_at(&array, &[2]).binding().is_unbound());
    assert_eq!(word_at(&array, &[3, 0]).index(), 2);
}

#[test]
fn test_hidden_keys_are_not_bound() {
    let symbols = SymbolTable::new();
    let array = scan("secret", &symbols);
    let frame = FrameRef::object();
    frame.append(Key::hidden(symbols.intern("secret")), Cell::null());

    assert_eq!(bind(&array, &frame, BindOptions::deep()), 0);
}

#[test]
fn test_bind_releases_every_claim() {
    let symbols = SymbolTable::new();
    let before = live_binder_claims();
    let array = scan("a: b: [c: a]", &symbols);
    bind(&array, &FrameRef::object(), BindOptions::collecting());
    assert_eq!(live_binder_claims(), before);
}

fn paramlist_of(symbols: &SymbolTable, names: &[(&str, ParamClass)]) -> ParamListRef {
    ParamListRef::new(ParamList::new(
        names
            .iter()
            .map(|(name, class)| Param::new(symbols.intern(name), *class, TypeSet::any_value()))
            .collect(),
    ))
}

#[test]
fn test_relative_bind_includes_hidden_params() {
    let symbols = SymbolTable::new();
    let params = paramlist_of(
        &symbols,
        &[("n", ParamClass::Normal), ("return", ParamClass::Return)],
    );
    let body = scan("return [n m]", &symbols);

    assert_eq!(bind_relative(&body, &params), 2);
    let ret = word_at(&body, &[0]);
    assert!(matches!(ret.binding(), Binding::Relative(list) if list.ptr_eq(&params)));
    assert_eq!(ret.index(), 2);
    assert_eq!(word_at(&body, &[1, 0]).index(), 1);
    assert!(word_at(&body, &[1, 1]).binding().is_unbound());
}

#[test]
fn test_copy_deep_derelativized_fixes_nested_words() {
    let symbols = SymbolTable::new();
    let params = paramlist_of(&symbols, &[("n", ParamClass::Normal)]);
    let body = scan("[n [n]]", &symbols);
    bind_relative(&body, &params);

    let frame = FrameRef::with_keys(
        FrameKind::Call {
            paramlist: params.clone(),
            coupling: None,
        },
        params.keys(),
    );
    frame.set(1, Cell::integer(42));

    let copy = copy_deep_derelativized(&body, &Specifier::Frame(frame.clone()));
    assert!(!copy.ptr_eq(&body));
    let inner = word_at(&copy, &[0, 1, 0]);
    assert!(bound_to(&inner, &frame));
    assert!(frame.is_reified());

    let original = word_at(&body, &[0, 1, 0]);
    assert!(matches!(original.binding(), Binding::Relative(_)));

    frame.decay();
    let value = resolve(&inner, &Specifier::Empty)
        .unwrap_or_else(|e| panic!("{e}"))
        .get();
    assert_eq!(value.as_integer(), Some(42));
}

#[test]
fn test_virtual_bind_shares_the_body_array() {
    let symbols = SymbolTable::new();
    let body_array = scan("x y", &symbols);
    let body = Cell::block(body_array.clone(), Specifier::Empty);
    let vars = Cell::block(scan("x", &symbols), Specifier::Empty);

    let (bound, frame) =
        virtual_bind_new_context(&body, &vars, &symbols).unwrap_or_else(|e| panic!("{e}"));
    frame.set(1, Cell::integer(5));

    let (array, specifier) = bound.as_block().unwrap_or_else(|| panic!("expected a block"));
    assert!(array.ptr_eq(&body_array));
    assert!(word_at(&body_array, &[0]).binding().is_unbound());

    let x = word_at(array, &[0]);
    let value = resolve(&x, specifier).unwrap_or_else(|e| panic!("{e}")).get();
    assert_eq!(value.as_integer(), Some(5));
    assert_eq!(
        resolve(&x, &Specifier::Empty).err(),
        Some(ResolveError::Unbound)
    );
    assert!(resolve(&word_at(array, &[1]), specifier).is_err());
}

#[test]
fn test_virtual_bind_accepts_a_single_word() {
    let symbols = SymbolTable::new();
    let body = Cell::block(scan("item", &symbols), Specifier::Empty);
    let var = Cell::word(WordKind::Word, symbols.intern("item"));
    let (_, frame) =
        virtual_bind_new_context(&body, &var, &symbols).unwrap_or_else(|e| panic!("{e}"));
    assert_eq!(frame.len(), 1);
}

#[test]
fn test_virtual_bind_rejects_duplicates_and_releases_claims() {
    let symbols = SymbolTable::new();
    let before = live_binder_claims();
    let body = Cell::block(scan("a", &symbols), Specifier::Empty);
    let vars = Cell::block(scan("a b a", &symbols), Specifier::Empty);

    let err = virtual_bind_new_context(&body, &vars, &symbols)
        .err()
        .unwrap_or_else(|| panic!("expected duplicate error"));
    assert_eq!(
        err.kind,
        EvalErrorKind::DuplicateBinding {
            name: "a".to_string()
        }
    );
    assert_eq!(live_binder_claims(), before);
}

#[test]
fn test_collect_set_words_in_order() {
    let symbols = SymbolTable::new();
    let array = scan("b: 1 a: 2 b: 3 [c: 4]", &symbols);
    let names: Vec<_> = collect_set_words(&array)
        .into_iter()
        .map(|symbol| symbols.lookup(symbol))
        .collect();
    assert_eq!(names, vec!["b", "a"]);
}
