use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use ren_ir::{Heart, Kind};

fn kinds(source: &str) -> Vec<Kind> {
    let symbols = SymbolTable::new();
    let array = scan(source, &symbols).unwrap_or_else(|e| panic!("scan failed: {e}"));
    let kinds = array.borrow().iter().map(Cell::kind).collect();
    kinds
}

fn spelling(cell: &Cell, symbols: &SymbolTable) -> String {
    match cell.heart() {
        Heart::Word(word) => symbols.lookup(word.symbol).to_string(),
        other => panic!("expected a word, got {other:?}"),
    }
}

#[test]
fn test_word_variants() {
    assert_eq!(
        kinds("foo foo: :foo @foo /foo"),
        vec![
            Kind::Word,
            Kind::SetWord,
            Kind::GetWord,
            Kind::SymWord,
            Kind::Refinement
        ]
    );
}

#[test]
fn test_operators_are_words() {
    assert_eq!(
        kinds("+ - * = < > equal? tail?"),
        vec![Kind::Word; 8]
    );
}

#[test]
fn test_negative_integer_vs_minus() {
    let symbols = SymbolTable::new();
    let array = scan("-1 - 1", &symbols).unwrap_or_else(|e| panic!("{e}"));
    let cells = array.to_vec();
    assert_eq!(cells[0].as_integer(), Some(-1));
    assert_eq!(spelling(&cells[1], &symbols), "-");
    assert_eq!(cells[2].as_integer(), Some(1));
}

#[test]
fn test_nested_arrays() {
    let symbols = SymbolTable::new();
    let array = scan("[a (b @[c]) @(d)]", &symbols).unwrap_or_else(|e| panic!("{e}"));
    let outer = array.get(0).unwrap_or_else(|| panic!("empty"));
    let Some((ArrayKind::Block, inner, _)) = outer.as_array() else {
        panic!("expected block");
    };
    let inner_kinds: Vec<Kind> = inner.borrow().iter().map(Cell::kind).collect();
    assert_eq!(inner_kinds, vec![Kind::Word, Kind::Group, Kind::SymGroup]);
}

#[test]
fn test_paths() {
    let symbols = SymbolTable::new();
    let array = scan("f/b/c obj/field:", &symbols).unwrap_or_else(|e| panic!("{e}"));
    let cells = array.to_vec();
    assert_eq!(cells[0].kind(), Kind::Path);
    assert_eq!(cells[1].kind(), Kind::SetPath);
    let Some((_, segments, _)) = cells[0].as_array() else {
        panic!("expected path");
    };
    let names: Vec<String> = segments
        .borrow()
        .iter()
        .map(|cell| spelling(cell, &symbols))
        .collect();
    assert_eq!(names, vec!["f", "b", "c"]);
}

#[test]
fn test_quotes_and_literals() {
    let symbols = SymbolTable::new();
    let array = scan(r#"'x ''[1] "a\"b" <local> _ ; comment"#, &symbols)
        .unwrap_or_else(|e| panic!("{e}"));
    let cells = array.to_vec();
    assert_eq!(cells.len(), 5);
    assert_eq!(cells[0].quotes(), 1);
    assert_eq!(cells[1].quotes(), 2);
    assert_eq!(cells[2].as_text(), Some("a\"b"));
    assert_eq!(cells[3].kind(), Kind::Tag);
    assert_eq!(cells[4].kind(), Kind::Blank);
}

#[test]
fn test_errors() {
    let symbols = SymbolTable::new();
    let err = |source: &str| match scan(source, &symbols) {
        Ok(_) => panic!("expected error for {source:?}"),
        Err(e) => e.kind,
    };
    assert_eq!(err("[1 2"), LexErrorKind::Unclosed { open: '[' });
    assert_eq!(err("1 ]"), LexErrorKind::UnexpectedClose { close: ']' });
    assert_eq!(
        err("(1 ]"),
        LexErrorKind::Mismatched {
            open: '(',
            close: ']'
        }
    );
    assert_eq!(err("[1 ']"), LexErrorKind::DanglingQuote);
    assert_eq!(err("99999999999999999999"), LexErrorKind::IntOverflow);
    assert_eq!(err(r#""\q""#), LexErrorKind::InvalidEscape { escape: 'q' });
}

proptest! {
    #[test]
    fn integers_scan_to_their_values(values in proptest::collection::vec(any::<i64>(), 0..16)) {
        let symbols = SymbolTable::new();
        let source = values.iter().map(i64::to_string).collect::<Vec<_>>().join(" ");
        let array = scan(&source, &symbols).map_err(|e| TestCaseError::fail(e.to_string()))?;
        let scanned: Vec<Option<i64>> = array.borrow().iter().map(Cell::as_integer).collect();
        let expected: Vec<Option<i64>> = values.into_iter().map(Some).collect();
        prop_assert_eq!(scanned, expected);
    }
}
