//! Binding as seen from scripts: closures, derived objects, virtual binding.

use pretty_assertions::assert_eq;
use ren_ir::Cell;

use super::{interpreter, run, run_err_kind, run_molded};
use crate::binding::live_binder_claims;
use crate::errors::EvalErrorKind;

#[test]
fn closure_keeps_its_defining_frame() {
    let source = "
        make-adder: func [n] [func [x] [x + n]]
        add5: make-adder 5
        add7: make-adder 7
        reduce [add5 10 add7 10]
    ";
    assert_eq!(run_molded(source), "[15 17]");
}

#[test]
fn block_escaping_its_call_is_inaccessible() {
    assert_eq!(
        run_err_kind("f: func [x] [[x]] b: f 10 do b"),
        EvalErrorKind::Inaccessible {
            name: "x".to_string()
        }
    );
}

#[test]
fn derived_object_overrides_method_fields() {
    let source = "
        base: make object! [x: 1 get-x: func [] [x]]
        derived: make base [x: 2]
        reduce [base/get-x derived/get-x]
    ";
    assert_eq!(run_molded(source), "[1 2]");
}

#[test]
fn derived_object_keeps_parent_fields() {
    let source = "
        base: make object! [a: 1 b: 2]
        derived: make base [b: 20 c: 30]
        reduce [derived/a derived/b derived/c base/b]
    ";
    assert_eq!(run_molded(source), "[1 20 30 2]");
}

#[test]
fn use_binds_virtually() {
    let mut interp = interpreter();
    let result = interp
        .eval_source("use [x] [x: 10 x]")
        .unwrap_or_else(|err| panic!("use failed: {err}"));
    assert_eq!(result, Cell::integer(10));
    assert_eq!(interp.user_value("x"), Some(Cell::null()));
}

#[test]
fn virtual_binding_reaches_only_its_own_block() {
    let source = "
        body: [x: x + 1 x]
        x: 100
        reduce [use [x] [x: 1 do body] x]
    ";
    assert_eq!(run_molded(source), "[101 101]");
}

#[test]
fn for_each_walks_in_groups() {
    assert_eq!(run("sum: 0 for-each x [1 2 3] [sum: sum + x] sum"), Cell::integer(6));
    assert_eq!(
        run("total: 0 for-each [a b] [1 2 3 4] [total: total + (a * b)] total"),
        Cell::integer(14)
    );
    assert!(run("last: 0 for-each [a b] [1 2 3] [last: b] last").is_null());
}

#[test]
fn for_each_variables_do_not_leak() {
    let mut interp = interpreter();
    interp
        .eval_source("x: 0 for-each x [1 2] [x]")
        .unwrap_or_else(|err| panic!("for-each failed: {err}"));
    assert_eq!(interp.user_value("x"), Some(Cell::integer(0)));
}

#[test]
fn duplicate_loop_variables() {
    assert_eq!(
        run_err_kind("for-each [a a] [1 2] [a]"),
        EvalErrorKind::DuplicateBinding {
            name: "a".to_string()
        }
    );
}

#[test]
fn explicit_bind_and_get() {
    let source = "
        o: make object! [v: 42]
        code: [v]
        bind code o
        do code
    ";
    assert_eq!(run(source), Cell::integer(42));
    assert_eq!(run("n: 3 set 'n 4 get 'n"), Cell::integer(4));
}

#[test]
fn word_captured_inside_a_call_outlives_it() {
    let source = "
        f: func [a] ['a]
        w: f 9
        get w
    ";
    assert_eq!(run(source), Cell::integer(9));
}

#[test]
fn scripts_release_every_binder_claim() {
    let before = live_binder_claims();
    run("f: func [a /b] [a] g: specialize :f [a: 1] o: make object! [p: 1] use [q] [q: 2]");
    let _ = run_err_kind("for-each [a a] [1] [a]");
    let _ = run_err_kind("f: func [a a] [a]");
    assert_eq!(live_binder_claims(), before);
}
