//! Step evaluation: infix, `let`, set-words, invisibles.

use pretty_assertions::assert_eq;
use ren_ir::Cell;

use super::{run, run_err_kind, run_molded};
use crate::errors::EvalErrorKind;

#[test]
fn infix_operators_associate_left_to_right() {
    assert_eq!(run("1 + 2 * 3"), Cell::integer(9));
    assert_eq!(run("10 - 4 - 3"), Cell::integer(3));
}

#[test]
fn prefix_argument_runs_through_infix() {
    assert_eq!(run("negate 1 + 2"), Cell::integer(-3));
}

#[test]
fn set_word_takes_the_whole_expression() {
    assert_eq!(run("x: 2 + 3 x"), Cell::integer(5));
}

#[test]
fn group_evaluates_first() {
    assert_eq!(run("2 * (1 + 2)"), Cell::integer(6));
}

#[test]
fn empty_source_is_void() {
    assert!(run("").is_void());
    assert!(run("comment 1").is_void());
}

#[test]
fn invisibles_leave_the_prior_value() {
    assert_eq!(run(r#"1 comment "ignored""#), Cell::integer(1));
    assert_eq!(run("1 elide 2 + 3"), Cell::integer(1));
    assert_eq!(run(r#"x: 1 (comment "nothing")"#), Cell::integer(1));
}

#[test]
fn invisible_inside_argument_is_skipped() {
    assert_eq!(run(r#"negate comment "skip" 4"#), Cell::integer(-4));
}

#[test]
fn let_shadows_without_touching_the_outer_variable() {
    assert_eq!(run("let x: 1 let x: 2 x"), Cell::integer(2));
    assert_eq!(run("x: 5 do [let x: 1 x] x"), Cell::integer(5));
}

#[test]
fn let_of_plain_word_is_invisible_and_null() {
    assert_eq!(run("1 let x"), Cell::integer(1));
    assert!(run("let x x").is_null());
}

#[test]
fn let_inside_function_body_is_per_call() {
    let source = "
        f: func [n] [let y: n * 2 y]
        reduce [f 1 f 2]
    ";
    assert_eq!(run_molded(source), "[2 4]");
}

#[test]
fn deferred_infix_waits_for_the_full_call() {
    assert_eq!(run("x: 0 if false [1] then [x: 10] x"), Cell::integer(0));
    assert_eq!(run("x: 0 if true [1] then [x: 10] x"), Cell::integer(10));
    assert_eq!(run("if true [1] then [2]"), Cell::integer(2));
}

#[test]
fn infix_without_left_argument() {
    assert_eq!(
        run_err_kind("+ 1 2"),
        EvalErrorKind::NoLeftArgument {
            action: "+".to_string()
        }
    );
}

#[test]
fn quoted_values_lose_one_level() {
    assert_eq!(run_molded("'x"), "x");
    assert_eq!(run_molded("''x"), "'x");
    assert_eq!(run_molded("'[a b]"), "[a b]");
}

#[test]
fn unbound_word() {
    assert_eq!(
        run_err_kind("nowhere"),
        EvalErrorKind::NotBound {
            name: "nowhere".to_string()
        }
    );
}

#[test]
fn set_word_needs_a_value() {
    assert!(matches!(
        run_err_kind("x:"),
        EvalErrorKind::Custom { message } if message == "x: needs a value"
    ));
}

#[test]
fn while_loop_counts() {
    assert_eq!(run("n: 0 while [n < 5] [n: n + 1] n"), Cell::integer(5));
}

#[test]
fn comparison_and_logic() {
    assert_eq!(run("1 = 1"), Cell::logic(true));
    assert_eq!(run("2 > 3"), Cell::logic(false));
    assert_eq!(run("not 2 > 3"), Cell::logic(true));
    assert_eq!(run(r#"either 1 < 2 ["yes"] ["no"]"#), Cell::text("yes"));
}
