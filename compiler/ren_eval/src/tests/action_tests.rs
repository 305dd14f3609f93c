//! Action composition and non-local exits.

use pretty_assertions::assert_eq;
use ren_ir::Cell;

use super::{run, run_err, run_err_kind, run_molded};
use crate::errors::EvalErrorKind;
use crate::interpreter::InterpreterBuilder;
use crate::print_handler::silent_handler;

#[test]
fn return_leaves_the_function() {
    let source = "f: func [x] [if x > 1 [return 10] 0] reduce [f 5 f 0]";
    assert_eq!(run_molded(source), "[10 0]");
}

#[test]
fn return_targets_its_own_function() {
    let source = "
        inner: func [] [return 1]
        outer: func [] [inner 2]
        outer
    ";
    assert_eq!(run(source), Cell::integer(2));
}

#[test]
fn return_at_top_level_fails() {
    let err = run_err("return 1");
    assert_eq!(err.message, "return used outside of a function");
}

#[test]
fn catch_and_throw() {
    assert_eq!(run("catch [throw 5 1]"), Cell::integer(5));
    assert_eq!(run("catch [1]"), Cell::integer(1));
    assert_eq!(run("catch/name [throw/name 5 'done] 'done"), Cell::integer(5));
}

#[test]
fn throw_passes_through_functions() {
    let source = "f: func [] [throw 7] catch [f 1]";
    assert_eq!(run(source), Cell::integer(7));
}

#[test]
fn named_throw_skips_non_matching_catch() {
    assert_eq!(
        run_err_kind("catch/name [throw/name 5 'other] 'done"),
        EvalErrorKind::UncaughtThrow {
            label: "other".to_string()
        }
    );
    assert_eq!(
        run_err_kind("catch [throw/name 1 'x]"),
        EvalErrorKind::UncaughtThrow {
            label: "x".to_string()
        }
    );
}

#[test]
fn adapt_runs_prelude_then_adaptee() {
    let source = "f: func [x] [x * 2] g: adapt :f [x: x + 1] g 3";
    assert_eq!(run(source), Cell::integer(8));
}

#[test]
fn adapted_arguments_are_rechecked() {
    let source = r#"f: func [x [integer!]] [x] g: adapt :f [x: "text"] g 1"#;
    assert!(matches!(
        run_err_kind(source),
        EvalErrorKind::TypeMismatch { param, .. } if param == "x"
    ));
}

#[test]
fn specialize_fixes_arguments() {
    assert_eq!(run("add10: specialize :add [value2: 10] add10 5"), Cell::integer(15));
}

#[test]
fn specialization_is_typechecked_when_made() {
    assert!(matches!(
        run_err_kind(r#"bad: specialize :add [value2: "x"]"#),
        EvalErrorKind::TypeMismatch { .. }
    ));
}

#[test]
fn specialized_infix_binds_left_to_first_open_parameter() {
    let source = "minus-one: infix specialize :subtract [value2: 1] 10 minus-one";
    assert_eq!(run(source), Cell::integer(9));
}

#[test]
fn specialized_refinement_cannot_be_named() {
    let source = "
        f: func [a /b [integer!]] [reduce [a b]]
        g: specialize :f [b: 1]
        reduce [g 0 f/b 0 2]
    ";
    assert_eq!(run_molded(source), "[[0 1] [0 2]]");
    assert!(matches!(
        run_err_kind("f: func [a /b [integer!]] [a] g: specialize :f [b: 1] g/b 0 1"),
        EvalErrorKind::BadRefinement { refinement, .. } if refinement == "b"
    ));
}

#[test]
fn apply_sets_arguments_by_name() {
    let source = "f: func [a /flag] [either flag [a + 1] [a]] reduce [apply :f [a: 1] apply :f [a: 1 flag: true]]";
    assert_eq!(run_molded(source), "[1 2]");
}

#[test]
fn apply_rejects_a_corrupt_refinement() {
    assert!(matches!(
        run_err_kind("f: func [a /flag] [a] apply :f [a: 1 flag: 5]"),
        EvalErrorKind::CorruptRefinement { param, .. } if param == "flag"
    ));
}

#[test]
fn apply_and_specialize_report_the_fetching_word() {
    let mismatch = |source: &str| match run_err_kind(source) {
        EvalErrorKind::TypeMismatch { action, param, .. } => (action, param),
        other => panic!("expected a type mismatch, got {other:?}"),
    };
    let func = r#"f: func [x [integer!]] [x] "#;
    assert_eq!(
        mismatch(&format!(r#"{func} apply :f [x: "s"]"#)),
        ("f".to_string(), "x".to_string())
    );
    assert_eq!(
        mismatch(&format!(r#"{func} specialize :f [x: "s"]"#)),
        ("f".to_string(), "x".to_string())
    );
}

#[test]
#[should_panic(expected = "refinement /flag")]
fn trusted_mode_aborts_on_a_corrupt_refinement() {
    let mut interp = InterpreterBuilder::new()
        .trusted(true)
        .print_handler(silent_handler())
        .build()
        .unwrap_or_else(|err| panic!("build failed: {err}"));
    let _ = interp.eval_source("f: func [a /flag] [a] apply :f [a: 1 flag: 5]");
}

#[test]
fn runaway_recursion_hits_the_depth_limit() {
    let mut interp = InterpreterBuilder::new()
        .max_depth(Some(50))
        .print_handler(silent_handler())
        .build()
        .unwrap_or_else(|err| panic!("build failed: {err}"));
    let err = interp
        .eval_source("f: func [] [f] f")
        .err()
        .unwrap_or_else(|| panic!("recursion should fail"));
    assert_eq!(err.kind, EvalErrorKind::StackOverflow { depth: 50 });
    let backtrace = err.backtrace.unwrap_or_else(|| panic!("no backtrace"));
    assert_eq!(backtrace.len(), 50);
    assert!(backtrace.frames().iter().all(|frame| frame.name == "f"));
}

#[test]
fn errors_carry_the_call_backtrace() {
    let source = "inner: func [] [fail \"boom\"] outer: func [] [inner] outer";
    let err = run_err(source);
    assert_eq!(err.kind, EvalErrorKind::User { message: "boom".to_string() });
    let names: Vec<String> = err
        .backtrace
        .unwrap_or_else(|| panic!("no backtrace"))
        .frames()
        .iter()
        .map(|frame| frame.name.clone())
        .collect();
    assert_eq!(names, vec!["fail", "inner", "outer"]);
}
