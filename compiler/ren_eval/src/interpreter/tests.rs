use super::*;
use crate::errors::EvalErrorKind;
use crate::print_handler::buffer_handler;
use pretty_assertions::assert_eq;

fn interpreter() -> Interpreter {
    Interpreter::new().unwrap_or_else(|err| panic!("interpreter failed to build: {err}"))
}

#[test]
fn builder_registers_natives_and_constants() {
    let interp = interpreter();
    for name in ["if", "func", "add", "true", "null", "integer!", "+", "then"] {
        let symbol = interp.symbols().get(name);
        assert!(
            symbol.and_then(|s| interp.lib().find(s)).is_some(),
            "{name} missing from lib"
        );
    }
}

#[test]
fn boot_script_makes_operators_infix() {
    let interp = interpreter();
    let plus = interp
        .symbols()
        .get("+")
        .and_then(|s| interp.lib().find(s))
        .and_then(|index| interp.lib().get(index))
        .unwrap_or_else(|| panic!("+ not defined"));
    assert!(plus.is_infix());
    assert!(!plus.is_deferred());

    let then = interp
        .symbols()
        .get("then")
        .and_then(|s| interp.lib().find(s))
        .and_then(|index| interp.lib().get(index))
        .unwrap_or_else(|| panic!("then not defined"));
    assert!(then.is_infix() && then.is_deferred());
}

#[test]
fn return_native_is_remembered() {
    let interp = interpreter();
    assert!(interp.return_action.is_some());
}

#[test]
fn load_collects_user_set_words() {
    let mut interp = interpreter();
    interp
        .load("answer: 42 other: answer")
        .unwrap_or_else(|err| panic!("load failed: {err}"));
    let answer = interp.symbols().get("answer").unwrap_or_else(|| panic!("not interned"));
    assert!(interp.user().find(answer).is_some());
    assert!(interp.lib().find(answer).is_none());
    assert_eq!(interp.user_value("answer"), Some(Cell::null()));
}

#[test]
fn user_definitions_shadow_lib() {
    let mut interp = interpreter();
    let result = interp
        .eval_source("if: 5 if")
        .unwrap_or_else(|err| panic!("eval failed: {err}"));
    assert_eq!(result, Cell::integer(5));
}

#[test]
fn settle_reports_uncaught_throws() {
    let interp = interpreter();
    let thrown = Err(ControlAction::Throw {
        label: Cell::null(),
        value: Cell::integer(1),
    });
    let err = interp
        .settle(thrown)
        .err()
        .unwrap_or_else(|| panic!("expected an error"));
    assert_eq!(
        err.kind,
        EvalErrorKind::UncaughtThrow {
            label: "null".to_string()
        }
    );
}

#[test]
fn call_scope_tracks_depth_and_stack() {
    let mut interp = InterpreterBuilder::new()
        .max_depth(Some(2))
        .build()
        .unwrap_or_else(|err| panic!("build failed: {err}"));
    let label = Some(interp.symbols().intern("outer"));
    let mut outer = interp
        .call_scope(label)
        .unwrap_or_else(|err| panic!("first scope failed: {err}"));
    assert_eq!(outer.call_stack.capture(outer.symbols()).frames().len(), 1);
    {
        let mut inner = outer
            .call_scope(None)
            .unwrap_or_else(|err| panic!("second scope failed: {err}"));
        let err = inner
            .call_scope(None)
            .err()
            .unwrap_or_else(|| panic!("third scope should exceed the limit"));
        assert_eq!(err.kind, EvalErrorKind::StackOverflow { depth: 2 });
    }
    assert_eq!(outer.call_stack.capture(outer.symbols()).frames().len(), 1);
    drop(outer);
    assert!(interp.call_stack.capture(interp.symbols()).frames().is_empty());
}

#[test]
fn print_goes_to_the_configured_handler() {
    let handler = buffer_handler();
    let mut interp = InterpreterBuilder::new()
        .print_handler(handler.clone())
        .build()
        .unwrap_or_else(|err| panic!("build failed: {err}"));
    interp
        .eval_source(r#"print "hello" print [1 "two"]"#)
        .unwrap_or_else(|err| panic!("eval failed: {err}"));
    assert_eq!(handler.get_output(), "hello\n1 two\n");
}

#[test]
fn shared_symbol_table_is_used() {
    let symbols = SharedSymbols::default();
    let marker = symbols.intern("marker-word");
    let interp = InterpreterBuilder::new()
        .symbols(symbols.clone())
        .build()
        .unwrap_or_else(|err| panic!("build failed: {err}"));
    assert_eq!(interp.symbols().get("marker-word"), Some(marker));
}
