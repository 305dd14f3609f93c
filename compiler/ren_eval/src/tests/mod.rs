//! Whole-interpreter tests: source in, values or errors out.

mod action_tests;
mod binding_tests;
mod evaluator_tests;

use ren_ir::Cell;

use crate::errors::{EvalError, EvalErrorKind};
use crate::interpreter::{Interpreter, InterpreterBuilder};
use crate::print_handler::silent_handler;

pub(crate) fn interpreter() -> Interpreter {
    InterpreterBuilder::new()
        .print_handler(silent_handler())
        .build()
        .unwrap_or_else(|err| panic!("interpreter failed to build: {err}"))
}

/// Value of the last expression of `source`.
pub(crate) fn run(source: &str) -> Cell {
    interpreter()
        .eval_source(source)
        .unwrap_or_else(|err| panic!("`{source}` failed: {err}"))
}

/// Molded value of the last expression of `source`.
pub(crate) fn run_molded(source: &str) -> String {
    let mut interp = interpreter();
    let value = interp
        .eval_source(source)
        .unwrap_or_else(|err| panic!("`{source}` failed: {err}"));
    interp.mold(&value)
}

/// Error raised by `source`.
pub(crate) fn run_err(source: &str) -> EvalError {
    match interpreter().eval_source(source) {
        Ok(value) => panic!("`{source}` should fail, got {value:?}"),
        Err(err) => err,
    }
}

pub(crate) fn run_err_kind(source: &str) -> EvalErrorKind {
    run_err(source).kind
}
