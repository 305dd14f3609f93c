//! Conditionals, loops, throws and output.

use ren_ir::{ArrayRef, Cell, FeedRef, Specifier};

use super::{block_arg, NativeEntry};
use crate::action::{Bounce, Level};
use crate::errors::{user_error, ControlAction, EvalError, EvalResult};
use crate::eval::StepFlags;
use crate::interpreter::Interpreter;

pub(super) const NATIVES: &[NativeEntry] = &[
    NativeEntry {
        name: "if",
        spec: "condition [any-value! <opt>] branch [block!]",
        func: native_if,
    },
    NativeEntry {
        name: "either",
        spec: "condition [any-value! <opt>] true-branch [block!] false-branch [block!]",
        func: native_either,
    },
    NativeEntry {
        name: "while",
        spec: "condition [block!] body [block!]",
        func: native_while,
    },
    NativeEntry {
        name: "then",
        spec: "left [any-value! <opt>] branch [block!]",
        func: native_then,
    },
    NativeEntry {
        name: "comment",
        spec: "'discarded [any-value!]",
        func: native_vanish,
    },
    NativeEntry {
        name: "elide",
        spec: "discarded [any-value! <opt>]",
        func: native_vanish,
    },
    NativeEntry {
        name: "the",
        spec: "'value [any-value!]",
        func: native_the,
    },
    NativeEntry {
        name: "do",
        spec: "source [block!]",
        func: native_do,
    },
    NativeEntry {
        name: "throw",
        spec: "value [any-value! <opt>] /name [any-value!]",
        func: native_throw,
    },
    NativeEntry {
        name: "catch",
        spec: "block [block!] /name [any-value!]",
        func: native_catch,
    },
    NativeEntry {
        name: "return",
        spec: "value [any-value! <opt> <end>]",
        func: native_return,
    },
    NativeEntry {
        name: "fail",
        spec: "reason [text!]",
        func: native_fail,
    },
    NativeEntry {
        name: "reduce",
        spec: "block [block!]",
        func: native_reduce,
    },
    NativeEntry {
        name: "print",
        spec: "value [any-value!]",
        func: native_print,
    },
];

fn run_block(interp: &mut Interpreter, level: &Level, index: usize) -> EvalResult<Cell> {
    let (array, specifier) = block_arg(interp, level, index)?;
    interp.do_array(&array, &specifier)
}

fn native_if(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    if !level.arg(1).is_truthy() {
        return Ok(Bounce::Value(Cell::null()));
    }
    run_block(interp, level, 2).map(Bounce::Value)
}

fn native_either(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let branch = if level.arg(1).is_truthy() { 2 } else { 3 };
    run_block(interp, level, branch).map(Bounce::Value)
}

fn native_while(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let mut result = Cell::null();
    while run_block(interp, level, 1)?.is_truthy() {
        result = run_block(interp, level, 2)?;
    }
    Ok(Bounce::Value(result))
}

/// Runs its branch only when the left side produced a value.
fn native_then(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    if level.arg(1).is_null() {
        return Ok(Bounce::Value(Cell::null()));
    }
    run_block(interp, level, 2).map(Bounce::Value)
}

fn native_vanish(_interp: &mut Interpreter, _level: &mut Level) -> EvalResult<Bounce> {
    Ok(Bounce::Vanished)
}

fn native_the(_interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    Ok(Bounce::Value(level.arg(1)))
}

fn native_do(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    run_block(interp, level, 1).map(Bounce::Value)
}

fn native_throw(_interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    Ok(Bounce::Thrown {
        label: level.arg(2),
        value: level.arg(1),
    })
}

/// Catches throws whose label matches `/name`, or unnamed throws without it.
fn native_catch(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let named = level.refinement(2);
    let wanted = level.arg(2);
    match run_block(interp, level, 1) {
        Ok(value) => Ok(Bounce::Value(value)),
        Err(ControlAction::Throw { label, value }) => {
            let matches = if named { label == wanted } else { label.is_null() };
            if matches {
                tracing::trace!(named, "throw caught");
                Ok(Bounce::Value(value))
            } else {
                Err(ControlAction::Throw { label, value })
            }
        }
        Err(err) => Err(err),
    }
}

/// Unwinds to the call frame this `return` was fetched from.
fn native_return(_interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let Some(target) = level.coupling.clone() else {
        return Err(EvalError::new("return used outside of a function").into());
    };
    Ok(Bounce::Thrown {
        label: Cell::frame(target),
        value: level.arg(1),
    })
}

fn native_fail(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let reason = level.arg(1);
    let message = reason
        .as_text()
        .map_or_else(|| interp.form(&reason), str::to_string);
    Err(user_error(message).into())
}

/// Evaluate each expression of a block into a new block.
fn native_reduce(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let (array, specifier) = block_arg(interp, level, 1)?;
    let values = reduce_array(interp, &array, specifier)?;
    Ok(Bounce::Value(Cell::block(
        ArrayRef::from_vec(values),
        Specifier::Empty,
    )))
}

fn reduce_array(
    interp: &mut Interpreter,
    array: &ArrayRef,
    specifier: Specifier,
) -> EvalResult<Vec<Cell>> {
    let feed = FeedRef::new(array.clone(), specifier);
    let mut values = Vec::new();
    while !feed.at_end() {
        let mut out = Cell::fresh_output();
        interp.eval_step(&feed, &mut out, StepFlags::empty())?;
        if !out.is_stale() {
            values.push(out.fresh());
        }
    }
    Ok(values)
}

/// Blocks are reduced and their values formed with spaces between them.
fn native_print(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let value = level.arg(1);
    let line = match value.as_block() {
        Some((array, specifier)) => {
            let values = reduce_array(interp, array, specifier.clone())?;
            values
                .iter()
                .map(|value| interp.form(value))
                .collect::<Vec<_>>()
                .join(" ")
        }
        None => interp.form(&value),
    };
    interp.print_handler().println(&line);
    Ok(Bounce::Value(Cell::void()))
}
