//! Integer arithmetic and comparison.

use ren_ir::{Cell, Specifier};

use super::{arg_mismatch, int_arg, word_arg, NativeEntry};
use crate::action::{Bounce, Level};
use crate::errors::{division_by_zero, integer_overflow, EvalResult};
use crate::interpreter::Interpreter;

pub(super) const NATIVES: &[NativeEntry] = &[
    NativeEntry {
        name: "add",
        spec: "value1 [integer!] value2 [integer!]",
        func: native_add,
    },
    NativeEntry {
        name: "subtract",
        spec: "value1 [integer!] value2 [integer!]",
        func: native_subtract,
    },
    NativeEntry {
        name: "multiply",
        spec: "value1 [integer!] value2 [integer!]",
        func: native_multiply,
    },
    NativeEntry {
        name: "negate",
        spec: "value [integer!]",
        func: native_negate,
    },
    NativeEntry {
        name: "equal?",
        spec: "value1 [any-value! <opt>] value2 [any-value! <opt>]",
        func: native_equal,
    },
    NativeEntry {
        name: "lesser?",
        spec: "value1 [integer!] value2 [integer!]",
        func: native_lesser,
    },
    NativeEntry {
        name: "greater?",
        spec: "value1 [integer!] value2 [integer!]",
        func: native_greater,
    },
    NativeEntry {
        name: "not",
        spec: "value [any-value! <opt>]",
        func: native_not,
    },
    NativeEntry {
        name: "div-rem",
        spec: "dividend [integer!] divisor [integer!] remainder:",
        func: native_div_rem,
    },
    NativeEntry {
        name: "incr",
        spec: "variable [any-word!]",
        func: native_incr,
    },
];

fn binary(
    interp: &Interpreter,
    level: &Level,
    operation: &str,
    op: fn(i64, i64) -> Option<i64>,
) -> EvalResult<Bounce> {
    let left = int_arg(interp, level, 1)?;
    let right = int_arg(interp, level, 2)?;
    let result = op(left, right).ok_or_else(|| integer_overflow(operation))?;
    Ok(Bounce::Value(Cell::integer(result)))
}

fn native_add(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    binary(interp, level, "add", i64::checked_add)
}

fn native_subtract(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    binary(interp, level, "subtract", i64::checked_sub)
}

fn native_multiply(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    binary(interp, level, "multiply", i64::checked_mul)
}

fn native_negate(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let value = int_arg(interp, level, 1)?;
    let negated = value.checked_neg().ok_or_else(|| integer_overflow("negate"))?;
    Ok(Bounce::Value(Cell::integer(negated)))
}

fn native_equal(_interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    Ok(Bounce::Value(Cell::logic(level.arg(1) == level.arg(2))))
}

fn native_lesser(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let less = int_arg(interp, level, 1)? < int_arg(interp, level, 2)?;
    Ok(Bounce::Value(Cell::logic(less)))
}

fn native_greater(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let greater = int_arg(interp, level, 1)? > int_arg(interp, level, 2)?;
    Ok(Bounce::Value(Cell::logic(greater)))
}

fn native_not(_interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    Ok(Bounce::Value(Cell::logic(!level.arg(1).is_truthy())))
}

/// Quotient as the result; the remainder goes to the variable named by the
/// output argument.
fn native_div_rem(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let dividend = int_arg(interp, level, 1)?;
    let divisor = int_arg(interp, level, 2)?;
    if divisor == 0 {
        return Err(division_by_zero().into());
    }
    let quotient = dividend
        .checked_div(divisor)
        .ok_or_else(|| integer_overflow("div-rem"))?;
    let remainder = dividend
        .checked_rem(divisor)
        .ok_or_else(|| integer_overflow("div-rem"))?;

    if !level.arg(3).is_null() {
        let target = word_arg(level, 3)?;
        interp.set_var(&target, &Specifier::Empty, Cell::integer(remainder))?;
    }
    Ok(Bounce::Value(Cell::integer(quotient)))
}

fn native_incr(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let target = word_arg(level, 1)?;
    let current = interp.get_var(&target, &Specifier::Empty)?;
    let Some(value) = current.as_integer() else {
        return Err(arg_mismatch(interp, level, 1, "integer!", &current));
    };
    let next = value.checked_add(1).ok_or_else(|| integer_overflow("incr"))?;
    Ok(Bounce::WriteBack {
        target: level.arg(1),
        value: Cell::integer(next),
    })
}
