//! Built-in actions.
//!
//! Every native is an entry in a static table: its name, the parameter
//! spec it is registered with, and the Rust function that runs once the
//! frame is fulfilled and typechecked. Natives read their arguments from
//! the frame by 1-based position, in spec order.
//!
//! Operators are ordinary natives made infix by [`BOOT_SOURCE`].

mod context;
mod control;
mod math;
mod meta;

use ren_ir::{ArrayRef, Cell, Heart, Specifier, Word};

use crate::action::{Bounce, Level};
use crate::errors::{not_a_word, type_mismatch, ControlAction, EvalResult};
use crate::interpreter::Interpreter;

/// Signature of a native's implementation.
pub type NativeFn = fn(&mut Interpreter, &mut Level) -> EvalResult<Bounce>;

/// One registered native.
#[derive(Clone, Copy)]
pub struct NativeEntry {
    pub name: &'static str,
    /// Parameter spec in the same dialect as `func`.
    pub spec: &'static str,
    pub func: NativeFn,
}

impl std::fmt::Debug for NativeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeEntry").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Script run in `lib` once the natives are registered.
pub const BOOT_SOURCE: &str = r"
    +: infix :add
    -: infix :subtract
    *: infix :multiply
    =: infix :equal?
    <: infix :lesser?
    >: infix :greater?
    then: infix/defer :then
";

/// All natives, in registration order. A native's position is its `NativeId`.
pub fn native_table() -> Vec<NativeEntry> {
    [
        control::NATIVES,
        math::NATIVES,
        meta::NATIVES,
        context::NATIVES,
    ]
    .concat()
}

/// Block argument in slot `index`.
fn block_arg(interp: &Interpreter, level: &Level, index: usize) -> EvalResult<(ArrayRef, Specifier)> {
    let value = level.arg(index);
    match value.as_block() {
        Some((array, specifier)) => Ok((array.clone(), specifier.clone())),
        None => Err(arg_mismatch(interp, level, index, "block!", &value)),
    }
}

/// Integer argument in slot `index`.
fn int_arg(interp: &Interpreter, level: &Level, index: usize) -> EvalResult<i64> {
    let value = level.arg(index);
    value
        .as_integer()
        .ok_or_else(|| arg_mismatch(interp, level, index, "integer!", &value))
}

/// Word argument in slot `index`, any word kind.
fn word_arg(level: &Level, index: usize) -> EvalResult<Word> {
    let value = level.arg(index);
    match value.heart() {
        Heart::Word(word) if value.quotes() == 0 => Ok(word.clone()),
        _ => Err(not_a_word(value.kind().name()).into()),
    }
}

fn arg_mismatch(
    interp: &Interpreter,
    level: &Level,
    index: usize,
    expected: &str,
    got: &Cell,
) -> ControlAction {
    let param = level
        .original
        .paramlist()
        .get(index)
        .map_or("argument", |param| interp.spelling(param.symbol));
    type_mismatch(interp.label_name(level.label), param, expected, got.kind().name()).into()
}
