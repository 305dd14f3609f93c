//! Objects, explicit binding and virtually bound loops.

use ren_ir::{Cell, FrameRef, Heart, Key, Kind, Specifier};

use super::{arg_mismatch, block_arg, word_arg, NativeEntry};
use crate::action::{Bounce, Level};
use crate::binding::{
    bind, collect_set_words, copy_deep_derelativized, virtual_bind_new_context, BindOptions,
};
use crate::errors::EvalResult;
use crate::interpreter::Interpreter;

pub(super) const NATIVES: &[NativeEntry] = &[
    NativeEntry {
        name: "make",
        spec: "type [datatype! object!] def [block!]",
        func: native_make,
    },
    NativeEntry {
        name: "bind",
        spec: "block [block!] context [object!]",
        func: native_bind,
    },
    NativeEntry {
        name: "get",
        spec: "word [any-word!]",
        func: native_get,
    },
    NativeEntry {
        name: "set",
        spec: "word [any-word!] value [any-value! <opt>]",
        func: native_set,
    },
    NativeEntry {
        name: "use",
        spec: "vars [word! block!] body [block!]",
        func: native_use,
    },
    NativeEntry {
        name: "for-each",
        spec: "'vars [word! block!] series [block!] body [block!]",
        func: native_for_each,
    },
];

/// `make object! [...]` or `make parent [...]`.
///
/// Top-level set-words of the body become fields; a parent's fields and
/// values are inherited and the result derives from it.
fn native_make(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let kind = level.arg(1);
    let frame = match kind.heart() {
        Heart::Datatype(Kind::Object) => FrameRef::object(),
        Heart::Object(parent) => parent.derive(),
        _ => return Err(arg_mismatch(interp, level, 1, "object!", &kind)),
    };
    let (def, def_specifier) = block_arg(interp, level, 2)?;
    let body = copy_deep_derelativized(&def, &def_specifier);
    for symbol in collect_set_words(&body) {
        if frame.find(symbol).is_none() {
            frame.append(Key::new(symbol), Cell::null());
        }
    }
    bind(&body, &frame, BindOptions::deep());
    interp.do_array(&body, &Specifier::Empty)?;
    tracing::trace!(fields = frame.len(), "object made");
    Ok(Bounce::Value(Cell::object(frame)))
}

fn native_bind(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let (array, _) = block_arg(interp, level, 1)?;
    let context = level.arg(2);
    let Some(frame) = context.as_object() else {
        return Err(arg_mismatch(interp, level, 2, "object!", &context));
    };
    bind(&array, frame, BindOptions::deep());
    Ok(Bounce::Value(level.arg(1)))
}

fn native_get(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let word = word_arg(level, 1)?;
    interp.get_var(&word, &Specifier::Empty).map(Bounce::Value)
}

fn native_set(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let word = word_arg(level, 1)?;
    let value = level.arg(2);
    interp.set_var(&word, &Specifier::Empty, value.clone())?;
    Ok(Bounce::Value(value))
}

/// Run `body` with fresh variables visible through a patch; the body's
/// array is shared, not copied.
fn native_use(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let (body, _frame) = virtual_bind_new_context(&level.arg(2), &level.arg(1), interp.symbols())?;
    let Some((array, specifier)) = body.as_block() else {
        return Ok(Bounce::Value(Cell::null()));
    };
    interp.do_array(array, specifier).map(Bounce::Value)
}

/// Run `body` once per group of values from `series`, the loop variables
/// taking the values in order. A short final group leaves the rest null.
fn native_for_each(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let (series, _) = block_arg(interp, level, 2)?;
    let (body, frame) = virtual_bind_new_context(&level.arg(3), &level.arg(1), interp.symbols())?;
    let Some((array, specifier)) = body.as_block() else {
        return Ok(Bounce::Value(Cell::null()));
    };

    let width = frame.len().max(1);
    let values = series.to_vec();
    let mut result = Cell::null();
    for chunk in values.chunks(width) {
        for index in 1..=frame.len() {
            let value = chunk.get(index - 1).cloned().unwrap_or_else(Cell::null);
            frame.set(index, value);
        }
        result = interp.do_array(array, specifier)?;
    }
    Ok(Bounce::Value(result))
}
