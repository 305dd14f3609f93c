//! Making and transforming actions; variadic access.

use ren_ir::{
    Action, ActionCell, ArrayRef, Cell, CellFlags, Dispatcher, FeedRef, FrameKind, FrameRef,
    Specifier,
};

use super::{arg_mismatch, block_arg, NativeEntry};
use crate::action::{make_paramlist, Bounce, Level};
use crate::binding::{bind, bind_relative, copy_deep_derelativized, BindOptions};
use crate::errors::{varargs_expired, EvalResult};
use crate::interpreter::Interpreter;

pub(super) const NATIVES: &[NativeEntry] = &[
    NativeEntry {
        name: "func",
        spec: "spec [block!] body [block!]",
        func: native_func,
    },
    NativeEntry {
        name: "adapt",
        spec: "adaptee [action!] prelude [block!]",
        func: native_adapt,
    },
    NativeEntry {
        name: "specialize",
        spec: "action [action!] def [block!]",
        func: native_specialize,
    },
    NativeEntry {
        name: "apply",
        spec: "action [action!] def [block!]",
        func: native_apply,
    },
    NativeEntry {
        name: "infix",
        spec: "action [action!] /defer",
        func: native_infix,
    },
    NativeEntry {
        name: "type-of",
        spec: "value [any-value! <opt>]",
        func: native_type_of,
    },
    NativeEntry {
        name: "take",
        spec: "source [varargs!]",
        func: native_take,
    },
    NativeEntry {
        name: "tail?",
        spec: "series [varargs! block!]",
        func: native_tail_q,
    },
];

fn action_arg(interp: &Interpreter, level: &Level, index: usize) -> EvalResult<ActionCell> {
    let value = level.arg(index);
    match value.as_action() {
        Some(action) => Ok(action.clone()),
        None => Err(arg_mismatch(interp, level, index, "action!", &value)),
    }
}

/// Function from a spec and a body. The body is copied, then bound
/// relative to the new parameter list.
fn native_func(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let (spec, _) = block_arg(interp, level, 1)?;
    let (body, body_specifier) = block_arg(interp, level, 2)?;
    let paramlist = make_paramlist(&spec, interp.symbols(), true)?;
    let body = copy_deep_derelativized(&body, &body_specifier);
    let bound = bind_relative(&body, &paramlist);
    tracing::trace!(params = paramlist.len(), bound, "func created");
    let action = Action::new(paramlist, Dispatcher::Body(body));
    Ok(Bounce::Value(Cell::action(action, None)))
}

/// Wrapper that runs `prelude` against the frame before the adaptee.
fn native_adapt(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let adaptee = action_arg(interp, level, 1)?;
    let (prelude, prelude_specifier) = block_arg(interp, level, 2)?;
    let prelude = copy_deep_derelativized(&prelude, &prelude_specifier);
    bind_relative(&prelude, adaptee.action.paramlist());
    let adapted = adaptee.action.wrap(Dispatcher::Adapt {
        prelude,
        adaptee: adaptee.action.clone(),
    });
    Ok(Bounce::Value(Cell::action(adapted, adaptee.coupling)))
}

/// Fix some arguments of an action. `def` runs against a scratch frame;
/// every non-null visible slot it leaves is checked and becomes part of
/// the new action's exemplar.
fn native_specialize(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let target = action_arg(interp, level, 1)?;
    let (def, def_specifier) = block_arg(interp, level, 2)?;
    let paramlist = target.action.paramlist().clone();
    let frame = FrameRef::with_keys(
        FrameKind::Call {
            paramlist: paramlist.clone(),
            coupling: None,
        },
        paramlist.keys(),
    );

    let mut slots = target.action.exemplar_slots();
    for (offset, slot) in slots.iter().enumerate() {
        if let Some(value) = slot {
            frame.set(offset + 1, value.clone());
        }
    }

    let def = copy_deep_derelativized(&def, &def_specifier);
    bind(&def, &frame, BindOptions::deep());
    let ran = interp.do_array(&def, &Specifier::Empty);
    let label = interp.label_name(target.label());

    let checked = ran.and_then(|_| {
        for (offset, param) in paramlist.params().iter().enumerate() {
            if param.class.is_hidden() || slots[offset].is_some() {
                continue;
            }
            let value = frame.get(offset + 1).unwrap_or_else(Cell::null);
            if value.is_null() {
                continue;
            }
            interp.check_arg(label, param, &value)?;
            slots[offset] = Some(value);
        }
        Ok(())
    });
    frame.decay();
    checked?;

    let specialized = target.action.specialize(slots);
    Ok(Bounce::Value(Cell::action(specialized, target.coupling)))
}

/// Call an action with arguments set by name in `def`.
fn native_apply(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let target = action_arg(interp, level, 1)?;
    let (def, def_specifier) = block_arg(interp, level, 2)?;
    let feed = FeedRef::new(ArrayRef::new(), Specifier::Empty);
    let mut call = Level::new(feed, &target, target.label(), Cell::fresh_output());

    let def = copy_deep_derelativized(&def, &def_specifier);
    bind(&def, &call.frame, BindOptions::deep());
    if let Err(err) = interp.do_array(&def, &Specifier::Empty) {
        call.frame.decay();
        return Err(err);
    }
    interp.apply_level(&mut call).map(Bounce::Value)
}

fn native_infix(_interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let mut flags = CellFlags::INFIX;
    if level.refinement(2) {
        flags |= CellFlags::DEFER;
    }
    Ok(Bounce::Value(level.arg(1).with_flags(flags)))
}

fn native_type_of(_interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    Ok(Bounce::Value(Cell::datatype(level.arg(1).kind())))
}

/// Next argument from a variadic, gathered the way its parameter says;
/// null once the feed is exhausted.
fn native_take(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let source = level.arg(1);
    let Some(varargs) = source.as_varargs().cloned() else {
        return Err(arg_mismatch(interp, level, 1, "varargs!", &source));
    };
    let frame = varargs
        .frame
        .upgrade()
        .filter(FrameRef::is_accessible)
        .ok_or_else(varargs_expired)?;
    let paramlist = frame.paramlist().ok_or_else(varargs_expired)?;
    let param = paramlist.get(varargs.param).cloned().ok_or_else(varargs_expired)?;

    if varargs.feed.at_end() {
        return Ok(Bounce::Value(Cell::null()));
    }
    let label = interp.label_name(level.label);
    let value = interp.gather(&varargs.feed, &param, varargs.param, &frame, false, label)?;
    if !value.is_null() {
        interp.check_arg(label, &param, &value)?;
    }
    Ok(Bounce::Value(value))
}

fn native_tail_q(interp: &mut Interpreter, level: &mut Level) -> EvalResult<Bounce> {
    let series = level.arg(1);
    let at_tail = if let Some(varargs) = series.as_varargs() {
        varargs.feed.at_end()
    } else if let Some((array, _)) = series.as_block() {
        array.is_empty()
    } else {
        return Err(arg_mismatch(interp, level, 1, "varargs! block!", &series));
    };
    Ok(Bounce::Value(Cell::logic(at_tail)))
}
