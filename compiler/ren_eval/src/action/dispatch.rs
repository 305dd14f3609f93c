//! Dispatch of a fulfilled frame.

use ren_ir::{ArrayRef, Cell, Dispatcher, Heart, ParamClass, Specifier};

use super::{Bounce, Level, State};
use crate::errors::{not_a_word, ControlAction, EvalError, EvalResult};
use crate::interpreter::Interpreter;

impl Interpreter {
    /// Run a call from its first argument to its result.
    ///
    /// The frame decays once the call ends, whatever the outcome; only
    /// frames reified by a closure stay readable.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn fulfill_and_dispatch(&mut self, level: &mut Level) -> EvalResult<Cell> {
        let result = match self.call_scope(level.label) {
            Ok(mut scope) => {
                let result = scope
                    .fulfill(level)
                    .and_then(|()| scope.typecheck_and_dispatch(level));
                scope.with_backtrace(result)
            }
            Err(err) => Err(err.into()),
        };
        end_call(level);
        result
    }

    /// Dispatch a frame whose slots were filled by the caller (`apply`,
    /// `specialize` tests). Hidden slots and specialized slots are preset
    /// here.
    pub fn apply_level(&mut self, level: &mut Level) -> EvalResult<Cell> {
        let paramlist = level.original.paramlist().clone();
        for (offset, param) in paramlist.params().iter().enumerate() {
            let index = offset + 1;
            if let Some(value) = level.original.specialized(index) {
                level.frame.set(index, value.clone());
                continue;
            }
            match param.class {
                ParamClass::Return => {
                    level.frame.set(index, self.return_cell(&level.frame));
                }
                ParamClass::Local => {
                    level.frame.set(index, Cell::null());
                }
                _ => {}
            }
        }
        level.state = State::Typecheck;

        let result = match self.call_scope(level.label) {
            Ok(mut scope) => {
                let result = scope.typecheck_and_dispatch(level);
                scope.with_backtrace(result)
            }
            Err(err) => Err(err.into()),
        };
        end_call(level);
        result
    }

    fn typecheck_and_dispatch(&mut self, level: &mut Level) -> EvalResult<Cell> {
        let mut recheck = true;
        loop {
            if recheck {
                level.state = State::Typecheck;
                self.typecheck(level)?;
            }
            level.state = State::Dispatch;
            level.out.mark_stale();

            match self.dispatch_phase(level)? {
                Bounce::Value(value) => {
                    level.out = value.fresh();
                    level.state = State::Done;
                    return Ok(level.out.clone());
                }
                Bounce::Vanished => {
                    level.state = State::Done;
                    return Ok(level.out.clone());
                }
                Bounce::Redo { recheck: again } => {
                    level.state = State::Redo { recheck: again };
                    recheck = again;
                }
                Bounce::WriteBack { target, value } => {
                    let Some(word) = target.as_word() else {
                        return Err(not_a_word(target.kind().name()).into());
                    };
                    self.set_var(word, &Specifier::Empty, value.clone())?;
                    level.out = value.fresh();
                    level.state = State::Done;
                    return Ok(level.out.clone());
                }
                Bounce::Thrown { label, value } => {
                    level.state = State::Thrown;
                    return Err(ControlAction::Throw { label, value });
                }
            }
        }
    }

    fn dispatch_phase(&mut self, level: &mut Level) -> EvalResult<Bounce> {
        let dispatcher = level.phase.dispatcher().clone();
        match dispatcher {
            Dispatcher::Native(id) => {
                let func = self
                    .natives
                    .get(usize::from(id.0))
                    .map(|entry| entry.func)
                    .ok_or_else(|| EvalError::new("unknown native"))?;
                func(self, level)
            }
            Dispatcher::Body(body) => self.run_body(level, &body),
            Dispatcher::Adapt { prelude, adaptee } => {
                let specifier = Specifier::Frame(level.frame.clone());
                self.do_array(&prelude, &specifier)?;
                level.phase = adaptee;
                Ok(Bounce::Redo { recheck: true })
            }
            Dispatcher::Specialized(target) => {
                level.phase = target;
                Ok(Bounce::Redo { recheck: false })
            }
        }
    }

    /// Run a function body against the call frame; a `return` aimed at this
    /// frame ends the body with its value.
    fn run_body(&mut self, level: &mut Level, body: &ArrayRef) -> EvalResult<Bounce> {
        let specifier = Specifier::Frame(level.frame.clone());
        match self.do_array(body, &specifier) {
            Ok(value) => Ok(Bounce::Value(value)),
            Err(ControlAction::Throw { label, value })
                if matches!(label.heart(), Heart::Frame(frame) if frame.ptr_eq(&level.frame)) =>
            {
                tracing::trace!("return caught by its frame");
                Ok(Bounce::Value(value))
            }
            Err(other) => Err(other),
        }
    }
}

/// Close a call frame. The `return` slot holds an action coupled to the
/// frame itself and is cleared first.
fn end_call(level: &Level) {
    let paramlist = level.original.paramlist();
    for (offset, param) in paramlist.params().iter().enumerate() {
        if param.class == ParamClass::Return {
            level.frame.set(offset + 1, Cell::null());
        }
    }
    level.frame.decay();
}
