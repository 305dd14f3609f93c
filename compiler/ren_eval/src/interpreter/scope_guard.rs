//! RAII guard for one action call.
//!
//! [`CallScope`] holds the depth token and the call-stack entry of a call
//! in progress. Dropping it (on success, error or unwinding) pops the
//! call-stack entry and releases the depth token.

use std::ops::{Deref, DerefMut};

use ren_ir::Symbol;
use ren_stack::DepthToken;

use super::Interpreter;
use crate::diagnostics::CallFrame;
use crate::errors::{stack_overflow, ControlAction, EvalError, EvalResult};

/// Access the interpreter through this guard; it implements `Deref` and `DerefMut`.
pub struct CallScope<'guard> {
    interpreter: &'guard mut Interpreter,
    _depth: DepthToken,
}

impl Drop for CallScope<'_> {
    fn drop(&mut self) {
        self.interpreter.call_stack.pop();
    }
}

impl Deref for CallScope<'_> {
    type Target = Interpreter;

    fn deref(&self) -> &Self::Target {
        self.interpreter
    }
}

impl DerefMut for CallScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.interpreter
    }
}

impl CallScope<'_> {
    /// Attach the live backtrace to an error leaving this call.
    pub fn with_backtrace<T>(&self, result: EvalResult<T>) -> EvalResult<T> {
        result.map_err(|action| match action {
            ControlAction::Error(err) => ControlAction::Error(Box::new(
                self.call_stack.attach_backtrace(*err, &self.symbols),
            )),
            throw @ ControlAction::Throw { .. } => throw,
        })
    }
}

impl Interpreter {
    /// Enter a call labeled `label`, failing once the depth limit is reached.
    pub fn call_scope(&mut self, label: Option<Symbol>) -> Result<CallScope<'_>, EvalError> {
        let token = self.depth.enter().map_err(|exceeded| {
            tracing::debug!(limit = exceeded.limit, "call depth limit reached");
            stack_overflow(exceeded.limit)
        })?;
        self.call_stack.push(CallFrame { name: label });
        Ok(CallScope {
            interpreter: self,
            _depth: token,
        })
    }
}
