//! Diagnostic infrastructure for the evaluator.
//!
//! `CallStack` records the label of every action currently dispatching so an
//! error escaping a call can carry a backtrace. The depth limit itself is
//! enforced separately by the interpreter's `DepthCounter`.

use ren_ir::{Symbol, SymbolTable};

use crate::errors::{BacktraceFrame, EvalBacktrace, EvalError};

/// A single frame in the live call stack.
#[derive(Clone, Copy, Debug)]
pub struct CallFrame {
    /// Label the action was invoked through, if any.
    pub name: Option<Symbol>,
}

/// Live call stack for the interpreter.
#[derive(Clone, Debug, Default)]
pub struct CallStack {
    frames: Vec<CallFrame>,
}

impl CallStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: CallFrame) {
        self.frames.push(frame);
    }

    /// Pop the most recent call frame.
    pub fn pop(&mut self) {
        debug_assert!(
            !self.frames.is_empty(),
            "CallStack::pop() called on empty stack"
        );
        self.frames.pop();
    }

    /// Snapshot of the stack, most recent call first.
    pub fn capture(&self, symbols: &SymbolTable) -> EvalBacktrace {
        let frames = self
            .frames
            .iter()
            .rev()
            .map(|f| BacktraceFrame {
                name: f
                    .name
                    .map_or_else(|| "anonymous".to_string(), |s| symbols.lookup(s).to_string()),
            })
            .collect();
        EvalBacktrace::new(frames)
    }

    /// Attach a backtrace from this call stack to an error.
    pub fn attach_backtrace(&self, err: EvalError, symbols: &SymbolTable) -> EvalError {
        if self.frames.is_empty() {
            return err;
        }
        err.with_backtrace(self.capture(symbols))
    }
}
