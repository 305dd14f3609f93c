//! Ren Eval - binding, argument fulfillment and evaluation.
//!
//! This crate runs scanned Ren source.
//!
//! # Architecture
//!
//! - `binding`: binder scratch maps, bind operations, resolution of words
//!   to slots, and virtual-binding patches
//! - `action`: parameter lists, the fulfillment state machine, typechecking
//!   and dispatch
//! - `eval`: the step evaluator (`let`, infix lookahead, paths)
//! - `natives`: built-in actions and the boot script
//! - `interpreter`: shared state, the builder and the call-scope guard
//!
//! # Re-exports
//!
//! Value types come from `ren_ir`; errors and the interpreter entry points
//! are re-exported here.

pub mod action;
pub mod binding;
pub mod config;
mod diagnostics;
pub mod errors;
pub mod eval;
pub mod interpreter;
mod mold;
mod natives;
mod print_handler;

pub use action::{Bounce, Level, State};
pub use config::{EvalConfig, DEFAULT_MAX_DEPTH};
pub use errors::{ControlAction, EvalBacktrace, EvalError, EvalErrorKind, EvalResult};
pub use eval::StepFlags;
pub use interpreter::{CallScope, Interpreter, InterpreterBuilder};
pub use mold::{form, mold};
pub use natives::{NativeEntry, NativeFn, BOOT_SOURCE};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, BufferPrintHandler, PrintHandlerImpl,
    SharedPrintHandler,
};

#[cfg(test)]
mod tests;
