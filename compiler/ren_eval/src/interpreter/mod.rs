//! The interpreter: contexts, native table and the public entry points.
//!
//! Evaluation itself lives in `crate::eval` (step loop) and
//! `crate::action` (fulfillment and dispatch); this module owns the state
//! they share.
//!
//! # Contexts
//!
//! - `lib` holds natives, constants, datatype words and the operators
//!   defined by the boot script.
//! - `user` collects every set-word of loaded scripts. Loading binds a
//!   script to `lib` first and then to `user`, so user definitions shadow
//!   library ones.

mod builder;
mod scope_guard;

pub use builder::InterpreterBuilder;
pub use scope_guard::CallScope;

use ren_ir::{Action, ArrayRef, Cell, FrameRef, SharedSymbols, Specifier, Symbol, SymbolTable};
use ren_stack::DepthCounter;

use crate::binding::{bind, BindOptions};
use crate::config::EvalConfig;
use crate::diagnostics::CallStack;
use crate::errors::{scan_error, uncaught_throw, ControlAction, EvalError, EvalResult};
use crate::mold::{form, mold};
use crate::natives::NativeEntry;
use crate::print_handler::SharedPrintHandler;

/// Interpreter state shared by every evaluation.
pub struct Interpreter {
    pub(crate) symbols: SharedSymbols,
    pub(crate) lib: FrameRef,
    pub(crate) user: FrameRef,
    pub(crate) natives: Vec<NativeEntry>,
    /// Native placed in every call frame's hidden `return` slot.
    pub(crate) return_action: Option<Action>,
    pub(crate) config: EvalConfig,
    pub(crate) call_stack: CallStack,
    pub(crate) depth: DepthCounter,
    pub(crate) print_handler: SharedPrintHandler,
}

impl Interpreter {
    /// Interpreter with default configuration, printing to stdout.
    pub fn new() -> Result<Self, EvalError> {
        InterpreterBuilder::new().build()
    }

    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn lib(&self) -> &FrameRef {
        &self.lib
    }

    pub fn user(&self) -> &FrameRef {
        &self.user
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    /// Scan `source` and bind it into `lib` and `user`.
    pub fn load(&mut self, source: &str) -> Result<ArrayRef, EvalError> {
        let array =
            ren_lexer::scan(source, &self.symbols).map_err(|err| scan_error(err.to_string()))?;
        bind(&array, &self.lib, BindOptions::deep());
        bind(&array, &self.user, BindOptions::collecting());
        Ok(array)
    }

    /// Load and run `source`, returning the value of its last expression.
    pub fn eval_source(&mut self, source: &str) -> Result<Cell, EvalError> {
        let array = self.load(source)?;
        let result = self.do_array(&array, &Specifier::Empty);
        self.settle(result)
    }

    /// Turn an evaluator result into a plain error result. A throw that
    /// reached this far had no matching catch.
    pub fn settle(&self, result: EvalResult<Cell>) -> Result<Cell, EvalError> {
        match result {
            Ok(value) => Ok(value),
            Err(ControlAction::Error(err)) => Err(*err),
            Err(ControlAction::Throw { label, .. }) => Err(uncaught_throw(&self.mold(&label))),
        }
    }

    /// Current value of a `user` variable.
    pub fn user_value(&self, name: &str) -> Option<Cell> {
        let symbol = self.symbols.get(name)?;
        let index = self.user.find(symbol)?;
        self.user.get(index)
    }

    pub fn mold(&self, cell: &Cell) -> String {
        mold(cell, &self.symbols)
    }

    pub fn form(&self, cell: &Cell) -> String {
        form(cell, &self.symbols)
    }

    #[inline]
    pub(crate) fn spelling(&self, symbol: Symbol) -> &'static str {
        self.symbols.lookup(symbol)
    }

    /// Name of a call for error messages.
    pub(crate) fn label_name(&self, label: Option<Symbol>) -> &'static str {
        label.map_or("anonymous", |symbol| self.spelling(symbol))
    }

    /// Value of a call frame's hidden `return` slot.
    pub(crate) fn return_cell(&self, frame: &FrameRef) -> Cell {
        match &self.return_action {
            Some(action) => Cell::action(action.clone(), Some(frame.clone())),
            None => Cell::null(),
        }
    }
}

#[cfg(test)]
mod tests;
