//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use ren_ir::{
    sym, Action, Cell, Dispatcher, FrameRef, Key, Kind, NativeId, SharedSymbols, Specifier,
};
use ren_stack::DepthCounter;

use super::Interpreter;
use crate::action::make_paramlist;
use crate::binding::{bind, BindOptions};
use crate::config::EvalConfig;
use crate::diagnostics::CallStack;
use crate::errors::{scan_error, EvalError};
use crate::natives::{native_table, BOOT_SOURCE};
use crate::print_handler::{stdout_handler, SharedPrintHandler};

/// Builder for creating Interpreter instances with various configurations.
#[derive(Default)]
pub struct InterpreterBuilder {
    symbols: Option<SharedSymbols>,
    config: EvalConfig,
    print_handler: Option<SharedPrintHandler>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing symbol table.
    #[must_use]
    pub fn symbols(mut self, symbols: SharedSymbols) -> Self {
        self.symbols = Some(symbols);
        self
    }

    #[must_use]
    pub fn config(mut self, config: EvalConfig) -> Self {
        self.config = config;
        self
    }

    /// Limit call nesting; `None` removes the limit.
    #[must_use]
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn trusted(mut self, trusted: bool) -> Self {
        self.config.trusted = trusted;
        self
    }

    /// Set the print handler used by `print`. Default is stdout.
    #[must_use]
    pub fn print_handler(mut self, handler: SharedPrintHandler) -> Self {
        self.print_handler = Some(handler);
        self
    }

    /// Build the interpreter: register natives and constants in `lib`, then
    /// run the boot script.
    pub fn build(self) -> Result<Interpreter, EvalError> {
        let symbols = self.symbols.unwrap_or_default();
        let natives = native_table();
        let lib = FrameRef::object();
        let mut return_action = None;

        for (position, entry) in natives.iter().enumerate() {
            let spec = ren_lexer::scan(entry.spec, &symbols)
                .map_err(|err| scan_error(format!("spec of {}: {err}", entry.name)))?;
            let paramlist = make_paramlist(&spec, &symbols, false)?;
            let id = u16::try_from(position)
                .map(NativeId)
                .map_err(|_| EvalError::new("native table is too large"))?;
            let name = symbols.intern(entry.name);
            let action = Action::new(paramlist, Dispatcher::Native(id)).labeled(name);
            if name == sym::RETURN {
                return_action = Some(action.clone());
            }
            lib.append(Key::new(name), Cell::action(action, None));
        }

        for (name, value) in [
            ("true", Cell::logic(true)),
            ("false", Cell::logic(false)),
            ("null", Cell::null()),
        ] {
            lib.append(Key::new(symbols.intern(name)), value);
        }
        for kind in Kind::all() {
            lib.append(Key::new(symbols.intern(kind.name())), Cell::datatype(kind));
        }
        tracing::debug!(natives = natives.len(), lib = lib.len(), "lib populated");

        let mut interpreter = Interpreter {
            symbols,
            lib,
            user: FrameRef::object(),
            natives,
            return_action,
            depth: DepthCounter::new(self.config.max_depth),
            config: self.config,
            call_stack: CallStack::new(),
            print_handler: self.print_handler.unwrap_or_else(stdout_handler),
        };
        interpreter.boot()?;
        Ok(interpreter)
    }
}

impl Interpreter {
    /// Run the boot script inside `lib`.
    fn boot(&mut self) -> Result<(), EvalError> {
        let array = ren_lexer::scan(BOOT_SOURCE, &self.symbols)
            .map_err(|err| scan_error(format!("boot script: {err}")))?;
        bind(&array, &self.lib, BindOptions::collecting());
        let result = self.do_array(&array, &Specifier::Empty);
        self.settle(result).map(|_| ())
    }
}
