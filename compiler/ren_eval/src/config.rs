//! Interpreter configuration.

/// Call depth allowed when no explicit limit is configured.
///
/// `stacker` grows the native stack, so this bounds runaway recursion
/// rather than protecting the process.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// Evaluation policy, fixed when the interpreter is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum nesting of action calls, or `None` for unlimited.
    pub max_depth: Option<usize>,
    /// Trusted mode: engine invariant violations (a refinement slot holding
    /// something other than `#[true]` or null at typecheck) abort instead of
    /// raising a script error.
    pub trusted: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: Some(DEFAULT_MAX_DEPTH),
            trusted: false,
        }
    }
}

impl EvalConfig {
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    #[must_use]
    pub fn trusted(mut self, trusted: bool) -> Self {
        self.trusted = trusted;
        self
    }
}
