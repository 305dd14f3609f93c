//! Error types for evaluation.
//!
//! # Structured Error Categories
//!
//! `EvalErrorKind` provides typed error categories. Factory functions
//! (e.g. `not_bound()`) are the public API; they populate both `kind` and
//! `message`.
//!
//! Every evaluator result is `Result<T, ControlAction>`: the `Err` side
//! carries either an error or a non-local throw (`throw`, `return`), and
//! both travel up the Rust stack with `?`.

use std::fmt;

use ren_ir::Cell;

/// Result of evaluation.
pub type EvalResult<T = Cell> = Result<T, ControlAction>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Binding
    NotBound {
        name: String,
    },
    Inaccessible {
        name: String,
    },
    DuplicateBinding {
        name: String,
    },

    // Fulfillment
    MissingArgument {
        action: String,
        param: String,
    },
    TypeMismatch {
        action: String,
        param: String,
        expected: String,
        got: String,
    },
    NoLeftArgument {
        action: String,
    },
    BadRefinement {
        action: String,
        refinement: String,
    },
    CorruptRefinement {
        action: String,
        param: String,
    },
    BadDeclaration {
        message: String,
    },
    VarargsExpired,

    // Access
    NoSuchField {
        field: String,
    },
    CannotPick {
        type_name: String,
    },
    NotAWord {
        type_name: String,
    },

    // Arithmetic
    IntegerOverflow {
        operation: String,
    },
    DivisionByZero,

    // Control
    UncaughtThrow {
        label: String,
    },
    StackOverflow {
        depth: usize,
    },

    // Source
    Scan {
        message: String,
    },

    /// Raised by `fail`.
    User {
        message: String,
    },

    /// Catch-all for errors not yet categorized into structured kinds.
    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotBound { name } => write!(f, "{name} is not bound"),
            Self::Inaccessible { name } => {
                write!(f, "{name} refers to a frame that is no longer accessible")
            }
            Self::DuplicateBinding { name } => write!(f, "duplicate binding for {name}"),

            Self::MissingArgument { action, param } => {
                write!(f, "{action} is missing its {param} argument")
            }
            Self::TypeMismatch {
                action,
                param,
                expected,
                got,
            } => write!(
                f,
                "{action} does not allow {got} for its {param} argument (expected {expected})"
            ),
            Self::NoLeftArgument { action } => {
                write!(f, "{action} is infix and has no left argument")
            }
            Self::BadRefinement { action, refinement } => {
                write!(f, "{action} has no usable refinement /{refinement}")
            }
            Self::CorruptRefinement { action, param } => {
                write!(f, "refinement /{param} of {action} holds a value other than #[true] or null")
            }
            Self::BadDeclaration { message } => write!(f, "bad parameter declaration: {message}"),
            Self::VarargsExpired => write!(f, "varargs used after its call ended"),

            Self::NoSuchField { field } => write!(f, "no field {field} in object"),
            Self::CannotPick { type_name } => write!(f, "cannot pick from {type_name}"),
            Self::NotAWord { type_name } => write!(f, "expected a word, got {type_name}"),

            Self::IntegerOverflow { operation } => write!(f, "integer overflow in {operation}"),
            Self::DivisionByZero => write!(f, "division by zero"),

            Self::UncaughtThrow { label } => write!(f, "no catch for throw: {label}"),
            Self::StackOverflow { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }

            Self::Scan { message } => write!(f, "syntax error: {message}"),
            Self::User { message } | Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Additional context note attached to an error.
#[derive(Clone, Debug)]
pub struct EvalNote {
    pub message: String,
}

impl EvalNote {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A single frame in an evaluation backtrace.
#[derive(Clone, Debug)]
pub struct BacktraceFrame {
    /// Action label, or `anonymous`.
    pub name: String,
}

/// Immutable snapshot of the call stack at an error site.
#[derive(Clone, Debug, Default)]
pub struct EvalBacktrace {
    frames: Vec<BacktraceFrame>,
}

impl EvalBacktrace {
    pub fn new(frames: Vec<BacktraceFrame>) -> Self {
        Self { frames }
    }

    pub fn frames(&self) -> &[BacktraceFrame] {
        &self.frames
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }
}

impl fmt::Display for EvalBacktrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.frames.is_empty() {
            return Ok(());
        }
        writeln!(f, "stack backtrace:")?;
        for (i, frame) in self.frames.iter().enumerate() {
            writeln!(f, "  {i}: {}", frame.name)?;
        }
        Ok(())
    }
}

/// Evaluation error.
#[derive(Clone, Debug)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable error message; equals `kind.to_string()` for factory errors.
    pub message: String,
    /// Call stack backtrace at the error site.
    pub backtrace: Option<EvalBacktrace>,
    /// Additional context notes.
    pub notes: Vec<EvalNote>,
}

impl EvalError {
    /// Create an error with just a message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::from_kind(EvalErrorKind::Custom { message })
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self {
            kind,
            message,
            backtrace: None,
            notes: Vec::new(),
        }
    }

    /// Attach a backtrace (keeps an existing one).
    #[must_use]
    pub fn with_backtrace(mut self, backtrace: EvalBacktrace) -> Self {
        if self.backtrace.is_none() {
            self.backtrace = Some(backtrace);
        }
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: EvalNote) -> Self {
        self.notes.push(note);
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        for note in &self.notes {
            write!(f, "\n  note: {}", note.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for EvalError {}

/// Non-local exit from an evaluation.
#[derive(Clone, Debug)]
pub enum ControlAction {
    Error(Box<EvalError>),
    /// `throw`/`return` unwinding toward a matching `catch` or frame.
    Throw { label: Cell, value: Cell },
}

impl ControlAction {
    /// The error, if this is one.
    pub fn as_error(&self) -> Option<&EvalError> {
        match self {
            ControlAction::Error(err) => Some(err),
            ControlAction::Throw { .. } => None,
        }
    }
}

impl From<EvalError> for ControlAction {
    fn from(err: EvalError) -> Self {
        ControlAction::Error(Box::new(err))
    }
}

// Binding

#[cold]
pub fn not_bound(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotBound {
        name: name.to_string(),
    })
}

#[cold]
pub fn inaccessible(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Inaccessible {
        name: name.to_string(),
    })
}

#[cold]
pub fn duplicate_binding(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DuplicateBinding {
        name: name.to_string(),
    })
}

// Fulfillment

#[cold]
pub fn missing_argument(action: &str, param: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingArgument {
        action: action.to_string(),
        param: param.to_string(),
    })
}

#[cold]
pub fn type_mismatch(action: &str, param: &str, expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        action: action.to_string(),
        param: param.to_string(),
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

#[cold]
pub fn no_left_argument(action: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoLeftArgument {
        action: action.to_string(),
    })
}

#[cold]
pub fn bad_refinement(action: &str, refinement: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BadRefinement {
        action: action.to_string(),
        refinement: refinement.to_string(),
    })
}

#[cold]
pub fn corrupt_refinement(action: &str, param: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CorruptRefinement {
        action: action.to_string(),
        param: param.to_string(),
    })
}

#[cold]
pub fn bad_declaration(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BadDeclaration {
        message: message.into(),
    })
}

#[cold]
pub fn varargs_expired() -> EvalError {
    EvalError::from_kind(EvalErrorKind::VarargsExpired)
}

// Access

#[cold]
pub fn no_such_field(field: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchField {
        field: field.to_string(),
    })
}

#[cold]
pub fn cannot_pick(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotPick {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn not_a_word(type_name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotAWord {
        type_name: type_name.to_string(),
    })
}

// Arithmetic

#[cold]
pub fn integer_overflow(operation: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IntegerOverflow {
        operation: operation.to_string(),
    })
}

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

// Control

#[cold]
pub fn uncaught_throw(label: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UncaughtThrow {
        label: label.to_string(),
    })
}

#[cold]
pub fn stack_overflow(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

// Source

#[cold]
pub fn scan_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Scan {
        message: message.into(),
    })
}

#[cold]
pub fn user_error(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::User {
        message: message.into(),
    })
}

#[cfg(test)]
mod tests;
