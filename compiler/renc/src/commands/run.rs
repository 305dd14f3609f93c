//! The `run` and `eval` commands: load Ren source into a fresh interpreter
//! and evaluate it.

use ren_eval::{EvalConfig, EvalError, InterpreterBuilder, SharedPrintHandler};

use super::read_file;

/// What a finished evaluation produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Molded result; `None` when the script produced no value.
    Value(Option<String>),
    /// Error message followed by the backtrace, if one was captured.
    Error(String),
}

/// Evaluate `source` with `config`, printing through `handler`.
pub fn run_source(source: &str, config: EvalConfig, handler: SharedPrintHandler) -> RunOutcome {
    let built = InterpreterBuilder::new()
        .config(config)
        .print_handler(handler)
        .build();
    let mut interpreter = match built {
        Ok(interpreter) => interpreter,
        Err(err) => return RunOutcome::Error(render_error(&err)),
    };

    match interpreter.eval_source(source) {
        Ok(value) if value.is_void() => RunOutcome::Value(None),
        Ok(value) => RunOutcome::Value(Some(interpreter.mold(&value))),
        Err(err) => RunOutcome::Error(render_error(&err)),
    }
}

fn render_error(err: &EvalError) -> String {
    tracing::debug!(kind = ?err.kind, "evaluation failed");
    let mut text = format!("error: {err}");
    if let Some(backtrace) = &err.backtrace {
        if !backtrace.is_empty() {
            text.push('\n');
            text.push_str(backtrace.to_string().trim_end());
        }
    }
    text
}

fn report(outcome: RunOutcome, show_value: bool) {
    match outcome {
        RunOutcome::Value(Some(molded)) if show_value => println!("== {molded}"),
        RunOutcome::Value(_) => {}
        RunOutcome::Error(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    }
}

/// Run a script file. Only `print` output is shown.
pub fn run_file(path: &str, config: EvalConfig) {
    let content = read_file(path);
    report(
        run_source(&content, config, ren_eval::stdout_handler()),
        false,
    );
}

/// Evaluate source given on the command line and show its value.
pub fn eval_code(code: &str, config: EvalConfig) {
    report(run_source(code, config, ren_eval::stdout_handler()), true);
}
