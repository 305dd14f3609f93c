//! CLI commands.

mod options;
mod run;

pub use options::{parse_run_options, RunOptions};
pub use run::{eval_code, run_file, run_source, RunOutcome};

/// Read a source file, exiting with a message when it cannot be read.
pub(crate) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("error: cannot read '{path}': {err}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests;
