//! Flags shared by `run` and `eval`.

use ren_eval::{EvalConfig, DEFAULT_MAX_DEPTH};

/// Parsed evaluation flags plus the first positional argument.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub config: EvalConfig,
    /// File path for `run`, source text for `eval`.
    pub target: Option<String>,
}

/// Parse `--max-depth=<n>`, `--no-max-depth` and `--trusted`.
///
/// Unknown flags are rejected; the first non-flag argument is the target.
pub fn parse_run_options(args: &[String]) -> Result<RunOptions, String> {
    let mut options = RunOptions {
        config: EvalConfig::default().with_max_depth(Some(DEFAULT_MAX_DEPTH)),
        target: None,
    };

    for arg in args {
        if let Some(depth) = arg.strip_prefix("--max-depth=") {
            let depth = depth
                .parse::<usize>()
                .map_err(|_| format!("invalid --max-depth value '{depth}'"))?;
            options.config = options.config.with_max_depth(Some(depth));
        } else if arg == "--no-max-depth" {
            options.config = options.config.with_max_depth(None);
        } else if arg == "--trusted" {
            options.config = options.config.trusted(true);
        } else if arg.starts_with("--") {
            return Err(format!("unknown option '{arg}'"));
        } else if options.target.is_none() {
            options.target = Some(arg.clone());
        }
    }

    Ok(options)
}
