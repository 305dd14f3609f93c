use pretty_assertions::assert_eq;
use ren_eval::{buffer_handler, EvalConfig, DEFAULT_MAX_DEPTH};

use super::{parse_run_options, run_source, RunOutcome};

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|arg| (*arg).to_string()).collect()
}

#[test]
fn options_default_to_the_standard_depth() {
    let options = parse_run_options(&strings(&["script.ren"]))
        .unwrap_or_else(|err| panic!("parse failed: {err}"));
    assert_eq!(options.target.as_deref(), Some("script.ren"));
    assert_eq!(options.config.max_depth, Some(DEFAULT_MAX_DEPTH));
    assert!(!options.config.trusted);
}

#[test]
fn options_parse_flags_in_any_position() {
    let options = parse_run_options(&strings(&["--trusted", "x.ren", "--max-depth=12"]))
        .unwrap_or_else(|err| panic!("parse failed: {err}"));
    assert_eq!(options.target.as_deref(), Some("x.ren"));
    assert_eq!(options.config.max_depth, Some(12));
    assert!(options.config.trusted);

    let unlimited = parse_run_options(&strings(&["--no-max-depth"]))
        .unwrap_or_else(|err| panic!("parse failed: {err}"));
    assert_eq!(unlimited.config.max_depth, None);
    assert_eq!(unlimited.target, None);
}

#[test]
fn options_reject_bad_flags() {
    assert!(parse_run_options(&strings(&["--max-depth=lots"])).is_err());
    assert!(parse_run_options(&strings(&["--fast"])).is_err());
}

#[test]
fn run_source_molds_the_value() {
    let handler = buffer_handler();
    let outcome = run_source(
        "print \"hi\" reduce [1 + 2 'a]",
        EvalConfig::default(),
        handler.clone(),
    );
    assert_eq!(outcome, RunOutcome::Value(Some("[3 a]".to_string())));
    assert_eq!(handler.get_output(), "hi\n");
}

#[test]
fn run_source_without_a_value() {
    let outcome = run_source("comment 1", EvalConfig::default(), buffer_handler());
    assert_eq!(outcome, RunOutcome::Value(None));
}

#[test]
fn run_source_reports_errors_with_backtrace() {
    let outcome = run_source(
        "f: func [] [fail \"nope\"] f",
        EvalConfig::default(),
        buffer_handler(),
    );
    let RunOutcome::Error(message) = outcome else {
        panic!("expected an error, got {outcome:?}");
    };
    assert!(message.starts_with("error: nope"), "{message}");
    assert!(message.contains("stack backtrace:"), "{message}");
    assert!(message.contains("1: f"), "{message}");
}
