use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_factory_message_matches_kind() {
    let err = type_mismatch("f", "value", "integer!", "text!");
    assert_eq!(err.message, err.kind.to_string());
    assert_eq!(
        err.message,
        "f does not allow text! for its value argument (expected integer!)"
    );
}

#[test]
fn test_backtrace_is_kept_once() {
    let first = EvalBacktrace::new(vec![BacktraceFrame { name: "g".into() }]);
    let second = EvalBacktrace::new(vec![BacktraceFrame { name: "h".into() }]);
    let err = not_bound("x")
        .with_backtrace(first)
        .with_backtrace(second);
    let names: Vec<_> = err
        .backtrace
        .iter()
        .flat_map(|bt| bt.frames().iter().map(|f| f.name.clone()))
        .collect();
    assert_eq!(names, vec!["g".to_string()]);
}

#[test]
fn test_display_includes_notes() {
    let err = duplicate_binding("x").with_note(EvalNote::new("in use"));
    assert_eq!(err.to_string(), "duplicate binding for x\n  note: in use");
}

#[test]
fn test_into_control_action() {
    let action: ControlAction = division_by_zero().into();
    assert!(matches!(
        action.as_error().map(|e| &e.kind),
        Some(EvalErrorKind::DivisionByZero)
    ));
}
