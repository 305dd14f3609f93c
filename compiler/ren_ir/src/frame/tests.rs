use super::*;
use pretty_assertions::assert_eq;

fn sym(n: u32) -> Symbol {
    Symbol::from_raw(n)
}

#[test]
fn test_vars_are_one_based() {
    let frame = FrameRef::with_keys(FrameKind::Context, vec![Key::new(sym(1)), Key::new(sym(2))]);
    assert_eq!(frame.len(), 2);
    assert_eq!(frame.get(0), None);
    assert_eq!(frame.get(1), Some(Cell::null()));
    assert!(frame.set(2, Cell::integer(5)));
    assert_eq!(frame.get(2), Some(Cell::integer(5)));
    assert!(!frame.set(3, Cell::integer(5)));
    assert_eq!(frame.archetype().kind(), Kind::Datatype);
}

#[test]
fn test_find_skips_hidden_and_respects_len() {
    let frame = FrameRef::object();
    frame.append(Key::new(sym(1)), Cell::integer(1));
    frame.append(Key::hidden(sym(2)), Cell::integer(2));
    frame.append(Key::new(sym(3)), Cell::integer(3));
    assert_eq!(frame.find(sym(1)), Some(1));
    assert_eq!(frame.find(sym(2)), None);
    assert_eq!(frame.find(sym(3)), Some(3));
    assert_eq!(frame.find_within(sym(3), 2), None);
}

#[test]
fn test_derive_copies_and_links_ancestor() {
    let base = FrameRef::object();
    base.append(Key::new(sym(1)), Cell::integer(10));
    let child = base.derive();
    assert_eq!(child.get(1), Some(Cell::integer(10)));
    child.set(1, Cell::integer(20));
    assert_eq!(base.get(1), Some(Cell::integer(10)));
    assert!(child.ancestor().is_some_and(|a| a.ptr_eq(&base)));
}

#[test]
fn test_decay_unless_reified() {
    let plain = FrameRef::with_keys(FrameKind::Context, Vec::new());
    plain.decay();
    assert!(!plain.is_accessible());

    let kept = FrameRef::with_keys(FrameKind::Context, Vec::new());
    kept.reify();
    kept.decay();
    assert!(kept.is_accessible());
}

#[test]
fn test_weak_frame_identity() {
    let frame = FrameRef::object();
    let other = FrameRef::object();
    let weak = frame.downgrade();
    assert!(weak.points_to(&frame));
    assert!(!weak.points_to(&other));
    assert!(weak.upgrade().is_some());
    drop(frame);
    assert!(weak.upgrade().is_none());
}
