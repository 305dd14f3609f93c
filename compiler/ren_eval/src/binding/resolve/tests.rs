use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use ren_ir::{FrameKind, Key, Param, ParamClass, ParamList, ParamListRef, Symbol, TypeSet, WordKind};

fn sym(n: u32) -> Symbol {
    Symbol::from_raw(100 + n)
}

fn object(pairs: &[(u32, i64)]) -> FrameRef {
    let frame = FrameRef::object();
    for (n, value) in pairs {
        frame.append(Key::new(sym(*n)), Cell::integer(*value));
    }
    frame
}

fn word(n: u32) -> Word {
    Word::new(WordKind::Word, sym(n))
}

fn paramlist(names: &[u32]) -> ParamListRef {
    ParamListRef::new(ParamList::new(
        names
            .iter()
            .map(|n| Param::new(sym(*n), ParamClass::Normal, TypeSet::any_value()))
            .collect(),
    ))
}

fn call_frame(paramlist: &ParamListRef, coupling: Option<FrameRef>) -> FrameRef {
    FrameRef::with_keys(
        FrameKind::Call {
            paramlist: paramlist.clone(),
            coupling,
        },
        paramlist.keys(),
    )
}

fn value_of(result: Result<Slot, ResolveError>) -> Option<i64> {
    result.ok().and_then(|slot| slot.get().as_integer())
}

#[test]
fn test_specific_word_through_empty_chain() {
    let frame = object(&[(1, 10), (2, 20)]);
    let bound = word(2).with_binding(Binding::Specific(frame), 2);
    assert_eq!(value_of(resolve(&bound, &Specifier::Empty)), Some(20));
}

#[test]
fn test_unbound_word() {
    assert_eq!(
        resolve(&word(1), &Specifier::Empty).err(),
        Some(ResolveError::Unbound)
    );
}

#[test]
fn test_relative_word_needs_matching_call_frame() {
    let params = paramlist(&[1]);
    let frame = call_frame(&params, None);
    frame.set(1, Cell::integer(7));
    let relative = word(1).with_binding(Binding::Relative(params), 1);

    assert_eq!(
        value_of(resolve(&relative, &Specifier::Frame(frame))),
        Some(7)
    );
    assert_eq!(
        resolve(&relative, &Specifier::Empty).err(),
        Some(ResolveError::Unbound)
    );

    let foreign = call_frame(&paramlist(&[1]), None);
    assert_eq!(
        resolve(&relative, &Specifier::Frame(foreign)).err(),
        Some(ResolveError::Unbound)
    );
}

#[test]
fn test_decayed_frame_is_inaccessible() {
    let params = paramlist(&[1]);
    let frame = call_frame(&params, None);
    let relative = word(1).with_binding(Binding::Relative(params), 1);
    frame.decay();
    assert_eq!(
        resolve(&relative, &Specifier::Frame(frame)).err(),
        Some(ResolveError::Inaccessible)
    );
}

#[test]
fn test_derelativize_reifies_call_frame() {
    let params = paramlist(&[1]);
    let frame = call_frame(&params, None);
    frame.set(1, Cell::integer(3));
    let relative = word(1).with_binding(Binding::Relative(params), 1);

    let fixed = derelativize(&relative, &Specifier::Frame(frame.clone()));
    frame.decay();
    assert!(frame.is_accessible());
    assert_eq!(value_of(resolve(&fixed, &Specifier::Empty)), Some(3));
}

#[test]
fn test_specific_word_redirects_to_derived_coupling() {
    let base = object(&[(1, 1)]);
    let derived = base.derive();
    derived.set(1, Cell::integer(2));
    let method_word = word(1).with_binding(Binding::Specific(base.clone()), 1);

    let params = paramlist(&[]);
    let through_base = call_frame(&params, Some(base));
    let through_derived = call_frame(&params, Some(derived));
    assert_eq!(
        value_of(resolve(&method_word, &Specifier::Frame(through_base))),
        Some(1)
    );
    assert_eq!(
        value_of(resolve(&method_word, &Specifier::Frame(through_derived))),
        Some(2)
    );
}

#[test]
fn test_specific_word_redirects_to_derived_terminal() {
    let base = object(&[(1, 1)]);
    let derived = base.derive();
    derived.set(1, Cell::integer(2));
    let method_word = word(1).with_binding(Binding::Specific(base), 1);

    assert_eq!(
        value_of(resolve(&method_word, &Specifier::Frame(derived.clone()))),
        Some(2)
    );
    let chain = Patch::single(sym(9), Cell::integer(9), None, Some(derived));
    assert_eq!(
        value_of(resolve(&method_word, &Specifier::Patch(chain))),
        Some(2)
    );
    assert_eq!(value_of(resolve(&method_word, &Specifier::Empty)), Some(1));
}

#[test]
fn test_derives_from_is_strict() {
    let base = object(&[]);
    let child = base.derive();
    let grandchild = child.derive();
    assert!(derives_from(&grandchild, &base));
    assert!(derives_from(&child, &base));
    assert!(!derives_from(&base, &base));
    assert!(!derives_from(&base, &child));
}

#[test]
fn test_nearest_patch_wins() {
    let outer = Patch::single(sym(1), Cell::integer(1), None, None);
    let inner = Patch::single(sym(1), Cell::integer(2), Some(outer), None);
    assert_eq!(
        value_of(resolve(&word(1), &Specifier::Patch(inner))),
        Some(2)
    );
}

#[test]
fn test_patch_shadows_specific_binding() {
    let frame = object(&[(1, 10)]);
    let bound = word(1).with_binding(Binding::Specific(frame), 1);
    let patch = Patch::single(sym(1), Cell::integer(99), None, None);
    assert_eq!(
        value_of(resolve(&bound, &Specifier::Patch(patch))),
        Some(99)
    );
    assert_eq!(value_of(resolve(&bound, &Specifier::Empty)), Some(10));
}

#[test]
fn test_frame_patch_ignores_keys_added_later() {
    let frame = object(&[(1, 1)]);
    let patch = Patch::frame(frame.clone(), None, None);
    frame.append(Key::new(sym(2)), Cell::integer(2));
    let spec = Specifier::Patch(patch);
    assert_eq!(value_of(resolve(&word(1), &spec)), Some(1));
    assert_eq!(resolve(&word(2), &spec).err(), Some(ResolveError::Unbound));
}

#[test]
fn test_cache_records_hit_and_miss_per_head() {
    let target = word(1);
    let hit_head = Patch::single(sym(1), Cell::integer(5), None, None);
    let miss_head = Patch::single(sym(2), Cell::integer(6), None, None);

    let _ = resolve(&target, &Specifier::Patch(hit_head.clone()));
    let state = target.cache().get();
    assert!(state.is_for(&hit_head));
    assert!(matches!(state, CacheState::Hit { .. }));

    let _ = resolve(&target, &Specifier::Patch(miss_head.clone()));
    let state = target.cache().get();
    assert!(state.is_for(&miss_head));
    assert!(!state.is_for(&hit_head));
    assert!(matches!(state, CacheState::Miss { .. }));

    // switching back recomputes rather than trusting the miss
    assert_eq!(
        value_of(resolve(&target, &Specifier::Patch(hit_head))),
        Some(5)
    );
}

#[test]
fn test_slot_set_writes_through() {
    let patch = Patch::single(sym(1), Cell::null(), None, None);
    let spec = Specifier::Patch(patch);
    let slot = resolve(&word(1), &spec).unwrap_or_else(|e| panic!("{e}"));
    assert!(slot.set(Cell::integer(4)));
    assert_eq!(value_of(resolve(&word(1), &spec)), Some(4));
}

fn build_chain(chain_index: usize, symbols: &[u32]) -> Rc<Patch> {
    let mut head: Option<Rc<Patch>> = None;
    for (position, n) in symbols.iter().enumerate().rev() {
        let value = i64::try_from(chain_index * 100 + position).unwrap_or(i64::MAX);
        head = Some(Patch::single(sym(*n), Cell::integer(value), head, None));
    }
    head.unwrap_or_else(|| Patch::frame(object(&[]), None, None))
}

proptest! {
    #[test]
    fn cached_resolution_matches_fresh_walk(
        chains in proptest::collection::vec(proptest::collection::vec(0u32..4, 0..5), 1..5),
        target in 0u32..4,
        queries in proptest::collection::vec(0usize..5, 1..24),
    ) {
        let heads: Vec<_> = chains
            .iter()
            .enumerate()
            .map(|(i, symbols)| build_chain(i, symbols))
            .collect();
        let lookup = word(target);
        for query in queries {
            let head = &heads[query % heads.len()];
            let cached = value_of(resolve(&lookup, &Specifier::Patch(head.clone())));
            let fresh = walk_patches(&lookup, head).and_then(|slot| slot.get().as_integer());
            prop_assert_eq!(cached, fresh);
        }
    }
}
