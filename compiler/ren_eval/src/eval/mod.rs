//! The step evaluator.
//!
//! `eval_step` consumes one expression from a feed into an output cell:
//!
//! 1. `let` adds a single-name patch in front of the feed's specifier.
//! 2. If the unit after the current one is an infix action whose left
//!    parameter is quoted, the current unit is handed over unevaluated.
//! 3. The current unit is evaluated; words that name actions invoke them.
//! 4. While the next unit is an infix action, it is invoked with the output
//!    as its left argument.
//!
//! The output cell starts each step marked stale. A step that leaves it
//! stale produced nothing (`comment`, `elide`, an empty group) and the
//! value from before the step shows through.

mod path;

use std::collections::VecDeque;

use bitflags::bitflags;
use ren_ir::{
    sym, ActionCell, ArrayKind, ArrayRef, Cell, FeedRef, Heart, Specifier, Symbol, Word, WordKind,
};

use crate::action::Level;
use crate::binding::{derelativize_cell, derive_specifier, make_local_patch, resolve, ResolveError};
use crate::errors::{inaccessible, not_a_word, not_bound, EvalError, EvalResult};
use crate::interpreter::Interpreter;

bitflags! {
    /// How a step treats what follows the expression it evaluates.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct StepFlags: u8 {
        /// Do not continue into infix operators after the expression.
        const NO_LOOKAHEAD = 1 << 0;
        /// The step gathers an argument; deferring infix operators wait.
        const FULFILLING_ARG = 1 << 1;
    }
}

/// `cell` made independent of `specifier`: words are bound to the slots
/// they resolve to, arrays carry the merged chain.
pub fn specify(cell: &Cell, specifier: &Specifier) -> Cell {
    let specified = match cell.heart() {
        Heart::Word(_) => derelativize_cell(cell, specifier),
        Heart::Array(kind, array, inner) => {
            let mut copy = cell.clone();
            *copy.heart_mut() = Heart::Array(*kind, array.clone(), derive_specifier(inner, specifier));
            copy
        }
        _ => cell.clone(),
    };
    specified.fresh()
}

impl Interpreter {
    /// Evaluate every expression of `array`; the last value produced wins.
    /// An array that produces nothing gives void.
    pub fn do_array(&mut self, array: &ArrayRef, specifier: &Specifier) -> EvalResult<Cell> {
        let feed = FeedRef::new(array.clone(), specifier.clone());
        let mut out = Cell::fresh_output();
        self.run_feed(&feed, &mut out)?;
        Ok(out.fresh())
    }

    /// Evaluate a group; `None` when every expression in it vanished.
    pub fn do_group(&mut self, array: &ArrayRef, specifier: &Specifier) -> EvalResult<Option<Cell>> {
        let feed = FeedRef::new(array.clone(), specifier.clone());
        let mut out = Cell::fresh_output();
        if self.run_feed(&feed, &mut out)? {
            Ok(Some(out.fresh()))
        } else {
            Ok(None)
        }
    }

    /// Step through `feed` to its end. Returns whether any step produced a value.
    fn run_feed(&mut self, feed: &FeedRef, out: &mut Cell) -> EvalResult<bool> {
        let mut produced = false;
        while !feed.at_end() {
            out.mark_stale();
            self.eval_step(feed, out, StepFlags::empty())?;
            produced |= !out.is_stale();
        }
        Ok(produced)
    }

    /// Evaluate one expression from `feed` into `out`.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn eval_step(&mut self, feed: &FeedRef, out: &mut Cell, flags: StepFlags) -> EvalResult<()> {
        ren_stack::ensure_sufficient_stack(|| self.eval_step_inner(feed, out, flags))
    }

    fn eval_step_inner(&mut self, feed: &FeedRef, out: &mut Cell, flags: StepFlags) -> EvalResult<()> {
        let Some(unit) = feed.peek() else {
            return Ok(());
        };
        let specifier = feed.specifier();

        if let Some(word) = unit.as_word() {
            if word.kind == WordKind::Word && word.symbol == sym::LET {
                return self.eval_let(feed, out, flags);
            }
        }

        if let Some((action, label)) = self.quoting_infix_at(feed, 1) {
            feed.advance();
            feed.advance();
            let left = specify(&unit, &specifier);
            self.invoke(feed, &action, label, Some(left), true, VecDeque::new(), out)?;
        } else {
            feed.advance();
            self.eval_unit(feed, &unit, &specifier, out)?;
        }

        while !flags.contains(StepFlags::NO_LOOKAHEAD) && !out.is_stale() {
            let Some((action, label, deferred)) = self.infix_at(feed) else {
                break;
            };
            if deferred && flags.contains(StepFlags::FULFILLING_ARG) {
                tracing::trace!("deferring infix until the argument is complete");
                break;
            }
            feed.advance();
            let left = out.clone();
            self.invoke(feed, &action, label, Some(left), true, VecDeque::new(), out)?;
        }
        Ok(())
    }

    /// `let x: ...` or `let x`: put a fresh patch for `x` in front of the
    /// feed's chain, then carry on as if `let` were not there.
    fn eval_let(&mut self, feed: &FeedRef, out: &mut Cell, flags: StepFlags) -> EvalResult<()> {
        feed.advance();
        let Some(target) = feed.peek() else {
            return Err(EvalError::new("let needs a word to declare").into());
        };
        let Some(word) = target.as_word() else {
            return Err(not_a_word(target.kind().name()).into());
        };
        let patched = make_local_patch(word.symbol, &feed.specifier());
        feed.set_specifier(patched);
        tracing::trace!(name = self.spelling(word.symbol), "let");
        match word.kind {
            WordKind::Set => self.eval_step_inner(feed, out, flags),
            WordKind::Word => {
                feed.advance();
                Ok(())
            }
            _ => Err(not_a_word(target.kind().name()).into()),
        }
    }

    fn eval_unit(
        &mut self,
        feed: &FeedRef,
        unit: &Cell,
        specifier: &Specifier,
        out: &mut Cell,
    ) -> EvalResult<()> {
        if unit.quotes() > 0 {
            *out = specify(&unit.clone().unquoted(), specifier);
            return Ok(());
        }
        match unit.heart() {
            Heart::Word(word) => match word.kind {
                WordKind::Word => {
                    let value = self.get_var(word, specifier)?;
                    match value.as_action() {
                        Some(action) => {
                            let infix = value.is_infix();
                            self.invoke(
                                feed,
                                action,
                                Some(word.symbol),
                                None,
                                infix,
                                VecDeque::new(),
                                out,
                            )?;
                        }
                        None => *out = value.fresh(),
                    }
                }
                WordKind::Set => {
                    let value = self.eval_rhs(feed, word.symbol)?;
                    self.set_var(word, specifier, value.clone())?;
                    *out = value;
                }
                WordKind::Get => *out = self.get_var(word, specifier)?.fresh().labeled(word.symbol),
                WordKind::Sym | WordKind::Refinement => *out = specify(unit, specifier),
            },
            Heart::Array(kind, array, inner) => match kind {
                ArrayKind::Block | ArrayKind::SymBlock => *out = specify(unit, specifier),
                ArrayKind::Group | ArrayKind::SymGroup => {
                    let group_specifier = derive_specifier(inner, specifier);
                    if let Some(value) = self.do_group(array, &group_specifier)? {
                        *out = value;
                    }
                }
                ArrayKind::Path => {
                    let path_specifier = derive_specifier(inner, specifier);
                    self.eval_path(feed, array, &path_specifier, out)?;
                }
                ArrayKind::SetPath => {
                    let path_specifier = derive_specifier(inner, specifier);
                    self.eval_set_path(feed, array, &path_specifier, out)?;
                }
            },
            Heart::Action(action) => {
                let label = action.label();
                self.invoke(feed, action, label, None, false, VecDeque::new(), out)?;
            }
            _ => *out = unit.clone().fresh(),
        }
        Ok(())
    }

    /// Value for the right-hand side of a set-word or set-path, skipping
    /// expressions that vanish.
    fn eval_rhs(&mut self, feed: &FeedRef, target: Symbol) -> EvalResult<Cell> {
        let mut value = Cell::fresh_output();
        while !feed.at_end() {
            self.eval_step(feed, &mut value, StepFlags::empty())?;
            if !value.is_stale() {
                return Ok(value);
            }
        }
        Err(EvalError::new(format!("{}: needs a value", self.spelling(target))).into())
    }

    /// Call `action` with arguments from `feed`, writing its result to `out`.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn invoke(
        &mut self,
        feed: &FeedRef,
        action: &ActionCell,
        label: Option<Symbol>,
        left: Option<Cell>,
        infix: bool,
        pickups: VecDeque<usize>,
        out: &mut Cell,
    ) -> EvalResult<()> {
        let mut level = Level::new(feed.clone(), action, label, out.clone());
        if infix {
            level = level.infix(left);
        }
        level.pickups = pickups;
        *out = self.fulfill_and_dispatch(&mut level)?;
        Ok(())
    }

    /// Infix action named by the unit under the cursor, with its label and
    /// whether it defers.
    fn infix_at(&self, feed: &FeedRef) -> Option<(ActionCell, Option<Symbol>, bool)> {
        let unit = feed.peek()?;
        let word = unit.as_word()?;
        if word.kind != WordKind::Word {
            return None;
        }
        let value = resolve(word, &feed.specifier()).ok()?.get();
        if !value.is_infix() {
            return None;
        }
        let action = value.as_action()?.clone();
        Some((action, Some(word.symbol), value.is_deferred()))
    }

    /// Infix action `offset` units past the cursor whose left parameter
    /// takes its argument literally.
    pub(crate) fn quoting_infix_at(
        &self,
        feed: &FeedRef,
        offset: usize,
    ) -> Option<(ActionCell, Option<Symbol>)> {
        let unit = feed.peek_at(offset)?;
        let word = unit.as_word()?;
        if word.kind != WordKind::Word {
            return None;
        }
        let value = resolve(word, &feed.specifier()).ok()?.get();
        if !value.is_infix() {
            return None;
        }
        let action = value.as_action()?;
        let (_, param) = action.action.first_unspecialized_param()?;
        if !param.class.is_literal() {
            return None;
        }
        Some((action.clone(), Some(word.symbol)))
    }

    /// Value of the variable `word` names, read through `specifier`.
    pub fn get_var(&self, word: &Word, specifier: &Specifier) -> EvalResult<Cell> {
        match resolve(word, specifier) {
            Ok(slot) => Ok(slot.get()),
            Err(err) => Err(self.resolve_error(err, word).into()),
        }
    }

    /// Store `value` in the variable `word` names, read through `specifier`.
    pub fn set_var(&self, word: &Word, specifier: &Specifier, value: Cell) -> EvalResult<()> {
        let slot = resolve(word, specifier).map_err(|err| self.resolve_error(err, word))?;
        if slot.set(value.fresh()) {
            Ok(())
        } else {
            Err(inaccessible(self.spelling(word.symbol)).into())
        }
    }

    fn resolve_error(&self, err: ResolveError, word: &Word) -> EvalError {
        let name = self.spelling(word.symbol);
        match err {
            ResolveError::Unbound => not_bound(name),
            ResolveError::Inaccessible => inaccessible(name),
        }
    }
}
