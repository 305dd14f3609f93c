//! Paths: refinement calls (`f/b/c`) and object field access (`obj/field`).

use std::collections::VecDeque;

use ren_ir::{Action, ActionCell, ArrayRef, Cell, FeedRef, Heart, ParamClass, Specifier, Symbol};
use smallvec::SmallVec;

use super::StepFlags;
use crate::binding::Binder;
use crate::errors::{bad_refinement, cannot_pick, no_such_field, not_a_word, EvalError, EvalResult};
use crate::interpreter::Interpreter;

/// Spellings of a path's elements; most paths are short.
type Elements = SmallVec<[Symbol; 4]>;

impl Interpreter {
    pub(super) fn eval_path(
        &mut self,
        feed: &FeedRef,
        path: &ArrayRef,
        specifier: &Specifier,
        out: &mut Cell,
    ) -> EvalResult<()> {
        let cells = path.to_vec();
        let Some((head, rest)) = cells.split_first() else {
            return Err(cannot_pick("path!").into());
        };
        let Some(head_word) = head.as_word() else {
            return Err(not_a_word(head.kind().name()).into());
        };
        let elements = element_symbols(rest)?;
        let value = self.get_var(head_word, specifier)?;

        if let Some(action) = value.as_action() {
            let pickups = self.path_pickups(&action.action, &elements, head_word.symbol)?;
            let infix = value.is_infix();
            return self.invoke(feed, action, Some(head_word.symbol), None, infix, pickups, out);
        }

        let mut current = value;
        for (position, symbol) in elements.iter().enumerate() {
            let Some(object) = current.as_object().cloned() else {
                return Err(cannot_pick(current.kind().name()).into());
            };
            let index = object
                .find(*symbol)
                .ok_or_else(|| no_such_field(self.spelling(*symbol)))?;
            let field = object.get(index).unwrap_or_else(Cell::null);

            if let Some(action) = field.as_action() {
                let refinements = &elements[position + 1..];
                let pickups = self.path_pickups(&action.action, refinements, *symbol)?;
                let method = ActionCell {
                    action: action.action.clone(),
                    coupling: Some(object),
                    label: Some(*symbol),
                };
                tracing::trace!(method = self.spelling(*symbol), "method call through path");
                return self.invoke(feed, &method, Some(*symbol), None, false, pickups, out);
            }
            current = field;
        }
        *out = current.fresh();
        Ok(())
    }

    pub(super) fn eval_set_path(
        &mut self,
        feed: &FeedRef,
        path: &ArrayRef,
        specifier: &Specifier,
        out: &mut Cell,
    ) -> EvalResult<()> {
        let cells = path.to_vec();
        let Some((head, rest)) = cells.split_first() else {
            return Err(cannot_pick("set-path!").into());
        };
        let Some(head_word) = head.as_word() else {
            return Err(not_a_word(head.kind().name()).into());
        };
        let elements = element_symbols(rest)?;
        let Some((field, walk)) = elements.split_last() else {
            return Err(cannot_pick("set-path!").into());
        };

        let mut current = self.get_var(head_word, specifier)?;
        for symbol in walk {
            let object = current
                .as_object()
                .cloned()
                .ok_or_else(|| cannot_pick(current.kind().name()))?;
            let index = object
                .find(*symbol)
                .ok_or_else(|| no_such_field(self.spelling(*symbol)))?;
            current = object.get(index).unwrap_or_else(Cell::null);
        }
        let object = current
            .as_object()
            .cloned()
            .ok_or_else(|| cannot_pick(current.kind().name()))?;
        let index = object
            .find(*field)
            .ok_or_else(|| no_such_field(self.spelling(*field)))?;

        let mut value = Cell::fresh_output();
        while value.is_stale() && !feed.at_end() {
            self.eval_step(feed, &mut value, StepFlags::empty())?;
        }
        if value.is_stale() {
            let message = format!("{}: needs a value", self.spelling(*field));
            return Err(EvalError::new(message).into());
        }
        object.set(index, value.clone().fresh());
        *out = value.fresh();
        Ok(())
    }

    /// Refinement indices requested by `refinements`, in path order.
    ///
    /// Refinements fixed by specialization are claimed with a negative
    /// index so naming them is an error; a repeated name finds its claim
    /// already released.
    fn path_pickups(
        &self,
        action: &Action,
        refinements: &[Symbol],
        label: Symbol,
    ) -> EvalResult<VecDeque<usize>> {
        let mut pickups = VecDeque::with_capacity(refinements.len());
        if refinements.is_empty() {
            return Ok(pickups);
        }

        let mut binder = Binder::new();
        let mut claimed: Elements = SmallVec::new();
        for (offset, param) in action.paramlist().params().iter().enumerate() {
            if param.class != ParamClass::Refinement {
                continue;
            }
            let index = i32::try_from(offset + 1).unwrap_or(i32::MAX);
            let index = if action.specialized(offset + 1).is_some() {
                -index
            } else {
                index
            };
            if binder.try_add(param.symbol, index) {
                claimed.push(param.symbol);
            }
        }

        let mut failure = None;
        for symbol in refinements {
            match usize::try_from(binder.get_or_zero(*symbol)) {
                Ok(index) if index > 0 => {
                    binder.remove(*symbol);
                    pickups.push_back(index);
                }
                _ => {
                    failure = Some(*symbol);
                    break;
                }
            }
        }

        for symbol in claimed {
            binder.remove(symbol);
        }
        if let Err(err) = binder.shutdown() {
            tracing::warn!(%err, "path pickups left claims behind");
        }

        match failure {
            Some(symbol) => Err(bad_refinement(self.spelling(label), self.spelling(symbol)).into()),
            None => Ok(pickups),
        }
    }
}

fn element_symbols(cells: &[Cell]) -> EvalResult<Elements> {
    cells
        .iter()
        .map(|cell| match cell.heart() {
            Heart::Word(word) if cell.quotes() == 0 => Ok(word.symbol),
            _ => Err(not_a_word(cell.kind().name()).into()),
        })
        .collect()
}
