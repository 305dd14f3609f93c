//! Filling a call frame from the feed.

use ren_ir::{ArrayKind, Cell, FeedRef, FrameRef, Heart, Param, ParamClass, Varargs, WordKind};

use super::{Level, State};
use crate::binding::derive_specifier;
use crate::errors::{missing_argument, no_left_argument, EvalResult};
use crate::eval::{specify, StepFlags};
use crate::interpreter::Interpreter;

impl Interpreter {
    /// Fill every slot of `level.frame`, leaving the level in `Typecheck`.
    ///
    /// Slots are visited in declaration order. Refinements requested by a
    /// path but not next in line stay pending and are gathered afterward in
    /// path order.
    pub fn fulfill(&mut self, level: &mut Level) -> EvalResult<()> {
        let paramlist = level.original.paramlist().clone();
        let left_slot = if level.is_infix() {
            level.original.first_unspecialized_param().map(|(index, _)| index)
        } else {
            None
        };

        for (offset, param) in paramlist.params().iter().enumerate() {
            let index = offset + 1;
            level.state = State::Fulfilling { param: index };

            if let Some(value) = level.original.specialized(index) {
                level.frame.set(index, value.clone());
                continue;
            }

            let value = match param.class {
                ParamClass::Local => Cell::null(),
                ParamClass::Return => self.return_cell(&level.frame),
                ParamClass::Refinement => match self.refinement_slot(level, index, param)? {
                    Some(value) => value,
                    None => continue,
                },
                _ if left_slot == Some(index) => self.take_left(level, param)?,
                _ => self.acquire_arg(level, index, param)?,
            };
            level.frame.set(index, value);
        }

        level.state = State::Pickups;
        while let Some(index) = level.pickups.pop_front() {
            let Some(param) = paramlist.get(index) else {
                continue;
            };
            level.mark_used(index);
            let value = if param.is_pure_refinement() {
                Cell::okay()
            } else {
                self.acquire_arg(level, index, param)?
            };
            level.frame.set(index, value);
        }

        level.state = State::Typecheck;
        Ok(())
    }

    /// Value for a refinement slot during the ordered walk, or `None` to
    /// leave the slot as it is (already activated, or pending).
    fn refinement_slot(
        &mut self,
        level: &mut Level,
        index: usize,
        param: &Param,
    ) -> EvalResult<Option<Cell>> {
        if level.arg(index).is_truthy() {
            return Ok(None);
        }
        let Some(position) = level.pickups.iter().position(|pickup| *pickup == index) else {
            return Ok(Some(Cell::null()));
        };
        if param.is_pure_refinement() {
            level.pickups.remove(position);
            level.mark_used(index);
            return Ok(Some(Cell::okay()));
        }
        if position == 0 {
            level.pickups.pop_front();
            level.mark_used(index);
            return self.acquire_arg(level, index, param).map(Some);
        }
        Ok(None)
    }

    fn take_left(&mut self, level: &mut Level, param: &Param) -> EvalResult<Cell> {
        match level.left.take() {
            Some(left) => Ok(left),
            None if param.is_endable() => Ok(Cell::null()),
            None => Err(no_left_argument(self.label_name(level.label)).into()),
        }
    }

    /// Gather the argument for parameter `index` from the level's feed.
    pub(crate) fn acquire_arg(
        &mut self,
        level: &mut Level,
        index: usize,
        param: &Param,
    ) -> EvalResult<Cell> {
        if param.is_variadic() {
            return Ok(Cell::varargs(Varargs {
                feed: level.feed.clone(),
                frame: level.frame.downgrade(),
                param: index,
            }));
        }
        let feed = level.feed.clone();
        let frame = level.frame.clone();
        let label = self.label_name(level.label);
        self.gather(&feed, param, index, &frame, level.is_infix(), label)
    }

    /// Take one argument for `param` from `feed`, according to its class.
    ///
    /// Right-hand arguments of an infix call do not look ahead, so infix
    /// operators associate left to right.
    pub(crate) fn gather(
        &mut self,
        feed: &FeedRef,
        param: &Param,
        index: usize,
        frame: &FrameRef,
        infix: bool,
        label: &str,
    ) -> EvalResult<Cell> {
        let mut flags = StepFlags::FULFILLING_ARG;
        if infix {
            flags |= StepFlags::NO_LOOKAHEAD;
        }
        let Some(unit) = feed.peek() else {
            return self.end_of_input(param, label);
        };
        let specifier = feed.specifier();

        match param.class {
            ParamClass::HardLiteral => {
                feed.advance();
                Ok(specify(&unit, &specifier))
            }
            ParamClass::MediumLiteral | ParamClass::SoftLiteral => {
                if self.quoting_infix_at(feed, 1).is_some() {
                    return self.evaluate_arg(feed, param, flags, label);
                }
                feed.advance();
                if param.class == ParamClass::SoftLiteral && unit.quotes() == 0 {
                    match unit.heart() {
                        Heart::Array(ArrayKind::Group, array, group_specifier) => {
                            let group_specifier = derive_specifier(group_specifier, &specifier);
                            let value = self.do_group(array, &group_specifier)?;
                            return Ok(value.unwrap_or_else(Cell::null));
                        }
                        Heart::Word(word) if word.kind == WordKind::Get => {
                            return Ok(self.get_var(word, &specifier)?.fresh());
                        }
                        _ => {}
                    }
                }
                Ok(specify(&unit, &specifier))
            }
            ParamClass::Modal => match self.modal_value(feed, &unit)? {
                Some(value) => {
                    frame.set(index + 1, Cell::okay());
                    Ok(value)
                }
                None => self.evaluate_arg(feed, param, flags, label),
            },
            _ => self.evaluate_arg(feed, param, flags, label),
        }
    }

    /// Value of an `@`-form at the head of the feed, consuming it; `None`
    /// when the next unit is not one.
    fn modal_value(&mut self, feed: &FeedRef, unit: &Cell) -> EvalResult<Option<Cell>> {
        if unit.quotes() > 0 {
            return Ok(None);
        }
        let specifier = feed.specifier();
        let value = match unit.heart() {
            Heart::Word(word) if word.kind == WordKind::Sym => {
                feed.advance();
                self.get_var(word, &specifier)?.fresh()
            }
            Heart::Array(ArrayKind::SymBlock, array, block_specifier) => {
                feed.advance();
                Cell::block(array.clone(), derive_specifier(block_specifier, &specifier))
            }
            Heart::Array(ArrayKind::SymGroup, array, group_specifier) => {
                feed.advance();
                let group_specifier = derive_specifier(group_specifier, &specifier);
                self.do_group(array, &group_specifier)?
                    .unwrap_or_else(Cell::null)
            }
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    /// One full expression, skipping anything that vanishes.
    fn evaluate_arg(
        &mut self,
        feed: &FeedRef,
        param: &Param,
        flags: StepFlags,
        label: &str,
    ) -> EvalResult<Cell> {
        let mut out = Cell::fresh_output();
        while !feed.at_end() {
            self.eval_step(feed, &mut out, flags)?;
            if !out.is_stale() {
                return Ok(out);
            }
        }
        self.end_of_input(param, label)
    }

    fn end_of_input(&self, param: &Param, label: &str) -> EvalResult<Cell> {
        if param.is_endable() {
            return Ok(Cell::null());
        }
        Err(missing_argument(label, self.spelling(param.symbol)).into())
    }
}
