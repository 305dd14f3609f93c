//! Argument typechecking.

use ren_ir::{Cell, Heart, Kind, Param, ParamClass};

use super::Level;
use crate::errors::{corrupt_refinement, type_mismatch, EvalResult};
use crate::interpreter::Interpreter;

impl Interpreter {
    /// Check every caller-supplied slot of `level.frame` against its parameter.
    ///
    /// Hidden parameters, variadics and slots the original action fixed by
    /// specialization are skipped; the latter were checked when the
    /// specialization was made. A refinement argument is checked only when
    /// the refinement was used or holds a value.
    pub fn typecheck(&self, level: &Level) -> EvalResult<()> {
        let label = self.label_name(level.label);
        let paramlist = level.original.paramlist();
        for (offset, param) in paramlist.params().iter().enumerate() {
            let index = offset + 1;
            if param.class.is_hidden()
                || param.is_variadic()
                || level.original.specialized(index).is_some()
            {
                continue;
            }
            let value = level.arg(index);
            if param.class == ParamClass::Refinement
                && value.is_null()
                && !level.used.contains(&index)
            {
                continue;
            }
            self.check_arg(label, param, &value)?;
        }
        Ok(())
    }

    /// Check one argument value against `param`.
    ///
    /// # Panics
    ///
    /// In trusted mode, a pure refinement holding anything but `#[true]` or
    /// null is an engine bug and aborts.
    pub(crate) fn check_arg(&self, label: &str, param: &Param, value: &Cell) -> EvalResult<()> {
        let name = self.spelling(param.symbol);

        if param.is_pure_refinement() {
            let is_true = value.quotes() == 0 && matches!(value.heart(), Heart::Logic(true));
            if value.is_null() || is_true {
                return Ok(());
            }
            assert!(
                !self.config.trusted,
                "refinement /{name} of {label} holds a non-logic value"
            );
            return Err(corrupt_refinement(label, name).into());
        }

        if value.is_null()
            && (param.class == ParamClass::Output
                || param.types.accepts(Kind::Null)
                || param.is_optional()
                || param.is_endable())
        {
            return Ok(());
        }

        let kind = value.kind();
        if param.types.accepts(kind) {
            return Ok(());
        }
        tracing::debug!(action = label, param = name, got = kind.name(), "type mismatch");
        Err(type_mismatch(label, name, &param.types.describe(), kind.name()).into())
    }
}
