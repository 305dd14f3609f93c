//! Building parameter lists from spec blocks.
//!
//! ```text
//! [
//!     "description text is ignored"
//!     value               ; normal: one evaluated expression
//!     'name               ; hard literal
//!     ''name              ; medium literal
//!     :name               ; soft literal
//!     @name /flag         ; modal, activates the refinement after it
//!     /flag               ; pure refinement
//!     /part [integer!]    ; refinement with an argument
//!     result:             ; output parameter
//!     value [integer! <opt> <end> <variadic>]
//!     <local> temp        ; locals
//! ]
//! ```

use ren_ir::{
    sym, ArrayRef, Heart, Kind, Param, ParamClass, ParamFlags, ParamList, ParamListRef,
    SymbolTable, TypeSet, WordKind,
};

use crate::binding::Binder;
use crate::errors::{bad_declaration, duplicate_binding, EvalError};

/// Parameter list described by `spec`. With `with_return`, a hidden
/// `return` slot is appended for the definitional return.
pub fn make_paramlist(
    spec: &ArrayRef,
    symbols: &SymbolTable,
    with_return: bool,
) -> Result<ParamListRef, EvalError> {
    let mut params: Vec<Param> = Vec::new();
    let mut has_types: Vec<bool> = Vec::new();
    let mut locals = false;

    for cell in spec.to_vec() {
        match cell.heart() {
            Heart::Text(_) => {}
            Heart::Tag(tag) if &**tag == "local" => locals = true,
            Heart::Array(_, types, _) if cell.as_block().is_some() => {
                let (Some(param), Some(typed)) = (params.last_mut(), has_types.last_mut()) else {
                    return Err(bad_declaration("type block before any parameter"));
                };
                if *typed || param.class.is_hidden() || param.class == ParamClass::Output {
                    return Err(bad_declaration(format!(
                        "unexpected type block after {}",
                        symbols.lookup(param.symbol)
                    )));
                }
                apply_types(param, types, symbols)?;
                *typed = true;
            }
            Heart::Word(word) => {
                let class = if locals {
                    if word.kind != WordKind::Word || cell.quotes() > 0 {
                        return Err(bad_declaration(format!(
                            "locals must be plain words: {}",
                            symbols.lookup(word.symbol)
                        )));
                    }
                    ParamClass::Local
                } else {
                    class_of(word.kind, cell.quotes()).ok_or_else(|| {
                        bad_declaration(format!(
                            "cannot quote {} here",
                            symbols.lookup(word.symbol)
                        ))
                    })?
                };
                params.push(Param::new(word.symbol, class, default_types(class)));
                has_types.push(false);
            }
            _ => {
                return Err(bad_declaration(format!(
                    "{} is not allowed in a parameter spec",
                    cell.kind()
                )))
            }
        }
    }

    if with_return {
        params.push(Param::new(sym::RETURN, ParamClass::Return, TypeSet::empty()));
    }

    check_modals(&params, symbols)?;
    check_duplicates(&params, symbols)?;
    Ok(ParamListRef::new(ParamList::new(params)))
}

fn class_of(kind: WordKind, quotes: u8) -> Option<ParamClass> {
    match (kind, quotes) {
        (WordKind::Word, 0) => Some(ParamClass::Normal),
        (WordKind::Word, 1) => Some(ParamClass::HardLiteral),
        (WordKind::Word, 2) => Some(ParamClass::MediumLiteral),
        (WordKind::Get, 0) => Some(ParamClass::SoftLiteral),
        (WordKind::Sym, 0) => Some(ParamClass::Modal),
        (WordKind::Refinement, 0) => Some(ParamClass::Refinement),
        (WordKind::Set, 0) => Some(ParamClass::Output),
        _ => None,
    }
}

fn default_types(class: ParamClass) -> TypeSet {
    match class {
        ParamClass::Refinement | ParamClass::Local | ParamClass::Return => TypeSet::empty(),
        ParamClass::Output => TypeSet::any_word() | TypeSet::NULL,
        _ => TypeSet::any_value(),
    }
}

fn apply_types(param: &mut Param, types: &ArrayRef, symbols: &SymbolTable) -> Result<(), EvalError> {
    let mut accepted = TypeSet::empty();
    for cell in types.to_vec() {
        match cell.heart() {
            Heart::Word(word) if word.kind == WordKind::Word => {
                let name = symbols.lookup(word.symbol);
                accepted |= match name {
                    "any-value!" => TypeSet::any_value(),
                    "any-word!" => TypeSet::any_word(),
                    _ => Kind::from_name(name)
                        .map(TypeSet::of)
                        .ok_or_else(|| bad_declaration(format!("unknown type {name}")))?,
                };
            }
            Heart::Tag(tag) => match &**tag {
                "opt" => {
                    accepted |= TypeSet::NULL;
                    param.flags.insert(ParamFlags::OPTIONAL);
                }
                "end" => param.flags.insert(ParamFlags::ENDABLE),
                "variadic" => param.flags.insert(ParamFlags::VARIADIC),
                other => return Err(bad_declaration(format!("unknown parameter tag <{other}>"))),
            },
            _ => {
                return Err(bad_declaration(format!(
                    "{} is not allowed in a type block",
                    cell.kind()
                )))
            }
        }
    }
    if accepted.is_empty() && param.class != ParamClass::Refinement {
        accepted = TypeSet::any_value();
    }
    param.types = accepted;
    Ok(())
}

/// Every modal parameter must be followed by the pure refinement it activates.
fn check_modals(params: &[Param], symbols: &SymbolTable) -> Result<(), EvalError> {
    for (position, param) in params.iter().enumerate() {
        if param.class != ParamClass::Modal {
            continue;
        }
        let companion = params.get(position + 1);
        if !companion.is_some_and(Param::is_pure_refinement) {
            return Err(bad_declaration(format!(
                "modal parameter {} must be followed by a refinement",
                symbols.lookup(param.symbol)
            )));
        }
    }
    Ok(())
}

fn check_duplicates(params: &[Param], symbols: &SymbolTable) -> Result<(), EvalError> {
    let mut binder = Binder::new();
    let mut claimed = Vec::with_capacity(params.len());
    let mut duplicate = None;
    for (position, param) in params.iter().enumerate() {
        let index = i32::try_from(position + 1).unwrap_or(i32::MAX);
        if binder.try_add(param.symbol, index) {
            claimed.push(param.symbol);
        } else {
            duplicate = Some(param.symbol);
            break;
        }
    }
    for symbol in claimed {
        binder.remove(symbol);
    }
    if let Err(err) = binder.shutdown() {
        tracing::warn!(%err, "parameter check left claims behind");
    }
    match duplicate {
        Some(symbol) => Err(duplicate_binding(symbols.lookup(symbol))),
        None => Ok(()),
    }
}
