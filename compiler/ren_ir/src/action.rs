//! Callables.
//!
//! An [`Action`] is a parameter list plus a dispatcher, optionally with a
//! partially filled, already-checked exemplar (a specialization). Wrappers
//! made by `adapt` and `specialize` share the parameter list of the action
//! they wrap, which is what lets relatively bound bodies resolve against any
//! frame built for that family of actions.

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use crate::array::ArrayRef;
use crate::cell::Cell;
use crate::frame::{Key, KeyFlags};
use crate::symbol::Symbol;
use crate::typeset::TypeSet;

/// How a parameter acquires its argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamClass {
    /// One full evaluated expression.
    Normal,
    /// Evaluated like `Normal`; receives a word the callee writes through.
    Output,
    /// Next unit verbatim.
    HardLiteral,
    /// Next unit verbatim unless a quoting infix operator claims it first.
    MediumLiteral,
    /// Like `MediumLiteral`, but GROUP! and GET-WORD! escapes are evaluated.
    SoftLiteral,
    /// Datatype chosen by an `@` sigil on the next unit; paired with a refinement.
    Modal,
    /// Optional, named. No typeset means a pure on/off flag.
    Refinement,
    /// Hidden local, never sourced from the call site.
    Local,
    /// Hidden definitional return.
    Return,
}

impl ParamClass {
    /// Classes that take the call-site unit without evaluating it.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            ParamClass::HardLiteral | ParamClass::MediumLiteral | ParamClass::SoftLiteral
        )
    }

    /// Classes that are never filled from the call site.
    pub fn is_hidden(self) -> bool {
        matches!(self, ParamClass::Local | ParamClass::Return)
    }
}

bitflags! {
    /// Per-parameter options.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ParamFlags: u8 {
        /// Argument is a `Varargs` capability pulled lazily by the body.
        const VARIADIC = 1 << 0;
        /// Reaching the end of input yields null instead of an error.
        const ENDABLE = 1 << 1;
        /// Null is accepted even when the typeset does not list it.
        const OPTIONAL = 1 << 2;
    }
}

/// A parameter descriptor.
#[derive(Clone, Debug)]
pub struct Param {
    pub symbol: Symbol,
    pub class: ParamClass,
    pub flags: ParamFlags,
    pub types: TypeSet,
}

impl Param {
    pub fn new(symbol: Symbol, class: ParamClass, types: TypeSet) -> Self {
        Param {
            symbol,
            class,
            flags: ParamFlags::empty(),
            types,
        }
    }

    #[must_use]
    pub fn with_flags(mut self, flags: ParamFlags) -> Self {
        self.flags.insert(flags);
        self
    }

    #[inline]
    pub fn is_variadic(&self) -> bool {
        self.flags.contains(ParamFlags::VARIADIC)
    }

    #[inline]
    pub fn is_endable(&self) -> bool {
        self.flags.contains(ParamFlags::ENDABLE)
    }

    #[inline]
    pub fn is_optional(&self) -> bool {
        self.flags.contains(ParamFlags::OPTIONAL)
    }

    /// A refinement that takes no argument.
    pub fn is_pure_refinement(&self) -> bool {
        self.class == ParamClass::Refinement && self.types.is_empty()
    }

    /// Frame key for this parameter.
    pub fn key(&self) -> Key {
        let flags = if self.class.is_hidden() {
            KeyFlags::HIDDEN
        } else {
            KeyFlags::empty()
        };
        Key {
            symbol: self.symbol,
            flags,
        }
    }
}

/// Ordered parameter descriptors: the keys of every frame built for an action.
#[derive(Debug, Default)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    pub fn new(params: Vec<Param>) -> Self {
        ParamList { params }
    }

    #[inline]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Parameter at a 1-based frame index.
    pub fn get(&self, index: usize) -> Option<&Param> {
        index.checked_sub(1).and_then(|i| self.params.get(i))
    }

    /// Frame keys, one per parameter.
    pub fn keys(&self) -> Vec<Key> {
        self.params.iter().map(Param::key).collect()
    }
}

/// Shared parameter list; identity is what relative bindings test.
#[derive(Clone, Debug)]
pub struct ParamListRef(Rc<ParamList>);

impl ParamListRef {
    pub fn new(list: ParamList) -> Self {
        ParamListRef(Rc::new(list))
    }

    #[inline]
    pub fn ptr_eq(&self, other: &ParamListRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl std::ops::Deref for ParamListRef {
    type Target = ParamList;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Index into the interpreter's native table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NativeId(pub u16);

/// What runs once the arguments are checked.
#[derive(Clone, Debug)]
pub enum Dispatcher {
    /// Built-in implemented in Rust.
    Native(NativeId),
    /// User function body, relatively bound to the parameter list.
    Body(ArrayRef),
    /// Run `prelude` against the frame, then redo as `adaptee`.
    Adapt { prelude: ArrayRef, adaptee: Action },
    /// Redo as `target`; the exemplar already holds the fixed arguments.
    Specialized(Action),
}

/// Action storage.
#[derive(Debug)]
pub struct ActionData {
    paramlist: ParamListRef,
    /// Per-parameter pre-filled values; `Some` slots are already typechecked.
    exemplar: Option<Rc<[Option<Cell>]>>,
    dispatcher: Dispatcher,
    label: Option<Symbol>,
}

/// Shared handle to an action.
#[derive(Clone)]
pub struct Action(Rc<ActionData>);

impl Action {
    pub fn new(paramlist: ParamListRef, dispatcher: Dispatcher) -> Self {
        Action(Rc::new(ActionData {
            paramlist,
            exemplar: None,
            dispatcher,
            label: None,
        }))
    }

    /// Wrapper sharing this action's parameter list and exemplar.
    #[must_use]
    pub fn wrap(&self, dispatcher: Dispatcher) -> Self {
        Action(Rc::new(ActionData {
            paramlist: self.0.paramlist.clone(),
            exemplar: self.0.exemplar.clone(),
            dispatcher,
            label: self.0.label,
        }))
    }

    /// Specialization of this action with a new exemplar.
    #[must_use]
    pub fn specialize(&self, exemplar: Vec<Option<Cell>>) -> Self {
        Action(Rc::new(ActionData {
            paramlist: self.0.paramlist.clone(),
            exemplar: Some(Rc::from(exemplar)),
            dispatcher: Dispatcher::Specialized(self.clone()),
            label: self.0.label,
        }))
    }

    /// Copy with a label for error messages.
    #[must_use]
    pub fn labeled(&self, label: Symbol) -> Self {
        Action(Rc::new(ActionData {
            paramlist: self.0.paramlist.clone(),
            exemplar: self.0.exemplar.clone(),
            dispatcher: self.0.dispatcher.clone(),
            label: Some(label),
        }))
    }

    #[inline]
    pub fn paramlist(&self) -> &ParamListRef {
        &self.0.paramlist
    }

    #[inline]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.0.dispatcher
    }

    #[inline]
    pub fn label(&self) -> Option<Symbol> {
        self.0.label
    }

    /// Pre-filled value for a 1-based parameter index.
    pub fn specialized(&self, index: usize) -> Option<&Cell> {
        let exemplar = self.0.exemplar.as_ref()?;
        index
            .checked_sub(1)
            .and_then(|i| exemplar.get(i))
            .and_then(Option::as_ref)
    }

    /// Whether any parameter is specialized.
    pub fn has_exemplar(&self) -> bool {
        self.0.exemplar.is_some()
    }

    /// Copy of the exemplar slots (all `None` when unspecialized).
    pub fn exemplar_slots(&self) -> Vec<Option<Cell>> {
        match &self.0.exemplar {
            Some(exemplar) => exemplar.to_vec(),
            None => vec![None; self.0.paramlist.len()],
        }
    }

    /// First parameter the call site can supply (what an infix action binds to on the left).
    pub fn first_unspecialized_param(&self) -> Option<(usize, &Param)> {
        self.0
            .paramlist
            .params()
            .iter()
            .enumerate()
            .map(|(i, param)| (i + 1, param))
            .find(|(index, param)| {
                !param.class.is_hidden()
                    && param.class != ParamClass::Refinement
                    && self.specialized(*index).is_none()
            })
    }

    /// Identity comparison.
    #[inline]
    pub fn ptr_eq(&self, other: &Action) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Action({:p}, params={})",
            Rc::as_ptr(&self.0),
            self.0.paramlist.len()
        )
    }
}
