//! Datatypes and typesets.
//!
//! `TypeSet` is a bitset with one bit per [`Kind`], computed once when a
//! parameter list is built so typechecking an argument is a single AND.

use std::fmt;

use bitflags::bitflags;

use crate::cell::{ArrayKind, Heart, WordKind};

/// Datatype of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Void,
    Null,
    Blank,
    Logic,
    Integer,
    Text,
    Tag,
    Word,
    SetWord,
    GetWord,
    SymWord,
    Refinement,
    Block,
    Group,
    SymBlock,
    SymGroup,
    Path,
    SetPath,
    Action,
    Object,
    Frame,
    Datatype,
    Varargs,
    Quoted,
}

/// Every kind with its datatype word, in bit order.
const KINDS: &[(Kind, &str)] = &[
    (Kind::Void, "void!"),
    (Kind::Null, "null!"),
    (Kind::Blank, "blank!"),
    (Kind::Logic, "logic!"),
    (Kind::Integer, "integer!"),
    (Kind::Text, "text!"),
    (Kind::Tag, "tag!"),
    (Kind::Word, "word!"),
    (Kind::SetWord, "set-word!"),
    (Kind::GetWord, "get-word!"),
    (Kind::SymWord, "sym-word!"),
    (Kind::Refinement, "refinement!"),
    (Kind::Block, "block!"),
    (Kind::Group, "group!"),
    (Kind::SymBlock, "sym-block!"),
    (Kind::SymGroup, "sym-group!"),
    (Kind::Path, "path!"),
    (Kind::SetPath, "set-path!"),
    (Kind::Action, "action!"),
    (Kind::Object, "object!"),
    (Kind::Frame, "frame!"),
    (Kind::Datatype, "datatype!"),
    (Kind::Varargs, "varargs!"),
    (Kind::Quoted, "quoted!"),
];

impl Kind {
    /// Datatype of an unquoted heart.
    pub fn of_heart(heart: &Heart) -> Kind {
        match heart {
            Heart::Void => Kind::Void,
            Heart::Null => Kind::Null,
            Heart::Blank => Kind::Blank,
            Heart::Logic(_) => Kind::Logic,
            Heart::Integer(_) => Kind::Integer,
            Heart::Text(_) => Kind::Text,
            Heart::Tag(_) => Kind::Tag,
            Heart::Word(word) => match word.kind {
                WordKind::Word => Kind::Word,
                WordKind::Set => Kind::SetWord,
                WordKind::Get => Kind::GetWord,
                WordKind::Sym => Kind::SymWord,
                WordKind::Refinement => Kind::Refinement,
            },
            Heart::Array(kind, _, _) => match kind {
                ArrayKind::Block => Kind::Block,
                ArrayKind::Group => Kind::Group,
                ArrayKind::SymBlock => Kind::SymBlock,
                ArrayKind::SymGroup => Kind::SymGroup,
                ArrayKind::Path => Kind::Path,
                ArrayKind::SetPath => Kind::SetPath,
            },
            Heart::Action(_) => Kind::Action,
            Heart::Object(_) => Kind::Object,
            Heart::Frame(_) => Kind::Frame,
            Heart::Datatype(_) => Kind::Datatype,
            Heart::Varargs(_) => Kind::Varargs,
        }
    }

    /// The datatype word, e.g. `integer!`.
    pub fn name(self) -> &'static str {
        KINDS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map_or("unknown!", |(_, name)| name)
    }

    /// Look up a kind by its datatype word.
    pub fn from_name(name: &str) -> Option<Kind> {
        KINDS
            .iter()
            .find(|(_, spelling)| *spelling == name)
            .map(|(kind, _)| *kind)
    }

    /// All kinds, in bit order.
    pub fn all() -> impl Iterator<Item = Kind> {
        KINDS.iter().map(|(kind, _)| *kind)
    }

    fn bit(self) -> u32 {
        let position = KINDS.iter().position(|(kind, _)| *kind == self).unwrap_or(0);
        1u32 << position
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags! {
    /// Set of accepted datatypes for a parameter.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeSet: u32 {
        const NULL = 1 << 1;
        const INTEGER = 1 << 4;
        const WORD = 1 << 7;
        const BLOCK = 1 << 12;
        const ACTION = 1 << 18;
        const OBJECT = 1 << 19;
        const VARARGS = 1 << 22;
    }
}

impl TypeSet {
    /// Typeset holding exactly one kind.
    pub fn of(kind: Kind) -> TypeSet {
        TypeSet::from_bits_retain(kind.bit())
    }

    /// Every value except void and null.
    pub fn any_value() -> TypeSet {
        let all = Kind::all().fold(TypeSet::empty(), |set, kind| set | TypeSet::of(kind));
        all - TypeSet::of(Kind::Void) - TypeSet::NULL
    }

    /// Every word variant.
    pub fn any_word() -> TypeSet {
        [
            Kind::Word,
            Kind::SetWord,
            Kind::GetWord,
            Kind::SymWord,
            Kind::Refinement,
        ]
        .into_iter()
        .fold(TypeSet::empty(), |set, kind| set | TypeSet::of(kind))
    }

    /// Whether values of `kind` are accepted.
    #[inline]
    pub fn accepts(self, kind: Kind) -> bool {
        self.intersects(TypeSet::of(kind))
    }

    /// Datatype words of the members, for error messages.
    pub fn describe(self) -> String {
        let names: Vec<&str> = Kind::all()
            .filter(|kind| self.accepts(*kind))
            .map(Kind::name)
            .collect();
        if names.is_empty() {
            return "nothing".to_string();
        }
        names.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_bits_match_kinds() {
        assert_eq!(TypeSet::NULL, TypeSet::of(Kind::Null));
        assert_eq!(TypeSet::INTEGER, TypeSet::of(Kind::Integer));
        assert_eq!(TypeSet::WORD, TypeSet::of(Kind::Word));
        assert_eq!(TypeSet::BLOCK, TypeSet::of(Kind::Block));
        assert_eq!(TypeSet::ACTION, TypeSet::of(Kind::Action));
        assert_eq!(TypeSet::OBJECT, TypeSet::of(Kind::Object));
        assert_eq!(TypeSet::VARARGS, TypeSet::of(Kind::Varargs));
    }

    #[test]
    fn test_any_value_excludes_null_and_void() {
        let any = TypeSet::any_value();
        assert!(any.accepts(Kind::Integer));
        assert!(any.accepts(Kind::Quoted));
        assert!(!any.accepts(Kind::Null));
        assert!(!any.accepts(Kind::Void));
    }

    #[test]
    fn test_kind_names_round_trip() {
        for kind in Kind::all() {
            assert_eq!(Kind::from_name(kind.name()), Some(kind));
        }
    }

    #[test]
    fn test_describe_lists_members() {
        let set = TypeSet::INTEGER | TypeSet::NULL;
        assert_eq!(set.describe(), "null! integer!");
    }
}
