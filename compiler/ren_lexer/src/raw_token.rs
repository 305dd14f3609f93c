//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived tokenizer output before
//! symbols are interned and cells are built.

use logos::Logos;

/// Raw token from logos (before interning).
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n]+")]
pub(crate) enum RawToken {
    #[regex(r";[^\n]*", logos::skip)]
    Comment,

    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("@[")]
    SymLBracket,
    #[token("@(")]
    SymLParen,

    /// One or more leading apostrophes; applies to the next value.
    #[regex(r"'+")]
    Quote,

    #[regex(r"-?[0-9]+", priority = 10)]
    Integer,

    #[regex(r#""([^"\\\n\r]|\\.)*""#)]
    Text,

    #[regex(r"<[a-z][a-z0-9-]*>", priority = 10)]
    Tag,

    #[regex(r"[A-Za-z=<>*+\-?!~&|_.][A-Za-z0-9=<>*+\-?!~&|_.]*")]
    Word,

    #[regex(r"[A-Za-z=<>*+\-?!~&|_.][A-Za-z0-9=<>*+\-?!~&|_.]*:")]
    SetWord,

    #[regex(r":[A-Za-z=<>*+\-?!~&|_.][A-Za-z0-9=<>*+\-?!~&|_.]*")]
    GetWord,

    #[regex(r"@[A-Za-z=<>*+\-?!~&|_.][A-Za-z0-9=<>*+\-?!~&|_.]*")]
    SymWord,

    #[regex(r"/[A-Za-z=<>*+\-?!~&|_.][A-Za-z0-9=<>*+\-?!~&|_.]*")]
    Refinement,

    #[regex(r"[A-Za-z=<>*+\-?!~&|_.][A-Za-z0-9=<>*+\-?!~&|_.]*(/[A-Za-z=<>*+\-?!~&|_.][A-Za-z0-9=<>*+\-?!~&|_.]*)+")]
    Path,

    #[regex(r"[A-Za-z=<>*+\-?!~&|_.][A-Za-z0-9=<>*+\-?!~&|_.]*(/[A-Za-z=<>*+\-?!~&|_.][A-Za-z0-9=<>*+\-?!~&|_.]*)+:")]
    SetPath,
}
