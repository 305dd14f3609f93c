//! Text renderings of values.
//!
//! `mold` produces source-like text (`"abc"`, `[1 2]`); `form` produces
//! display text (`abc`, `1 2`) and is what `print` uses.

use std::fmt::Write;

use ren_ir::{ArrayKind, Cell, Heart, SymbolTable, WordKind};

/// Source-like rendering of `cell`.
pub fn mold(cell: &Cell, symbols: &SymbolTable) -> String {
    let mut out = String::new();
    mold_into(&mut out, cell, symbols);
    out
}

/// Display rendering of `cell`: text without quotes, blocks without brackets.
pub fn form(cell: &Cell, symbols: &SymbolTable) -> String {
    if cell.quotes() > 0 {
        return mold(cell, symbols);
    }
    match cell.heart() {
        Heart::Text(text) => text.to_string(),
        Heart::Array(ArrayKind::Block, array, _) => array
            .to_vec()
            .iter()
            .map(|item| form(item, symbols))
            .collect::<Vec<_>>()
            .join(" "),
        _ => mold(cell, symbols),
    }
}

fn mold_into(out: &mut String, cell: &Cell, symbols: &SymbolTable) {
    for _ in 0..cell.quotes() {
        out.push('\'');
    }
    match cell.heart() {
        Heart::Void => out.push_str("~void~"),
        Heart::Null => out.push_str("null"),
        Heart::Blank => out.push('_'),
        Heart::Logic(value) => {
            let _ = write!(out, "#[{value}]");
        }
        Heart::Integer(value) => {
            let _ = write!(out, "{value}");
        }
        Heart::Text(text) => {
            let _ = write!(out, "{:?}", &**text);
        }
        Heart::Tag(tag) => {
            let _ = write!(out, "<{tag}>");
        }
        Heart::Word(word) => {
            let name = symbols.lookup(word.symbol);
            match word.kind {
                WordKind::Word => out.push_str(name),
                WordKind::Set => {
                    let _ = write!(out, "{name}:");
                }
                WordKind::Get => {
                    let _ = write!(out, ":{name}");
                }
                WordKind::Sym => {
                    let _ = write!(out, "@{name}");
                }
                WordKind::Refinement => {
                    let _ = write!(out, "/{name}");
                }
            }
        }
        Heart::Array(kind, array, _) => {
            let items = array.to_vec();
            let (open, close, separator) = match kind {
                ArrayKind::Block => ("[", "]", " "),
                ArrayKind::Group => ("(", ")", " "),
                ArrayKind::SymBlock => ("@[", "]", " "),
                ArrayKind::SymGroup => ("@(", ")", " "),
                ArrayKind::Path => ("", "", "/"),
                ArrayKind::SetPath => ("", ":", "/"),
            };
            out.push_str(open);
            for (position, item) in items.iter().enumerate() {
                if position > 0 {
                    out.push_str(separator);
                }
                mold_into(out, item, symbols);
            }
            out.push_str(close);
        }
        Heart::Action(_) => out.push_str("#[action]"),
        Heart::Object(frame) => {
            out.push_str("make object! [");
            let mut first = true;
            for (offset, key) in frame.keys().iter().enumerate() {
                if key.is_hidden() {
                    continue;
                }
                if !first {
                    out.push(' ');
                }
                first = false;
                let _ = write!(out, "{}: ", symbols.lookup(key.symbol));
                let value = frame.get(offset + 1).unwrap_or_else(Cell::null);
                mold_into(out, &value, symbols);
            }
            out.push(']');
        }
        Heart::Frame(_) => out.push_str("#[frame]"),
        Heart::Datatype(kind) => out.push_str(kind.name()),
        Heart::Varargs(_) => out.push_str("#[varargs]"),
    }
}
