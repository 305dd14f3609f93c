//! Scanner for Ren using logos with symbol interning.
//!
//! `scan` turns source text into a block of unbound cells. Binding happens
//! later, in the evaluator.

mod escape;
mod lex_error;
mod raw_token;

use logos::Logos;
use ren_ir::{ArrayKind, ArrayRef, Cell, Specifier, SymbolTable, WordKind};

pub use lex_error::{LexError, LexErrorKind, Span};

use escape::unescape_text;
use raw_token::RawToken;

/// An array being collected between an opening and a closing delimiter.
struct Open {
    kind: ArrayKind,
    delimiter: char,
    span: Span,
    quotes: u8,
    cells: Vec<Cell>,
}

/// Nesting state of one scan.
struct Builder<'a> {
    symbols: &'a SymbolTable,
    root: Vec<Cell>,
    open: Vec<Open>,
    /// Apostrophes seen but not yet attached to a value.
    pending_quotes: Option<(u8, Span)>,
}

impl<'a> Builder<'a> {
    fn new(symbols: &'a SymbolTable) -> Self {
        Builder {
            symbols,
            root: Vec::new(),
            open: Vec::new(),
            pending_quotes: None,
        }
    }

    fn take_quotes(&mut self) -> u8 {
        self.pending_quotes.take().map_or(0, |(count, _)| count)
    }

    fn push(&mut self, cell: Cell) {
        let quotes = self.take_quotes();
        let cell = cell.quoted(quotes);
        match self.open.last_mut() {
            Some(open) => open.cells.push(cell),
            None => self.root.push(cell),
        }
    }

    fn open(&mut self, kind: ArrayKind, delimiter: char, span: Span) {
        let quotes = self.take_quotes();
        self.open.push(Open {
            kind,
            delimiter,
            span,
            quotes,
            cells: Vec::new(),
        });
    }

    fn close(&mut self, close: char, span: Span) -> Result<(), LexError> {
        if let Some((_, quote_span)) = self.pending_quotes {
            return Err(LexError::new(LexErrorKind::DanglingQuote, quote_span));
        }
        let Some(open) = self.open.pop() else {
            return Err(LexError::new(LexErrorKind::UnexpectedClose { close }, span));
        };
        let expected = if open.delimiter == '[' { ']' } else { ')' };
        if close != expected {
            return Err(LexError::new(
                LexErrorKind::Mismatched {
                    open: open.delimiter,
                    close,
                },
                span,
            ));
        }
        let cell = Cell::array(open.kind, ArrayRef::from_vec(open.cells), Specifier::Empty)
            .quoted(open.quotes);
        match self.open.last_mut() {
            Some(parent) => parent.cells.push(cell),
            None => self.root.push(cell),
        }
        Ok(())
    }

    fn word(&self, kind: WordKind, spelling: &str) -> Cell {
        Cell::word(kind, self.symbols.intern(spelling))
    }

    fn path(&self, kind: ArrayKind, spelling: &str) -> Cell {
        let segments = spelling
            .split('/')
            .map(|segment| self.word(WordKind::Word, segment))
            .collect();
        Cell::array(kind, ArrayRef::from_vec(segments), Specifier::Empty)
    }

    fn finish(mut self) -> Result<ArrayRef, LexError> {
        if let Some((_, span)) = self.pending_quotes {
            return Err(LexError::new(LexErrorKind::DanglingQuote, span));
        }
        if let Some(open) = self.open.pop() {
            return Err(LexError::new(
                LexErrorKind::Unclosed {
                    open: open.delimiter,
                },
                open.span,
            ));
        }
        Ok(ArrayRef::from_vec(self.root))
    }
}

/// Scan source text into a block of unbound cells.
pub fn scan(source: &str, symbols: &SymbolTable) -> Result<ArrayRef, LexError> {
    let mut builder = Builder::new(symbols);
    let mut logos = RawToken::lexer(source);

    while let Some(token_result) = logos.next() {
        let span = Span::from_range(logos.span());
        let slice = logos.slice();

        let Ok(raw) = token_result else {
            return Err(LexError::new(
                LexErrorKind::InvalidToken {
                    text: slice.to_string(),
                },
                span,
            ));
        };

        match raw {
            RawToken::Comment => {}
            RawToken::LBracket => builder.open(ArrayKind::Block, '[', span),
            RawToken::LParen => builder.open(ArrayKind::Group, '(', span),
            RawToken::SymLBracket => builder.open(ArrayKind::SymBlock, '[', span),
            RawToken::SymLParen => builder.open(ArrayKind::SymGroup, '(', span),
            RawToken::RBracket => builder.close(']', span)?,
            RawToken::RParen => builder.close(')', span)?,
            RawToken::Quote => {
                let count = u8::try_from(slice.len()).unwrap_or(u8::MAX);
                let total = builder
                    .pending_quotes
                    .map_or(count, |(prior, _)| prior.saturating_add(count));
                builder.pending_quotes = Some((total, span));
            }
            RawToken::Integer => {
                let value: i64 = slice
                    .parse()
                    .map_err(|_| LexError::new(LexErrorKind::IntOverflow, span))?;
                builder.push(Cell::integer(value));
            }
            RawToken::Text => {
                let body = &slice[1..slice.len() - 1];
                let text = unescape_text(body)
                    .map_err(|escape| LexError::new(LexErrorKind::InvalidEscape { escape }, span))?;
                builder.push(Cell::text(&text));
            }
            RawToken::Tag => builder.push(Cell::tag(&slice[1..slice.len() - 1])),
            RawToken::Word if slice == "_" => builder.push(Cell::blank()),
            RawToken::Word => {
                let cell = builder.word(WordKind::Word, slice);
                builder.push(cell);
            }
            RawToken::SetWord => {
                let cell = builder.word(WordKind::Set, &slice[..slice.len() - 1]);
                builder.push(cell);
            }
            RawToken::GetWord => {
                let cell = builder.word(WordKind::Get, &slice[1..]);
                builder.push(cell);
            }
            RawToken::SymWord => {
                let cell = builder.word(WordKind::Sym, &slice[1..]);
                builder.push(cell);
            }
            RawToken::Refinement => {
                let cell = builder.word(WordKind::Refinement, &slice[1..]);
                builder.push(cell);
            }
            RawToken::Path => {
                let cell = builder.path(ArrayKind::Path, slice);
                builder.push(cell);
            }
            RawToken::SetPath => {
                let cell = builder.path(ArrayKind::SetPath, &slice[..slice.len() - 1]);
                builder.push(cell);
            }
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests;
