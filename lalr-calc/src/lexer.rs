//! # Calculator Lexer
//!
//! [`CalcLexer`] turns source text into parse-tree items. It is built on
//! [`logos`] and implements [`TokenSource`], so the parser pulls tokens from
//! it one at a time. Spans are 0-based line/column ranges.
use crate::{CalcError, CalcToken};
use lalr::{Item, Position, Span, SymbolId, TokenSource};
use logos::Logos;
use std::ops::Range;

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\f\r]+")]
enum RawToken {
    #[token("\n")]
    LineFeed,

    #[regex(r"[0-9]+")]
    Number,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Asterisk,

    #[token("/")]
    Slash,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,
}

/// Grammar symbols of the calculator's terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terminals {
    pub number: SymbolId,
    pub plus: SymbolId,
    pub minus: SymbolId,
    pub asterisk: SymbolId,
    pub slash: SymbolId,
    pub left_paren: SymbolId,
    pub right_paren: SymbolId,
}

pub struct CalcLexer<'source> {
    inner: logos::Lexer<'source, RawToken>,
    terminals: Terminals,
    line: usize,
    line_start: usize,
}

impl<'source> CalcLexer<'source> {
    pub fn new(input: &'source str, terminals: Terminals) -> Self {
        Self {
            inner: RawToken::lexer(input),
            terminals,
            line: 0,
            line_start: 0,
        }
    }

    fn span(&self, range: Range<usize>) -> Span {
        Span::new(
            Position::new(self.line, range.start - self.line_start),
            Position::new(self.line, range.end - self.line_start),
        )
    }
}

impl TokenSource for CalcLexer<'_> {
    type Content = CalcToken;
    type Error = CalcError;

    fn try_next(&mut self) -> Result<Option<Item<CalcToken>>, CalcError> {
        while let Some(raw) = self.inner.next() {
            let range = self.inner.span();
            let span = self.span(range.clone());
            let slice = self.inner.slice();
            let Ok(raw) = raw else {
                let ch = slice.chars().next().unwrap_or_default();
                return Err(CalcError::UnexpectedChar { ch, span });
            };
            let t = self.terminals;
            let (symbol, c) = match raw {
                RawToken::LineFeed => {
                    self.line += 1;
                    self.line_start = range.end;
                    continue;
                }
                RawToken::Number => {
                    let n = slice.parse::<i64>()?;
                    return Ok(Some(Item::scalar(t.number, CalcToken::number(n, Some(span)))));
                }
                RawToken::Plus => (t.plus, '+'),
                RawToken::Minus => (t.minus, '-'),
                RawToken::Asterisk => (t.asterisk, '*'),
                RawToken::Slash => (t.slash, '/'),
                RawToken::LeftParen => (t.left_paren, '('),
                RawToken::RightParen => (t.right_paren, ')'),
            };
            return Ok(Some(Item::scalar(symbol, CalcToken::op(c, Some(span)))));
        }
        Ok(None)
    }
}
