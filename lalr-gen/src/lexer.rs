//! Grammar-file lexer.
//!
//! Turns `.g` source text into [`Token`]s for the [`parser`](super::parser)
//! module. Built on [`logos`]; whitespace and `--` comments are skipped.
//!
//! Symbol names are interned while lexing into the three tables of a
//! [`LexContext`]: terminals, nonterminals and production labels.
//! Punctuation terminals are named through [`SYM_NAMES`], so `+` becomes the
//! terminal `plus`.

use anyhow::{Result, bail};
use lalr::{Derivation, Symtab};
use logos::Logos;
use std::collections::HashMap;

/// Symbol tables filled in while lexing.
#[derive(Default, Debug)]
pub struct LexContext {
    pub terms: Symtab,
    pub nonterms: Symtab,
    pub prod_labels: Symtab,
}

/// Tokens produced by the grammar lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A production label (`sum:`).
    ProdLabel(usize),

    /// A nonterminal symbol (`Expr`).
    NonTerm(usize),

    /// The production separator `->`.
    Prod,

    /// A terminal symbol (`num`, or punctuation such as `+`).
    Term(usize),

    /// A precedence-group directive: `%none`, `%left` or `%right`.
    Group(Derivation),

    /// End of a grammar line.
    LineFeed,
}

#[derive(Logos, Debug, PartialEq)]
#[logos(skip r"[ \t\f\r]+")]
enum LogosToken {
    #[regex(r"[\n]")]
    LineFeed,

    #[regex(r"--[^\n]*")]
    Comment,

    #[regex(r"->")]
    Prod,

    #[regex(r"%(none|left|right)")]
    Directive,

    #[regex(r"[a-z]([a-zA-Z0-9_])*:")]
    ProdLabel,

    #[regex(r"[a-z]([a-zA-Z0-9_])*")]
    Atom,

    #[regex(r"[A-Z][a-zA-Z0-9_]*")]
    Var,

    #[regex(r###"[-~`!@#$%^&*+=|\\<>?/;\(\)\[\]{},\.'":]"###)]
    Sym,
}

/// Names given to punctuation terminals.
pub const SYM_NAMES: &[(char, &str)] = &[
    ('.', "dot"),
    ('-', "minus"),
    ('~', "tilde"),
    ('`', "backtick"),
    ('!', "exclamation"),
    ('@', "at"),
    ('#', "hash"),
    ('$', "dollar"),
    ('%', "percent"),
    ('^', "caret"),
    ('&', "ampersand"),
    ('*', "asterisk"),
    ('+', "plus"),
    ('=', "equals"),
    ('|', "pipe"),
    ('\\', "backslash"),
    ('<', "lessThan"),
    ('>', "greaterThan"),
    ('?', "question"),
    ('/', "slash"),
    (';', "semicolon"),
    ('(', "leftParen"),
    (')', "rightParen"),
    ('[', "leftBrack"),
    (']', "rightBrack"),
    ('{', "leftBrace"),
    ('}', "rightBrace"),
    (',', "comma"),
    ('\'', "singleQuote"),
    ('"', "doubleQuote"),
    (':', "colon"),
];

/// Terminal name for a punctuation character, if it has one.
pub fn sym_name(c: char) -> Option<&'static str> {
    SYM_NAMES.iter().find(|(k, _)| *k == c).map(|(_, v)| *v)
}

pub struct Lexer<'source> {
    inner: logos::Lexer<'source, LogosToken>,
    sym_names: HashMap<char, &'static str>,
    line: usize,
}

impl<'source> Lexer<'source> {
    pub fn new(input: &'source str) -> Self {
        Self {
            inner: LogosToken::lexer(input),
            sym_names: SYM_NAMES.iter().cloned().collect(),
            line: 1,
        }
    }

    /// Next token, `Ok(None)` at end of input.
    pub fn next_token(&mut self, ctx: &mut LexContext) -> Result<Option<Token>> {
        while let Some(kind) = self.inner.next() {
            let slice = self.inner.slice();
            let Ok(token) = kind else {
                bail!("line {}: unexpected input {:?}", self.line, slice);
            };
            let token = match token {
                LogosToken::Sym => {
                    let c = slice.chars().next().unwrap_or_default();
                    let Some(name) = self.sym_names.get(&c) else {
                        bail!("line {}: no terminal name for {:?}", self.line, c);
                    };
                    Token::Term(ctx.terms.add(name))
                }
                LogosToken::Atom => Token::Term(ctx.terms.add(slice)),
                LogosToken::Var => Token::NonTerm(ctx.nonterms.add(slice)),
                LogosToken::ProdLabel => {
                    let label = slice.strip_suffix(':').unwrap_or(slice);
                    Token::ProdLabel(ctx.prod_labels.add(label))
                }
                LogosToken::Directive => Token::Group(match slice {
                    "%left" => Derivation::LeftMost,
                    "%right" => Derivation::RightMost,
                    _ => Derivation::None,
                }),
                LogosToken::Prod => Token::Prod,
                LogosToken::Comment => continue,
                LogosToken::LineFeed => {
                    self.line += 1;
                    Token::LineFeed
                }
            };
            return Ok(Some(token));
        }
        Ok(None)
    }

    /// Tokenizes the whole input.
    pub fn tokenize_all(input: &'source str, ctx: &mut LexContext) -> Result<Vec<Token>> {
        let mut lex = Lexer::new(input);
        let mut out = Vec::new();
        while let Some(tok) = lex.next_token(ctx)? {
            out.push(tok);
        }
        Ok(out)
    }
}
