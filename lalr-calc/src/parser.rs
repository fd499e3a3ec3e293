//! # Calculator Parser
//!
//! Loads the calculator grammar (`calc.g`), attaches a constant-folding
//! rewrite hook to every `Expr` production and drives the LALR(1) parser
//! over a [`CalcLexer`].
//!
//! Folding happens during reduction, so an accepted expression comes back
//! as a single scalar item holding its value. Division by zero and `i64`
//! overflow yield an error-flagged item instead of a value; the hooks of
//! enclosing expressions leave such children alone, so the error travels
//! up to the root inside a plain reduction.

use crate::lexer::{CalcLexer, Terminals};
use crate::{CalcError, CalcToken};
use lalr::{ERROR_STATE, Item, Parser, ParserStats, Rewrite, Span, SymbolId};
use lalr_gen::GrammarSpec;
use once_cell::sync::Lazy;

/// Grammar source of the calculator.
pub const GRAMMAR: &str = include_str!("calc.g");

static CALCULATOR: Lazy<Result<Calculator, CalcError>> = Lazy::new(Calculator::new);

/// Evaluates `source` with the shared [`Calculator`].
pub fn eval(source: &str) -> Result<Evaluation, CalcError> {
    match &*CALCULATOR {
        Ok(calc) => calc.eval(source),
        Err(err) => Err(err.clone()),
    }
}

/// Result of evaluating one source text.
#[derive(Debug)]
pub struct Evaluation {
    root: Item<CalcToken>,
    stats: ParserStats,
}

impl Evaluation {
    /// The folded value; `None` on a syntax error or arithmetic fault.
    pub fn value(&self) -> Option<i64> {
        if self.root.is_error() {
            return None;
        }
        self.root.scalar_value().and_then(CalcToken::as_number)
    }

    pub fn is_error(&self) -> bool {
        self.root.is_error()
    }

    /// Source range covered by the result. For a syntax error this is the
    /// offending token, and `None` at end of input.
    pub fn span(&self) -> Option<Span> {
        self.root
            .leaves()
            .iter()
            .filter_map(|leaf| leaf.scalar_value())
            .fold(None, |acc, tok| Span::merge_opt(acc, tok.span))
    }

    /// The parse tree root.
    pub fn root(&self) -> &Item<CalcToken> {
        &self.root
    }

    pub fn stats(&self) -> ParserStats {
        self.stats
    }
}

/// A calculator grammar with folding hooks, ready to evaluate input.
pub struct Calculator {
    parser: Parser<CalcToken>,
    terminals: Terminals,
}

impl Calculator {
    pub fn new() -> Result<Self, CalcError> {
        Self::from_grammar(GRAMMAR)
    }

    /// Builds a calculator from grammar source. Productions labelled `num`,
    /// `paren`, `neg`, `mul`, `div`, `add` and `sub` get folding hooks.
    pub fn from_grammar(source: &str) -> Result<Self, CalcError> {
        let spec = GrammarSpec::parse(source).map_err(|e| CalcError::Grammar(format!("{e:#}")))?;
        let terminal = |name: &str| {
            spec.symbol(name)
                .ok_or_else(|| CalcError::Grammar(format!("no terminal named {name}")))
        };
        let terminals = Terminals {
            number: terminal("number")?,
            plus: terminal("plus")?,
            minus: terminal("minus")?,
            asterisk: terminal("asterisk")?,
            slash: terminal("slash")?,
            left_paren: terminal("leftParen")?,
            right_paren: terminal("rightParen")?,
        };
        let grammar = spec.build_with(folding_hook)?;
        let parser = Parser::new(grammar)?;
        log::debug!(
            "calculator: {} productions, {} states",
            parser.grammar().productions().len(),
            parser.table().state_count()
        );
        Ok(Self { parser, terminals })
    }

    pub fn terminals(&self) -> Terminals {
        self.terminals
    }

    pub fn parser(&self) -> &Parser<CalcToken> {
        &self.parser
    }

    pub fn eval(&self, source: &str) -> Result<Evaluation, CalcError> {
        let lexer = CalcLexer::new(source, self.terminals);
        let (root, stats) = self.parser.parse_with_stats(lexer)?;
        log::debug!("{:?} => {} ({:?})", source, root, stats);
        Ok(Evaluation { root, stats })
    }
}

fn folding_hook(label: &str) -> Option<Rewrite<CalcToken>> {
    match label {
        "num" => Some(Box::new(|left: SymbolId, children: &[Item<CalcToken>]| {
            let tok = children.first()?.scalar_value()?;
            Some(Item::scalar(left, *tok))
        })),
        "paren" => Some(Box::new(|left: SymbolId, children: &[Item<CalcToken>]| {
            let [_, inner, _] = children else {
                return None;
            };
            Some(fold(left, Some(operand(inner)?), children))
        })),
        "neg" => Some(Box::new(|left: SymbolId, children: &[Item<CalcToken>]| {
            let [_, inner] = children else {
                return None;
            };
            Some(fold(left, operand(inner)?.checked_neg(), children))
        })),
        "mul" => Some(binary(i64::checked_mul)),
        "div" => Some(binary(i64::checked_div)),
        "add" => Some(binary(i64::checked_add)),
        "sub" => Some(binary(i64::checked_sub)),
        _ => None,
    }
}

fn binary(op: fn(i64, i64) -> Option<i64>) -> Rewrite<CalcToken> {
    Box::new(move |left: SymbolId, children: &[Item<CalcToken>]| {
        let [lhs, _, rhs] = children else {
            return None;
        };
        let (a, b) = (operand(lhs)?, operand(rhs)?);
        Some(fold(left, op(a, b), children))
    })
}

/// Value of an already folded child; `None` if it is in error.
fn operand(item: &Item<CalcToken>) -> Option<i64> {
    if item.is_error() {
        return None;
    }
    item.scalar_value()?.as_number()
}

/// A scalar for `value` spanning all `children`, error-flagged when the
/// arithmetic failed.
fn fold(left: SymbolId, value: Option<i64>, children: &[Item<CalcToken>]) -> Item<CalcToken> {
    let mut tok = match value {
        Some(n) => CalcToken::number(n, None),
        None => CalcToken::invalid(None),
    };
    for child in children.iter().filter_map(Item::scalar_value) {
        tok.merge_span(&child.span);
    }
    if value.is_some() {
        return Item::scalar(left, tok);
    }
    log::debug!("arithmetic fault at {:?}", tok.span);
    Item::scalar(left, tok).with_state(ERROR_STATE)
}
