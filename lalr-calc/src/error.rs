//! # Calculator Error Type
//!
//! [`CalcError`] covers the failures that stop an evaluation outright:
//! a broken grammar, a character the lexer does not know, and a numeric
//! literal that does not fit in an `i64`. Syntax errors and arithmetic
//! faults are not errors here; they show up as error-flagged items in the
//! [`Evaluation`](crate::Evaluation).
use lalr::Span;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// The embedded grammar failed to load or has conflicts.
    #[error("calculator grammar: {0}")]
    Grammar(String),

    /// The lexer met a character that starts no token.
    #[error("unexpected character {ch:?} at {}", span.display())]
    UnexpectedChar { ch: char, span: Span },

    /// An integer literal could not be parsed from its string representation.
    #[error("unable to parse {0:?}")]
    ParseInt(#[from] std::num::ParseIntError),
}

impl From<lalr::GrammarError> for CalcError {
    fn from(err: lalr::GrammarError) -> Self {
        CalcError::Grammar(err.to_string())
    }
}
