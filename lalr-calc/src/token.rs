//! # Calculator Tokens
//!
//! [`CalcToken`] is the content type of every parse-tree item the calculator
//! handles: lexed tokens and folded subexpressions alike.
use lalr::Span;
use std::fmt;

/// The payload carried by a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenValue {
    /// No value: an expression whose evaluation failed.
    None,

    /// Integer literal or folded result.
    Number(i64),

    /// Operator or parenthesis.
    Op(char),
}

/// A value together with the source range it covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalcToken {
    pub value: TokenValue,
    pub span: Option<Span>,
}

impl CalcToken {
    pub fn number(n: i64, span: Option<Span>) -> Self {
        Self {
            value: TokenValue::Number(n),
            span,
        }
    }

    pub fn op(c: char, span: Option<Span>) -> Self {
        Self {
            value: TokenValue::Op(c),
            span,
        }
    }

    pub fn invalid(span: Option<Span>) -> Self {
        Self {
            value: TokenValue::None,
            span,
        }
    }

    pub fn as_number(&self) -> Option<i64> {
        match self.value {
            TokenValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn merge_span(&mut self, other_span: &Option<Span>) {
        self.span = Span::merge_opt(self.span, *other_span);
    }
}

impl fmt::Display for CalcToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            TokenValue::None => f.write_str("?"),
            TokenValue::Number(n) => write!(f, "{n}"),
            TokenValue::Op(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lalr::{Position, span};

    fn sp(sl: usize, sc: usize, el: usize, ec: usize) -> Span {
        Span::new(Position::new(sl, sc), Position::new(el, ec))
    }

    #[test]
    fn merge_span_expands_existing_span_to_cover_both() {
        let mut t = CalcToken::number(1, Some(sp(0, 5, 0, 10)));
        t.merge_span(&Some(sp(0, 2, 0, 12)));
        assert_eq!(t.span, span!(0, 2, 0, 12));
    }

    #[test]
    fn merge_span_sets_when_self_is_none() {
        let mut t = CalcToken::op('+', None);
        t.merge_span(&Some(sp(1, 0, 1, 3)));
        assert_eq!(t.span, Some(sp(1, 0, 1, 3)));
    }

    #[test]
    fn merge_span_is_noop_when_other_is_none() {
        let mut t = CalcToken::number(0, Some(sp(2, 4, 2, 9)));
        t.merge_span(&None);
        assert_eq!(t.span, Some(sp(2, 4, 2, 9)));
    }

    #[test]
    fn display_shows_the_value() {
        assert_eq!(CalcToken::number(-7, None).to_string(), "-7");
        assert_eq!(CalcToken::op('*', None).to_string(), "*");
        assert_eq!(CalcToken::invalid(None).to_string(), "?");
        assert_eq!(CalcToken::op('(', None).as_number(), None);
    }
}
