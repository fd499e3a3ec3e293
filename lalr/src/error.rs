//! Error and source-location types.
//!
//! [`GrammarError`] reports grammars that cannot be turned into a usable
//! LALR(1) table: malformed symbol references and conflicts that the
//! precedence groups do not resolve. Input errors are *not* represented
//! here; the driver returns the offending token instead (see
//! [`Parser::parse`](crate::Parser::parse)).
//!
//! [`Position`] and [`Span`] are small helpers for token sources that want to
//! attach source locations to their token content.
//!
//! ```rust
//! # use lalr::{Position, Span, span};
//! let sp = Span::new(Position::new(3, 5), Position::new(3, 10));
//! assert!(!sp.is_empty());
//! assert_eq!(sp.line_range(), (3, 3));
//! assert!(span!(1, 1, 1, 5).is_some());
//! ```

use crate::symtab::SymbolId;
use crate::table::Conflict;
use smartstring::alias::String;
use thiserror::Error;

/// Reasons a grammar is rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrammarError {
    #[error("grammar has no productions")]
    NoProductions,

    #[error("duplicate symbol name {0:?}")]
    DuplicateSymbol(String),

    #[error("production {production} refers to symbol {symbol}, but only {count} symbols are declared")]
    SymbolOutOfRange {
        production: usize,
        symbol: SymbolId,
        count: usize,
    },

    /// The first production must be the only production of symbol 0.
    #[error("production {0} is not a valid augmented start production")]
    BadStartProduction(usize),

    #[error("{} unresolved conflict(s), first: {}", .0.len(), first_conflict(.0))]
    Conflicts(Vec<Conflict>),
}

fn first_conflict(conflicts: &[Conflict]) -> std::string::String {
    conflicts
        .first()
        .map(|c| c.to_string())
        .unwrap_or_else(|| "none".into())
}

/// A 0-based line/column position in source text.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    #[inline]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// A half-open source range: `[start, end)`.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[inline]
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Merge with another span by covering both.
    pub fn merge(&self, other: &Span) -> Span {
        let start = if self.start <= other.start {
            self.start
        } else {
            other.start
        };
        let end = if self.end >= other.end {
            self.end
        } else {
            other.end
        };
        Span { start, end }
    }

    /// Merges two optional spans; a missing side leaves the other unchanged.
    pub fn merge_opt(a: Option<Span>, b: Option<Span>) -> Option<Span> {
        match (a, b) {
            (Some(a), Some(b)) => Some(a.merge(&b)),
            (a, None) => a,
            (None, b) => b,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the inclusive line range spanned by this `Span`.
    #[inline]
    pub fn line_range(&self) -> (usize, usize) {
        (self.start.line, self.end.line)
    }

    /// Pretty-print for diagnostics (human-readable).
    #[inline]
    pub fn display(&self) -> std::string::String {
        format!(
            "span {}:{} to {}:{}",
            self.start.line, self.start.column, self.end.line, self.end.column
        )
    }
}

/// Build an `Option<Span>` inline from 0-based line/column coordinates.
#[macro_export]
macro_rules! span {
    ($line_start:expr, $col_start:expr, $line_end:expr, $col_end:expr) => {
        Some($crate::Span {
            start: $crate::Position { line: $line_start, column: $col_start },
            end:   $crate::Position { line: $line_end,   column: $col_end   },
        })
    }
}
