//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! LALR(1) table construction and a table-driven parse driver.
//!
//! A [`Grammar`] is a symbol table plus ordered [`PrecedenceGroup`]s of
//! productions. [`Automaton::build`] turns it into the canonical LR(0)
//! collection, computes LALR(1) lookaheads by spontaneous generation and
//! propagation, and emits a dense [`ParseTable`] whose shift/reduce ties are
//! settled by group precedence and [`Derivation`]. A [`Parser`] runs that
//! table over any [`TokenSource`], calling per-production rewrite hooks to
//! shape the resulting tree of [`Item`]s.
//!
//! ```rust
//! use lalr::{Derivation, Grammar, IterSource, Item, Parser, PrecedenceGroup, Production};
//!
//! const INT: usize = 2;
//! const PLUS: usize = 3;
//!
//! let grammar = Grammar::new(
//!     ["S'", "E", "int", "+"],
//!     vec![
//!         PrecedenceGroup::new(
//!             Derivation::None,
//!             vec![
//!                 Production::new(0, [1]),
//!                 Production::new(1, [INT])
//!                     .with_rewrite(|left, c: &[Item<i64>]| Some(Item::scalar(left, *c[0].scalar_value()?))),
//!             ],
//!         ),
//!         PrecedenceGroup::new(
//!             Derivation::LeftMost,
//!             vec![Production::new(1, [1, PLUS, 1]).with_rewrite(|left, c: &[Item<i64>]| {
//!                 Some(Item::scalar(left, c[0].scalar_value()? + c[2].scalar_value()?))
//!             })],
//!         ),
//!     ],
//! )
//! .unwrap();
//!
//! let parser = Parser::new(grammar).unwrap();
//! let tokens = vec![Item::scalar(INT, 40), Item::empty(PLUS), Item::scalar(INT, 2)];
//! let root = parser.parse(IterSource(tokens.into_iter())).unwrap();
//! assert_eq!(root.scalar_value(), Some(&42));
//! ```

mod automaton;
mod error;
mod first;
mod grammar;
mod item;
mod lalr;
mod lr0;
mod parser;
mod source;
mod symtab;
mod table;

pub use crate::automaton::Automaton;
pub use crate::error::{GrammarError, Position, Span};
pub use crate::first::FirstSets;
pub use crate::grammar::{Derivation, Grammar, PrecedenceGroup, Production, Rewrite};
pub use crate::item::{ERROR_STATE, Item, Node, Reduction};
pub use crate::lalr::{LalrSets, Lr1Item, Lr1ItemId, Propagations};
pub use crate::lr0::{ItemId, Lr0Automaton, Lr0Item, StateId};
pub use crate::parser::{Parser, ParserConfig, ParserCtx, ParserStats};
pub use crate::source::{IterSource, LaTokenIter, TokenSource, TryIterSource};
pub use crate::symtab::{EOF_NAME, Lookahead, SymbolId, Symtab};
pub use crate::table::{Action, Conflict, ConflictKind, ParseTable};
