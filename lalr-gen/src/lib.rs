//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! Grammar files and table dumps for the [`lalr`] crate.
//!
//! A grammar file lists productions grouped by precedence (see [`spec`]).
//! [`GrammarSpec`] reads one into a symbol list and precedence groups,
//! and builds a [`lalr::Grammar`] from them with optional rewrite hooks
//! attached by production label. [`dump`] writes a plain-text report of
//! the LR(0) states, FIRST sets, LALR(1) item sets, propagation edges,
//! the parse table and any unresolved conflicts.
//!
//! ```
//! use lalr_gen::GrammarSpec;
//!
//! let spec = GrammarSpec::parse("E -> num\n%left\nadd: E -> E + E\n").unwrap();
//! let grammar: lalr::Grammar<()> = spec.build().unwrap();
//! let (_, table) = lalr::Automaton::build(&grammar);
//! assert!(table.is_conflict_free());
//! ```

pub mod dump;
mod lexer;
mod parser;
pub mod spec;

pub use dump::report;
pub use lexer::{SYM_NAMES, sym_name};
pub use spec::{GrammarSpec, GroupSpec, ProductionSpec};
