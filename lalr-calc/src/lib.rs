//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0
//! or (at your option) any later version (LGPL-3.0-or-later).
//!
//! # lalr-calc
//!
//! A small integer calculator showing the pieces of the [`lalr`] crate
//! working together:
//!
//! - [`lexer`]: a [`logos`] lexer implementing [`lalr::TokenSource`],
//! - [`parser`]: the calculator grammar (`calc.g`, read with
//!   [`lalr_gen::GrammarSpec`]) with constant-folding rewrite hooks,
//! - [`token`]: the [`CalcToken`] content type carried by parse-tree items.
//!
//! ## Example
//!
//! ```rust
//! use lalr::span;
//!
//! let ev = lalr_calc::eval("1 + 2 * 3").unwrap();
//! assert_eq!(ev.value(), Some(7));
//! assert_eq!(ev.span(), span!(0, 0, 0, 9));
//!
//! let ev = lalr_calc::eval("4 / (2 - 2)").unwrap();
//! assert!(ev.is_error());
//! ```
pub mod error;
pub mod lexer;
pub mod parser;
pub mod token;

pub use error::CalcError;
pub use lexer::{CalcLexer, Terminals};
pub use parser::{Calculator, Evaluation, eval};
pub use token::{CalcToken, TokenValue};
