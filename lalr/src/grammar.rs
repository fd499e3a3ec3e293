//! # Grammar model
//!
//! A [`Grammar`] is a symbol table plus an ordered list of
//! [`PrecedenceGroup`]s. Each group holds productions and a [`Derivation`]
//! policy that settles conflicts between equally ranked actions. Group `0`
//! binds tightest; each later group binds less tightly.
//!
//! Productions are flattened in group order at construction time; the
//! position in that flat list is the global production id used by the
//! automaton, the parse table and [`Reduction`](crate::Reduction) nodes.
//!
//! By convention symbol `0` is the augmented start goal, and the first
//! production of the first group is its only production:
//!
//! ```rust
//! use lalr::{Derivation, Grammar, PrecedenceGroup, Production};
//!
//! // S' -> e ; e -> e + e | i
//! let grammar: Grammar<()> = Grammar::new(
//!     ["S'", "e", "+", "i"],
//!     vec![
//!         PrecedenceGroup::new(
//!             Derivation::None,
//!             vec![Production::new(0, [1]), Production::new(1, [3])],
//!         ),
//!         PrecedenceGroup::new(Derivation::LeftMost, vec![Production::new(1, [1, 2, 1])]),
//!     ],
//! )
//! .unwrap();
//! assert_eq!(grammar.productions().len(), 3);
//! assert!(grammar.is_terminal(2));
//! assert!(!grammar.is_terminal(1));
//! ```

use crate::error::GrammarError;
use crate::item::Item;
use crate::symtab::{SymbolId, Symtab};
use smartstring::alias::String;
use std::fmt;

/// A rewrite hook: called with the production's left symbol and the popped
/// children; `Some` replaces the default node for the reduction.
pub type Rewrite<T> = Box<dyn Fn(SymbolId, &[Item<T>]) -> Option<Item<T>> + Send + Sync>;

/// How ties between equally ranked parse actions are settled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Derivation {
    /// No preference; a tie is an unresolved conflict.
    #[default]
    None,
    /// Prefer the single reduce (left associativity).
    LeftMost,
    /// Prefer the shift (right associativity).
    RightMost,
}

impl Derivation {
    pub fn to_str(self) -> &'static str {
        match self {
            Derivation::None => "none",
            Derivation::LeftMost => "left",
            Derivation::RightMost => "right",
        }
    }
}

/// A grammatical production `left -> right…` with an optional rewrite hook.
pub struct Production<T> {
    left: SymbolId,
    right: Vec<SymbolId>,
    rewrite: Option<Rewrite<T>>,
}

impl<T> Production<T> {
    pub fn new(left: SymbolId, right: impl IntoIterator<Item = SymbolId>) -> Self {
        Self {
            left,
            right: right.into_iter().collect(),
            rewrite: None,
        }
    }

    /// Attaches a rewrite hook to this production.
    pub fn with_rewrite<F>(mut self, f: F) -> Self
    where
        F: Fn(SymbolId, &[Item<T>]) -> Option<Item<T>> + Send + Sync + 'static,
    {
        self.rewrite = Some(Box::new(f));
        self
    }

    pub fn left(&self) -> SymbolId {
        self.left
    }

    pub fn right(&self) -> &[SymbolId] {
        &self.right
    }

    pub fn len(&self) -> usize {
        self.right.len()
    }

    pub fn is_empty(&self) -> bool {
        self.right.is_empty()
    }

    pub fn has_rewrite(&self) -> bool {
        self.rewrite.is_some()
    }

    /// Runs the rewrite hook, if any.
    pub fn rewrite(&self, children: &[Item<T>]) -> Option<Item<T>> {
        self.rewrite.as_ref().and_then(|f| f(self.left, children))
    }
}

impl<T> fmt::Debug for Production<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Production")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("rewrite", &self.rewrite.is_some())
            .finish()
    }
}

/// Productions sharing one precedence rank.
#[derive(Debug)]
pub struct PrecedenceGroup<T> {
    pub derivation: Derivation,
    pub productions: Vec<Production<T>>,
}

impl<T> PrecedenceGroup<T> {
    pub fn new(derivation: Derivation, productions: Vec<Production<T>>) -> Self {
        Self {
            derivation,
            productions,
        }
    }
}

/// A validated grammar with flattened productions.
#[derive(Debug)]
pub struct Grammar<T> {
    symbols: Symtab,
    productions: Vec<Production<T>>,
    precedence: Vec<usize>,
    derivations: Vec<Derivation>,
    nonterminal: Vec<bool>,
    by_left: Vec<Vec<usize>>,
}

impl<T> Grammar<T> {
    /// Flattens and validates the groups.
    pub fn new<S: AsRef<str>>(
        symbol_names: impl IntoIterator<Item = S>,
        groups: Vec<PrecedenceGroup<T>>,
    ) -> Result<Self, GrammarError> {
        let mut symbols = Symtab::new();
        for name in symbol_names {
            let name = name.as_ref();
            if symbols.try_add(name).is_none() {
                return Err(GrammarError::DuplicateSymbol(String::from(name)));
            }
        }

        let mut productions = Vec::new();
        let mut precedence = Vec::new();
        let mut derivations = Vec::with_capacity(groups.len());
        for (rank, group) in groups.into_iter().enumerate() {
            derivations.push(group.derivation);
            for prod in group.productions {
                productions.push(prod);
                precedence.push(rank);
            }
        }

        let nonterminal = classify(symbols.len(), &productions);
        let mut by_left = vec![Vec::new(); symbols.len()];
        for (i, prod) in productions.iter().enumerate() {
            if let Some(ids) = by_left.get_mut(prod.left) {
                ids.push(i);
            }
        }
        let grammar = Self {
            symbols,
            productions,
            precedence,
            derivations,
            nonterminal,
            by_left,
        };
        grammar.validate()?;
        Ok(grammar)
    }

    fn validate(&self) -> Result<(), GrammarError> {
        let Some(start) = self.productions.first() else {
            return Err(GrammarError::NoProductions);
        };
        let count = self.symbols.len();
        for (i, prod) in self.productions.iter().enumerate() {
            for &symbol in std::iter::once(&prod.left).chain(prod.right.iter()) {
                if symbol >= count {
                    return Err(GrammarError::SymbolOutOfRange {
                        production: i,
                        symbol,
                        count,
                    });
                }
            }
            if i > 0 && prod.left == 0 {
                return Err(GrammarError::BadStartProduction(i));
            }
        }
        if start.left != 0 {
            return Err(GrammarError::BadStartProduction(0));
        }
        Ok(())
    }

    pub fn symbols(&self) -> &Symtab {
        &self.symbols
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn productions(&self) -> &[Production<T>] {
        &self.productions
    }

    pub fn production(&self, id: usize) -> &Production<T> {
        &self.productions[id]
    }

    /// Ids of the productions whose left side is `symbol`, in id order.
    pub fn productions_of(&self, symbol: SymbolId) -> &[usize] {
        &self.by_left[symbol]
    }

    /// Precedence group of a production; lower binds tighter.
    pub fn precedence(&self, production: usize) -> usize {
        self.precedence[production]
    }

    pub fn derivation(&self, group: usize) -> Derivation {
        self.derivations[group]
    }

    pub fn group_count(&self) -> usize {
        self.derivations.len()
    }

    pub fn is_terminal(&self, symbol: SymbolId) -> bool {
        !self.nonterminal[symbol]
    }

    pub fn is_nonterminal(&self, symbol: SymbolId) -> bool {
        self.nonterminal[symbol]
    }

    pub fn terminals(&self) -> impl Iterator<Item = SymbolId> + '_ {
        (0..self.symbol_count()).filter(|&s| !self.nonterminal[s])
    }

    pub fn nonterminals(&self) -> impl Iterator<Item = SymbolId> + '_ {
        (0..self.symbol_count()).filter(|&s| self.nonterminal[s])
    }

    /// Writes `left -> right…` using symbol names.
    pub fn display_production(&self, id: usize) -> std::string::String {
        let prod = &self.productions[id];
        let mut s = format!("{} ->", self.symbols.sym(prod.left).unwrap_or("?"));
        for &sym in &prod.right {
            s.push(' ');
            s.push_str(self.symbols.sym(sym).unwrap_or("?"));
        }
        s
    }
}

/// A symbol is a nonterminal iff it is the left side of some production.
fn classify<T>(n_symbols: usize, productions: &[Production<T>]) -> Vec<bool> {
    let mut nonterminal = vec![false; n_symbols];
    for prod in productions {
        if let Some(flag) = nonterminal.get_mut(prod.left) {
            *flag = true;
        }
    }
    nonterminal
}
