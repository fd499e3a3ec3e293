//! FIRST sets.
//!
//! `first[s]` holds the terminals that can begin a string derived from `s`.
//! Nullability is tracked separately in `nullable[s]` rather than with an
//! epsilon member, so the sets contain terminals only.

use crate::grammar::Grammar;
use crate::symtab::{Lookahead, SymbolId};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets {
    first: Vec<BTreeSet<SymbolId>>,
    nullable: Vec<bool>,
}

impl FirstSets {
    /// Runs the fixpoint to completion.
    pub fn compute<T>(grammar: &Grammar<T>) -> Self {
        let n = grammar.symbol_count();
        let mut first = vec![BTreeSet::new(); n];
        let mut nullable = vec![false; n];
        for t in grammar.terminals() {
            first[t].insert(t);
        }
        for prod in grammar.productions() {
            if prod.is_empty() {
                nullable[prod.left()] = true;
            }
        }
        let mut sets = Self { first, nullable };
        let mut passes = 1;
        while sets.step(grammar) {
            passes += 1;
        }
        log::debug!("FIRST sets: {n} symbols, {passes} passes");
        sets
    }

    /// One pass over all productions; returns `true` if any set grew.
    pub fn step<T>(&mut self, grammar: &Grammar<T>) -> bool {
        let mut changed = false;
        for prod in grammar.productions() {
            let left = prod.left();
            let mut all_nullable = true;
            for &sym in prod.right() {
                if sym != left {
                    let add: Vec<SymbolId> = self.first[sym]
                        .difference(&self.first[left])
                        .copied()
                        .collect();
                    if !add.is_empty() {
                        self.first[left].extend(add);
                        changed = true;
                    }
                }
                if !self.nullable[sym] {
                    all_nullable = false;
                    break;
                }
            }
            if all_nullable && !self.nullable[left] {
                self.nullable[left] = true;
                changed = true;
            }
        }
        changed
    }

    pub fn first(&self, symbol: SymbolId) -> &BTreeSet<SymbolId> {
        &self.first[symbol]
    }

    pub fn is_nullable(&self, symbol: SymbolId) -> bool {
        self.nullable[symbol]
    }

    pub fn len(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    /// FIRST of a symbol sequence as lookaheads; `fallback` is included iff
    /// the whole sequence is nullable.
    pub fn first_of(&self, seq: &[SymbolId], fallback: Lookahead) -> BTreeSet<Lookahead> {
        let mut out = BTreeSet::new();
        for &sym in seq {
            out.extend(self.first[sym].iter().map(|&t| Some(t)));
            if !self.nullable[sym] {
                return out;
            }
        }
        out.insert(fallback);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Derivation, PrecedenceGroup, Production};

    // S' -> A ; A -> B c | ; B -> b | A
    fn nullable_grammar() -> Grammar<()> {
        Grammar::new(
            ["S'", "A", "B", "b", "c"],
            vec![PrecedenceGroup::new(
                Derivation::None,
                vec![
                    Production::new(0, [1]),
                    Production::new(1, [2, 4]),
                    Production::new(1, []),
                    Production::new(2, [3]),
                    Production::new(2, [1]),
                ],
            )],
        )
        .unwrap()
    }

    #[test]
    fn terminals_are_their_own_first() {
        let g = nullable_grammar();
        let f = FirstSets::compute(&g);
        assert_eq!(f.first(3), &BTreeSet::from([3]));
        assert_eq!(f.first(4), &BTreeSet::from([4]));
        assert!(!f.is_nullable(3));
    }

    #[test]
    fn nullable_chains_contribute() {
        let g = nullable_grammar();
        let f = FirstSets::compute(&g);
        assert!(f.is_nullable(1));
        assert!(f.is_nullable(2));
        assert!(f.is_nullable(0));
        assert_eq!(f.first(1), &BTreeSet::from([3, 4]));
        assert_eq!(f.first(2), &BTreeSet::from([3, 4]));
    }

    #[test]
    fn fixpoint_is_idempotent() {
        let g = nullable_grammar();
        let mut f = FirstSets::compute(&g);
        let before = f.clone();
        assert!(!f.step(&g));
        assert_eq!(f, before);
    }

    #[test]
    fn first_of_sequence_uses_fallback_only_when_nullable() {
        let g = nullable_grammar();
        let f = FirstSets::compute(&g);
        assert_eq!(f.first_of(&[4], None), BTreeSet::from([Some(4)]));
        assert_eq!(
            f.first_of(&[1, 2], Some(4)),
            BTreeSet::from([Some(3), Some(4)])
        );
        assert_eq!(f.first_of(&[1], None), BTreeSet::from([None, Some(3), Some(4)]));
        assert_eq!(f.first_of(&[], Some(3)), BTreeSet::from([Some(3)]));
    }
}
