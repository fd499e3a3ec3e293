//! Construction entry point.
//!
//! [`Automaton::build`] runs every construction phase in order (LR(0)
//! collection, FIRST sets, kernels, LALR lookaheads, table) and keeps the
//! intermediate structures around, read-only, for dumps and tests.

use crate::first::FirstSets;
use crate::grammar::Grammar;
use crate::lalr::{self, LalrSets, Lr1Item, Propagations};
use crate::lr0::{ItemId, Lr0Automaton, Lr0Item, StateId};
use crate::table::ParseTable;
use indexmap::IndexSet;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    lr0: Lr0Automaton,
    first: FirstSets,
    kernels: Vec<Vec<ItemId>>,
    lalr: LalrSets,
}

impl Automaton {
    /// Builds the automaton and its parse table.
    ///
    /// Construction is deterministic: the same grammar always yields the
    /// same state numbering and the same table.
    pub fn build<T>(grammar: &Grammar<T>) -> (Automaton, ParseTable) {
        let mut lr0 = Lr0Automaton::generate(grammar);
        let first = FirstSets::compute(grammar);
        let kernels = lr0.kernels();
        let lalr = lalr::compute(grammar, &first, &mut lr0, &kernels);
        let table = ParseTable::generate(grammar, &lr0, &lalr);

        let conflicts = table.conflicts();
        for conflict in &conflicts {
            log::warn!("{}", conflict.describe(grammar.symbols()));
        }
        log::debug!(
            "table: {} states x {} columns, {} conflicts",
            table.state_count(),
            table.column_count(),
            conflicts.len()
        );

        let automaton = Automaton {
            lr0,
            first,
            kernels,
            lalr,
        };
        (automaton, table)
    }

    pub fn state_count(&self) -> usize {
        self.lr0.state_count()
    }

    pub fn first_sets(&self) -> &FirstSets {
        &self.first
    }

    pub fn lr0(&self) -> &Lr0Automaton {
        &self.lr0
    }

    pub fn lr0_items(&self) -> &IndexSet<Lr0Item> {
        self.lr0.items()
    }

    pub fn lr0_states(&self) -> &IndexSet<Vec<ItemId>> {
        self.lr0.states()
    }

    pub fn kernels(&self) -> &[Vec<ItemId>] {
        &self.kernels
    }

    pub fn lr1_items(&self) -> &IndexSet<Lr1Item> {
        &self.lalr.items
    }

    pub fn lalr_states(&self) -> &[BTreeSet<usize>] {
        &self.lalr.states
    }

    pub fn lalr(&self) -> &LalrSets {
        &self.lalr
    }

    pub fn propagations(&self) -> &Propagations {
        &self.lalr.propagations
    }

    pub fn gotos(&self) -> &[Vec<Option<StateId>>] {
        self.lr0.gotos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lr0::tests::arith;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn rebuild_is_identical() {
        init_logger();
        let g = arith();
        let (a1, t1) = Automaton::build(&g);
        let (a2, t2) = Automaton::build(&g);
        assert_eq!(a1, a2);
        assert_eq!(t1, t2);
    }

    #[test]
    fn table_has_one_row_per_state() {
        init_logger();
        let g = arith();
        let (a, t) = Automaton::build(&g);
        assert_eq!(t.state_count(), a.state_count());
        assert_eq!(t.column_count(), g.symbol_count() + 1);
        assert_eq!(a.kernels().len(), a.state_count());
        assert_eq!(a.lalr_states().len(), a.state_count());
        assert!(!a.propagations().is_empty());
        assert_eq!(a.first_sets().len(), g.symbol_count());
    }
}
