//! LALR(1) lookaheads by spontaneous generation and propagation.
//!
//! Phase 1 closes every kernel item under a placeholder lookahead. A
//! lookahead produced inside that closure is *spontaneous* and is inserted
//! directly into the successor state; the placeholder itself turns into a
//! propagation edge. The placeholder is the end-of-input lookahead (`None`):
//! FIRST sets contain terminals only, so inside a closure `None` can only
//! come from the kernel, and in the initial state it really is end-of-input.
//!
//! Phase 2 closes every set once and then pushes lookaheads along the edges
//! until nothing changes, re-closing each state whose set grew.

use crate::first::FirstSets;
use crate::grammar::Grammar;
use crate::lr0::{ItemId, Lr0Automaton, Lr0Item, StateId};
use crate::symtab::Lookahead;
use indexmap::{IndexMap, IndexSet};
use std::collections::{BTreeSet, HashSet, VecDeque};

pub type Lr1ItemId = usize;

/// An LR(0) item paired with one lookahead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lr1Item {
    pub lr0: ItemId,
    pub lookahead: Lookahead,
}

/// Propagation edges: lookaheads reaching `(state, item)` also reach every
/// listed `(state, item)`.
pub type Propagations = IndexMap<(StateId, ItemId), IndexSet<(StateId, ItemId)>>;

/// The LALR(1) item sets of every LR(0) state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LalrSets {
    pub items: IndexSet<Lr1Item>,
    pub states: Vec<BTreeSet<Lr1ItemId>>,
    pub propagations: Propagations,
}

struct Builder<'a, T> {
    grammar: &'a Grammar<T>,
    first: &'a FirstSets,
    lr0: &'a mut Lr0Automaton,
    items: IndexSet<Lr1Item>,
    states: Vec<BTreeSet<Lr1ItemId>>,
    propagations: Propagations,
}

/// Computes LALR(1) item sets from the LR(0) automaton and its kernels.
pub fn compute<T>(
    grammar: &Grammar<T>,
    first: &FirstSets,
    lr0: &mut Lr0Automaton,
    kernels: &[Vec<ItemId>],
) -> LalrSets {
    let n_states = lr0.state_count();
    let mut b = Builder {
        grammar,
        first,
        lr0,
        items: IndexSet::new(),
        states: vec![BTreeSet::new(); n_states],
        propagations: IndexMap::new(),
    };
    b.discover(kernels);
    log::debug!(
        "LALR phase 1: {} propagation sources, {} edges",
        b.propagations.len(),
        b.propagations.values().map(IndexSet::len).sum::<usize>()
    );
    let passes = b.propagate();
    log::debug!(
        "LALR phase 2: {passes} passes, {} LR(1) items",
        b.items.len()
    );
    LalrSets {
        items: b.items,
        states: b.states,
        propagations: b.propagations,
    }
}

impl<T> Builder<'_, T> {
    fn intern(&mut self, lr0: ItemId, lookahead: Lookahead) -> Lr1ItemId {
        self.items.insert_full(Lr1Item { lr0, lookahead }).0
    }

    /// LR(1) closure; generated lookaheads are `FIRST(tail, outer)`.
    fn closure(&mut self, seed: impl IntoIterator<Item = Lr1ItemId>) -> BTreeSet<Lr1ItemId> {
        let (grammar, first) = (self.grammar, self.first);
        let mut closed = BTreeSet::new();
        let mut seen = HashSet::new();
        let mut open = VecDeque::new();
        for id in seed {
            if seen.insert(id) {
                open.push_back(id);
            }
        }
        while let Some(id) = open.pop_front() {
            closed.insert(id);
            let Lr1Item { lr0, lookahead } = self.items[id];
            let item = self.lr0.item(lr0);
            let right = grammar.production(item.production).right();
            let Some(&next) = right.get(item.position) else {
                continue;
            };
            if !grammar.is_nonterminal(next) {
                continue;
            }
            let lookaheads = first.first_of(&right[item.position + 1..], lookahead);
            for &p in grammar.productions_of(next) {
                let start = self.lr0.intern_item(Lr0Item::new(p, 0));
                for &la in &lookaheads {
                    let added = self.intern(start, la);
                    if seen.insert(added) {
                        open.push_back(added);
                    }
                }
            }
        }
        closed
    }

    fn discover(&mut self, kernels: &[Vec<ItemId>]) {
        for (state, kernel) in kernels.iter().enumerate() {
            for &k in kernel {
                let seed = self.intern(k, None);
                for id in self.closure([seed]) {
                    let Lr1Item { lr0, lookahead } = self.items[id];
                    let item = self.lr0.item(lr0);
                    if lookahead.is_some() || state == 0 {
                        self.states[state].insert(id);
                    }
                    let Some(next) = item.next_symbol(self.grammar) else {
                        continue;
                    };
                    let Some(target) = self.lr0.goto_state(state, next) else {
                        continue;
                    };
                    let succ = self.lr0.intern_item(item.advance());
                    match lookahead {
                        None => {
                            self.propagations
                                .entry((state, lr0))
                                .or_default()
                                .insert((target, succ));
                        }
                        Some(_) => {
                            let spontaneous = self.intern(succ, lookahead);
                            self.states[target].insert(spontaneous);
                        }
                    }
                }
            }
        }
    }

    fn propagate(&mut self) -> usize {
        for state in 0..self.states.len() {
            let set = std::mem::take(&mut self.states[state]);
            self.states[state] = self.closure(set);
        }
        let mut passes = 0;
        loop {
            passes += 1;
            let mut dirty = BTreeSet::new();
            for state in 0..self.states.len() {
                let current: Vec<Lr1ItemId> = self.states[state].iter().copied().collect();
                for id in current {
                    let Lr1Item { lr0, lookahead } = self.items[id];
                    let Some(targets) = self.propagations.get(&(state, lr0)) else {
                        continue;
                    };
                    let targets: Vec<(StateId, ItemId)> = targets.iter().copied().collect();
                    for (target, succ) in targets {
                        let pushed = self.intern(succ, lookahead);
                        if self.states[target].insert(pushed) {
                            dirty.insert(target);
                        }
                    }
                }
            }
            if dirty.is_empty() {
                return passes;
            }
            for state in dirty {
                let set = std::mem::take(&mut self.states[state]);
                self.states[state] = self.closure(set);
            }
        }
    }
}

impl LalrSets {
    pub fn item(&self, id: Lr1ItemId) -> Lr1Item {
        self.items[id]
    }

    /// LR(1) items of `state` in id order.
    pub fn state_items(&self, state: StateId) -> impl Iterator<Item = Lr1Item> + '_ {
        self.states[state].iter().map(|&id| self.items[id])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Derivation, PrecedenceGroup, Production};
    use crate::lr0::tests::arith;

    fn build<T>(g: &Grammar<T>) -> (Lr0Automaton, LalrSets) {
        let first = FirstSets::compute(g);
        let mut lr0 = Lr0Automaton::generate(g);
        let kernels = lr0.kernels();
        let sets = compute(g, &first, &mut lr0, &kernels);
        (lr0, sets)
    }

    fn complete_lookaheads<T>(
        g: &Grammar<T>,
        lr0: &Lr0Automaton,
        sets: &LalrSets,
        state: StateId,
    ) -> BTreeSet<(usize, Lookahead)> {
        sets.state_items(state)
            .filter_map(|it| {
                let item = lr0.item(it.lr0);
                item.is_complete(g).then_some((item.production, it.lookahead))
            })
            .collect()
    }

    #[test]
    fn end_of_input_reaches_start_reduction() {
        let g = arith();
        let (lr0, sets) = build(&g);
        let on_e = lr0.goto_state(0, 1).unwrap();
        let got = complete_lookaheads(&g, &lr0, &sets, on_e);
        assert_eq!(got, BTreeSet::from([(0, None)]));
    }

    #[test]
    fn operand_reduction_sees_all_followers() {
        let g = arith();
        let (lr0, sets) = build(&g);
        let on_int = lr0.goto_state(0, 2).unwrap();
        let got = complete_lookaheads(&g, &lr0, &sets, on_int);
        assert_eq!(got, BTreeSet::from([(1, None), (1, Some(3)), (1, Some(4))]));
    }

    // The classic grammar that is LALR(1) but not SLR(1):
    // S' -> S ; S -> L = R | R ; L -> * R | id ; R -> L
    #[test]
    fn lalr_lookaheads_are_tighter_than_follow() {
        let g: Grammar<()> = Grammar::new(
            ["S'", "S", "L", "R", "=", "*", "id"],
            vec![PrecedenceGroup::new(
                Derivation::None,
                vec![
                    Production::new(0, [1]),
                    Production::new(1, [2, 4, 3]),
                    Production::new(1, [3]),
                    Production::new(2, [5, 3]),
                    Production::new(2, [6]),
                    Production::new(3, [2]),
                ],
            )],
        )
        .unwrap();
        let (lr0, sets) = build(&g);
        let on_l = lr0.goto_state(0, 2).unwrap();
        let got = complete_lookaheads(&g, &lr0, &sets, on_l);
        // R -> L . reduces only at end of input, so `=` is left to the shift.
        assert_eq!(got, BTreeSet::from([(5, None)]));
    }

    // S' -> S ; S -> A a A b | B b B a ; A -> ; B ->
    fn empty_operands() -> Grammar<()> {
        Grammar::new(
            ["S'", "S", "A", "B", "a", "b"],
            vec![PrecedenceGroup::new(
                Derivation::None,
                vec![
                    Production::new(0, [1]),
                    Production::new(1, [2, 4, 2, 5]),
                    Production::new(1, [3, 5, 3, 4]),
                    Production::new(2, []),
                    Production::new(3, []),
                ],
            )],
        )
        .unwrap()
    }

    #[test]
    fn empty_reductions_get_only_their_followers() {
        let g = empty_operands();
        let (lr0, sets) = build(&g);
        let got = complete_lookaheads(&g, &lr0, &sets, 0);
        assert_eq!(got, BTreeSet::from([(3, Some(4)), (4, Some(5))]));

        let after_a = lr0.goto_state(lr0.goto_state(0, 2).unwrap(), 4).unwrap();
        let got = complete_lookaheads(&g, &lr0, &sets, after_a);
        assert_eq!(got, BTreeSet::from([(3, Some(5))]));

        let after_b = lr0.goto_state(lr0.goto_state(0, 3).unwrap(), 5).unwrap();
        let got = complete_lookaheads(&g, &lr0, &sets, after_b);
        assert_eq!(got, BTreeSet::from([(4, Some(4))]));
    }

    #[test]
    fn propagation_edges_follow_gotos() {
        let g = arith();
        let (lr0, sets) = build(&g);
        for (&(state, item), targets) in &sets.propagations {
            let sym = lr0.item(item).next_symbol(&g).unwrap();
            for &(target, succ) in targets {
                assert_eq!(lr0.goto_state(state, sym), Some(target));
                assert_eq!(lr0.item(succ), lr0.item(item).advance());
            }
        }
    }
}
