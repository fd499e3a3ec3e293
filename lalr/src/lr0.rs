//! LR(0) items, closure/goto and the canonical collection of states.
//!
//! Items and states are hash-consed: each distinct [`Lr0Item`] gets a dense
//! id in first-seen order, and each distinct closed item set gets a dense
//! state id the same way. States are built from a FIFO worklist starting at
//! the closure of the start item, so ids are reproducible across builds.

use crate::grammar::Grammar;
use crate::symtab::SymbolId;
use indexmap::IndexSet;
use std::collections::{HashSet, VecDeque};

pub type ItemId = usize;
pub type StateId = usize;

/// A production with a marker (the *dot*) before `right[position]`.
///
/// `E -> E . + T` is production `E -> E + T` at position 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lr0Item {
    pub production: usize,
    pub position: usize,
}

impl Lr0Item {
    pub const fn new(production: usize, position: usize) -> Self {
        Self {
            production,
            position,
        }
    }

    /// Symbol right after the dot, if any.
    pub fn next_symbol<T>(&self, grammar: &Grammar<T>) -> Option<SymbolId> {
        grammar
            .production(self.production)
            .right()
            .get(self.position)
            .copied()
    }

    pub fn is_complete<T>(&self, grammar: &Grammar<T>) -> bool {
        self.position >= grammar.production(self.production).len()
    }

    pub fn advance(&self) -> Self {
        Self::new(self.production, self.position + 1)
    }
}

/// The canonical LR(0) collection with its transition function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lr0Automaton {
    items: IndexSet<Lr0Item>,
    states: IndexSet<Vec<ItemId>>,
    gotos: Vec<Vec<Option<StateId>>>,
    goto_precedence: Vec<Vec<Option<usize>>>,
}

impl Lr0Automaton {
    /// Builds every state reachable from the closure of the start item.
    pub fn generate<T>(grammar: &Grammar<T>) -> Self {
        let mut lr0 = Self {
            items: IndexSet::new(),
            states: IndexSet::new(),
            gotos: Vec::new(),
            goto_precedence: Vec::new(),
        };
        let n = grammar.symbol_count();

        let start = lr0.intern_item(Lr0Item::new(0, 0));
        let initial = lr0.closure(grammar, vec![start]);
        let (initial, _) = lr0.intern_state(initial, n);

        let mut work = VecDeque::from([initial]);
        while let Some(state) = work.pop_front() {
            for symbol in 0..n {
                let Some((target, precedence, is_new)) = lr0.goto(grammar, state, symbol) else {
                    continue;
                };
                lr0.gotos[state][symbol] = Some(target);
                lr0.goto_precedence[state][symbol] = Some(precedence);
                if is_new {
                    work.push_back(target);
                }
            }
        }
        log::debug!(
            "LR(0): {} items, {} states",
            lr0.items.len(),
            lr0.states.len()
        );
        lr0
    }

    /// Interns `item`, returning its dense id.
    pub fn intern_item(&mut self, item: Lr0Item) -> ItemId {
        self.items.insert_full(item).0
    }

    fn intern_state(&mut self, mut items: Vec<ItemId>, n_symbols: usize) -> (StateId, bool) {
        items.sort_unstable();
        let (id, is_new) = self.states.insert_full(items);
        if is_new {
            self.gotos.push(vec![None; n_symbols]);
            self.goto_precedence.push(vec![None; n_symbols]);
        }
        (id, is_new)
    }

    /// Closes `kernel` over nonterminal expansion.
    ///
    /// For every item whose next symbol is a nonterminal `B`, adds `B -> . γ`
    /// for each production of `B`. Items are returned in discovery order.
    pub fn closure<T>(&mut self, grammar: &Grammar<T>, kernel: Vec<ItemId>) -> Vec<ItemId> {
        let mut seen: HashSet<ItemId> = kernel.iter().copied().collect();
        let mut open = VecDeque::from(kernel);
        let mut closed = Vec::new();
        while let Some(id) = open.pop_front() {
            closed.push(id);
            let item = self.items[id];
            let Some(next) = item.next_symbol(grammar) else {
                continue;
            };
            if !grammar.is_nonterminal(next) {
                continue;
            }
            for &p in grammar.productions_of(next) {
                let added = self.intern_item(Lr0Item::new(p, 0));
                if seen.insert(added) {
                    open.push_back(added);
                }
            }
        }
        closed
    }

    /// Transition of `state` on `symbol`.
    ///
    /// Returns the target state, the tightest precedence group among the
    /// productions that contributed to it, and whether the state is new.
    /// `None` when no item in `state` has `symbol` after its dot.
    fn goto<T>(
        &mut self,
        grammar: &Grammar<T>,
        state: StateId,
        symbol: SymbolId,
    ) -> Option<(StateId, usize, bool)> {
        let mut moved = Vec::new();
        let mut precedence = usize::MAX;
        for &id in &self.states[state] {
            let item = self.items[id];
            if item.next_symbol(grammar) == Some(symbol) {
                moved.push(item.advance());
                precedence = precedence.min(grammar.precedence(item.production));
            }
        }
        if moved.is_empty() {
            return None;
        }
        let kernel = moved.into_iter().map(|i| self.intern_item(i)).collect();
        let closed = self.closure(grammar, kernel);
        let (target, is_new) = self.intern_state(closed, grammar.symbol_count());
        Some((target, precedence, is_new))
    }

    /// Kernel items of every state: position > 0, plus the start item in the
    /// initial state.
    pub fn kernels(&self) -> Vec<Vec<ItemId>> {
        self.states
            .iter()
            .enumerate()
            .map(|(state, items)| {
                items
                    .iter()
                    .copied()
                    .filter(|&id| {
                        let item = self.items[id];
                        item.position > 0 || (state == 0 && item.production == 0)
                    })
                    .collect()
            })
            .collect()
    }

    pub fn items(&self) -> &IndexSet<Lr0Item> {
        &self.items
    }

    pub fn item(&self, id: ItemId) -> Lr0Item {
        self.items[id]
    }

    pub fn item_id(&self, item: &Lr0Item) -> Option<ItemId> {
        self.items.get_index_of(item)
    }

    pub fn states(&self) -> &IndexSet<Vec<ItemId>> {
        &self.states
    }

    pub fn state(&self, id: StateId) -> &[ItemId] {
        &self.states[id]
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn gotos(&self) -> &[Vec<Option<StateId>>] {
        &self.gotos
    }

    pub fn goto_state(&self, state: StateId, symbol: SymbolId) -> Option<StateId> {
        self.gotos[state][symbol]
    }

    pub fn goto_precedence(&self, state: StateId, symbol: SymbolId) -> Option<usize> {
        self.goto_precedence[state][symbol]
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::grammar::{Derivation, PrecedenceGroup, Production};

    /// `S' -> E ; E -> int ; E -> E * E ; E -> E + E` in three groups.
    pub(crate) fn arith() -> Grammar<()> {
        Grammar::new(
            ["S'", "E", "int", "*", "+"],
            vec![
                PrecedenceGroup::new(
                    Derivation::None,
                    vec![Production::new(0, [1]), Production::new(1, [2])],
                ),
                PrecedenceGroup::new(Derivation::LeftMost, vec![Production::new(1, [1, 3, 1])]),
                PrecedenceGroup::new(Derivation::LeftMost, vec![Production::new(1, [1, 4, 1])]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn closure_of_start_item() {
        let g = arith();
        let lr0 = Lr0Automaton::generate(&g);
        let initial: Vec<Lr0Item> = lr0.state(0).iter().map(|&id| lr0.item(id)).collect();
        assert_eq!(
            initial,
            vec![
                Lr0Item::new(0, 0),
                Lr0Item::new(1, 0),
                Lr0Item::new(2, 0),
                Lr0Item::new(3, 0),
            ]
        );
    }

    #[test]
    fn states_and_transitions() {
        let g = arith();
        let lr0 = Lr0Automaton::generate(&g);
        // {0,1(E),2(int),3(E *),4(E +),5(E*E.),6(E+E.)}
        assert_eq!(lr0.state_count(), 7);
        let on_e = lr0.goto_state(0, 1).unwrap();
        let on_int = lr0.goto_state(0, 2).unwrap();
        assert_ne!(on_e, on_int);
        assert_eq!(lr0.goto_state(0, 3), None);
        assert_eq!(lr0.goto_precedence(0, 2), Some(0));
        let after_star = lr0.goto_state(on_e, 3).unwrap();
        assert_eq!(lr0.goto_precedence(on_e, 3), Some(1));
        assert_eq!(lr0.goto_precedence(on_e, 4), Some(2));
        // int is reachable from inside the operator states too
        assert_eq!(lr0.goto_state(after_star, 2), Some(on_int));
    }

    #[test]
    fn kernels_drop_closure_items() {
        let g = arith();
        let lr0 = Lr0Automaton::generate(&g);
        let kernels = lr0.kernels();
        assert_eq!(kernels[0], vec![lr0.item_id(&Lr0Item::new(0, 0)).unwrap()]);
        for (state, kernel) in kernels.iter().enumerate().skip(1) {
            assert!(!kernel.is_empty());
            assert!(kernel.iter().all(|&id| lr0.item(id).position > 0), "state {state}");
        }
    }

    #[test]
    fn generation_is_reproducible() {
        let g = arith();
        assert_eq!(Lr0Automaton::generate(&g), Lr0Automaton::generate(&g));
    }
}
