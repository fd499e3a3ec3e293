//! Parse-table generation and conflict resolution.
//!
//! The table is dense: one row per state, one column per lookahead. Column
//! `0` is end-of-input and column `s + 1` is symbol `s`. Nonterminal columns
//! carry the goto transitions as [`Action::Shift`] entries.
//!
//! When several actions compete for a cell, each is ranked by precedence
//! group (a shift by the tightest group among the productions that produced
//! the transition, a reduce by its production's group) and only the tightest
//! ones survive. A remaining tie is settled by that group's
//! [`Derivation`]; ties it cannot settle become conflict entries.

use crate::grammar::{Derivation, Grammar};
use crate::lalr::LalrSets;
use crate::lr0::{Lr0Automaton, StateId};
use crate::symtab::{Lookahead, SymbolId, Symtab};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Error(Lookahead),
    ErrorShiftReduce(Lookahead),
    ErrorReduceReduce(Lookahead),
    Reduce(usize),
    Shift(StateId),
}

impl Action {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Action::ErrorShiftReduce(_) | Action::ErrorReduceReduce(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConflictKind::ShiftReduce => "shift/reduce",
            ConflictKind::ReduceReduce => "reduce/reduce",
        })
    }
}

/// A table cell that the precedence groups could not settle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Conflict {
    pub state: StateId,
    pub lookahead: Lookahead,
    pub kind: ConflictKind,
}

impl Conflict {
    /// Like `Display`, but with the lookahead's symbol name.
    pub fn describe(&self, symbols: &Symtab) -> String {
        format!(
            "{} conflict in state {} on {}",
            self.kind,
            self.state,
            symbols.lookahead_name(self.lookahead)
        )
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} conflict in state {} on ", self.kind, self.state)?;
        match self.lookahead {
            Some(sym) => write!(f, "symbol {sym}"),
            None => f.write_str("end of input"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTable {
    actions: Vec<Vec<Action>>,
}

/// Column index of a lookahead.
#[inline]
pub fn column(la: Lookahead) -> usize {
    la.map_or(0, |s| s + 1)
}

/// Lookahead of a column index.
#[inline]
pub fn lookahead(column: usize) -> Lookahead {
    column.checked_sub(1)
}

#[derive(Clone, Copy)]
struct Candidate {
    action: Action,
    precedence: usize,
}

impl ParseTable {
    /// Generates the table; a pure function of the automaton and the
    /// grammar's precedence data.
    pub fn generate<T>(grammar: &Grammar<T>, lr0: &Lr0Automaton, lalr: &LalrSets) -> Self {
        let n_columns = grammar.symbol_count() + 1;
        let mut actions = Vec::with_capacity(lr0.state_count());
        for state in 0..lr0.state_count() {
            let mut row = Vec::with_capacity(n_columns);
            for col in 0..n_columns {
                let candidates = candidates(grammar, lr0, lalr, state, lookahead(col));
                row.push(resolve(grammar, &candidates, lookahead(col)));
            }
            actions.push(row);
        }
        Self { actions }
    }

    pub fn action(&self, state: StateId, la: Lookahead) -> Action {
        self.actions[state][column(la)]
    }

    /// Goto on a nonterminal; `None` if the cell is not a transition.
    pub fn goto(&self, state: StateId, symbol: SymbolId) -> Option<StateId> {
        match self.action(state, Some(symbol)) {
            Action::Shift(target) => Some(target),
            _ => None,
        }
    }

    pub fn row(&self, state: StateId) -> &[Action] {
        &self.actions[state]
    }

    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    pub fn column_count(&self) -> usize {
        self.actions.first().map_or(0, Vec::len)
    }

    /// Every conflict entry, in state then column order.
    pub fn conflicts(&self) -> Vec<Conflict> {
        let mut out = Vec::new();
        for (state, row) in self.actions.iter().enumerate() {
            for action in row {
                let (kind, lookahead) = match *action {
                    Action::ErrorShiftReduce(la) => (ConflictKind::ShiftReduce, la),
                    Action::ErrorReduceReduce(la) => (ConflictKind::ReduceReduce, la),
                    _ => continue,
                };
                out.push(Conflict {
                    state,
                    lookahead,
                    kind,
                });
            }
        }
        out
    }

    pub fn is_conflict_free(&self) -> bool {
        self.actions.iter().flatten().all(|a| !a.is_conflict())
    }
}

fn candidates<T>(
    grammar: &Grammar<T>,
    lr0: &Lr0Automaton,
    lalr: &LalrSets,
    state: StateId,
    la: Lookahead,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    if let Some(sym) = la {
        if let Some(target) = lr0.goto_state(state, sym) {
            out.push(Candidate {
                action: Action::Shift(target),
                precedence: lr0.goto_precedence(state, sym).unwrap_or(usize::MAX),
            });
        }
    }
    for item in lalr.state_items(state) {
        if item.lookahead != la {
            continue;
        }
        let core = lr0.item(item.lr0);
        if !core.is_complete(grammar) {
            continue;
        }
        let action = Action::Reduce(core.production);
        if out.iter().any(|c| c.action == action) {
            continue;
        }
        out.push(Candidate {
            action,
            precedence: grammar.precedence(core.production),
        });
    }
    out
}

fn resolve<T>(grammar: &Grammar<T>, candidates: &[Candidate], la: Lookahead) -> Action {
    let Some(tightest) = candidates.iter().map(|c| c.precedence).min() else {
        return Action::Error(la);
    };
    let survivors: Vec<Action> = candidates
        .iter()
        .filter(|c| c.precedence == tightest)
        .map(|c| c.action)
        .collect();
    if let [only] = survivors.as_slice() {
        return *only;
    }

    let reduces: Vec<Action> = survivors
        .iter()
        .copied()
        .filter(|a| matches!(a, Action::Reduce(_)))
        .collect();
    let shift = survivors
        .iter()
        .copied()
        .find(|a| matches!(a, Action::Shift(_)));
    let derivation = if tightest < grammar.group_count() {
        grammar.derivation(tightest)
    } else {
        Derivation::None
    };
    match (derivation, &reduces[..], shift) {
        (Derivation::LeftMost, [reduce], _) => *reduce,
        (Derivation::RightMost, _, Some(shift)) => shift,
        (Derivation::None, [_], _) => Action::ErrorShiftReduce(la),
        _ => Action::ErrorReduceReduce(la),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::first::FirstSets;
    use crate::grammar::{PrecedenceGroup, Production};
    use crate::lalr;
    use crate::lr0::tests::arith;

    fn table<T>(g: &Grammar<T>) -> (Lr0Automaton, ParseTable) {
        let first = FirstSets::compute(g);
        let mut lr0 = Lr0Automaton::generate(g);
        let kernels = lr0.kernels();
        let sets = lalr::compute(g, &first, &mut lr0, &kernels);
        let table = ParseTable::generate(g, &lr0, &sets);
        (lr0, table)
    }

    #[test]
    fn column_mapping() {
        assert_eq!(column(None), 0);
        assert_eq!(column(Some(4)), 5);
        assert_eq!(lookahead(0), None);
        assert_eq!(lookahead(5), Some(4));
    }

    #[test]
    fn precedence_groups_settle_arithmetic() {
        let g = arith();
        let (lr0, t) = table(&g);
        assert!(t.is_conflict_free());
        let e = lr0.goto_state(0, 1).unwrap();
        let plus_state = lr0.goto_state(e, 4).unwrap();
        let sum = lr0.goto_state(plus_state, 1).unwrap();
        let star_state = lr0.goto_state(e, 3).unwrap();
        let product = lr0.goto_state(star_state, 1).unwrap();
        // E + E . * : multiplication binds tighter, shift
        assert_eq!(t.action(sum, Some(3)), Action::Shift(star_state));
        // E + E . + : same group, left associative, reduce
        assert_eq!(t.action(sum, Some(4)), Action::Reduce(3));
        // E * E . + : reduce the tighter product first
        assert_eq!(t.action(product, Some(4)), Action::Reduce(2));
        assert_eq!(t.action(product, Some(3)), Action::Reduce(2));
        assert_eq!(t.action(product, None), Action::Reduce(2));
        assert_eq!(t.action(0, Some(3)), Action::Error(Some(3)));
        assert_eq!(t.goto(0, 1), Some(e));
    }

    fn ambiguous(derivation: Derivation) -> Grammar<()> {
        Grammar::new(
            ["S'", "E", "int", "+"],
            vec![
                PrecedenceGroup::new(
                    Derivation::None,
                    vec![Production::new(0, [1]), Production::new(1, [2])],
                ),
                PrecedenceGroup::new(derivation, vec![Production::new(1, [1, 3, 1])]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn derivation_settles_ties() {
        let (lr0, left) = table(&ambiguous(Derivation::LeftMost));
        let e = lr0.goto_state(0, 1).unwrap();
        let op = lr0.goto_state(e, 3).unwrap();
        let sum = lr0.goto_state(op, 1).unwrap();
        assert_eq!(left.action(sum, Some(3)), Action::Reduce(2));

        let (_, right) = table(&ambiguous(Derivation::RightMost));
        assert_eq!(right.action(sum, Some(3)), Action::Shift(op));

        let (_, none) = table(&ambiguous(Derivation::None));
        assert_eq!(none.action(sum, Some(3)), Action::ErrorShiftReduce(Some(3)));
        assert_eq!(
            none.conflicts(),
            vec![Conflict {
                state: sum,
                lookahead: Some(3),
                kind: ConflictKind::ShiftReduce
            }]
        );
    }

    #[test]
    fn reduce_reduce_is_reported() {
        // S' -> S ; S -> A | B ; A -> x ; B -> x
        let g: Grammar<()> = Grammar::new(
            ["S'", "S", "A", "B", "x"],
            vec![PrecedenceGroup::new(
                Derivation::LeftMost,
                vec![
                    Production::new(0, [1]),
                    Production::new(1, [2]),
                    Production::new(1, [3]),
                    Production::new(2, [4]),
                    Production::new(3, [4]),
                ],
            )],
        )
        .unwrap();
        let (_, t) = table(&g);
        let conflicts = t.conflicts();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::ReduceReduce);
        assert_eq!(conflicts[0].lookahead, None);
        assert!(conflicts[0].to_string().contains("end of input"));
        assert!(conflicts[0].describe(g.symbols()).ends_with("on $"));
    }
}
