//! The shift-reduce parse driver.
//!
//! A [`Parser`] owns a grammar and its conflict-free parse table. Each call
//! to [`Parser::parse`] runs an independent state machine over its own
//! [`ParserCtx`], so one parser can serve any number of concurrent runs.
//!
//! Input errors are not reported through `Err`: the run stops at the first
//! [`Action::Error`] entry and returns the offending token with a negative
//! state. `Err` is reserved for faults raised by the token source.

use crate::automaton::Automaton;
use crate::error::GrammarError;
use crate::grammar::Grammar;
use crate::item::{ERROR_STATE, Item};
use crate::lr0::StateId;
use crate::source::{LaTokenIter, TokenSource};
use crate::symtab::{SymbolId, Symtab};
use crate::table::{Action, ParseTable};
use smartstring::alias::String;

/// Driver options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Collapse unit reductions `A -> B` (with `B` a nonterminal) into `B`'s
    /// content relabelled as `A`.
    pub trim_reductions: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            trim_reductions: true,
        }
    }
}

impl ParserConfig {
    pub fn with_trim_reductions(mut self, trim: bool) -> Self {
        self.trim_reductions = trim;
        self
    }
}

/// Counters for a single parse run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Tokens pulled from the source, not counting end-of-input.
    pub tokens: usize,
    pub shifts: usize,
    pub reductions: usize,
}

/// Per-run driver state.
///
/// `states[i]` is the automaton state that was current when `values[i]` was
/// pushed; the current state itself is kept outside the stack.
pub struct ParserCtx<S: TokenSource> {
    pub input: LaTokenIter<S>,
    pub values: Vec<Item<S::Content>>,
    pub states: Vec<StateId>,
    pub stats: ParserStats,
}

impl<S: TokenSource> ParserCtx<S> {
    pub fn new(source: S) -> Self {
        Self {
            input: LaTokenIter::new(source),
            values: Vec::new(),
            states: Vec::new(),
            stats: ParserStats::default(),
        }
    }

    fn advance(&mut self) -> Result<(), S::Error> {
        if self.input.advance()? {
            self.stats.tokens += 1;
        }
        Ok(())
    }

    pub fn dump_state(&self, state: StateId, symbols: &Symtab) {
        let mut output = String::new();
        for (value, below) in self.values.iter().zip(&self.states) {
            output.push_str(&format!(
                "<{}> {}  ",
                below,
                symbols.lookahead_name(value.symbol())
            ));
        }
        output.push_str(&format!(
            "<{}>  <-  {}",
            state,
            symbols.lookahead_name(self.input.lookahead())
        ));
        log::trace!("{}", output);
    }
}

/// A conflict-free parser for one grammar.
pub struct Parser<T> {
    grammar: Grammar<T>,
    table: ParseTable,
    config: ParserConfig,
}

impl<T> Parser<T> {
    /// Builds the table; fails if any conflict survives precedence
    /// resolution.
    pub fn new(grammar: Grammar<T>) -> Result<Self, GrammarError> {
        Self::new_with_config(grammar, ParserConfig::default())
    }

    pub fn new_with_config(grammar: Grammar<T>, config: ParserConfig) -> Result<Self, GrammarError> {
        let (_, table) = Automaton::build(&grammar);
        let conflicts = table.conflicts();
        if !conflicts.is_empty() {
            return Err(GrammarError::Conflicts(conflicts));
        }
        Ok(Self {
            grammar,
            table,
            config,
        })
    }

    pub fn grammar(&self) -> &Grammar<T> {
        &self.grammar
    }

    pub fn table(&self) -> &ParseTable {
        &self.table
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    /// Parses the whole token stream.
    ///
    /// Returns the root of the tree on acceptance, or the offending token
    /// with a negative state on a syntax error.
    ///
    /// A token whose symbol is a nonterminal or out of range is a syntax
    /// error like any other unexpected token.
    ///
    /// # Panics
    ///
    /// If the table holds a conflict entry; [`Parser::new`] rejects such
    /// tables, so this indicates a bug in table construction.
    pub fn parse<S>(&self, source: S) -> Result<Item<T>, S::Error>
    where
        S: TokenSource<Content = T>,
    {
        self.parse_with_stats(source).map(|(item, _)| item)
    }

    /// Like [`parse`](Self::parse), also returning run counters.
    pub fn parse_with_stats<S>(&self, source: S) -> Result<(Item<T>, ParserStats), S::Error>
    where
        S: TokenSource<Content = T>,
    {
        let mut ctx = ParserCtx::new(source);
        let mut state: StateId = 0;
        ctx.advance()?;
        loop {
            if log::log_enabled!(log::Level::Trace) {
                ctx.dump_state(state, self.grammar.symbols());
            }
            let la = ctx.input.lookahead();
            let action = match la {
                Some(sym) if !self.is_input_symbol(sym) => Action::Error(la),
                _ => self.table.action(state, la),
            };
            match action {
                Action::Shift(next) => {
                    log::trace!("Shift {}", next);
                    let mut token = ctx.input.take_current().unwrap_or_else(Item::eof);
                    annotate(&mut token, next);
                    ctx.values.push(token);
                    ctx.states.push(state);
                    state = next;
                    ctx.stats.shifts += 1;
                    ctx.advance()?;
                }

                Action::Reduce(production) => {
                    log::trace!("Reduce {}", self.grammar.display_production(production));
                    let prod = self.grammar.production(production);
                    let n = prod.len();
                    let at = ctx.values.len() - n;
                    let children = ctx.values.split_off(at);
                    let below = if n == 0 { state } else { ctx.states[at] };
                    ctx.states.truncate(at);
                    let mut node = self.reduce(production, children);
                    ctx.stats.reductions += 1;

                    if prod.left() == 0 && ctx.values.is_empty() {
                        log::trace!("Accept");
                        return Ok((node, ctx.stats));
                    }
                    let Some(next) = self.table.goto(below, prod.left()) else {
                        panic!("no goto from state {below} on symbol {}", prod.left());
                    };
                    annotate(&mut node, next);
                    ctx.values.push(node);
                    ctx.states.push(below);
                    state = next;
                }

                Action::Error(_) => {
                    log::debug!(
                        "syntax error in state {} on {}",
                        state,
                        self.grammar.symbols().lookahead_name(la)
                    );
                    let mut token = ctx.input.take_current().unwrap_or_else(Item::eof);
                    token.set_state(ERROR_STATE);
                    return Ok((token, ctx.stats));
                }

                Action::ErrorShiftReduce(_) | Action::ErrorReduceReduce(_) => {
                    panic!(
                        "unresolved conflict in state {} on {}",
                        state,
                        self.grammar.symbols().lookahead_name(la)
                    );
                }
            }
        }
    }

    /// Only terminals may come from the token source; nonterminal columns
    /// hold gotos.
    fn is_input_symbol(&self, symbol: SymbolId) -> bool {
        symbol < self.grammar.symbol_count() && !self.grammar.is_nonterminal(symbol)
    }

    /// Builds the node for a reduction: the rewrite hook's result if it
    /// returns one, else the trimmed child, else a generic reduction.
    fn reduce(&self, production: usize, mut children: Vec<Item<T>>) -> Item<T> {
        let prod = self.grammar.production(production);
        if let Some(item) = prod.rewrite(&children) {
            return item;
        }
        if self.config.trim_reductions {
            if let [only] = prod.right() {
                if self.grammar.is_nonterminal(*only) {
                    if let Some(child) = children.pop() {
                        return child.relabeled(prod.left());
                    }
                }
            }
        }
        Item::reduction(prod.left(), production, children)
    }
}

/// Records the automaton state on a stack entry unless it is already in
/// error.
fn annotate<T>(item: &mut Item<T>, state: StateId) {
    if item.state() >= 0 {
        item.set_state(state as isize);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Derivation, PrecedenceGroup, Production};
    use crate::item::Node;
    use crate::source::{IterSource, TryIterSource};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    const INT: usize = 2;
    const STAR: usize = 3;
    const PLUS: usize = 4;

    fn groups<T>() -> Vec<PrecedenceGroup<T>> {
        vec![
            PrecedenceGroup::new(
                Derivation::None,
                vec![Production::new(0, [1]), Production::new(1, [INT])],
            ),
            PrecedenceGroup::new(Derivation::LeftMost, vec![Production::new(1, [1, STAR, 1])]),
            PrecedenceGroup::new(Derivation::LeftMost, vec![Production::new(1, [1, PLUS, 1])]),
        ]
    }

    fn grammar<T>(groups: Vec<PrecedenceGroup<T>>) -> Grammar<T> {
        Grammar::new(["S'", "E", "int", "*", "+"], groups).unwrap()
    }

    fn lex(input: &str) -> IterSource<std::vec::IntoIter<Item<char>>> {
        let items: Vec<_> = input
            .chars()
            .map(|c| match c {
                '*' => Item::scalar(STAR, c),
                '+' => Item::scalar(PLUS, c),
                _ => Item::scalar(INT, c),
            })
            .collect();
        IterSource(items.into_iter())
    }

    #[test]
    fn accepts_and_keeps_every_leaf() {
        init_logger();
        let parser = Parser::new(grammar(groups())).unwrap();
        let root = parser.parse(lex("1+2*3+4")).unwrap();
        assert_eq!(root.symbol(), Some(0));
        assert!(!root.is_error());
        let leaves: std::string::String =
            root.leaves().iter().filter_map(|l| l.scalar_value()).collect();
        assert_eq!(leaves, "1+2*3+4");
    }

    #[test]
    fn precedence_and_associativity_shape_the_tree() {
        init_logger();
        let parser = Parser::new(grammar(groups())).unwrap();
        let show = |s: &str| parser.parse(lex(s)).unwrap().to_string();
        assert_eq!(show("1+2*3"), "[[1] + [[2] * [3]]]");
        assert_eq!(show("1*2+3"), "[[[1] * [2]] + [3]]");
        assert_eq!(show("1+2+3"), "[[[1] + [2]] + [3]]");
        assert_eq!(show("7"), "[7]");
    }

    #[test]
    fn syntax_error_returns_offending_token() {
        init_logger();
        let parser = Parser::new(grammar(groups())).unwrap();
        let bad = parser.parse(lex("1+*2")).unwrap();
        assert!(bad.state() < 0);
        assert!(bad.is_error());
        assert_eq!(bad.symbol(), Some(STAR));

        let early_end = parser.parse(lex("1+")).unwrap();
        assert!(early_end.is_eof());
        assert!(early_end.is_error());

        let empty = parser.parse(lex("")).unwrap();
        assert!(empty.is_eof() && empty.is_error());
    }

    #[test]
    fn non_terminal_tokens_are_rejected() {
        init_logger();
        let parser = Parser::new(grammar::<char>(groups())).unwrap();

        let as_goal = parser.parse(IterSource(vec![Item::empty(1)].into_iter())).unwrap();
        assert!(as_goal.is_error());
        assert_eq!(as_goal.symbol(), Some(1));

        let mid_input = vec![Item::scalar(INT, '1'), Item::scalar(PLUS, '+'), Item::empty(1)];
        let bad = parser.parse(IterSource(mid_input.into_iter())).unwrap();
        assert!(bad.state() < 0);
        assert_eq!(bad.symbol(), Some(1));

        let unknown = parser.parse(IterSource(vec![Item::empty(99)].into_iter())).unwrap();
        assert!(unknown.is_error());
        assert_eq!(unknown.symbol(), Some(99));
    }

    #[test]
    fn trim_toggle_only_changes_unit_reductions() {
        init_logger();
        let trimmed = Parser::new(grammar(groups())).unwrap();
        let full = Parser::new_with_config(
            grammar(groups()),
            ParserConfig::default().with_trim_reductions(false),
        )
        .unwrap();
        let a = trimmed.parse(lex("1+2")).unwrap();
        let b = full.parse(lex("1+2")).unwrap();
        assert_eq!(a.as_reduction().unwrap().production, 3);
        assert_eq!(a.symbol(), Some(0));
        let start = b.as_reduction().unwrap();
        assert_eq!(start.production, 0);
        assert_eq!(start.children.len(), 1);
        assert_eq!(start.children[0].node(), a.node());
    }

    fn folding() -> Grammar<i64> {
        let num = |left, c: &[Item<i64>]| Some(Item::scalar(left, *c[0].scalar_value()?));
        let mul = |left, c: &[Item<i64>]| {
            let (a, b) = (*c[0].scalar_value()?, *c[2].scalar_value()?);
            Some(Item::scalar(left, a * b))
        };
        let add = |left, c: &[Item<i64>]| {
            let (a, b) = (*c[0].scalar_value()?, *c[2].scalar_value()?);
            if b == 0 {
                // adding zero is flagged so error propagation can be observed
                return Some(Item::scalar(left, a).with_state(ERROR_STATE));
            }
            Some(Item::scalar(left, a + b))
        };
        grammar(vec![
            PrecedenceGroup::new(
                Derivation::None,
                vec![Production::new(0, [1]), Production::new(1, [INT]).with_rewrite(num)],
            ),
            PrecedenceGroup::new(
                Derivation::LeftMost,
                vec![Production::new(1, [1, STAR, 1]).with_rewrite(mul)],
            ),
            PrecedenceGroup::new(
                Derivation::LeftMost,
                vec![Production::new(1, [1, PLUS, 1]).with_rewrite(add)],
            ),
        ])
    }

    fn numbers(input: &str) -> IterSource<std::vec::IntoIter<Item<i64>>> {
        let items: Vec<_> = input
            .chars()
            .map(|c| match c {
                '*' => Item::empty(STAR),
                '+' => Item::empty(PLUS),
                _ => Item::scalar(INT, c.to_digit(10).unwrap() as i64),
            })
            .collect();
        IterSource(items.into_iter())
    }

    #[test]
    fn rewrite_hooks_fold_constants() {
        init_logger();
        let parser = Parser::new(folding()).unwrap();
        let (root, stats) = parser.parse_with_stats(numbers("1+2*3")).unwrap();
        assert_eq!(root.scalar_value(), Some(&7));
        assert!(!root.is_error());
        assert_eq!(stats.tokens, 5);
        assert_eq!(stats.shifts, 5);
        // three operands, two operators, one start
        assert_eq!(stats.reductions, 6);
    }

    #[test]
    fn error_from_rewrite_reaches_the_root() {
        init_logger();
        let parser = Parser::new(folding()).unwrap();
        let root = parser.parse(numbers("2*3+0*5")).unwrap();
        assert!(root.is_error());
        assert!(matches!(root.node(), Node::Scalar(6)));
    }

    #[test]
    fn source_fault_aborts_the_run() {
        init_logger();
        let parser = Parser::new(grammar::<char>(groups())).unwrap();
        let tokens = vec![Ok(Item::scalar(INT, '1')), Err("stream closed")];
        let res = parser.parse(TryIterSource(tokens.into_iter()));
        assert_eq!(res.err(), Some("stream closed"));
    }

    #[test]
    fn conflicting_grammar_is_rejected() {
        init_logger();
        let g: Grammar<()> = grammar(vec![
            PrecedenceGroup::new(
                Derivation::None,
                vec![Production::new(0, [1]), Production::new(1, [INT])],
            ),
            PrecedenceGroup::new(
                Derivation::None,
                vec![Production::new(1, [1, PLUS, 1])],
            ),
        ]);
        match Parser::new(g) {
            Err(GrammarError::Conflicts(conflicts)) => assert!(!conflicts.is_empty()),
            other => panic!("expected conflicts, got {:?}", other.err()),
        }
    }

    fn _assert_send_sync<T: Send + Sync>() {}
    #[test]
    fn parser_is_send_sync() {
        _assert_send_sync::<Parser<i64>>();
    }
}
