//! Text dumps of a grammar's construction.
//!
//! Each writer emits one section in a line-oriented, comma-separated format
//! that is easy to grep and diff. Sections start with a header line holding
//! a tag and a count, for example `PS,5` for five productions.

use crate::spec::GrammarSpec;
use anyhow::{Context, Result};
use lalr::{Action, Automaton, Conflict, FirstSets, Grammar, Lr0Item, ParseTable};
use std::io::{self, Write};
use std::path::Path;

/// Formats an LR(0) item as `E -> E . + E`.
pub fn format_item<T>(grammar: &Grammar<T>, item: Lr0Item) -> String {
    let symbols = grammar.symbols();
    let prod = grammar.production(item.production);
    let mut s = format!("{} ->", symbols.sym(prod.left()).unwrap_or("?"));
    for (j, &sym) in prod.right().iter().enumerate() {
        if j == item.position {
            s.push_str(" .");
        }
        s.push(' ');
        s.push_str(symbols.sym(sym).unwrap_or("?"));
    }
    if item.position >= prod.len() {
        s.push_str(" .");
    }
    s
}

fn format_action<T>(grammar: &Grammar<T>, action: Action) -> String {
    let la = |la| grammar.symbols().lookahead_name(la).to_string();
    match action {
        Action::Shift(state) => format!("Shift({state})"),
        Action::Reduce(prod) => format!("Reduce({prod})"),
        Action::Error(_) => "Error".to_string(),
        Action::ErrorShiftReduce(l) => format!("ErrorShiftReduce({})", la(l)),
        Action::ErrorReduceReduce(l) => format!("ErrorReduceReduce({})", la(l)),
    }
}

/// Writes the grammar productions.
///
/// ```text
/// PS,<number of productions>
///
/// P,<id>,<label>,<group>,<derivation>,<left> -> <right…>
/// ```
pub fn write_prods<W: Write, T>(
    out: &mut W,
    grammar: &Grammar<T>,
    labels: &[&str],
) -> io::Result<()> {
    writeln!(out, "PS,{}\n", grammar.productions().len())?;
    for i in 0..grammar.productions().len() {
        let group = grammar.precedence(i);
        writeln!(
            out,
            "P,{},{},{},{},{}",
            i,
            labels.get(i).copied().unwrap_or(""),
            group,
            grammar.derivation(group).to_str(),
            grammar.display_production(i)
        )?;
    }
    writeln!(out)
}

/// Writes the canonical LR(0) collection and its transitions.
pub fn write_lr0_states<W: Write, T>(
    out: &mut W,
    grammar: &Grammar<T>,
    automaton: &Automaton,
) -> io::Result<()> {
    let lr0 = automaton.lr0();
    writeln!(out, "CS,{}\n", lr0.state_count())?;
    for (state, items) in lr0.states().iter().enumerate() {
        let kernel = &automaton.kernels()[state];
        for &id in items {
            let tag = if kernel.contains(&id) { "K" } else { "C" };
            writeln!(out, "{},{},{}", tag, state, format_item(grammar, lr0.item(id)))?;
        }
        for (sym, target) in lr0.gotos()[state].iter().enumerate() {
            if let Some(target) = target {
                writeln!(
                    out,
                    "G,{},{},{},{}",
                    state,
                    grammar.symbols().sym(sym).unwrap_or("?"),
                    target,
                    lr0.goto_precedence(state, sym).unwrap_or_default()
                )?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Writes FIRST sets, with `` `empty' `` for nullable symbols.
pub fn write_first<W: Write, T>(
    out: &mut W,
    grammar: &Grammar<T>,
    first: &FirstSets,
) -> io::Result<()> {
    let symbols = grammar.symbols();
    for sym in 0..first.len() {
        write!(out, "FIRST,{},{{", symbols.sym(sym).unwrap_or("?"))?;
        if first.is_nullable(sym) {
            write!(out, "`empty', ")?;
        }
        for &t in first.first(sym) {
            write!(out, "{}, ", symbols.sym(t).unwrap_or("?"))?;
        }
        writeln!(out, "}}")?;
    }
    writeln!(out)
}

/// Writes the LALR(1) item sets.
pub fn write_lalr_states<W: Write, T>(
    out: &mut W,
    grammar: &Grammar<T>,
    automaton: &Automaton,
) -> io::Result<()> {
    let lalr = automaton.lalr();
    writeln!(out, "LS,{}\n", lalr.states.len())?;
    for state in 0..lalr.states.len() {
        for item in lalr.state_items(state) {
            writeln!(
                out,
                "L,{},{}, {}",
                state,
                format_item(grammar, automaton.lr0().item(item.lr0)),
                grammar.symbols().lookahead_name(item.lookahead)
            )?;
        }
    }
    writeln!(out)
}

/// Writes the lookahead propagation edges.
pub fn write_propagations<W: Write, T>(
    out: &mut W,
    grammar: &Grammar<T>,
    automaton: &Automaton,
) -> io::Result<()> {
    let edges = automaton.propagations();
    let lr0 = automaton.lr0();
    writeln!(out, "PRS,{}\n", edges.values().map(|t| t.len()).sum::<usize>())?;
    for (&(state, item), targets) in edges {
        for &(target, succ) in targets {
            writeln!(
                out,
                "PR,{},{} => {},{}",
                state,
                format_item(grammar, lr0.item(item)),
                target,
                format_item(grammar, lr0.item(succ))
            )?;
        }
    }
    writeln!(out)
}

/// Writes every non-error table entry, one per line.
pub fn write_table<W: Write, T>(
    out: &mut W,
    grammar: &Grammar<T>,
    table: &ParseTable,
) -> io::Result<()> {
    writeln!(out, "TAB,{},{}\n", table.state_count(), table.column_count())?;
    for state in 0..table.state_count() {
        for (col, &action) in table.row(state).iter().enumerate() {
            if matches!(action, Action::Error(_)) {
                continue;
            }
            let la = grammar.symbols().lookahead_name(col.checked_sub(1));
            writeln!(out, "T,{},{},{}", state, la, format_action(grammar, action))?;
        }
    }
    writeln!(out)
}

pub fn write_conflicts<W: Write, T>(
    out: &mut W,
    grammar: &Grammar<T>,
    conflicts: &[Conflict],
) -> io::Result<()> {
    writeln!(out, "XS,{}\n", conflicts.len())?;
    for c in conflicts {
        writeln!(out, "X,{}", c.describe(grammar.symbols()))?;
    }
    writeln!(out)
}

/// Builds `spec` and writes every section; returns the unresolved conflicts.
pub fn write_report<W: Write>(out: &mut W, spec: &GrammarSpec) -> Result<Vec<Conflict>> {
    let grammar: Grammar<()> = spec.build()?;
    let (automaton, table) = Automaton::build(&grammar);
    let conflicts = table.conflicts();

    write_prods(out, &grammar, &spec.labels())?;
    write_lr0_states(out, &grammar, &automaton)?;
    write_first(out, &grammar, automaton.first_sets())?;
    write_lalr_states(out, &grammar, &automaton)?;
    write_propagations(out, &grammar, &automaton)?;
    write_table(out, &grammar, &table)?;
    write_conflicts(out, &grammar, &conflicts)?;
    Ok(conflicts)
}

/// Reads a grammar file and writes its full report to `out_path`.
pub fn report<P: AsRef<Path>, Q: AsRef<Path>>(grammar_path: P, out_path: Q) -> Result<Vec<Conflict>> {
    let spec = GrammarSpec::load(grammar_path)?;
    let out_path = out_path.as_ref();
    let file = std::fs::File::create(out_path)
        .with_context(|| format!("creating {}", out_path.display()))?;
    let mut out = io::BufWriter::new(file);
    let conflicts = write_report(&mut out, &spec)?;
    out.flush()?;
    Ok(conflicts)
}
