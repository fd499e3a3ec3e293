//! Grammar files.
//!
//! A grammar file is a list of lines:
//!
//! ```text
//! -- comment
//! Expr -> num
//! paren: Expr -> ( Expr )
//! %left
//! mul: Expr -> Expr * Expr
//! ```
//!
//! Uppercase identifiers are nonterminals; lowercase identifiers and
//! punctuation are terminals. `%none`, `%left` and `%right` open a new
//! precedence group; productions before the first directive belong to an
//! implicit `%none` group. The augmented production `start: Start -> X`,
//! where `X` is the first nonterminal in the file, is prepended to the first
//! group.
//!
//! Symbol ids list nonterminals first (`Start` is `0`), then terminals.

use crate::lexer::{LexContext, Lexer, Token};
use crate::parser::{self, Line, Symbol};
use anyhow::{Context, Result, anyhow, bail};
use chumsky::Parser as _;
use lalr::{Derivation, Grammar, GrammarError, PrecedenceGroup, Production, Rewrite, SymbolId};
use smartstring::alias::String;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductionSpec {
    pub label: String,
    pub left: SymbolId,
    pub right: Vec<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub derivation: Derivation,
    pub productions: Vec<ProductionSpec>,
}

/// A parsed grammar file, independent of any token content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarSpec {
    pub symbols: Vec<String>,
    pub n_nonterminals: usize,
    pub groups: Vec<GroupSpec>,
}

impl GrammarSpec {
    pub fn parse(source: &str) -> Result<Self> {
        let mut ctx = LexContext::default();
        ctx.prod_labels.add("start");
        ctx.nonterms.add("Start");
        let mut toks = Lexer::tokenize_all(source, &mut ctx)?;
        if toks.last().is_some_and(|t| *t != Token::LineFeed) {
            toks.push(Token::LineFeed);
        }
        let lines = parser::parser()
            .parse(&toks)
            .into_result()
            .map_err(|errs| anyhow!("malformed grammar ({} parse errors)", errs.len()))?;
        if ctx.nonterms.len() < 2 {
            bail!("grammar declares no nonterminals");
        }

        let n_nonterminals = ctx.nonterms.len();
        let to_id = |sym: &Symbol| match sym {
            Symbol::NonTerm(i) => *i,
            Symbol::Term(i) => *i + n_nonterminals,
        };

        let mut groups = vec![GroupSpec {
            derivation: Derivation::None,
            productions: vec![ProductionSpec {
                label: String::from("start"),
                left: 0,
                right: vec![1],
            }],
        }];
        let mut n_prods = 1;
        for line in lines {
            match line {
                Line::Group(derivation) => groups.push(GroupSpec {
                    derivation,
                    productions: Vec::new(),
                }),
                Line::Production(p) => {
                    let label = match p.label.and_then(|l| ctx.prod_labels.sym(l)) {
                        Some(name) => String::from(name),
                        None => String::from(format!("rule{n_prods}").as_str()),
                    };
                    let spec = ProductionSpec {
                        label,
                        left: p.lhs,
                        right: p.rhs.iter().map(to_id).collect(),
                    };
                    if let Some(group) = groups.last_mut() {
                        group.productions.push(spec);
                    }
                    n_prods += 1;
                }
            }
        }

        let symbols: Vec<String> = ctx
            .nonterms
            .iter()
            .chain(ctx.terms.iter())
            .map(String::from)
            .collect();
        let spec = Self {
            symbols,
            n_nonterminals,
            groups,
        };
        for nt in 1..n_nonterminals {
            if !spec.productions().any(|p| p.left == nt) {
                log::warn!("nonterminal {} has no productions", spec.symbols[nt]);
            }
        }
        Ok(spec)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("reading grammar {}", path.display()))?;
        Self::parse(&source).with_context(|| format!("in grammar {}", path.display()))
    }

    /// Productions in global id order.
    pub fn productions(&self) -> impl Iterator<Item = &ProductionSpec> {
        self.groups.iter().flat_map(|g| g.productions.iter())
    }

    /// Production labels in global id order.
    pub fn labels(&self) -> Vec<&str> {
        self.productions().map(|p| p.label.as_str()).collect()
    }

    pub fn symbol(&self, name: &str) -> Option<SymbolId> {
        self.symbols.iter().position(|s| s.as_str() == name)
    }

    pub fn production_id(&self, label: &str) -> Option<usize> {
        self.productions().position(|p| p.label.as_str() == label)
    }

    /// Builds a grammar without rewrite hooks.
    pub fn build<T: 'static>(&self) -> Result<Grammar<T>, GrammarError> {
        self.build_with(|_| None)
    }

    /// Builds a grammar, asking `rewrite` for a hook by production label.
    pub fn build_with<T: 'static, F>(&self, mut rewrite: F) -> Result<Grammar<T>, GrammarError>
    where
        F: FnMut(&str) -> Option<Rewrite<T>>,
    {
        let groups = self
            .groups
            .iter()
            .map(|g| {
                let productions = g
                    .productions
                    .iter()
                    .map(|p| {
                        let prod = Production::new(p.left, p.right.iter().copied());
                        match rewrite(p.label.as_str()) {
                            Some(hook) => prod.with_rewrite(hook),
                            None => prod,
                        }
                    })
                    .collect();
                PrecedenceGroup::new(g.derivation, productions)
            })
            .collect();
        Grammar::new(self.symbols.iter().map(String::as_str), groups)
    }
}
