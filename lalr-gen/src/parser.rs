use super::lexer::Token;
use chumsky::prelude::*;
use lalr::Derivation;

#[derive(Debug, Clone, PartialEq)]
pub enum Symbol {
    Term(usize),
    NonTerm(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Production {
    pub label: Option<usize>,
    pub lhs: usize,
    pub rhs: Vec<Symbol>,
}

/// One meaningful line of a grammar file.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    Group(Derivation),
    Production(Production),
}

pub fn parser<'a>() -> impl Parser<'a, &'a [Token], Vec<Line>> {
    let symbol = select! {
        Token::Term(t) => Symbol::Term(t),
        Token::NonTerm(n) => Symbol::NonTerm(n),
    }
    .labelled("symbol");

    let tlist = symbol.repeated().collect::<Vec<_>>();

    let left = select! {
        Token::NonTerm(n) => n,
    }
    .labelled("left");

    let prod_kw = select! { Token::Prod => () }.labelled("Prod");
    let lf = select! { Token::LineFeed => () }.labelled("LineFeed");

    let production_without_label = left
        .then_ignore(prod_kw.clone())
        .then(tlist.clone())
        .then_ignore(lf.clone())
        .map(|(lhs, rhs)| Production {
            label: None,
            lhs,
            rhs,
        });

    let production_with_label = select! { Token::ProdLabel(l) => l }
        .then(left)
        .then_ignore(prod_kw)
        .then(tlist)
        .then_ignore(lf.clone())
        .map(|((label, lhs), rhs)| Production {
            label: Some(label),
            lhs,
            rhs,
        });

    let production = production_with_label
        .or(production_without_label)
        .map(|p| Some(Line::Production(p)));

    let group = select! { Token::Group(d) => d }
        .labelled("directive")
        .then_ignore(lf.clone())
        .map(|d| Some(Line::Group(d)));

    let empty_line = lf.map(|_| None::<Line>);

    production
        .or(group)
        .or(empty_line)
        .repeated()
        .collect::<Vec<_>>()
        .map(|lines| lines.into_iter().flatten().collect::<Vec<_>>())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn productions(lines: &[Line]) -> Vec<&Production> {
        lines
            .iter()
            .filter_map(|l| match l {
                Line::Production(p) => Some(p),
                Line::Group(_) => None,
            })
            .collect()
    }

    #[test]
    fn single_production() {
        let tokens = vec![
            Token::ProdLabel(0),
            Token::NonTerm(1),
            Token::Prod,
            Token::Term(2),
            Token::NonTerm(3),
            Token::LineFeed,
        ];
        let lines = parser().parse(&tokens).into_result().unwrap();
        let prods = productions(&lines);
        assert_eq!(prods.len(), 1);
        let p = prods[0];
        assert_eq!(p.label, Some(0));
        assert_eq!(p.lhs, 1);
        assert_eq!(p.rhs, vec![Symbol::Term(2), Symbol::NonTerm(3)]);
    }

    #[test]
    fn empty_line_skipped() {
        let tokens = vec![Token::LineFeed];
        let lines = parser().parse(&tokens).into_result().unwrap();
        assert!(lines.is_empty());
    }

    #[test]
    fn groups_interleave_with_productions() {
        let tokens = vec![
            Token::NonTerm(1),
            Token::Prod,
            Token::Term(0),
            Token::LineFeed,
            Token::LineFeed,
            Token::Group(Derivation::LeftMost),
            Token::LineFeed,
            Token::ProdLabel(1),
            Token::NonTerm(1),
            Token::Prod,
            Token::NonTerm(1),
            Token::Term(1),
            Token::NonTerm(1),
            Token::LineFeed,
            Token::NonTerm(2),
            Token::Prod,
            Token::LineFeed,
        ];
        let lines = parser().parse(&tokens).into_result().unwrap();
        assert_eq!(lines.len(), 4);
        assert!(matches!(lines[1], Line::Group(Derivation::LeftMost)));
        let prods = productions(&lines);
        assert_eq!(prods[1].label, Some(1));
        assert!(prods[2].rhs.is_empty());
    }

    #[test]
    fn missing_arrow_is_rejected() {
        let tokens = vec![Token::NonTerm(1), Token::Term(0), Token::LineFeed];
        assert!(parser().parse(&tokens).into_result().is_err());
    }
}
