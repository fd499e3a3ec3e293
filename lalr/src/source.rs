//! Token sources.
//!
//! The driver pulls tokens one at a time from a [`TokenSource`]. A source
//! either yields the next [`Item`], reports end of stream with `Ok(None)`, or
//! fails; a failure aborts the parse and is handed back to the caller
//! unchanged.
//!
//! [`LaTokenIter`] wraps a source with one token of lookahead and turns end
//! of stream into the end-of-input item.

use crate::item::Item;
use crate::symtab::Lookahead;
use std::convert::Infallible;

/// A fallible pull-based stream of tokens.
pub trait TokenSource {
    type Content;
    type Error;

    fn try_next(&mut self) -> Result<Option<Item<Self::Content>>, Self::Error>;
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    type Content = S::Content;
    type Error = S::Error;

    fn try_next(&mut self) -> Result<Option<Item<Self::Content>>, Self::Error> {
        (**self).try_next()
    }
}

/// Adapts an infallible iterator of items.
#[derive(Debug, Clone)]
pub struct IterSource<I>(pub I);

impl<T, I> TokenSource for IterSource<I>
where
    I: Iterator<Item = Item<T>>,
{
    type Content = T;
    type Error = Infallible;

    fn try_next(&mut self) -> Result<Option<Item<T>>, Infallible> {
        Ok(self.0.next())
    }
}

/// Adapts an iterator of `Result`s.
#[derive(Debug, Clone)]
pub struct TryIterSource<I>(pub I);

impl<T, E, I> TokenSource for TryIterSource<I>
where
    I: Iterator<Item = Result<Item<T>, E>>,
{
    type Content = T;
    type Error = E;

    fn try_next(&mut self) -> Result<Option<Item<T>>, E> {
        self.0.next().transpose()
    }
}

/// Single-token lookahead over a [`TokenSource`].
///
/// Nothing is pulled until the first [`advance`](Self::advance). Once the
/// source is exhausted the current item stays at end-of-input and the source
/// is not polled again.
pub struct LaTokenIter<S: TokenSource> {
    source: S,
    current: Option<Item<S::Content>>,
    exhausted: bool,
}

impl<S: TokenSource> LaTokenIter<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            current: None,
            exhausted: false,
        }
    }

    /// Moves to the next token; returns `false` at end-of-input.
    pub fn advance(&mut self) -> Result<bool, S::Error> {
        if self.exhausted {
            self.current = Some(Item::eof());
            return Ok(false);
        }
        match self.source.try_next()? {
            Some(item) => {
                self.current = Some(item);
                Ok(true)
            }
            None => {
                self.exhausted = true;
                self.current = Some(Item::eof());
                Ok(false)
            }
        }
    }

    /// The current token; `None` before the first advance or after
    /// [`take_current`](Self::take_current).
    pub fn current(&self) -> Option<&Item<S::Content>> {
        self.current.as_ref()
    }

    pub fn take_current(&mut self) -> Option<Item<S::Content>> {
        self.current.take()
    }

    /// Lookahead of the current token; end-of-input when there is none.
    pub fn lookahead(&self) -> Lookahead {
        self.current.as_ref().and_then(Item::symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_of_stream_becomes_eof_item() {
        let items = vec![Item::scalar(3, 'a'), Item::empty(4)];
        let mut la = LaTokenIter::new(IterSource(items.into_iter()));
        assert_eq!(la.lookahead(), None);
        assert!(la.advance().unwrap());
        assert_eq!(la.lookahead(), Some(3));
        assert!(la.advance().unwrap());
        assert_eq!(la.lookahead(), Some(4));
        assert!(!la.advance().unwrap());
        assert!(la.current().unwrap().is_eof());
        assert!(!la.advance().unwrap());
        assert!(la.current().unwrap().is_eof());
    }

    #[test]
    fn source_fault_is_passed_through() {
        let results: Vec<Result<Item<()>, &str>> = vec![Ok(Item::empty(2)), Err("bad byte")];
        let mut la = LaTokenIter::new(TryIterSource(results.into_iter()));
        assert!(la.advance().unwrap());
        assert_eq!(la.advance(), Err("bad byte"));
    }

    #[test]
    fn take_current_moves_token_out() {
        let mut la = LaTokenIter::new(IterSource(std::iter::once(Item::scalar(1, 7))));
        la.advance().unwrap();
        let tok = la.take_current().unwrap();
        assert_eq!(tok.scalar_value(), Some(&7));
        assert!(la.current().is_none());
    }
}
