//! # Parse-tree items
//!
//! [`Item<T>`] is both the token type consumed by the driver and the node
//! type of the tree it produces. Its payload is a [`Node<T>`]:
//!
//! - [`Node::Empty`]: no content (end-of-input, bare punctuation),
//! - [`Node::Scalar`]: a user value, typically attached by the token source
//!   or by a rewrite hook,
//! - [`Node::Nested`]: a single wrapped item,
//! - [`Node::Reduction`]: a production id with its ordered children.
//!
//! Every item carries a *state*: non-negative for normal items, negative
//! ([`ERROR_STATE`]) for items that are in error. [`Item::is_error`] ORs the
//! item's own state with the error flags of its children, computes this once
//! and caches it; [`Item::set_state`] drops the cached value.

use crate::symtab::SymbolId;
use std::cell::Cell;
use std::fmt;

/// State value marking an item as erroneous.
pub const ERROR_STATE: isize = -1;

/// Payload of a parse-tree item.
#[derive(Debug, Clone, PartialEq)]
pub enum Node<T> {
    Empty,
    Scalar(T),
    Nested(Box<Item<T>>),
    Reduction(Reduction<T>),
}

/// A generic reduction: the reduced production and its children in
/// left-to-right order.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction<T> {
    pub production: usize,
    pub children: Vec<Item<T>>,
}

/// A token or parse-tree node.
#[derive(Debug, Clone)]
pub struct Item<T> {
    symbol: Option<SymbolId>,
    state: isize,
    node: Node<T>,
    in_error: Cell<Option<bool>>,
}

impl<T> Item<T> {
    /// Creates an item for `symbol`.
    ///
    /// A reduction with an erroneous child starts out in [`ERROR_STATE`].
    pub fn new(symbol: SymbolId, node: Node<T>) -> Self {
        let state = match &node {
            Node::Reduction(r) if r.children.iter().any(Item::is_error) => ERROR_STATE,
            _ => 0,
        };
        Self {
            symbol: Some(symbol),
            state,
            node,
            in_error: Cell::new(None),
        }
    }

    pub fn scalar(symbol: SymbolId, value: T) -> Self {
        Self::new(symbol, Node::Scalar(value))
    }

    pub fn empty(symbol: SymbolId) -> Self {
        Self::new(symbol, Node::Empty)
    }

    pub fn nested(symbol: SymbolId, item: Item<T>) -> Self {
        Self::new(symbol, Node::Nested(Box::new(item)))
    }

    pub fn reduction(symbol: SymbolId, production: usize, children: Vec<Item<T>>) -> Self {
        Self::new(
            symbol,
            Node::Reduction(Reduction {
                production,
                children,
            }),
        )
    }

    /// The end-of-input sentinel.
    pub fn eof() -> Self {
        Self {
            symbol: None,
            state: 0,
            node: Node::Empty,
            in_error: Cell::new(None),
        }
    }

    /// Moves this item's content under a new symbol, keeping an error mark.
    pub fn relabeled(self, symbol: SymbolId) -> Self {
        let in_error = self.is_error();
        let mut item = Item::new(symbol, self.node);
        if in_error {
            item.state = ERROR_STATE;
        }
        item
    }

    /// Returns this item with its state replaced.
    pub fn with_state(mut self, state: isize) -> Self {
        self.set_state(state);
        self
    }

    /// The item's symbol; `None` for the end-of-input sentinel.
    pub fn symbol(&self) -> Option<SymbolId> {
        self.symbol
    }

    pub fn is_eof(&self) -> bool {
        self.symbol.is_none()
    }

    pub fn state(&self) -> isize {
        self.state
    }

    pub fn set_state(&mut self, state: isize) {
        self.state = state;
        self.in_error.set(None);
    }

    pub fn node(&self) -> &Node<T> {
        &self.node
    }

    pub fn scalar_value(&self) -> Option<&T> {
        match &self.node {
            Node::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn nested_item(&self) -> Option<&Item<T>> {
        match &self.node {
            Node::Nested(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_reduction(&self) -> Option<&Reduction<T>> {
        match &self.node {
            Node::Reduction(r) => Some(r),
            _ => None,
        }
    }

    /// Children of a reduction; empty for every other kind of node.
    pub fn children(&self) -> &[Item<T>] {
        match &self.node {
            Node::Reduction(r) => &r.children,
            _ => &[],
        }
    }

    /// True if this item, or anything below it, is in error.
    pub fn is_error(&self) -> bool {
        if let Some(in_error) = self.in_error.get() {
            return in_error;
        }
        if self.state < 0 {
            return true;
        }
        let in_error = match &self.node {
            Node::Nested(item) => item.is_error(),
            Node::Reduction(r) => r.children.iter().any(Item::is_error),
            Node::Empty | Node::Scalar(_) => false,
        };
        self.in_error.set(Some(in_error));
        in_error
    }

    /// Leaf items (scalars and empties) in left-to-right order.
    pub fn leaves(&self) -> Vec<&Item<T>> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Item<T>>) {
        match &self.node {
            Node::Nested(item) => item.collect_leaves(out),
            Node::Reduction(r) => r.children.iter().for_each(|c| c.collect_leaves(out)),
            Node::Empty | Node::Scalar(_) => out.push(self),
        }
    }
}

impl<T: PartialEq> PartialEq for Item<T> {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol && self.state == other.state && self.node == other.node
    }
}

impl<T: fmt::Display> fmt::Display for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Empty => Ok(()),
            Node::Scalar(v) => write!(f, "{v}"),
            Node::Nested(item) => write!(f, "{item}"),
            Node::Reduction(r) => {
                write!(f, "[")?;
                for (i, child) in r.children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl<T: fmt::Display> fmt::Display for Item<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_eof() {
            return write!(f, "{}", crate::symtab::EOF_NAME);
        }
        write!(f, "{}", self.node)
    }
}
