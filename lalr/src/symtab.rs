//! # Symbol table
//!
//! Maps dense symbol ids to display names. Ids are assigned in declaration
//! order and double as array indices throughout the automaton and the parse
//! table. End-of-input is not a symbol; it is represented by the `None`
//! [`Lookahead`](crate::Lookahead).

use indexmap::IndexSet;
use smartstring::alias::String;

/// Dense, zero-based symbol identifier.
pub type SymbolId = usize;

/// A parse-table column key: a symbol, or `None` for end-of-input.
pub type Lookahead = Option<SymbolId>;

/// Display name used for the end-of-input sentinel.
pub const EOF_NAME: &str = "$";

/// An insertion-ordered set of symbol names.
///
/// Adding a name that is already present returns the existing id.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Symtab {
    names: IndexSet<String>,
}

impl Symtab {
    pub fn new() -> Self {
        Self {
            names: IndexSet::new(),
        }
    }

    /// Interns `sym` and returns its id.
    pub fn add(&mut self, sym: &str) -> SymbolId {
        self.names.insert_full(String::from(sym)).0
    }

    /// Adds `sym` only if it is new; returns `None` for a duplicate.
    pub fn try_add(&mut self, sym: &str) -> Option<SymbolId> {
        match self.names.insert_full(String::from(sym)) {
            (idx, true) => Some(idx),
            (_, false) => None,
        }
    }

    pub fn idx(&self, sym: &str) -> Option<SymbolId> {
        self.names.get_index_of(sym)
    }

    pub fn sym(&self, idx: SymbolId) -> Option<&str> {
        self.names.get_index(idx).map(|s| s.as_str())
    }

    /// Name of a lookahead, rendering end-of-input as [`EOF_NAME`].
    pub fn lookahead_name(&self, la: Lookahead) -> &str {
        match la {
            Some(idx) => self.sym(idx).unwrap_or("?"),
            None => EOF_NAME,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Symtab {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut tab = Symtab::new();
        for name in iter {
            tab.add(name.as_ref());
        }
        tab
    }
}
