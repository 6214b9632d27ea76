use std::{borrow::Borrow, fmt::Display, sync::Arc};

use derive_more::Display;
use itertools::Itertools;

/// Marks the empty word, both in grammar files and in rendered output.
pub const EPSILON: &str = "ε";

/// An interned symbol name. Cloning is a reference count bump, so symbols are
/// cheap to copy around the search and the grammar can be shared by threads.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(Arc<str>);

impl Symbol {
    pub fn new(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();
        assert!(!s.is_empty());
        Symbol(Arc::from(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_epsilon(&self) -> bool {
        self.as_str() == EPSILON
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Symbol::new(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word<S>(pub Vec<S>);

impl<S> Word<S> {
    pub fn new(symbols: impl IntoIterator<Item = S>) -> Self {
        Word(symbols.into_iter().collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, S> {
        self.0.iter()
    }
}

impl<S: Display> Display for Word<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "{}", EPSILON)
        } else {
            write!(f, "{}", self.iter().join(" "))
        }
    }
}
