//! Membership and derivation trees for context-free grammars.
//!
//! A [`Grammar`] is built once, from a [`GrammarDefinition`] or a grammar file,
//! and can then answer any number of [`derive`] calls. An accepted string comes
//! with the [`DerivationTree`] that witnesses it.

pub mod derivation;
pub mod grammars;
pub mod language;
pub mod tokenize;

pub use derivation::{
    engine::{derive, derive_with, Derivation, DeriveError},
    options::{DeriveOptions, DEFAULT_MAX_DEPTH},
    tree::{DerivationTree, Node, NodeId, NodeLabel},
};
pub use grammars::{
    definition::GrammarDefinition,
    error::GrammarError,
    parse::{load, load_file, parse_definition, LoadError},
    types::Grammar,
};
pub use language::{Symbol, EPSILON};
pub use tokenize::Tokenization;
