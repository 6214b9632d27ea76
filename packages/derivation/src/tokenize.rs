use derive_more::Display;

use crate::language::Symbol;

/// How a candidate string is split into terminal tokens. The policy is fixed
/// for a session; the engine only ever sees the resulting tokens.
#[derive(Debug, Display, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tokenization {
    /// One token per character, whitespace ignored.
    #[default]
    #[display("characters")]
    Characters,
    /// Tokens are separated by whitespace.
    #[display("whitespace")]
    Whitespace,
}

impl Tokenization {
    pub fn tokenize(&self, input: &str) -> Vec<Symbol> {
        match self {
            Tokenization::Characters => input
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| Symbol::new(c.to_string()))
                .collect(),
            Tokenization::Whitespace => input.split_whitespace().map(Symbol::new).collect(),
        }
    }
}
