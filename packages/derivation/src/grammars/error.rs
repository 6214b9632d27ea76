use derive_more::Display;
use thiserror::Error;

/// The four parts every grammar must provide.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum GrammarPart {
    #[display("terminal symbols (Vt)")]
    Terminals,
    #[display("non-terminal symbols (Vxt)")]
    NonTerminals,
    #[display("start symbol (S)")]
    StartSymbol,
    #[display("productions (P)")]
    Productions,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("the grammar is incomplete: missing {0}")]
    IncompleteGrammar(GrammarPart),
    #[error("the start symbol '{0}' is not a non-terminal")]
    StartNotNonTerminal(String),
    #[error("'{0}' has productions but is not a non-terminal")]
    ProductionLhsNotNonTerminal(String),
    #[error("'{symbol}' in a production of '{lhs}' is neither a terminal nor a non-terminal")]
    InvalidRhsSymbol { symbol: String, lhs: String },
    #[error("'{0}' is declared as both a terminal and a non-terminal")]
    TerminalNonTerminal(String),
    #[error("'{0}' is reserved for the empty production and cannot be declared as a symbol")]
    ReservedSymbol(String),
}
