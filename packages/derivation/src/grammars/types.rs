use std::{borrow::Borrow, fmt::Display};

use derive_more::Display;
use indexmap::{IndexMap, IndexSet};
use log::debug;

use crate::{
    grammars::{
        definition::GrammarDefinition,
        error::{GrammarError, GrammarPart},
        parse::{self, LoadError},
    },
    language::{Symbol, Word, EPSILON},
};

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Terminal(pub Symbol);

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonTerminal(pub Symbol);

impl Borrow<str> for Terminal {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for NonTerminal {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

/// A grammar symbol tagged with its kind. The tag is decided once, when the
/// grammar is built, so the search never has to look symbols up by name.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
pub enum ProductionSymbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl ProductionSymbol {
    pub fn symbol(&self) -> &Symbol {
        match self {
            ProductionSymbol::Terminal(t) => &t.0,
            ProductionSymbol::NonTerminal(nt) => &nt.0,
        }
    }
}

/// The right-hand side of a production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Rhs {
    Epsilon,
    Word(Word<ProductionSymbol>),
}

impl Rhs {
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Rhs::Epsilon)
    }

    pub fn symbols(&self) -> &[ProductionSymbol] {
        match self {
            Rhs::Epsilon => &[],
            Rhs::Word(word) => &word.0,
        }
    }
}

impl Display for Rhs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rhs::Epsilon => write!(f, "{}", EPSILON),
            Rhs::Word(word) => write!(f, "{}", word),
        }
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
#[display("{lhs} → {rhs}")]
pub struct Production {
    pub lhs: NonTerminal,
    pub rhs: Rhs,
}

/// A validated context-free grammar.
///
/// Productions keep their declaration order: it decides which alternative the
/// derivation engine tries first.
#[derive(Debug, Clone)]
pub struct Grammar {
    terminals: IndexSet<Terminal>,
    non_terminals: IndexSet<NonTerminal>,
    start_symbol: NonTerminal,
    productions: Vec<Production>,
    alternatives: IndexMap<NonTerminal, Vec<usize>>,
}

impl Grammar {
    pub fn build(definition: &GrammarDefinition) -> Result<Self, GrammarError> {
        let terminals = symbol_set(&definition.terminals, Terminal);
        let non_terminals = symbol_set(&definition.non_terminals, NonTerminal);
        let start = definition
            .start
            .as_deref()
            .map(str::trim)
            .filter(|start| !start.is_empty());

        if terminals.is_empty() {
            return Err(GrammarError::IncompleteGrammar(GrammarPart::Terminals));
        }
        if non_terminals.is_empty() {
            return Err(GrammarError::IncompleteGrammar(GrammarPart::NonTerminals));
        }
        let start = start.ok_or(GrammarError::IncompleteGrammar(GrammarPart::StartSymbol))?;
        if definition.productions.is_empty() {
            return Err(GrammarError::IncompleteGrammar(GrammarPart::Productions));
        }

        if terminals.contains(EPSILON) || non_terminals.contains(EPSILON) {
            return Err(GrammarError::ReservedSymbol(EPSILON.to_owned()));
        }

        if let Some(t) = terminals.iter().find(|t| non_terminals.contains(t.0.as_str())) {
            return Err(GrammarError::TerminalNonTerminal(t.to_string()));
        }

        let start_symbol = non_terminals
            .get(start)
            .cloned()
            .ok_or_else(|| GrammarError::StartNotNonTerminal(start.to_owned()))?;

        let mut productions = Vec::with_capacity(definition.productions.len());
        let mut alternatives: IndexMap<NonTerminal, Vec<usize>> = IndexMap::new();

        for (lhs, rhs) in &definition.productions {
            let lhs = lhs.trim();
            let lhs = non_terminals
                .get(lhs)
                .cloned()
                .ok_or_else(|| GrammarError::ProductionLhsNotNonTerminal(lhs.to_owned()))?;

            // ε inside a longer right-hand side is the identity of concatenation.
            let symbols = rhs
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty() && *s != EPSILON)
                .map(|s| {
                    classify(&terminals, &non_terminals, s).ok_or_else(|| {
                        GrammarError::InvalidRhsSymbol {
                            symbol: s.to_owned(),
                            lhs: lhs.to_string(),
                        }
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            let rhs = if symbols.is_empty() {
                Rhs::Epsilon
            } else {
                Rhs::Word(Word(symbols))
            };

            alternatives
                .entry(lhs.clone())
                .or_default()
                .push(productions.len());
            productions.push(Production { lhs, rhs });
        }

        debug!(
            "Grammar has {} productions, {} non-terminals, {} terminals, start symbol {}",
            productions.len(),
            non_terminals.len(),
            terminals.len(),
            start_symbol,
        );

        Ok(Self {
            terminals,
            non_terminals,
            start_symbol,
            productions,
            alternatives,
        })
    }

    /// Builds a grammar from symbol lists and production lines such as
    /// `"S -> a S b | ε"`.
    pub fn from_definition(
        terminals: &[&str],
        non_terminals: &[&str],
        start_symbol: &str,
        productions: &[&str],
    ) -> Result<Self, LoadError> {
        let mut definition = GrammarDefinition::new(terminals, non_terminals, start_symbol);

        for (idx, line) in productions.iter().enumerate() {
            let (lhs, alternatives) = parse::production_line(line, idx + 1)?;
            for rhs in alternatives {
                definition.add_production(lhs, rhs.as_slice());
            }
        }

        Ok(Self::build(&definition)?)
    }

    pub fn terminals(&self) -> &IndexSet<Terminal> {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &IndexSet<NonTerminal> {
        &self.non_terminals
    }

    pub fn start_symbol(&self) -> &NonTerminal {
        &self.start_symbol
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// All right-hand sides of `non_terminal`, in declaration order.
    pub fn productions_for<'a>(
        &'a self,
        non_terminal: &NonTerminal,
    ) -> impl Iterator<Item = &'a Rhs> + 'a {
        self.alternatives(non_terminal)
            .iter()
            .map(move |&idx| &self.productions[idx].rhs)
    }

    pub fn classify(&self, name: &str) -> Option<ProductionSymbol> {
        classify(&self.terminals, &self.non_terminals, name)
    }

    /// Indices into [`Grammar::productions`] of the alternatives for `non_terminal`.
    pub(crate) fn alternatives(&self, non_terminal: &NonTerminal) -> &[usize] {
        self.alternatives
            .get(non_terminal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn symbol_set<T: std::hash::Hash + Eq>(names: &[String], wrap: fn(Symbol) -> T) -> IndexSet<T> {
    names
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| wrap(Symbol::new(name)))
        .collect()
}

fn classify(
    terminals: &IndexSet<Terminal>,
    non_terminals: &IndexSet<NonTerminal>,
    name: &str,
) -> Option<ProductionSymbol> {
    if let Some(t) = terminals.get(name) {
        Some(ProductionSymbol::Terminal(t.clone()))
    } else {
        non_terminals
            .get(name)
            .map(|nt| ProductionSymbol::NonTerminal(nt.clone()))
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn balanced() -> GrammarDefinition {
        GrammarDefinition::new(&["a", "b"], &["S"], "S")
            .with_production("S", &["a", "S", "b"])
            .with_production("S", &[EPSILON])
    }

    #[test]
    fn build_classifies_symbols() {
        let grammar = Grammar::build(&balanced()).unwrap();

        assert_eq!(grammar.start_symbol().to_string(), "S");
        assert_eq!(grammar.productions().len(), 2);

        let rhs = grammar.productions()[0].rhs.symbols();
        assert!(matches!(rhs[0], ProductionSymbol::Terminal(_)));
        assert!(matches!(rhs[1], ProductionSymbol::NonTerminal(_)));
        assert!(grammar.productions()[1].rhs.is_epsilon());
    }

    #[test]
    fn productions_for_keeps_declaration_order() {
        let grammar = Grammar::build(
            &GrammarDefinition::new(&["a", "b"], &["S", "A"], "S")
                .with_production("S", &["b"])
                .with_production("A", &["a"])
                .with_production("S", &["a", "S"]),
        )
        .unwrap();

        let s = grammar.start_symbol().clone();
        let alternatives = grammar
            .productions_for(&s)
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        assert_eq!(alternatives, vec!["b", "a S"]);
    }

    #[test]
    fn unknown_non_terminal_has_no_productions() {
        let grammar = Grammar::build(&balanced()).unwrap();
        let missing = NonTerminal(Symbol::new("X"));

        assert_eq!(grammar.productions_for(&missing).count(), 0);
    }

    #[test]
    fn epsilon_inside_a_word_is_dropped() {
        let grammar = Grammar::build(
            &GrammarDefinition::new(&["a"], &["S"], "S").with_production("S", &["a", EPSILON]),
        )
        .unwrap();

        assert_eq!(grammar.productions()[0].to_string(), "S → a");
    }

    #[test]
    fn build_does_not_touch_its_input() {
        let definition = balanced();
        let copy = definition.clone();

        Grammar::build(&definition).unwrap();

        assert_eq!(definition, copy);
    }

    #[test]
    fn from_definition_desugars_alternatives() {
        let grammar =
            Grammar::from_definition(&["a", "b"], &["S"], "S", &["S -> a S b | ε"]).unwrap();

        let productions = grammar
            .productions()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        assert_eq!(productions, vec!["S → a S b", "S → ε"]);
    }

    #[test]
    fn classify_uses_declared_sets() {
        let grammar = Grammar::build(&balanced()).unwrap();

        assert!(matches!(
            grammar.classify("a"),
            Some(ProductionSymbol::Terminal(_))
        ));
        assert!(matches!(
            grammar.classify("S"),
            Some(ProductionSymbol::NonTerminal(_))
        ));
        assert_eq!(grammar.classify("c"), None);
    }

    #[rstest]
    #[case::no_terminals(
        GrammarDefinition::new(&[], &["S"], "S").with_production("S", &[EPSILON]),
        GrammarError::IncompleteGrammar(GrammarPart::Terminals)
    )]
    #[case::no_non_terminals(
        GrammarDefinition::new(&["a"], &[], "S").with_production("S", &["a"]),
        GrammarError::IncompleteGrammar(GrammarPart::NonTerminals)
    )]
    #[case::no_start_symbol(
        GrammarDefinition { start: None, ..balanced() },
        GrammarError::IncompleteGrammar(GrammarPart::StartSymbol)
    )]
    #[case::blank_start_symbol(
        GrammarDefinition { start: Some("  ".to_owned()), ..balanced() },
        GrammarError::IncompleteGrammar(GrammarPart::StartSymbol)
    )]
    #[case::no_productions(
        GrammarDefinition::new(&["a"], &["S"], "S"),
        GrammarError::IncompleteGrammar(GrammarPart::Productions)
    )]
    #[case::start_is_not_a_non_terminal(
        GrammarDefinition::new(&["a"], &["S"], "X").with_production("S", &["a"]),
        GrammarError::StartNotNonTerminal("X".to_owned())
    )]
    #[case::lhs_is_not_a_non_terminal(
        GrammarDefinition::new(&["a"], &["S"], "S")
            .with_production("S", &["a"])
            .with_production("X", &["a"]),
        GrammarError::ProductionLhsNotNonTerminal("X".to_owned())
    )]
    #[case::undeclared_rhs_symbol(
        GrammarDefinition::new(&["a"], &["S"], "S").with_production("S", &["c"]),
        GrammarError::InvalidRhsSymbol { symbol: "c".to_owned(), lhs: "S".to_owned() }
    )]
    #[case::symbol_of_both_kinds(
        GrammarDefinition::new(&["a", "S"], &["S"], "S").with_production("S", &["a"]),
        GrammarError::TerminalNonTerminal("S".to_owned())
    )]
    #[case::epsilon_declared_as_terminal(
        GrammarDefinition::new(&["a", EPSILON], &["S"], "S").with_production("S", &["a"]),
        GrammarError::ReservedSymbol(EPSILON.to_owned())
    )]
    fn build_rejects_invalid_grammars(
        #[case] definition: GrammarDefinition,
        #[case] expected: GrammarError,
    ) {
        assert_eq!(Grammar::build(&definition).unwrap_err(), expected);
    }
}
