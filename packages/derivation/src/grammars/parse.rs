//! Reader for the line-based grammar file format:
//!
//! ```text
//! Vt: a b
//! Vxt: S
//! S: S
//! P:
//! S -> a S b
//! S -> ε
//! ```
//!
//! `→` is accepted in place of `->`, alternatives may be joined with `|` on a
//! single line, and blank lines and lines starting with `#` are skipped.

use std::{fs, io, path::Path};

use derive_more::Display;
use log::debug;
use thiserror::Error;
use winnow::{
    ascii::{space0, space1},
    combinator::{alt, fail, opt, preceded, separated},
    ModalResult, Parser,
};

use crate::grammars::{definition::GrammarDefinition, error::GrammarError, types::Grammar};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    #[display("Vt")]
    Terminals,
    #[display("Vxt")]
    NonTerminals,
    #[display("S")]
    Start,
    #[display("P")]
    Productions,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("error reading grammar file: {0}")]
    Io(#[from] io::Error),
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error("line {line}: section '{section}:' appears more than once")]
    DuplicateSection { line: usize, section: Section },
    #[error("invalid grammar: {0}")]
    Grammar(#[from] GrammarError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line<'s> {
    Terminals(Vec<&'s str>),
    NonTerminals(Vec<&'s str>),
    Start(Option<&'s str>),
    ProductionsHeader,
    Production(&'s str, Vec<Vec<&'s str>>),
}

pub fn load(source: &str) -> Result<Grammar, LoadError> {
    let definition = parse_definition(source)?;
    Ok(Grammar::build(&definition)?)
}

pub fn load_file(path: impl AsRef<Path>) -> Result<Grammar, LoadError> {
    let path = path.as_ref();
    debug!("Loading grammar from {}", path.display());

    let source = fs::read_to_string(path)?;
    load(&source)
}

pub fn parse_definition(source: &str) -> Result<GrammarDefinition, LoadError> {
    let mut definition = GrammarDefinition::default();
    let mut seen: Vec<Section> = Vec::new();
    let mut in_productions = false;

    let mut enter = |section: Section, line: usize| {
        if seen.contains(&section) {
            Err(LoadError::DuplicateSection { line, section })
        } else {
            seen.push(section);
            Ok(())
        }
    };

    for (idx, raw) in source.lines().enumerate() {
        let line_number = idx + 1;
        let text = raw.trim();
        if text.is_empty() || text.starts_with('#') {
            continue;
        }

        let parsed = parse_line(text, line_number)?;

        match parsed {
            Line::Production(lhs, alternatives) if in_productions => {
                for rhs in alternatives {
                    definition.add_production(lhs, rhs.as_slice());
                }
            }
            Line::Production(..) => {
                return Err(LoadError::Syntax {
                    line: line_number,
                    message: "production found before the 'P:' section".to_owned(),
                });
            }
            _ if in_productions => {
                return Err(LoadError::Syntax {
                    line: line_number,
                    message: "expected a production of the form 'lhs -> rhs'".to_owned(),
                });
            }
            Line::Terminals(symbols) => {
                enter(Section::Terminals, line_number)?;
                definition.terminals = symbols.into_iter().map(str::to_owned).collect();
            }
            Line::NonTerminals(symbols) => {
                enter(Section::NonTerminals, line_number)?;
                definition.non_terminals = symbols.into_iter().map(str::to_owned).collect();
            }
            Line::Start(start) => {
                enter(Section::Start, line_number)?;
                definition.start = start.map(str::to_owned);
            }
            Line::ProductionsHeader => {
                enter(Section::Productions, line_number)?;
                in_productions = true;
            }
        }
    }

    Ok(definition)
}

/// Parses a single `lhs -> rhs | rhs ...` line. An empty alternative stands
/// for ε.
pub fn production_line(text: &str, line: usize) -> Result<(&str, Vec<Vec<&str>>), LoadError> {
    production
        .parse(text.trim())
        .map_err(|e| LoadError::Syntax {
            line,
            message: e.to_string(),
        })
}

fn parse_line(text: &str, line: usize) -> Result<Line<'_>, LoadError> {
    grammar_line.parse(text).map_err(|e| LoadError::Syntax {
        line,
        message: e.to_string(),
    })
}

fn grammar_line<'s>(input: &mut &'s str) -> ModalResult<Line<'s>> {
    alt((
        preceded(("Vxt:", space0), symbols).map(Line::NonTerminals),
        preceded(("Vt:", space0), symbols).map(Line::Terminals),
        preceded(("S:", space0), opt(symbol)).map(Line::Start),
        ("P:", space0).value(Line::ProductionsHeader),
        production.map(|(lhs, alternatives)| Line::Production(lhs, alternatives)),
    ))
    .parse_next(input)
}

fn production<'s>(input: &mut &'s str) -> ModalResult<(&'s str, Vec<Vec<&'s str>>)> {
    (
        symbol,
        preceded((space0, arrow, space0), alternatives),
    )
        .parse_next(input)
}

fn alternatives<'s>(input: &mut &'s str) -> ModalResult<Vec<Vec<&'s str>>> {
    separated(1.., symbols, (space0, '|', space0)).parse_next(input)
}

fn symbols<'s>(input: &mut &'s str) -> ModalResult<Vec<&'s str>> {
    separated(0.., symbol, space1).parse_next(input)
}

/// A symbol runs up to whitespace, `|`, or an arrow, so `S->a` reads as
/// `S`, `->`, `a`.
fn symbol<'s>(input: &mut &'s str) -> ModalResult<&'s str> {
    let word = input
        .find(|c: char| c.is_whitespace() || c == '|')
        .unwrap_or(input.len());
    let end = [input[..word].find("->"), input[..word].find('→')]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(word);

    if end == 0 {
        return fail(input);
    }

    let (symbol, rest) = input.split_at(end);
    *input = rest;
    Ok(symbol)
}

fn arrow(input: &mut &str) -> ModalResult<()> {
    alt(("->", "→")).void().parse_next(input)
}
