use std::mem;

use itertools::Itertools;
use log::{debug, trace};
use thiserror::Error;

use crate::{
    derivation::{
        options::DeriveOptions,
        tree::{DerivationTree, Node, NodeLabel, TreeBuilder},
    },
    grammars::types::{Grammar, NonTerminal, ProductionSymbol, Rhs},
    language::Symbol,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Derivation {
    Accepted(DerivationTree),
    Rejected,
}

impl Derivation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Derivation::Accepted(_))
    }

    pub fn tree(&self) -> Option<&DerivationTree> {
        match self {
            Derivation::Accepted(tree) => Some(tree),
            Derivation::Rejected => None,
        }
    }

    pub fn into_tree(self) -> Option<DerivationTree> {
        match self {
            Derivation::Accepted(tree) => Some(tree),
            Derivation::Rejected => None,
        }
    }
}

/// The search gave up. Unlike [`Derivation::Rejected`] this says nothing
/// about whether the input belongs to the language.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DeriveError {
    #[error(
        "gave up after applying {max_depth} productions along one derivation path \
         (is the grammar left-recursive?)"
    )]
    DepthExceeded { max_depth: usize },
    #[error("gave up after {max_steps} search steps")]
    StepLimitExceeded { max_steps: u64 },
}

pub fn derive(grammar: &Grammar, input: &[Symbol]) -> Result<Derivation, DeriveError> {
    derive_with(grammar, input, &DeriveOptions::default())
}

/// Decides whether `input` is derivable from the start symbol of `grammar`,
/// expanding the leftmost non-terminal first and trying its productions in
/// declaration order. The first derivation found is returned.
pub fn derive_with(
    grammar: &Grammar,
    input: &[Symbol],
    options: &DeriveOptions,
) -> Result<Derivation, DeriveError> {
    debug!("Deriving \"{}\"", input.iter().join(" "));

    let search = Search::new(grammar, input, options);
    let outcome = search.run();

    match outcome {
        Ok(Some(trail)) => {
            debug!("Accepted using {} productions", trail.len());
            Ok(Derivation::Accepted(build_tree(grammar, &trail)))
        }
        Ok(None) => {
            debug!("Rejected");
            Ok(Derivation::Rejected)
        }
        Err(err) => {
            debug!("{}", err);
            Err(err)
        }
    }
}

/// A non-terminal whose remaining alternatives have not been tried yet,
/// together with everything needed to restart the search from it.
#[derive(Debug)]
struct ChoicePoint {
    non_terminal: NonTerminal,
    next_alternative: usize,
    form: Vec<ProductionSymbol>,
    position: usize,
    trail_len: usize,
}

struct Search<'a> {
    grammar: &'a Grammar,
    input: &'a [Symbol],
    options: &'a DeriveOptions,
    /// The unexpanded part of the sentential form, leftmost symbol last.
    form: Vec<ProductionSymbol>,
    position: usize,
    /// Indices of the productions applied so far, in leftmost order.
    trail: Vec<usize>,
    choices: Vec<ChoicePoint>,
    steps: u64,
}

impl<'a> Search<'a> {
    fn new(grammar: &'a Grammar, input: &'a [Symbol], options: &'a DeriveOptions) -> Self {
        Self {
            grammar,
            input,
            options,
            form: vec![ProductionSymbol::NonTerminal(
                grammar.start_symbol().clone(),
            )],
            position: 0,
            trail: Vec::new(),
            choices: Vec::new(),
            steps: 0,
        }
    }

    fn run(mut self) -> Result<Option<Vec<usize>>, DeriveError> {
        loop {
            self.tick()?;

            let advanced = match self.form.pop() {
                None => {
                    if self.position == self.input.len() {
                        return Ok(Some(self.trail));
                    }
                    trace!("Form exhausted with {} tokens left", self.input.len() - self.position);
                    false
                }
                Some(ProductionSymbol::Terminal(t)) => {
                    if self.input.get(self.position) == Some(&t.0) {
                        trace!("Matched {} at {}", t, self.position);
                        self.position += 1;
                        true
                    } else {
                        trace!("Expected {} at {}", t, self.position);
                        false
                    }
                }
                Some(ProductionSymbol::NonTerminal(nt)) => {
                    self.choices.push(ChoicePoint {
                        non_terminal: nt,
                        next_alternative: 0,
                        form: mem::take(&mut self.form),
                        position: self.position,
                        trail_len: self.trail.len(),
                    });
                    false
                }
            };

            if !advanced && !self.resume()? {
                return Ok(None);
            }
        }
    }

    /// Restores the innermost choice point that still has an untried
    /// alternative and applies that alternative. Returns `false` once every
    /// choice is exhausted.
    fn resume(&mut self) -> Result<bool, DeriveError> {
        while let Some(choice) = self.choices.last_mut() {
            let alternatives = self.grammar.alternatives(&choice.non_terminal);

            if let Some(&production) = alternatives.get(choice.next_alternative) {
                choice.next_alternative += 1;

                self.form.clone_from(&choice.form);
                self.position = choice.position;
                self.trail.truncate(choice.trail_len);

                let rhs = &self.grammar.productions()[production].rhs;
                trace!("Expanding {} → {} at {}", choice.non_terminal, rhs, self.position);

                self.form.extend(rhs.symbols().iter().rev().cloned());
                self.trail.push(production);

                if self.trail.len() > self.options.max_depth {
                    return Err(DeriveError::DepthExceeded {
                        max_depth: self.options.max_depth,
                    });
                }

                return Ok(true);
            }

            trace!("No alternatives left for {}", choice.non_terminal);
            self.choices.pop();
        }

        Ok(false)
    }

    fn tick(&mut self) -> Result<(), DeriveError> {
        self.steps += 1;

        if let Some(max_steps) = self.options.max_steps {
            if self.steps > max_steps {
                return Err(DeriveError::StepLimitExceeded { max_steps });
            }
        }

        Ok(())
    }
}

type Frame<'a> = (Node, std::slice::Iter<'a, ProductionSymbol>);

/// Replays a leftmost derivation into a tree. Every non-terminal node, in
/// pre-order, takes the next production from `trail`.
fn build_tree(grammar: &Grammar, trail: &[usize]) -> DerivationTree {
    let productions = trail
        .iter()
        .map(|&idx| grammar.productions()[idx].clone())
        .collect::<Vec<_>>();
    let mut applied = trail.iter().map(|&idx| &grammar.productions()[idx].rhs);

    let mut builder = TreeBuilder::new();
    let root = builder.new_node(NodeLabel::NonTerminal(grammar.start_symbol().clone()));

    let Some(rhs) = applied.next() else {
        return DerivationTree::new(root, productions);
    };

    let mut frames: Vec<Frame<'_>> = Vec::new();
    let mut current = open(&mut builder, root, rhs);

    loop {
        match current.1.next() {
            Some(ProductionSymbol::Terminal(t)) => {
                let leaf = builder.new_node(NodeLabel::Terminal(t.clone()));
                current.0.attach_child(leaf);
            }
            Some(ProductionSymbol::NonTerminal(nt)) => {
                let node = builder.new_node(NodeLabel::NonTerminal(nt.clone()));
                match applied.next() {
                    Some(rhs) => {
                        let child = open(&mut builder, node, rhs);
                        frames.push(mem::replace(&mut current, child));
                    }
                    None => current.0.attach_child(node),
                }
            }
            None => match frames.pop() {
                Some(mut parent) => {
                    parent.0.attach_child(current.0);
                    current = parent;
                }
                None => return DerivationTree::new(current.0, productions),
            },
        }
    }
}

fn open<'a>(builder: &mut TreeBuilder, mut node: Node, rhs: &'a Rhs) -> Frame<'a> {
    if rhs.is_epsilon() {
        node.attach_child(builder.new_node(NodeLabel::Epsilon));
    }

    (node, rhs.symbols().iter())
}
