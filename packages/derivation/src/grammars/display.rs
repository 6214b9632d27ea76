use std::fmt::Display;

use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use tabled::{builder::Builder, settings::Style};

use crate::{
    derivation::tree::escape_dot,
    grammars::types::{Grammar, NonTerminal},
};

impl Display for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "G = ({{{}}}, {{{}}}, P, {})",
            self.non_terminals().iter().join(", "),
            self.terminals().iter().join(", "),
            self.start_symbol()
        )?;
        writeln!(f)?;

        let mut grouped: IndexMap<&NonTerminal, Vec<String>> = IndexMap::new();
        for production in self.productions() {
            grouped
                .entry(&production.lhs)
                .or_default()
                .push(production.rhs.to_string());
        }

        writeln!(f, "P = {{")?;
        for (lhs, rhs) in grouped {
            writeln!(f, "  {} → {}", lhs, rhs.join(" | "))?;
        }
        write!(f, "}}")
    }
}

impl Grammar {
    /// The productions in declaration order, numbered from 1.
    pub fn production_table(&self) -> String {
        let mut builder = Builder::default();

        builder.push_record(["#", "lhs", "rhs"]);
        for (idx, production) in self.productions().iter().enumerate() {
            builder.push_record([
                (idx + 1).to_string(),
                production.lhs.to_string(),
                production.rhs.to_string(),
            ]);
        }

        let mut table = builder.build();
        table.with(Style::rounded());

        table.to_string()
    }

    /// A Graphviz digraph with an edge from every non-terminal to each symbol
    /// that appears on the right-hand side of one of its productions.
    pub fn dependency_graph_dot(&self) -> String {
        let edges = self
            .productions()
            .iter()
            .flat_map(|production| {
                production
                    .rhs
                    .symbols()
                    .iter()
                    .map(move |symbol| (production.lhs.0.clone(), symbol.symbol().clone()))
            })
            .collect::<IndexSet<_>>();

        let mut dot = String::from("digraph grammar {\n");
        for nt in self.non_terminals() {
            dot.push_str(&format!("  \"{}\" [shape=ellipse];\n", escape_dot(nt.0.as_str())));
        }
        for t in self.terminals() {
            dot.push_str(&format!("  \"{}\" [shape=box];\n", escape_dot(t.0.as_str())));
        }
        for (from, to) in edges {
            dot.push_str(&format!(
                "  \"{}\" -> \"{}\";\n",
                escape_dot(from.as_str()),
                escape_dot(to.as_str())
            ));
        }
        dot.push_str("}\n");

        dot
    }
}
