use std::fmt::Display;

use derive_more::Display;

use crate::{
    grammars::types::{NonTerminal, Production, ProductionSymbol, Terminal},
    language::{Symbol, Word, EPSILON},
};

/// Identifies a node within one derivation tree. Ids are handed out in
/// creation order, starting from 0 for every derivation.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Display, Clone, PartialEq, Eq, Hash)]
pub enum NodeLabel {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
    #[display("{}", EPSILON)]
    Epsilon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    id: NodeId,
    label: NodeLabel,
    children: Vec<Node>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &NodeLabel {
        &self.label
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn attach_child(&mut self, child: Node) {
        self.children.push(child);
    }
}

/// Creates nodes with fresh ids. One builder is used per derivation, so ids
/// never collide within a tree and never leak between derivations.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    next_id: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_node(&mut self, label: NodeLabel) -> Node {
        let id = NodeId(self.next_id);
        self.next_id += 1;

        Node {
            id,
            label,
            children: Vec::new(),
        }
    }
}

/// The witness of an accepted string: the parse tree together with the
/// productions applied in leftmost order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivationTree {
    root: Node,
    productions: Vec<Production>,
}

impl DerivationTree {
    pub fn new(root: Node, productions: Vec<Production>) -> Self {
        Self { root, productions }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Nodes in pre-order.
    pub fn nodes(&self) -> PreOrder<'_> {
        PreOrder {
            stack: vec![&self.root],
        }
    }

    /// Parent to child edges, grouped by parent in pre-order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.nodes()
            .flat_map(|node| node.children.iter().map(move |child| (node.id, child.id)))
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes().filter(|node| node.is_leaf())
    }

    /// The terminal leaves read left to right; ε leaves contribute nothing.
    pub fn yield_word(&self) -> Vec<Symbol> {
        self.leaves()
            .filter_map(|node| match &node.label {
                NodeLabel::Terminal(t) => Some(t.0.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    /// Number of edges on the longest root to leaf path.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(&self.root, 0)];

        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.children.iter().map(|child| (child, depth + 1)));
        }

        deepest
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// The sentential forms of the leftmost derivation, from the start symbol
    /// down to the derived string.
    pub fn sentential_forms(&self) -> Vec<Word<ProductionSymbol>> {
        let mut form = match &self.root.label {
            NodeLabel::NonTerminal(nt) => vec![ProductionSymbol::NonTerminal(nt.clone())],
            _ => Vec::new(),
        };
        let mut forms = vec![Word(form.clone())];

        for production in &self.productions {
            let leftmost = form
                .iter()
                .position(|symbol| matches!(symbol, ProductionSymbol::NonTerminal(_)));

            if let Some(idx) = leftmost {
                let rest = form.split_off(idx + 1);
                form.pop();
                form.extend(production.rhs.symbols().iter().cloned());
                form.extend(rest);
                forms.push(Word(form.clone()));
            }
        }

        forms
    }

    pub fn to_dot(&self) -> String {
        let mut dot = String::from("digraph derivation {\n");

        for node in self.nodes() {
            let shape = match node.label {
                NodeLabel::NonTerminal(_) => "ellipse",
                NodeLabel::Terminal(_) => "box",
                NodeLabel::Epsilon => "plaintext",
            };
            dot.push_str(&format!(
                "  n{} [label=\"{}\", shape={}];\n",
                node.id,
                escape_dot(&node.label.to_string()),
                shape
            ));
        }

        for (parent, child) in self.edges() {
            dot.push_str(&format!("  n{} -> n{};\n", parent, child));
        }

        dot.push_str("}\n");
        dot
    }
}

impl Display for DerivationTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.root.label)?;

        let mut stack = Vec::new();
        push_children(&mut stack, &self.root, "");

        while let Some((node, prefix, is_last)) = stack.pop() {
            let (connector, indent) = if is_last {
                ("└─ ", "   ")
            } else {
                ("├─ ", "│  ")
            };
            writeln!(f, "{}{}{}", prefix, connector, node.label)?;

            push_children(&mut stack, node, &format!("{}{}", prefix, indent));
        }

        Ok(())
    }
}

fn push_children<'a>(stack: &mut Vec<(&'a Node, String, bool)>, node: &'a Node, prefix: &str) {
    let count = node.children.len();
    for (idx, child) in node.children.iter().enumerate().rev() {
        stack.push((child, prefix.to_owned(), idx + 1 == count));
    }
}

pub struct PreOrder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

pub(crate) fn escape_dot(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nt(name: &str) -> NodeLabel {
        NodeLabel::NonTerminal(NonTerminal(Symbol::new(name)))
    }

    fn t(name: &str) -> NodeLabel {
        NodeLabel::Terminal(Terminal(Symbol::new(name)))
    }

    /// S(a, S(ε), b), built by hand.
    fn small_tree() -> DerivationTree {
        let mut builder = TreeBuilder::new();

        let mut root = builder.new_node(nt("S"));
        let a = builder.new_node(t("a"));
        let mut inner = builder.new_node(nt("S"));
        let epsilon = builder.new_node(NodeLabel::Epsilon);
        let b = builder.new_node(t("b"));

        inner.attach_child(epsilon);
        root.attach_child(a);
        root.attach_child(inner);
        root.attach_child(b);

        DerivationTree::new(root, Vec::new())
    }

    #[test]
    fn builder_hands_out_increasing_ids() {
        let mut builder = TreeBuilder::new();

        let first = builder.new_node(nt("S"));
        let second = builder.new_node(nt("S"));

        assert_eq!(first.id().index(), 0);
        assert_eq!(second.id().index(), 1);
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn yield_skips_epsilon_leaves() {
        let word = small_tree()
            .yield_word()
            .iter()
            .map(Symbol::to_string)
            .collect::<Vec<_>>();

        assert_eq!(word, vec!["a", "b"]);
    }

    #[test]
    fn nodes_and_edges_follow_pre_order() {
        let tree = small_tree();

        let labels = tree
            .nodes()
            .map(|node| node.label().to_string())
            .collect::<Vec<_>>();
        assert_eq!(labels, vec!["S", "a", "S", "ε", "b"]);

        let edges = tree
            .edges()
            .map(|(from, to)| (from.index(), to.index()))
            .collect::<Vec<_>>();
        assert_eq!(edges, vec![(0, 1), (0, 2), (0, 4), (2, 3)]);

        assert_eq!(tree.len(), 5);
        assert_eq!(tree.depth(), 2);
    }

    #[test]
    fn renders_as_indented_text() {
        let expected = "\
S
├─ a
├─ S
│  └─ ε
└─ b
";

        assert_eq!(small_tree().to_string(), expected);
    }

    #[test]
    fn renders_as_dot() {
        let dot = small_tree().to_dot();

        assert!(dot.starts_with("digraph derivation {\n"));
        assert!(dot.contains("  n0 [label=\"S\", shape=ellipse];\n"));
        assert!(dot.contains("  n1 [label=\"a\", shape=box];\n"));
        assert!(dot.contains("  n3 [label=\"ε\", shape=plaintext];\n"));
        assert!(dot.contains("  n2 -> n3;\n"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn dot_labels_are_escaped() {
        assert_eq!(escape_dot("\"x\""), "\\\"x\\\"");
        assert_eq!(escape_dot("a\\b"), "a\\\\b");
    }
}
