/// The unvalidated parts of a grammar, as read from a grammar file or put
/// together by hand. [`Grammar::build`](crate::grammars::types::Grammar::build)
/// turns it into a checked [`Grammar`](crate::grammars::types::Grammar).
///
/// A production whose right-hand side is empty or consists of `ε` alone is an
/// erasing production.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrammarDefinition {
    pub terminals: Vec<String>,
    pub non_terminals: Vec<String>,
    pub start: Option<String>,
    pub productions: Vec<(String, Vec<String>)>,
}

impl GrammarDefinition {
    pub fn new<S: AsRef<str>>(terminals: &[S], non_terminals: &[S], start: S) -> Self {
        Self {
            terminals: terminals.iter().map(|s| s.as_ref().to_owned()).collect(),
            non_terminals: non_terminals
                .iter()
                .map(|s| s.as_ref().to_owned())
                .collect(),
            start: Some(start.as_ref().to_owned()),
            productions: Vec::new(),
        }
    }

    pub fn add_production<S: AsRef<str>>(&mut self, lhs: impl AsRef<str>, rhs: &[S]) {
        self.productions.push((
            lhs.as_ref().to_owned(),
            rhs.iter().map(|s| s.as_ref().to_owned()).collect(),
        ));
    }

    pub fn with_production<S: AsRef<str>>(mut self, lhs: impl AsRef<str>, rhs: &[S]) -> Self {
        self.add_production(lhs, rhs);
        self
    }
}
