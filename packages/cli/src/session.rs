use std::{
    fs,
    io::{BufRead, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use derivation::{derive_with, Derivation, DerivationTree, Grammar};
use log::info;

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Accepted,
    Rejected,
    GaveUp,
}

/// Checks candidate strings against one grammar, either from a list or
/// interactively.
pub struct Session<'g> {
    grammar: &'g Grammar,
    settings: Settings,
    dot_dir: Option<PathBuf>,
    show_steps: bool,
    accepted: usize,
}

impl<'g> Session<'g> {
    pub fn new(grammar: &'g Grammar, settings: Settings) -> Self {
        Self {
            grammar,
            settings,
            dot_dir: None,
            show_steps: false,
            accepted: 0,
        }
    }

    pub fn with_dot_dir(mut self, dot_dir: Option<PathBuf>) -> Self {
        self.dot_dir = dot_dir;
        self
    }

    pub fn with_steps(mut self, show_steps: bool) -> Self {
        self.show_steps = show_steps;
        self
    }

    pub fn check(&mut self, input: &str, out: &mut impl Write) -> Result<Verdict> {
        let tokens = self.settings.tokenization.tokenize(input);

        match derive_with(self.grammar, &tokens, &self.settings.options) {
            Ok(Derivation::Accepted(tree)) => {
                writeln!(out, "The string '{}' is accepted by the grammar.", input)?;
                self.report(&tree, out)?;
                Ok(Verdict::Accepted)
            }
            Ok(Derivation::Rejected) => {
                writeln!(out, "The string '{}' is not accepted by the grammar.", input)?;
                Ok(Verdict::Rejected)
            }
            Err(err) => {
                writeln!(out, "Gave up on '{}': {}.", input, err)?;
                Ok(Verdict::GaveUp)
            }
        }
    }

    /// Reads one string per line until EOF or a quit word. Blank lines
    /// stand for the empty string.
    pub fn run_interactive(&mut self, input: impl BufRead, out: &mut impl Write) -> Result<()> {
        let mut lines = input.lines();

        loop {
            write!(out, "{}", self.settings.prompt)?;
            out.flush()?;

            let Some(line) = lines.next() else {
                writeln!(out)?;
                break;
            };
            let line = line.context("could not read from standard input")?;

            if self.settings.is_quit_word(&line) {
                break;
            }

            self.check(line.trim(), out)?;
            writeln!(out)?;
        }

        info!("Session finished after {} accepted strings", self.accepted);
        Ok(())
    }

    fn report(&mut self, tree: &DerivationTree, out: &mut impl Write) -> Result<()> {
        self.accepted += 1;

        writeln!(out, "Derivation tree:")?;
        write!(out, "{}", tree)?;

        if self.show_steps {
            writeln!(out, "Leftmost derivation:")?;
            for (step, form) in tree.sentential_forms().iter().enumerate() {
                let arrow = if step == 0 { " " } else { "⇒" };
                writeln!(out, "  {} {}", arrow, form)?;
            }
        }

        if let Some(dir) = &self.dot_dir {
            fs::create_dir_all(dir)
                .with_context(|| format!("could not create {}", dir.display()))?;
            let path = dir.join(format!("derivation-{}.dot", self.accepted));
            fs::write(&path, tree.to_dot())
                .with_context(|| format!("could not write {}", path.display()))?;
            writeln!(out, "Tree written to {}", path.display())?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use derivation::load;
    use rstest::rstest;

    use super::*;

    const BALANCED: &str = "\
Vt: a b
Vxt: S
S: S
P:
S -> a S b | ε
";

    fn grammar() -> Grammar {
        load(BALANCED).unwrap()
    }

    fn output(bytes: Vec<u8>) -> String {
        String::from_utf8(bytes).unwrap()
    }

    #[rstest]
    #[case("aabb", Verdict::Accepted)]
    #[case("", Verdict::Accepted)]
    #[case("aab", Verdict::Rejected)]
    fn reports_verdicts(#[case] input: &str, #[case] expected: Verdict) {
        let grammar = grammar();
        let mut session = Session::new(&grammar, Settings::default());
        let mut out = Vec::new();

        assert_eq!(session.check(input, &mut out).unwrap(), expected);
    }

    #[test]
    fn accepted_strings_print_their_tree() {
        let grammar = grammar();
        let mut session = Session::new(&grammar, Settings::default()).with_steps(true);
        let mut out = Vec::new();

        session.check("ab", &mut out).unwrap();

        let text = output(out);
        assert!(text.contains("'ab' is accepted"));
        assert!(text.contains("├─ a"));
        assert!(text.contains("⇒ a S b"));
        assert!(text.contains("⇒ a b"));
    }

    #[test]
    fn exhausted_budgets_are_not_rejections() {
        let grammar = grammar();
        let mut settings = Settings::default();
        settings.options = settings.options.with_max_steps(2);
        let mut session = Session::new(&grammar, settings);
        let mut out = Vec::new();

        assert_eq!(session.check("aabb", &mut out).unwrap(), Verdict::GaveUp);
        assert!(output(out).starts_with("Gave up on 'aabb'"));
    }

    #[test]
    fn interactive_loop_stops_at_quit_word() {
        let grammar = grammar();
        let mut session = Session::new(&grammar, Settings::default());
        let mut out = Vec::new();

        session
            .run_interactive(Cursor::new("ab\nba\nquit\naabb\n"), &mut out)
            .unwrap();

        let text = output(out);
        assert!(text.contains("'ab' is accepted"));
        assert!(text.contains("'ba' is not accepted"));
        assert!(!text.contains("aabb"));
    }

    #[test]
    fn interactive_loop_ends_at_eof() {
        let grammar = grammar();
        let mut session = Session::new(&grammar, Settings::default());
        let mut out = Vec::new();

        session.run_interactive(Cursor::new("ab\n"), &mut out).unwrap();

        assert_eq!(output(out).matches("Enter a string").count(), 2);
    }
}
