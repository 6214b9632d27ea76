use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::ValueEnum;
use derivation::{DeriveOptions, Tokenization};
use serde::Deserialize;

pub const DEFAULT_PROMPT: &str = "Enter a string to check (or 'quit' to finish): ";
pub const DEFAULT_QUIT_WORDS: [&str; 3] = ["quit", "exit", "salir"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TokenizationSetting {
    Characters,
    Whitespace,
}

impl From<TokenizationSetting> for Tokenization {
    fn from(value: TokenizationSetting) -> Self {
        match value {
            TokenizationSetting::Characters => Tokenization::Characters,
            TokenizationSetting::Whitespace => Tokenization::Whitespace,
        }
    }
}

/// Session settings as they appear in a YAML config file. Every field is
/// optional; command-line flags take precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartialSettings {
    pub tokenization: Option<TokenizationSetting>,
    pub max_depth: Option<usize>,
    pub max_steps: Option<u64>,
    pub prompt: Option<String>,
    pub quit_words: Option<Vec<String>>,
}

impl PartialSettings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;

        serde_yaml::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    /// Values set in `other` win over the ones in `self`.
    pub fn merge(self, other: PartialSettings) -> PartialSettings {
        PartialSettings {
            tokenization: other.tokenization.or(self.tokenization),
            max_depth: other.max_depth.or(self.max_depth),
            max_steps: other.max_steps.or(self.max_steps),
            prompt: other.prompt.or(self.prompt),
            quit_words: other.quit_words.or(self.quit_words),
        }
    }

    pub fn resolve(self) -> Settings {
        let defaults = DeriveOptions::default();

        Settings {
            tokenization: self.tokenization.map(Into::into).unwrap_or_default(),
            options: DeriveOptions {
                max_depth: self.max_depth.unwrap_or(defaults.max_depth),
                max_steps: self.max_steps.or(defaults.max_steps),
            },
            prompt: self.prompt.unwrap_or_else(|| DEFAULT_PROMPT.to_owned()),
            quit_words: self
                .quit_words
                .unwrap_or_else(|| DEFAULT_QUIT_WORDS.map(str::to_owned).to_vec()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tokenization: Tokenization,
    pub options: DeriveOptions,
    pub prompt: String,
    pub quit_words: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        PartialSettings::default().resolve()
    }
}

impl Settings {
    pub fn is_quit_word(&self, line: &str) -> bool {
        let line = line.trim();
        self.quit_words
            .iter()
            .any(|word| word.eq_ignore_ascii_case(line))
    }
}

#[cfg(test)]
mod tests {
    use derivation::DEFAULT_MAX_DEPTH;
    use rstest::rstest;

    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = Settings::default();

        assert_eq!(settings.tokenization, Tokenization::Characters);
        assert_eq!(settings.options.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(settings.options.max_steps, None);
        assert_eq!(settings.prompt, DEFAULT_PROMPT);
    }

    #[test]
    fn reads_yaml() {
        let file: PartialSettings = serde_yaml::from_str(
            "tokenization: whitespace\nmax_depth: 100\nquit_words: [bye]\n",
        )
        .unwrap();

        let settings = file.resolve();

        assert_eq!(settings.tokenization, Tokenization::Whitespace);
        assert_eq!(settings.options.max_depth, 100);
        assert_eq!(settings.quit_words, vec!["bye"]);
    }

    #[test]
    fn rejects_unknown_keys() {
        let result = serde_yaml::from_str::<PartialSettings>("max_dept: 3\n");

        assert!(result.is_err());
    }

    #[test]
    fn later_values_win() {
        let file = PartialSettings {
            max_depth: Some(10),
            max_steps: Some(500),
            ..PartialSettings::default()
        };
        let flags = PartialSettings {
            max_depth: Some(20),
            ..PartialSettings::default()
        };

        let settings = file.merge(flags).resolve();

        assert_eq!(settings.options.max_depth, 20);
        assert_eq!(settings.options.max_steps, Some(500));
    }

    #[rstest]
    #[case("quit", true)]
    #[case("  EXIT ", true)]
    #[case("salir", true)]
    #[case("ab", false)]
    #[case("", false)]
    fn recognizes_quit_words(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(Settings::default().is_quit_word(line), expected);
    }
}
