mod session;
mod settings;

use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use derivation::load_file;
use env_logger::Env;
use log::debug;

use crate::{
    session::{Session, Verdict},
    settings::{PartialSettings, TokenizationSetting},
};

/// Decide whether strings belong to the language of a context-free grammar
/// and print the derivation tree of the ones that do.
#[derive(Debug, Parser)]
#[command(name = "derive", version)]
struct Args {
    /// Grammar file with Vt, Vxt, S and P sections
    grammar: PathBuf,

    /// Check this string and exit instead of prompting (repeatable)
    #[arg(short = 'i', long = "input")]
    inputs: Vec<String>,

    /// How candidate strings are split into terminals
    #[arg(short, long, value_enum)]
    tokenize: Option<TokenizationSetting>,

    /// Maximum number of productions along one derivation path [default: 2048].
    /// Right-recursive grammars apply about one production per token, so
    /// raise this for inputs longer than the default
    #[arg(long)]
    max_depth: Option<usize>,

    /// Maximum number of search steps, backtracking included
    #[arg(long)]
    max_steps: Option<u64>,

    /// YAML file with session settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write each accepted derivation tree as a DOT file into this directory
    #[arg(long)]
    dot_dir: Option<PathBuf>,

    /// Write the non-terminal dependency graph as a DOT file
    #[arg(long)]
    grammar_graph: Option<PathBuf>,

    /// Also print the sentential forms of each accepted derivation
    #[arg(long)]
    steps: bool,

    /// Do not print the grammar before checking strings
    #[arg(short, long)]
    quiet: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn overrides(&self) -> PartialSettings {
        PartialSettings {
            tokenization: self.tokenize,
            max_depth: self.max_depth,
            max_steps: self.max_steps,
            ..PartialSettings::default()
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let file_settings = match &args.config {
        Some(path) => PartialSettings::from_file(path)?,
        None => PartialSettings::default(),
    };
    let settings = file_settings.merge(args.overrides()).resolve();
    debug!("Settings: {:?}", settings);

    let grammar = load_file(&args.grammar)
        .with_context(|| format!("could not load grammar {}", args.grammar.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !args.quiet {
        writeln!(out, "{}", grammar)?;
        writeln!(out, "{}", grammar.production_table())?;
        writeln!(out, "Tokenization: {}", settings.tokenization)?;
        writeln!(out)?;
    }

    if let Some(path) = &args.grammar_graph {
        fs::write(path, grammar.dependency_graph_dot())
            .with_context(|| format!("could not write {}", path.display()))?;
    }

    let mut session = Session::new(&grammar, settings)
        .with_dot_dir(args.dot_dir.clone())
        .with_steps(args.steps);

    if args.inputs.is_empty() {
        session.run_interactive(io::stdin().lock(), &mut out)?;
        return Ok(ExitCode::SUCCESS);
    }

    let mut all_accepted = true;
    for input in &args.inputs {
        let verdict = session.check(input, &mut out)?;
        all_accepted &= verdict == Verdict::Accepted;
    }

    Ok(if all_accepted {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
