//! Command line tools.
//!
//! This module is specifically designed to be used by texcore's binary
//! target. It contains all the content needed to create texcore's command
//! line interface.
//!
//! Each subcommand of the CLI should be runnable only using its arguments.
//! This is why subcommands derive the [`clap::Parser`] trait.

pub mod color;
pub mod io;
pub mod traits;
use clap::{CommandFactory, Parser, Subcommand};
pub use traits::*;
#[cfg(feature = "cli-complete")]
pub mod complete;

use crate::chars::InputSource;
use crate::config::Config;
use crate::env::Environment;
use crate::error::{Error, Result};
use crate::mouth::Mouth;
use crate::token::{Token, TokenKind};
use std::io::Write;
use std::path::Path;

/// Main command line structure. Contains every subcommand.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "texcore: run TeX's tokenizer, macro expander, and command executor over a document.",
    propagate_version(true),
    subcommand_required(true)
)]
pub struct Cli {
    /// Which of texcore's pipeline stages to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Enumerate all possible commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the Eyes alone and print the raw token stream.
    Tokenize(Tokenize),
    /// Run the full Eyes/Mouth/Stomach pipeline and print the typeset output.
    Run(Run),
    /// Run the Mouth alone (no Stomach) and print the fully-expanded token stream.
    Expand(Expand),
    /// Run the full pipeline and report only whether it completed without error.
    Check(Check),
    #[cfg(feature = "cli-complete")]
    Complete(complete::CompleteCommand),
}

/// Build a command from the top-level command line structure.
pub fn build_cli() -> clap::Command {
    Cli::command()
}

/// Builds a fresh [`Environment`] for one input job: `jobname` and the
/// `\input` search path from `input.directory`, `\input`/`\include`
/// enabled or disabled per `input.follow_includes`, with `source` pushed
/// as the initial input.
fn build_job_environment(input: &io::InputArgs, path: Option<&Path>, source: String) -> Environment {
    let mut env = Config::from_first_input(path)
        .with_input_path(vec![input.directory.clone()])
        .build_environment();
    env.allow_input = !matches!(input.follow_includes, io::Choice::Never);
    env.inputs.push(InputSource::new(source, path_name(path)));
    env
}

fn describe_token(token: &Token) -> String {
    match &token.kind {
        TokenKind::Character(c, cat) => format!("Character({c:?}, {cat:?})"),
        TokenKind::ControlSequence { name, active } => {
            if *active {
                format!("ControlSequence(active {name:?})")
            } else {
                format!("ControlSequence({name})")
            }
        }
        TokenKind::Parameter(i) => format!("Parameter({i})"),
        TokenKind::Group { inner, .. } => format!("Group({} tokens)", inner.len()),
    }
}

/// `tokenize <FILE>...`: runs the Eyes alone, printing one token per line
/// as `[line.col] kind`.
#[derive(Parser, Debug)]
pub struct Tokenize {
    /// Input source(s).
    #[command(flatten)]
    pub input: io::InputArgs,
    /// Output formatting.
    #[command(flatten)]
    pub output: io::OutputArgs,
}

impl Execute for Tokenize {
    type Error = Error;

    fn execute(self) -> Result<()> {
        let mut stdout = self.output.stdout();
        for (path, source) in self.input.read_sources(&mut stdout)? {
            let mut env = build_job_environment(&self.input, path.as_deref(), source);
            while let Some(token) = crate::eyes::next_token(&mut env)? {
                writeln!(stdout, "[{}] {}", token.position, describe_token(&token))?;
            }
        }
        Ok(())
    }
}

/// `run <FILE>...`: runs the full pipeline to completion, printing the
/// typeset character stream and any `\message`/`\errmessage` output.
#[derive(Parser, Debug)]
pub struct Run {
    /// Input source(s).
    #[command(flatten)]
    pub input: io::InputArgs,
    /// Output formatting.
    #[command(flatten)]
    pub output: io::OutputArgs,
}

impl Execute for Run {
    type Error = Error;

    fn execute(self) -> Result<()> {
        let mut stdout = self.output.stdout();
        for (path, source) in self.input.read_sources(&mut stdout)? {
            let mut env = build_job_environment(&self.input, path.as_deref(), source);
            let mut mouth = Mouth::new();
            crate::stomach::run(&mut mouth, &mut env, &mut stdout)?;
        }
        Ok(())
    }
}

/// `expand <FILE>...`: runs the Mouth alone, printing the fully-expanded
/// token stream without executing any command.
#[derive(Parser, Debug)]
pub struct Expand {
    /// Input source(s).
    #[command(flatten)]
    pub input: io::InputArgs,
    /// Output formatting.
    #[command(flatten)]
    pub output: io::OutputArgs,
}

impl Execute for Expand {
    type Error = Error;

    fn execute(self) -> Result<()> {
        let mut stdout = self.output.stdout();
        let control: termcolor::ColorSpec = self.output.color_args.into();
        for (path, source) in self.input.read_sources(&mut stdout)? {
            let mut env = build_job_environment(&self.input, path.as_deref(), source);
            let mut mouth = Mouth::new();
            while let Some(token) = mouth.read(&mut env)? {
                let rendered = crate::mouth::render_tokens(std::slice::from_ref(&token));
                crate::explain::write_colorized(&rendered, &control, &mut stdout)?;
            }
            writeln!(stdout)?;
        }
        Ok(())
    }
}

/// `check <FILE>...`: runs the full pipeline and reports only whether it
/// completed without error, via the process exit code.
#[derive(Parser, Debug)]
pub struct Check {
    /// Input source(s).
    #[command(flatten)]
    pub input: io::InputArgs,
}

impl Execute for Check {
    type Error = Error;

    fn execute(self) -> Result<()> {
        let mut sink = std::io::sink();
        for (path, source) in self.input.read_sources(&mut std::io::stdout())? {
            let mut env = build_job_environment(&self.input, path.as_deref(), source);
            let mut mouth = Mouth::new();
            crate::stomach::run(&mut mouth, &mut env, &mut sink)?;
        }
        Ok(())
    }
}

fn path_name(path: Option<&Path>) -> Option<String> {
    path.map(|p| p.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn test_cli() {
        Cli::command().debug_assert();
    }
}
