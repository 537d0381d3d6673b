//! Polyglot CLI: per-commit language statistics for git repositories.
//!
//! `polyglot stats` reports the language composition of a commit, reusing
//! the statistics cached for the previously scanned commit whenever it can.
//! `breakdown` lists the files behind each language, and `dump-cache`,
//! `clear` and `disable` inspect and manage the cache file.

#![warn(missing_docs)]

mod breakdown;
mod cache_cmd;
mod error;
mod logging;
mod stats;
mod workspace;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use crate::error::CliError;

/// Polyglot: incremental language statistics for git repositories.
#[derive(Parser, Debug)]
#[command(name = "polyglot", version, about = "Per-commit language statistics")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path inside the repository to inspect.
    #[arg(long, global = true, default_value = ".")]
    pub repo: PathBuf,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the language statistics of a commit as JSON.
    Stats(StatsArgs),
    /// Print the files assigned to each language as JSON.
    Breakdown(BreakdownArgs),
    /// Print the raw cache record as JSON (`null` if there is none).
    DumpCache,
    /// Delete the cache file.
    Clear,
    /// Freeze the cache so that `stats` stops scanning.
    Disable,
}

/// Arguments for the `polyglot stats` subcommand.
#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Commit to scan (any revision git understands).
    #[arg(long)]
    pub commit: Option<String>,

    /// Rescan the whole tree instead of extending the cached baseline.
    #[arg(long)]
    pub force: bool,

    /// Maximum number of files classified per tree.
    #[arg(long)]
    pub max_tree_size: Option<usize>,
}

/// Arguments for the `polyglot breakdown` subcommand.
#[derive(Parser, Debug)]
pub struct BreakdownArgs {
    /// Commit to scan (any revision git understands).
    #[arg(long)]
    pub commit: Option<String>,

    /// Maximum number of files classified per tree.
    #[arg(long)]
    pub max_tree_size: Option<usize>,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Where to start looking for the repository.
    pub repo: PathBuf,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            process::exit(if e.use_stderr() { 1 } else { 0 });
        }
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        repo: cli.repo,
    };
    logging::init(&global);

    let result = match cli.command {
        Command::Stats(ref args) => stats::run(args, &global),
        Command::Breakdown(ref args) => breakdown::run(args, &global),
        Command::DumpCache => cache_cmd::dump(&global),
        Command::Clear => cache_cmd::clear(&global),
        Command::Disable => cache_cmd::disable(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}", e.report());
            process::exit(1);
        }
    }
}

/// Returns the `--commit` value or the usage error for its absence.
fn required_commit(commit: Option<&str>) -> Result<&str, CliError> {
    match commit {
        Some(rev) if !rev.trim().is_empty() => Ok(rev),
        _ => Err(CliError::Usage(
            "missing required --commit <REV>".to_string(),
        )),
    }
}

/// Writes `value` to stdout as pretty-printed JSON.
fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
