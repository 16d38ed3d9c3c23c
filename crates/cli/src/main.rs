use std::path::PathBuf;
use std::process;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::error;

use exediff::commands;

/// Executable disassembly differ.
///
/// The binary is intentionally thin: it parses args, dispatches to command
/// helpers, and lets `exediff-core` + `commands` own the real work for
/// testability and reuse.
#[derive(Parser, Debug)]
#[command(
    name = "exediff",
    version,
    about = "Report which functions differ between two builds of an executable",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Baseline executable.
    file_a: Option<PathBuf>,

    /// Executable to compare against the baseline.
    file_b: Option<PathBuf>,

    /// Disassembler dialect to use. Defaults to the host platform's.
    #[arg(long, global = true)]
    dialect: Option<String>,

    /// Output path override (report file for a diff, dump destination).
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and normalize one executable, then print its symbols.
    Dump {
        /// Path to the executable to inspect.
        file: PathBuf,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List available disassembler dialect parsers.
    Dialects {
        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        error!("{err:#}");
        process::exit(10);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Dump { file, json }) => {
            commands::dump_command(&file, cli.dialect.as_deref(), cli.output.as_deref(), json)
        }
        Some(Command::Dialects { json }) => commands::dialects_command(json),
        None => {
            let (Some(file_a), Some(file_b)) = (cli.file_a, cli.file_b) else {
                return Err(anyhow!("Usage: exediff <executable-a> <executable-b>"));
            };
            commands::diff_command(&file_a, &file_b, cli.dialect.as_deref(), cli.output.as_deref())
        }
    }
}
