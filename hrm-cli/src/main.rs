//! hrmi: run, check, format and test Human Resource Machine programs.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Input or parse error
//! - 2: Program validation error
//! - 3: Runtime error
//! - 4: Fixture mismatch

mod commands;
mod input;
mod trace;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use hrm_vm::DEFAULT_STEP_LIMIT;

#[derive(Parser, Debug)]
#[command(
    name = "hrmi",
    version,
    about = "Human Resource Machine interpreter",
    after_help = "Inbox and tiles are comma-separated values: integers or single letters.\n\
                  In '-t 0,,B' the empty entry leaves tile 1 empty."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program and print its outbox.
    Run {
        /// Program source file.
        program: PathBuf,

        /// Inbox values, first to be grabbed first (e.g. 1,2,A).
        #[arg(short, long, value_name = "VALUES", allow_hyphen_values = true)]
        inbox: Option<String>,

        /// Initial floor tiles from address 0 (e.g. 0,,B).
        #[arg(short, long, value_name = "VALUES", allow_hyphen_values = true)]
        tiles: Option<String>,

        /// Print every instruction with the state changes it causes.
        #[arg(short, long)]
        verbose: bool,

        /// Maximum number of instructions to execute (0 for no limit).
        #[arg(long, env = "HRM_MAX_STEPS", default_value_t = DEFAULT_STEP_LIMIT)]
        max_steps: u64,
    },

    /// Parse and validate a program.
    Check {
        program: PathBuf,
    },

    /// Print a program in canonical form.
    Fmt {
        program: PathBuf,
    },

    /// Run a program against every example of a JSON fixture.
    Test {
        program: PathBuf,

        /// Fixture file: {"tiles": [...], "examples": [{"inbox": [...], "outbox": [...]}]}.
        fixture: PathBuf,

        /// Maximum number of instructions per example (0 for no limit).
        #[arg(long, env = "HRM_MAX_STEPS", default_value_t = DEFAULT_STEP_LIMIT)]
        max_steps: u64,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    let result = match &cli.command {
        Command::Run {
            program,
            inbox,
            tiles,
            verbose,
            max_steps,
        } => commands::run(
            program,
            inbox.as_deref(),
            tiles.as_deref(),
            *verbose,
            *max_steps,
        ),
        Command::Check { program } => commands::check(program),
        Command::Fmt { program } => commands::fmt(program),
        Command::Test {
            program,
            fixture,
            max_steps,
        } => commands::test(program, fixture, *max_steps),
    };

    if let Err(code) = result {
        process::exit(code);
    }
}
