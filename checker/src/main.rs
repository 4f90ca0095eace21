//! Auto checker for programming exercises.
//!
//! Each exercise is an implementation (`<name>.js`) and a definition
//! (`<name>.test`) in the exercises directory. The checker runs the
//! implementation in an isolated context and reports a verdict per exercise.

mod cli;
mod config;
mod exercise;
mod outcome;
mod report;
mod results;
mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sandbox::exit_codes;

use crate::cli::CheckArgs;
use crate::exercise::resolve_exercises_dir;

#[derive(Parser)]
#[command(name = "checker", version, about = "Auto checker for programming exercises")]
struct Cli {
    /// Exercises directory (defaults to ./Exercises).
    #[arg(long, global = true)]
    dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the names of all exercises.
    List,
    /// Check exercises (the default).
    Check(CheckArgs),
}

fn main() {
    sandbox::logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            exit_codes::FATAL
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let dir = match cli.dir {
        Some(dir) => dir,
        None => resolve_exercises_dir(&std::env::current_dir().context("read current dir")?),
    };
    match cli.command {
        Some(Command::List) => {
            cli::list_exercises(&dir)?;
            Ok(exit_codes::OK)
        }
        Some(Command::Check(args)) => cli::check_exercises(&dir, &args),
        None => cli::check_exercises(&dir, &CheckArgs::default()),
    }
}
