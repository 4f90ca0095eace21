//! CLI command implementations.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use sandbox::exit_codes;
use sandbox::io::config::{CONFIG_FILE_NAME, load_config};
use tracing::{debug, info};

use crate::config::{Overrides, apply_overrides};
use crate::exercise::{discover_exercises, select_exercises};
use crate::report::{BANNER, summary_line};
use crate::results::{RunResults, write_results};
use crate::run::run_exercises;

#[derive(Debug, Clone, Default, PartialEq, Eq, clap::Args)]
pub struct CheckArgs {
    /// Exercises to check (all when omitted).
    pub names: Vec<String>,
    /// Record sandbox errors per exercise instead of stopping the batch.
    #[arg(long)]
    pub keep_going: bool,
    /// Write a JSON results file.
    #[arg(long)]
    pub results: Option<PathBuf>,
    #[arg(long)]
    pub parse_timeout_ms: Option<u64>,
    #[arg(long)]
    pub execution_timeout_ms: Option<u64>,
}

impl CheckArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            keep_going: self.keep_going,
            parse_timeout_ms: self.parse_timeout_ms,
            execution_timeout_ms: self.execution_timeout_ms,
        }
    }
}

/// List all available exercises.
pub fn list_exercises(dir: &Path) -> Result<()> {
    for exercise in discover_exercises(dir)? {
        println!("{}", exercise.name);
    }
    Ok(())
}

/// Check exercises and return the process exit code.
pub fn check_exercises(dir: &Path, args: &CheckArgs) -> Result<i32> {
    let base = load_config(&dir.join(CONFIG_FILE_NAME))?;
    let config = apply_overrides(base, &args.overrides()).context("apply overrides")?;
    debug!(?config, dir = %dir.display(), "config loaded");

    let exercises = select_exercises(discover_exercises(dir)?, &args.names)?;
    info!(count = exercises.len(), "checking exercises");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for line in BANNER {
        writeln!(out, "{line}").context("write report")?;
    }

    let started_at = Utc::now();
    let outcome = run_exercises(&exercises, &config, &mut out)?;
    let finished_at = Utc::now();

    writeln!(out, "\n{}", summary_line(&outcome.tally)).context("write report")?;
    out.flush().context("flush report")?;

    let fatal = outcome
        .fatal
        .as_ref()
        .map(|fatal| format!("{}: {}", fatal.exercise, fatal.error));

    if let Some(path) = &args.results {
        let results = RunResults::new(
            dir,
            started_at,
            finished_at,
            outcome.tally,
            fatal.clone(),
            outcome.records,
        );
        write_results(path, &results)?;
    }

    match fatal {
        Some(message) => {
            eprintln!("fatal: {message}");
            Ok(exit_codes::FATAL)
        }
        None => Ok(exit_codes::OK),
    }
}
