//! Machine-readable results file.
//!
//! Records what was checked (digests of both sources), when, and with what
//! verdict, so a batch can be audited after the console output is gone.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sandbox::{Metrics, Verdict};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::outcome::Tally;

/// Result of one exercise.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExerciseRecord {
    pub name: String,
    /// SHA-256 of the implementation source, if it could be read.
    pub implementation_sha256: Option<String>,
    /// SHA-256 of the definition source, if it could be read.
    pub definition_sha256: Option<String>,
    pub metrics: Option<Metrics>,
    pub verdict: Verdict,
}

/// Results of a whole batch, persisted as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunResults {
    pub exercises_dir: String,
    pub start_time: String,
    pub end_time: String,
    pub summary: Tally,
    /// Fatal error that stopped the batch early.
    pub fatal: Option<String>,
    pub exercises: Vec<ExerciseRecord>,
}

impl RunResults {
    pub fn new(
        exercises_dir: &Path,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        summary: Tally,
        fatal: Option<String>,
        exercises: Vec<ExerciseRecord>,
    ) -> Self {
        Self {
            exercises_dir: exercises_dir.display().to_string(),
            start_time: started_at.to_rfc3339(),
            end_time: finished_at.to_rfc3339(),
            summary,
            fatal,
            exercises,
        }
    }
}

pub fn write_results(path: &Path, results: &RunResults) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let contents = serde_json::to_string_pretty(results).context("serialize results")?;
    fs::write(path, format!("{contents}\n"))
        .with_context(|| format!("write results {}", path.display()))?;
    debug!(path = %path.display(), exercises = results.exercises.len(), "results written");
    Ok(())
}

pub fn source_sha256(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}
