//! Batch orchestration.
//!
//! Validates exercises one at a time on a single engine, writing the report
//! as it goes. Each exercise yields exactly one verdict line.

use std::io::Write;

use anyhow::{Context, Result};
use sandbox::io::config::SandboxConfig;
use sandbox::{Engine, SandboxError, Verdict, validate};
use tracing::{debug, info, instrument, warn};

use crate::exercise::Exercise;
use crate::outcome::{Tally, classify_outcome};
use crate::report::{exercise_header, metrics_line, verdict_line};
use crate::results::{ExerciseRecord, source_sha256};

/// Result of running a batch.
#[derive(Debug)]
pub struct RunOutcome {
    pub records: Vec<ExerciseRecord>,
    pub tally: Tally,
    /// Set when a fatal sandbox error stopped the batch.
    pub fatal: Option<FatalError>,
}

/// A sandbox error that stopped the batch, and where it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatalError {
    pub exercise: String,
    pub error: SandboxError,
}

/// Run every exercise in order.
///
/// With `fail_fast`, the first sandbox error ends the batch; otherwise it is
/// recorded as that exercise's error verdict and the batch continues.
#[instrument(skip_all, fields(exercises = exercises.len(), fail_fast = config.fail_fast))]
pub fn run_exercises<W: Write>(
    exercises: &[Exercise],
    config: &SandboxConfig,
    out: &mut W,
) -> Result<RunOutcome> {
    let mut engine = Engine::new(config.limits());
    let mut records = Vec::with_capacity(exercises.len());
    let mut tally = Tally::default();

    for exercise in exercises {
        writeln!(out, "\n{}", exercise_header(&exercise.name)).context("write report")?;
        let (record, fatal) = check_exercise(&mut engine, exercise, config.fail_fast);
        if let Some(metrics) = &record.metrics {
            writeln!(out, "{}", metrics_line(metrics)).context("write report")?;
        }
        writeln!(out, "{}", verdict_line(&record.verdict)).context("write report")?;
        tally.record(classify_outcome(&record.verdict));
        records.push(record);

        if let Some(error) = fatal {
            warn!(exercise = %exercise.name, err = %error, "fatal sandbox error, stopping");
            return Ok(RunOutcome {
                records,
                tally,
                fatal: Some(FatalError {
                    exercise: exercise.name.clone(),
                    error,
                }),
            });
        }
    }

    info!(
        total = tally.total(),
        passed = tally.passed,
        failed = tally.failed,
        errors = tally.errors,
        "batch complete"
    );
    Ok(RunOutcome {
        records,
        tally,
        fatal: None,
    })
}

fn check_exercise(
    engine: &mut Engine,
    exercise: &Exercise,
    fail_fast: bool,
) -> (ExerciseRecord, Option<SandboxError>) {
    let mut record = ExerciseRecord {
        name: exercise.name.clone(),
        implementation_sha256: None,
        definition_sha256: None,
        metrics: None,
        verdict: Verdict::Error {
            reason: String::new(),
        },
    };

    let sources = match exercise.load_sources() {
        Ok(sources) => sources,
        Err(err) => {
            record.verdict = Verdict::Error {
                reason: format!("{err:#}"),
            };
            return (record, None);
        }
    };
    record.implementation_sha256 = Some(source_sha256(&sources.implementation.text));
    record.definition_sha256 = Some(source_sha256(&sources.definition.text));

    debug!(exercise = %exercise.name, "validating");
    match validate(engine, &sources.implementation, &sources.definition) {
        Ok(validation) => {
            record.metrics = validation.metrics;
            record.verdict = validation.verdict;
            (record, None)
        }
        Err(error) => {
            record.verdict = Verdict::Error {
                reason: error.to_string(),
            };
            let fatal = fail_fast.then_some(error);
            (record, fatal)
        }
    }
}
