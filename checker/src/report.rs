//! Console report lines.

use sandbox::{Metrics, Verdict};

use crate::outcome::Tally;

pub const BANNER: [&str; 2] = ["How Programming Works", "Labs Auto Checker"];

pub fn exercise_header(name: &str) -> String {
    format!("Test {name}")
}

pub fn metrics_line(metrics: &Metrics) -> String {
    format!("  Length: {}, lines: {}", metrics.length, metrics.lines)
}

/// `Status: Passed, ...` for passing exercises, `Error: ...` otherwise.
pub fn verdict_line(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Passed { cases } => format!("  Status: Passed, {cases}"),
        _ => format!("  Error: {}", verdict.reason().unwrap_or_default()),
    }
}

pub fn summary_line(tally: &Tally) -> String {
    format!(
        "Summary: passed={} failed={} errors={}",
        tally.passed, tally.failed, tally.errors
    )
}
