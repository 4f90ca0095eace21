use sandbox::Verdict;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed,
    Error,
}

pub fn classify_outcome(verdict: &Verdict) -> Outcome {
    match verdict {
        Verdict::Passed { .. } => Outcome::Passed,
        Verdict::Failed { .. } => Outcome::Failed,
        Verdict::Error { .. } => Outcome::Error,
    }
}

/// Per-outcome counts for a batch.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct Tally {
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
}

impl Tally {
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Passed => self.passed += 1,
            Outcome::Failed => self.failed += 1,
            Outcome::Error => self.errors += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.errors
    }
}
