//! Shared deterministic types for sources, failures, and verdicts.
//!
//! These types define the contract between the validator and whatever
//! orchestrates it. The orchestrator matches on variants; the `Display`
//! output is the human-readable reason printed for an exercise.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// How a source file is wrapped before execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A sequence of statements that populates `module.exports`.
    Statements,
    /// A single expression whose value is the artifact (test definitions).
    Expression,
}

/// A file's text plus the wrapping mode used to execute it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub text: String,
    pub kind: SourceKind,
}

impl SourceUnit {
    /// Learner implementation (`<name>.js`).
    pub fn implementation(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: SourceKind::Statements,
        }
    }

    /// Test definition (`<name>.test`).
    pub fn definition(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: SourceKind::Expression,
        }
    }
}

/// Size of the stringified candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// JavaScript string length (UTF-16 code units).
    pub length: usize,
    pub lines: usize,
}

/// Summary of literal call cases for a passing exercise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseSummary {
    NoCases,
    Passed { count: usize },
}

impl fmt::Display for CaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaseSummary::NoCases => write!(f, "No test cases"),
            CaseSummary::Passed { count } => write!(f, "Passed cases: {count}"),
        }
    }
}

/// Recoverable, per-exercise validation failure.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Failure {
    #[error("Invalid test definition: {reason}")]
    InvalidTest { reason: String },
    #[error("No implementation detected")]
    MissingImplementation,
    #[error("Function {expected} is not found")]
    NameMismatch { expected: String, actual: String },
    #[error("{message}")]
    Threw { message: String },
    #[error("Solution is too long")]
    TooLong { length: usize, max: f64 },
    #[error("Solution is too short")]
    TooShort { length: usize, min: f64 },
    #[error("{name} is not a function")]
    NotCallable { name: String },
    #[error("Case failed: expected {expected}, result: {actual}")]
    CaseFailed {
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("Case {index} threw: {message}")]
    CaseThrew { index: usize, message: String },
    #[error("{message}")]
    HookFailed { message: String },
}

impl Failure {
    pub fn invalid_test(reason: impl Into<String>) -> Self {
        Failure::InvalidTest {
            reason: reason.into(),
        }
    }
}

/// Final outcome of validating one exercise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Verdict {
    Passed { cases: CaseSummary },
    Failed { failure: Failure },
    /// A sandbox-level problem downgraded to a per-exercise result.
    Error { reason: String },
}

impl Verdict {
    pub fn is_passed(&self) -> bool {
        matches!(self, Verdict::Passed { .. })
    }

    /// Text after `Error: ` for anything that did not pass.
    pub fn reason(&self) -> Option<String> {
        match self {
            Verdict::Passed { .. } => None,
            Verdict::Failed { failure } => Some(failure.to_string()),
            Verdict::Error { reason } => Some(reason.clone()),
        }
    }
}
