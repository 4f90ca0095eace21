//! Sandboxed execution and validation of learner exercises.
//!
//! An exercise is a pair of JavaScript sources: an implementation that
//! exports a function, and a test definition naming that function together
//! with its allowed size, literal call cases, and an optional assertion hook.
//! The crate is split the same way as its responsibilities:
//!
//! - **[`core`]**: Pure, deterministic logic (source wrapping, measurement,
//!   canonical comparison, failure and verdict types). No engine, no I/O.
//! - **[`io`]**: The embedded V8 engine, fresh per-load contexts, wall-clock
//!   budgets, and configuration files.
//!
//! [`validate`] ties the two together into the validation protocol.

pub mod core;
pub mod definition;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod validate;

pub use crate::core::types::{CaseSummary, Failure, Metrics, SourceKind, SourceUnit, Verdict};
pub use crate::io::engine::{Engine, Limits, SandboxError};
pub use crate::validate::{Validation, validate};
