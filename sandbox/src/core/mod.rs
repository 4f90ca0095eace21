//! Deterministic, pure logic shared by the sandbox and validator.
//!
//! Core modules must be free of I/O side effects and must not touch the
//! JavaScript engine. They operate on plain data and return deterministic
//! outputs suitable for tests.

pub mod canonical;
pub mod metrics;
pub mod types;
pub mod wrap;
