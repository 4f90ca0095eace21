//! Stable exit codes for the checker CLI.

/// The batch completed; individual exercises may still have failed.
pub const OK: i32 = 0;
/// A fatal sandbox error stopped the batch, or the invocation was invalid.
pub const FATAL: i32 = 1;
