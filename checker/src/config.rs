//! Sandbox configuration merging.
//!
//! Applies command-line overrides to the configuration loaded from the
//! exercises directory.

use anyhow::Result;
use sandbox::io::config::SandboxConfig;

/// Command-line overrides for the sandbox configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Downgrade fatal sandbox errors to per-exercise errors.
    pub keep_going: bool,
    pub parse_timeout_ms: Option<u64>,
    pub execution_timeout_ms: Option<u64>,
}

/// Apply overrides to the base config and re-validate.
pub fn apply_overrides(mut base: SandboxConfig, overrides: &Overrides) -> Result<SandboxConfig> {
    if overrides.keep_going {
        base.fail_fast = false;
    }
    if let Some(parse_timeout_ms) = overrides.parse_timeout_ms {
        base.parse_timeout_ms = parse_timeout_ms;
    }
    if let Some(execution_timeout_ms) = overrides.execution_timeout_ms {
        base.execution_timeout_ms = execution_timeout_ms;
    }
    base.validate()?;
    Ok(base)
}
