//! Checker configuration stored as `checker.toml` in the exercises directory.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::io::engine::Limits;

/// File name looked up inside the exercises directory.
pub const CONFIG_FILE_NAME: &str = "checker.toml";

/// Sandbox configuration (TOML).
///
/// Missing fields default to the reference budgets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SandboxConfig {
    /// Budget for compiling a wrapped source file.
    pub parse_timeout_ms: u64,

    /// Budget for running a file and for each later call into candidate code.
    pub execution_timeout_ms: u64,

    /// Stop the whole batch on a parse error, execution error, or timeout.
    /// When false these become a per-exercise error verdict.
    pub fail_fast: bool,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            parse_timeout_ms: 1_000,
            execution_timeout_ms: 5_000,
            fail_fast: true,
        }
    }
}

impl SandboxConfig {
    pub fn validate(&self) -> Result<()> {
        if self.parse_timeout_ms == 0 {
            return Err(anyhow!("parse_timeout_ms must be > 0"));
        }
        if self.execution_timeout_ms == 0 {
            return Err(anyhow!("execution_timeout_ms must be > 0"));
        }
        Ok(())
    }

    pub fn limits(&self) -> Limits {
        Limits {
            parse_timeout: Duration::from_millis(self.parse_timeout_ms),
            execution_timeout: Duration::from_millis(self.execution_timeout_ms),
        }
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `SandboxConfig::default()`.
pub fn load_config(path: &Path) -> Result<SandboxConfig> {
    if !path.exists() {
        let cfg = SandboxConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: SandboxConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}
