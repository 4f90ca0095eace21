//! Test-only helpers for engines and exercise directories.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::core::types::SourceUnit;
use crate::io::engine::{Engine, Limits, SandboxError};
use crate::validate::{Validation, validate};

/// Short budgets so timeout tests finish quickly.
pub fn test_limits() -> Limits {
    Limits {
        parse_timeout: Duration::from_millis(1_000),
        execution_timeout: Duration::from_millis(300),
    }
}

pub fn engine() -> Engine {
    Engine::new(test_limits())
}

/// Validate an implementation/definition pair on a fresh engine.
pub fn validate_sources(implementation: &str, definition: &str) -> Result<Validation, SandboxError> {
    let mut engine = engine();
    validate(
        &mut engine,
        &SourceUnit::implementation(implementation),
        &SourceUnit::definition(definition),
    )
}

/// Temporary exercises directory.
pub struct ExerciseDir {
    temp: TempDir,
}

impl ExerciseDir {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create tempdir")?;
        Ok(Self { temp })
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Write `<name>.js` and `<name>.test`.
    pub fn add(&self, name: &str, implementation: &str, definition: &str) -> Result<()> {
        self.write(&format!("{name}.js"), implementation)?;
        self.write(&format!("{name}.test"), definition)?;
        Ok(())
    }

    pub fn write(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.temp.path().join(file_name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}
