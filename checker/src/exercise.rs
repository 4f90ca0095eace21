//! Exercise discovery and source loading.
//!
//! An exercise named `X` is the pair `X.js` (implementation) and `X.test`
//! (definition) inside the exercises directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use sandbox::SourceUnit;

pub const DEFINITION_SUFFIX: &str = ".test";
pub const IMPLEMENTATION_SUFFIX: &str = ".js";
const EXERCISES_DIR_NAME: &str = "Exercises";

/// One exercise and the paths of its two files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exercise {
    pub name: String,
    pub implementation: PathBuf,
    pub definition: PathBuf,
}

/// Both sources of an exercise, ready for the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub implementation: SourceUnit,
    pub definition: SourceUnit,
}

impl Exercise {
    pub fn new(dir: &Path, name: &str) -> Self {
        Self {
            name: name.to_string(),
            implementation: dir.join(format!("{name}{IMPLEMENTATION_SUFFIX}")),
            definition: dir.join(format!("{name}{DEFINITION_SUFFIX}")),
        }
    }

    pub fn load_sources(&self) -> Result<Sources> {
        let implementation = fs::read_to_string(&self.implementation)
            .with_context(|| format!("read {}", self.implementation.display()))?;
        let definition = fs::read_to_string(&self.definition)
            .with_context(|| format!("read {}", self.definition.display()))?;
        Ok(Sources {
            implementation: SourceUnit::implementation(implementation),
            definition: SourceUnit::definition(definition),
        })
    }
}

/// Exercises directory when none is given: the current directory if it is
/// already inside `Exercises`, otherwise `./Exercises`.
pub fn resolve_exercises_dir(cwd: &Path) -> PathBuf {
    let inside = cwd
        .to_string_lossy()
        .contains(&format!("/{EXERCISES_DIR_NAME}"));
    if inside {
        cwd.to_path_buf()
    } else {
        cwd.join(EXERCISES_DIR_NAME)
    }
}

/// Discover exercises from every `*.test` file in `dir`, sorted by name.
pub fn discover_exercises(dir: &Path) -> Result<Vec<Exercise>> {
    if !dir.is_dir() {
        bail!("exercises directory {} not found", dir.display());
    }
    let mut exercises = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.context("read exercise entry")?;
        if !entry.path().is_file() {
            continue;
        }
        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        match file_name.strip_suffix(DEFINITION_SUFFIX) {
            Some(name) if !name.is_empty() => exercises.push(Exercise::new(dir, name)),
            _ => {}
        }
    }
    exercises.sort_by(|left, right| left.name.cmp(&right.name));
    Ok(exercises)
}

/// Keep only the named exercises; every name must exist.
pub fn select_exercises(exercises: Vec<Exercise>, names: &[String]) -> Result<Vec<Exercise>> {
    if names.is_empty() {
        return Ok(exercises);
    }
    for name in names {
        if !exercises.iter().any(|exercise| &exercise.name == name) {
            bail!("exercise {} not found", name);
        }
    }
    Ok(exercises
        .into_iter()
        .filter(|exercise| names.contains(&exercise.name))
        .collect())
}
