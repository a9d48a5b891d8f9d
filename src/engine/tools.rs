//! Path and directory checks used by the CLI.

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::errors::MultiError;

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Check that every path exists and is a directory. All problems are reported together.
pub fn assert_dirs_exist(dirs: &[&Path]) -> std::result::Result<(), MultiError> {
    let mut errors = MultiError::new();
    for dir in dirs {
        match std::fs::metadata(dir) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                errors.push(anyhow!("{} does not exist", dir.display()));
            }
            Err(e) => {
                errors.push(
                    anyhow::Error::new(e)
                        .context(format!("failed to get file info about {}", dir.display())),
                );
            }
            Ok(meta) if !meta.is_dir() => {
                errors.push(anyhow!("{} is not a directory", dir.display()));
            }
            Ok(_) => {}
        }
    }
    match errors.into_option() {
        None => Ok(()),
        Some(errors) => Err(errors),
    }
}

/// True if `dir` has no entries.
pub fn dir_is_empty(dir: &Path) -> Result<bool> {
    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("could not read dir contents of {}", dir.display()))?;
    Ok(entries.next().is_none())
}

/// Pretty JSON for CLI output.
pub fn to_indented_json<T: Serialize + ?Sized>(target: &T) -> Result<String> {
    serde_json::to_string_pretty(target).context("serialize output")
}
