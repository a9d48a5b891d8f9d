//! Per-file hashing errors and the aggregate that collects them.

use std::fmt;
use std::path::PathBuf;

/// A boxed error that can cross thread boundaries.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure to hash a single file. The walk keeps going; the path is left out of the result map.
#[derive(Debug, thiserror::Error)]
pub enum FileHashError {
    #[error("could not open data for path ({}): {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not hash data for path ({}): {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FileHashError {
    /// Path of the file that failed.
    pub fn path(&self) -> &PathBuf {
        match self {
            FileHashError::Open { path, .. } | FileHashError::Read { path, .. } => path,
        }
    }
}

/// Ordered set of independent errors surfaced as one failure.
///
/// An empty `MultiError` is not a failure; use [`MultiError::into_option`] before handing it out.
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<BoxedError>,
}

impl MultiError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one error, preserving arrival order.
    pub fn push<E>(&mut self, err: E)
    where
        E: Into<BoxedError>,
    {
        self.errors.push(err.into());
    }

    /// Append every error of `other`.
    pub fn extend(&mut self, other: MultiError) {
        self.errors.extend(other.errors);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[BoxedError] {
        &self.errors
    }

    /// `None` when nothing was collected, so callers never see an empty failure.
    pub fn into_option(self) -> Option<MultiError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        f.write_str(&joined)
    }
}

impl std::error::Error for MultiError {}
