//! Public and internal types for the dupelink API and pipeline.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use crate::engine::hashing::HashAlgorithm;
use crate::errors::MultiError;
use crate::utils::config::WorkerLimits;

/// Finalized digest of one file's full content.
///
/// Compared and bucketed by value (hex encoding), never by hasher identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileDigest(Vec<u8>);

impl FileDigest {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex encoding of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Map of path → digest for every file that hashed successfully under a walked root.
///
/// Failed paths never appear here; they only show up in the [`MultiError`] returned next to it.
pub type PathHashes = HashMap<PathBuf, FileDigest>;

/// Result of one walk: `(hashes, errors)`. `errors` is `None` when every file hashed;
/// otherwise it holds one entry per failed file and `hashes` still holds every success.
pub type HashWalkResult = (PathHashes, Option<MultiError>);

/// Map from one file path to the related (identical) paths in the other tree.
pub type FileMap = HashMap<PathBuf, Vec<PathBuf>>;

/// Progress of a walk on a 0..=100 scale.
pub type Progress = usize;

/// Full options for a CLI run.
#[derive(Clone, Debug)]
pub struct Opts {
    /// Number of hashing workers (>= 1). One worker uses the serial hasher.
    pub workers: usize,
    /// Digest algorithm used for both trees.
    pub algorithm: HashAlgorithm,
    /// Report what would be linked/copied without touching the output tree.
    pub dry_run: bool,
    /// Copy reference files that have no identical file in the source tree.
    pub copy_missing: bool,
    /// Debug logging.
    pub verbose: bool,
    /// Stop dispatching new files after the first hashing error.
    pub fail_fast: bool,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            workers: WorkerLimits::DEFAULT_WORKERS,
            algorithm: HashAlgorithm::default(),
            dry_run: false,
            copy_missing: false,
            verbose: false,
            fail_fast: true,
        }
    }
}

/// Something that can walk a tree and hash every regular file in it.
pub trait WalkHasher: Send + Sync {
    /// Hash every file under `root`.
    ///
    /// `Err` means discovery itself failed (nothing was hashed). `Ok((hashes, Some(errors)))`
    /// means some files failed; `hashes` still holds every file that succeeded.
    fn walk_and_hash(&self, root: &std::path::Path) -> crate::Result<HashWalkResult>;
}
