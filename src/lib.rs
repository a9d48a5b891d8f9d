//! Dupelink: concurrent walk-and-hash engine for hardlinking files shared between two trees

pub mod engine;
pub mod errors;
pub mod pipeline;
pub mod scan;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use errors::{BoxedError, FileHashError, MultiError};

use log::debug;
use std::path::Path;

use engine::hashing::HashAlgorithm;
use pipeline::WalkSettings;

/// Result alias used by public dupelink API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;

/// Single entry point: hash every regular file under `root` with `workers` hashers.
///
/// `workers <= 1` hashes serially on the calling thread. Per-file failures come back in the
/// second tuple element next to the hashes that did succeed; a failure to list the tree is `Err`.
///
/// ```ignore
/// let (hashes, errors) = dupelink::hash_dir(path, 4, HashAlgorithm::Sha256)?;
/// ```
pub fn hash_dir(root: &Path, workers: usize, algorithm: HashAlgorithm) -> Result<HashWalkResult> {
    debug!(
        "{} hash_dir: root={} workers={} algorithm={:?}",
        env!("CARGO_PKG_NAME").to_uppercase(),
        root.display(),
        workers,
        algorithm
    );
    scan::walk_hasher_for(workers, WalkSettings::for_algorithm(algorithm)).walk_and_hash(root)
}
