//! Application configuration constants.
//! Tuning and thresholds in one place.

use std::sync::OnceLock;

// ---- Package / paths (from CARGO_PKG_NAME, cached) ----

/// Package-derived file names: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    pkg_name: &'static str,
    config_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    /// Build and cache names from `CARGO_PKG_NAME`. Called once on first use.
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| {
            let pkg = env!("CARGO_PKG_NAME");
            PackagePaths {
                pkg_name: pkg,
                config_filename: format!(".{pkg}.toml"),
            }
        })
    }

    pub fn pkg_name(&self) -> &str {
        self.pkg_name
    }

    /// `.dupelink.toml`, looked up in the current directory by the CLI.
    pub fn config_filename(&self) -> &str {
        &self.config_filename
    }
}

// ---- Workers ----

/// Worker count limits for the hashing pool.
pub struct WorkerLimits;

impl WorkerLimits {
    /// Workers used when neither the CLI nor the config file sets one. One worker means serial hashing.
    pub const DEFAULT_WORKERS: usize = 1;
    /// Smallest valid worker count.
    pub const MIN_WORKERS: usize = 1;
}

// ---- Channels ----

/// Capacities of the pipeline channels.
pub struct ChannelCaps;

impl ChannelCaps {
    /// Work channel is a rendezvous: an item counts as dispatched only once a worker took it.
    pub const WORK: usize = 0;
    /// Each worker may park one finished result while the collector catches up.
    pub const WORKER_RESULT: usize = 1;
    /// Merged stream feeding the collector.
    pub const MERGED_RESULT: usize = 16;
}

// ---- Hashing ----

/// Hashing I/O buffer sizes.
pub struct HashingConsts;

impl HashingConsts {
    /// Chunk size for streaming file contents into a hasher (bytes). 64 KB.
    pub const HASH_READ_CHUNK_SIZE: usize = 64 * 1024;
}

// ---- Connect ----

/// Mode for directories created under the output tree (and base for copied files).
pub const DEFAULT_DIR_MODE: u32 = 0o755;

/// Progress percentage ceiling.
pub const PROGRESS_MAX: usize = 100;
