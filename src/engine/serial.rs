//! Single-threaded walk hasher: the `workers == 1` path.

use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;

use crate::errors::MultiError;
use crate::pipeline::{HashOutcome, WalkSettings, collect_walk_items, process_data};
use crate::utils::config::PROGRESS_MAX;
use crate::{HashWalkResult, PathHashes, WalkHasher};

/// Hashes every file one after the other on the calling thread.
///
/// Same contract as [`ParallelWalkHasher`](crate::pipeline::ParallelWalkHasher): partial
/// results plus an aggregated error, and with fail-fast the walk stops after the first failure.
#[derive(Clone)]
pub struct SerialWalkHasher {
    settings: WalkSettings,
}

impl SerialWalkHasher {
    pub fn new(settings: WalkSettings) -> Self {
        Self { settings }
    }
}

impl WalkHasher for SerialWalkHasher {
    fn walk_and_hash(&self, root: &Path) -> Result<HashWalkResult> {
        let items = collect_walk_items(self.settings.walker.as_ref(), root)
            .context("could not get items for serial hash walk")?;
        let total = items.len();
        debug!("{}: {} files, serial", root.display(), total);

        let cancel = self.settings.new_cancel_token();
        let mut hashes = PathHashes::new();
        let mut errors = MultiError::new();
        self.settings.progress.report_progress(0);
        for (i, item) in items.into_iter().enumerate() {
            if cancel.is_cancelled() {
                debug!("serial walk stopped after {} of {} items", i, total);
                break;
            }
            match process_data(item, &self.settings.hasher_factory) {
                HashOutcome::Hashed { path, digest } => {
                    hashes.insert(path, digest);
                }
                HashOutcome::Failed(err) => {
                    errors.push(err);
                    if self.settings.fail_fast {
                        cancel.cancel();
                    }
                }
            }
            self.settings
                .progress
                .report_progress(i * PROGRESS_MAX / total);
        }

        if cancel.interrupted() {
            bail!("hashing interrupted by user");
        }
        Ok((hashes, errors.into_option()))
    }
}
