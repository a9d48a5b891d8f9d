use anyhow::{Context, Result, bail};
use log::debug;
use std::path::Path;
use std::thread;

use crate::errors::MultiError;
use crate::utils::config::WorkerLimits;
use crate::{HashWalkResult, PathHashes, WalkHasher};

use super::collector::collect_results;
use super::context::{WalkSettings, create_walk_channels};
use super::dispatch::dispatch_work;
use super::merge::merge_result_channels;
use super::walk::collect_walk_items;
use super::workers::spawn_hash_workers;

/// Hashes every file under a root with a bounded pool of worker threads.
///
/// Pipeline per call: walk → dispatcher → work channel → N workers → per-worker result
/// channels → fan-in → collector. All of it runs inside one thread scope, so
/// [`walk_and_hash`](WalkHasher::walk_and_hash) returns only after every thread has exited.
#[derive(Clone)]
pub struct ParallelWalkHasher {
    num_workers: usize,
    settings: WalkSettings,
}

impl ParallelWalkHasher {
    /// `num_workers` below 1 is treated as 1.
    pub fn new(num_workers: usize, settings: WalkSettings) -> Self {
        Self {
            num_workers: num_workers.max(WorkerLimits::MIN_WORKERS),
            settings,
        }
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }
}

impl WalkHasher for ParallelWalkHasher {
    fn walk_and_hash(&self, root: &Path) -> Result<HashWalkResult> {
        let items = collect_walk_items(self.settings.walker.as_ref(), root)
            .context("could not get items for parallel hash walk")?;
        debug!(
            "{}: {} files, {} workers",
            root.display(),
            items.len(),
            self.num_workers()
        );
        self.settings.progress.report_progress(0);

        let cancel = self.settings.new_cancel_token();
        let channels = create_walk_channels();
        let fail_fast = self.settings.fail_fast;

        let (hashes, errors) = thread::scope(|s| -> Result<(PathHashes, MultiError)> {
            let (worker_handles, worker_rxs) = spawn_hash_workers(
                s,
                self.num_workers,
                &channels.work_rx,
                &cancel,
                &self.settings.hasher_factory,
            );
            // Only workers hold receivers now; if they all exit, dispatch fails fast instead of blocking.
            drop(channels.work_rx);
            let (merged_rx, merge_handles) = merge_result_channels(s, worker_rxs);
            let collector = s.spawn(|| collect_results(merged_rx, &cancel, fail_fast));

            let dispatched = dispatch_work(
                items,
                channels.work_tx,
                &cancel,
                self.settings.progress.as_ref(),
            );
            debug!("{}: dispatched {} files", root.display(), dispatched);

            let worker_panics = worker_handles
                .into_iter()
                .map(|h| h.join())
                .filter(|r| r.is_err())
                .count();
            let merge_panics = merge_handles
                .into_iter()
                .map(|h| h.join())
                .filter(|r| r.is_err())
                .count();
            let collected = collector
                .join()
                .map_err(|_| anyhow::anyhow!("collector thread panicked"))?;
            if worker_panics > 0 {
                bail!("{} worker thread(s) panicked", worker_panics);
            }
            if merge_panics > 0 {
                bail!("{} merge thread(s) panicked", merge_panics);
            }
            Ok(collected)
        })?;

        if cancel.interrupted() {
            bail!("hashing interrupted by user");
        }
        Ok((hashes, errors.into_option()))
    }
}
