//! Hash the source and reference trees concurrently.

use anyhow::{Result, anyhow};
use log::debug;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::thread;

use crate::engine::progress::{ProgressAggregator, ProgressReporter};
use crate::engine::serial::SerialWalkHasher;
use crate::errors::MultiError;
use crate::pipeline::{ParallelWalkHasher, WalkSettings};
use crate::{Opts, PathHashes, WalkHasher};

/// Pick the hasher for `workers`: serial for one worker, the pool otherwise.
pub fn walk_hasher_for(workers: usize, settings: WalkSettings) -> Box<dyn WalkHasher> {
    if workers > 1 {
        Box::new(ParallelWalkHasher::new(workers, settings))
    } else {
        Box::new(SerialWalkHasher::new(settings))
    }
}

/// Hash `src_dir` and `reference_dir` at the same time, each with its own hasher reporting into
/// one aggregated progress sink. Returns `(src_hashes, reference_hashes)`.
///
/// Any failure on either side (discovery or per-file) makes the whole call fail with a
/// [`MultiError`] holding every individual error; `base` is aborted in that case, finished otherwise.
pub fn hash_trees(
    src_dir: &Path,
    reference_dir: &Path,
    opts: &Opts,
    base: Arc<dyn ProgressReporter>,
    interrupt: Option<Arc<AtomicBool>>,
) -> Result<(PathHashes, PathHashes)> {
    let aggregator = ProgressAggregator::new(base, 2);
    let settings_for = |reporter: Arc<dyn ProgressReporter>| {
        WalkSettings::for_algorithm(opts.algorithm)
            .progress(reporter)
            .fail_fast(opts.fail_fast)
            .interrupt(interrupt.clone())
    };
    let src_progress: Arc<dyn ProgressReporter> = Arc::new(aggregator.sub_reporter());
    let ref_progress: Arc<dyn ProgressReporter> = Arc::new(aggregator.sub_reporter());
    let src_hasher = walk_hasher_for(opts.workers, settings_for(src_progress));
    let ref_hasher = walk_hasher_for(opts.workers, settings_for(ref_progress));

    let (src_result, ref_result) = thread::scope(|s| {
        let src = s.spawn(|| src_hasher.walk_and_hash(src_dir));
        let reference = s.spawn(|| ref_hasher.walk_and_hash(reference_dir));
        (
            src.join()
                .unwrap_or_else(|_| Err(anyhow!("hash thread for {} panicked", src_dir.display()))),
            reference.join().unwrap_or_else(|_| {
                Err(anyhow!(
                    "hash thread for {} panicked",
                    reference_dir.display()
                ))
            }),
        )
    });

    let mut errors = MultiError::new();
    let mut take = |result: Result<(PathHashes, Option<MultiError>)>| match result {
        Ok((hashes, walk_errors)) => {
            if let Some(walk_errors) = walk_errors {
                errors.extend(walk_errors);
            }
            hashes
        }
        Err(e) => {
            errors.push(e);
            PathHashes::new()
        }
    };
    let src_hashes = take(src_result);
    let ref_hashes = take(ref_result);

    if let Some(errors) = errors.into_option() {
        aggregator.abort();
        return Err(anyhow::Error::new(errors));
    }
    aggregator.finish();
    debug!(
        "hashed {} source files and {} reference files",
        src_hashes.len(),
        ref_hashes.len()
    );
    Ok((src_hashes, ref_hashes))
}
