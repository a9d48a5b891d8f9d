//! Progress sinks: the no-op default, a kdam bar for the CLI, and an aggregator for concurrent walks.

use kdam::{Animation, Bar, BarExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::Progress;
use crate::utils::config::PROGRESS_MAX;

/// Receives percentage updates (0..=100) from a walk.
pub trait ProgressReporter: Send + Sync {
    fn report_progress(&self, progress: Progress);

    /// Walks are done and succeeded.
    fn finish(&self) {}

    /// Walks failed; clear any display before errors are printed.
    fn abort(&self) {}
}

/// Does nothing. The default when no reporter is supplied.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopProgressReporter;

impl ProgressReporter for NoopProgressReporter {
    fn report_progress(&self, _progress: Progress) {}
}

/// Percentage bar on stderr.
pub struct BarReporter {
    bar: Mutex<Bar>,
}

impl BarReporter {
    pub fn new(desc: &'static str) -> Self {
        Self {
            bar: Mutex::new(kdam::tqdm!(
                total = PROGRESS_MAX,
                desc = desc,
                animation = Animation::Classic,
                position = 0
            )),
        }
    }
}

impl ProgressReporter for BarReporter {
    fn report_progress(&self, progress: Progress) {
        // Skip the update if the lock is contended; the next one catches up.
        if let Ok(mut bar) = self.bar.try_lock() {
            let _ = bar.update_to(progress.min(PROGRESS_MAX));
        }
    }

    fn finish(&self) {
        let mut bar = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = bar.update_to(PROGRESS_MAX);
        eprintln!();
    }

    fn abort(&self) {
        let mut bar = self.bar.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = bar.clear();
    }
}

/// Combines several concurrent walks into one progress value for a base reporter.
///
/// Each sub-reporter's latest value is kept; the reported value is their sum divided by the
/// larger of the expected count and the number of sub-reporters seen so far.
pub struct ProgressAggregator {
    base: Arc<dyn ProgressReporter>,
    expected: usize,
    // Locked across computation and report so totals are taken at report time.
    reported: Mutex<HashMap<usize, Progress>>,
    next_id: AtomicUsize,
}

impl ProgressAggregator {
    pub fn new(base: Arc<dyn ProgressReporter>, expected: usize) -> Arc<Self> {
        Arc::new(Self {
            base,
            expected,
            reported: Mutex::new(HashMap::with_capacity(expected)),
            next_id: AtomicUsize::new(0),
        })
    }

    /// New sub-reporter feeding this aggregator.
    pub fn sub_reporter(self: &Arc<Self>) -> SubProgressReporter {
        SubProgressReporter {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            parent: Arc::clone(self),
        }
    }

    fn report_sub_progress(&self, id: usize, progress: Progress) {
        let mut reported = self.reported.lock().unwrap_or_else(PoisonError::into_inner);
        reported.insert(id, progress);
        let total: Progress = reported.values().sum();
        let length = reported.len().max(self.expected);
        let normalized = if length > 0 { total / length } else { 0 };
        self.base.report_progress(normalized);
    }

    pub fn finish(&self) {
        self.base.finish();
    }

    pub fn abort(&self) {
        self.base.abort();
    }
}

/// Reports into a parent [`ProgressAggregator`].
pub struct SubProgressReporter {
    id: usize,
    parent: Arc<ProgressAggregator>,
}

impl ProgressReporter for SubProgressReporter {
    fn report_progress(&self, progress: Progress) {
        self.parent.report_sub_progress(self.id, progress);
    }
}
