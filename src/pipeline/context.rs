//! Walk settings shared by both hashers, and the per-invocation channel set.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use crate::engine::hashing::{HashAlgorithm, HasherFactory};
use crate::engine::progress::{NoopProgressReporter, ProgressReporter};
use crate::utils::config::ChannelCaps;

use super::cancel::CancelToken;
use super::walk::{FileWalker, PathWalker, PathedData};

/// Configuration that outlives a single walk: walker, hash constructor, progress sink, cancel policy.
///
/// Nothing per-walk lives here; every `walk_and_hash` call builds its own channels, token and error list.
#[derive(Clone)]
pub struct WalkSettings {
    pub walker: Arc<dyn PathWalker>,
    pub hasher_factory: HasherFactory,
    pub progress: Arc<dyn ProgressReporter>,
    /// Stop dispatching new work after the first per-file error.
    pub fail_fast: bool,
    pub interrupt: Option<Arc<AtomicBool>>,
}

impl WalkSettings {
    /// Real filesystem walker, no progress, fail-fast on.
    pub fn new(hasher_factory: HasherFactory) -> Self {
        Self {
            walker: Arc::new(FileWalker),
            hasher_factory,
            progress: Arc::new(NoopProgressReporter),
            fail_fast: true,
            interrupt: None,
        }
    }

    pub fn for_algorithm(algorithm: HashAlgorithm) -> Self {
        Self::new(algorithm.factory())
    }

    pub fn walker(mut self, walker: Arc<dyn PathWalker>) -> Self {
        self.walker = walker;
        self
    }

    pub fn progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    pub fn interrupt(mut self, interrupt: Option<Arc<AtomicBool>>) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Fresh token for one walk.
    pub fn new_cancel_token(&self) -> CancelToken {
        CancelToken::new(self.interrupt.clone())
    }
}

/// Work channel for one walk. The dispatcher owns `work_tx`; workers share clones of `work_rx`.
pub struct WalkChannels {
    pub work_tx: Sender<PathedData>,
    pub work_rx: Receiver<PathedData>,
}

pub fn create_walk_channels() -> WalkChannels {
    let (work_tx, work_rx) = bounded::<PathedData>(ChannelCaps::WORK);
    WalkChannels { work_tx, work_rx }
}
