//! Parallel walk-and-hash pipeline: walk, dispatch, hash workers, fan-in, collect.

pub mod cancel;
pub mod collector;
pub mod context;
pub mod dispatch;
pub mod error_handler;
pub mod merge;
pub mod orchestrator;
pub mod walk;
pub mod workers;

pub use cancel::CancelToken;
pub use collector::collect_results;
pub use context::{WalkChannels, WalkSettings, create_walk_channels};
pub use dispatch::dispatch_work;
pub use error_handler::report_errors;
pub use merge::merge_result_channels;
pub use orchestrator::ParallelWalkHasher;
pub use walk::{
    DataReader, FileWalker, PathWalker, PathedData, WalkOutcome, collect_walk_items,
    to_outcome_walkdir,
};
pub use workers::{HashOutcome, hash_worker_loop, process_data, spawn_hash_workers};
