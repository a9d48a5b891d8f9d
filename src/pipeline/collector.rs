use crossbeam_channel::Receiver;
use log::debug;

use crate::PathHashes;
use crate::errors::MultiError;

use super::cancel::CancelToken;
use super::workers::HashOutcome;

/// Drain the merged result stream into `(hashes, errors)`.
///
/// The only writer of the map. On a failure the error is kept and, when `fail_fast`, the walk is
/// cancelled so nothing new is dispatched; results already in flight are still recorded.
pub fn collect_results(
    merged_rx: Receiver<HashOutcome>,
    cancel: &CancelToken,
    fail_fast: bool,
) -> (PathHashes, MultiError) {
    let mut hashes = PathHashes::new();
    let mut errors = MultiError::new();
    for outcome in merged_rx.iter() {
        match outcome {
            HashOutcome::Hashed { path, digest } => {
                hashes.insert(path, digest);
            }
            HashOutcome::Failed(err) => {
                debug!("collector: {}", err);
                errors.push(err);
                if fail_fast {
                    cancel.cancel();
                }
            }
        }
    }
    debug!(
        "collector: stream closed, {} hashed, {} failed",
        hashes.len(),
        errors.len()
    );
    (hashes, errors)
}
