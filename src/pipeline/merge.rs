use crossbeam_channel::{Receiver, bounded};
use std::thread::{Scope, ScopedJoinHandle};

use crate::utils::config::ChannelCaps;

use super::workers::HashOutcome;

/// Fan-in: forward every worker's results onto one stream, in arrival order.
///
/// One forwarder per worker holds a clone of the merged sender; the merged stream closes only
/// after the last forwarder has drained its (closed) worker channel and exited.
pub fn merge_result_channels<'scope, 'env>(
    scope: &'scope Scope<'scope, 'env>,
    worker_rxs: Vec<Receiver<HashOutcome>>,
) -> (Receiver<HashOutcome>, Vec<ScopedJoinHandle<'scope, ()>>) {
    let (merged_tx, merged_rx) = bounded::<HashOutcome>(ChannelCaps::MERGED_RESULT);
    let handles = worker_rxs
        .into_iter()
        .map(|worker_rx| {
            let merged_tx = merged_tx.clone();
            scope.spawn(move || {
                for outcome in worker_rx.iter() {
                    if merged_tx.send(outcome).is_err() {
                        break;
                    }
                }
            })
        })
        .collect();
    drop(merged_tx);
    (merged_rx, handles)
}
