use crossbeam_channel::{Receiver, Sender, bounded, select};
use log::debug;
use std::path::PathBuf;
use std::thread::{Scope, ScopedJoinHandle};

use crate::FileDigest;
use crate::engine::hashing::{HasherFactory, hash_reader};
use crate::errors::FileHashError;
use crate::utils::config::ChannelCaps;

use super::cancel::CancelToken;
use super::walk::PathedData;

/// Result of hashing one file. Handed to the collector by value.
pub enum HashOutcome {
    Hashed { path: PathBuf, digest: FileDigest },
    Failed(FileHashError),
}

/// Open, hash and close one item. The reader is dropped before this returns on every path.
pub fn process_data(item: PathedData, factory: &HasherFactory) -> HashOutcome {
    let (path, mut reader) = match item.open() {
        Ok(opened) => opened,
        Err(err) => return HashOutcome::Failed(err),
    };
    let mut hasher = factory();
    let read = hash_reader(hasher.as_mut(), reader.as_mut());
    drop(reader);
    match read {
        Ok(_) => HashOutcome::Hashed {
            path,
            digest: hasher.finish(),
        },
        Err(source) => HashOutcome::Failed(FileHashError::Read { path, source }),
    }
}

/// Single hash worker: take items from `work_rx` until it closes or the walk is cancelled,
/// emit one outcome per item on `result_tx`. Dropping `result_tx` on exit tells the merge this worker is done.
pub fn hash_worker_loop(
    id: usize,
    work_rx: Receiver<PathedData>,
    result_tx: Sender<HashOutcome>,
    cancel: CancelToken,
    factory: HasherFactory,
) {
    let mut hashed = 0_usize;
    loop {
        if cancel.is_cancelled() {
            debug!("worker {}: cancelled after {} items", id, hashed);
            break;
        }
        select! {
            recv(work_rx) -> msg => match msg {
                Ok(item) => {
                    let outcome = process_data(item, &factory);
                    hashed += 1;
                    if result_tx.send(outcome).is_err() {
                        break;
                    }
                }
                // Closed and drained: no more work.
                Err(_) => break,
            },
            recv(cancel.signal()) -> _ => {
                debug!("worker {}: cancelled after {} items", id, hashed);
                break;
            }
        }
    }
    drop(result_tx);
}

/// Spawn `num_workers` hash workers in `scope`, each with its own result channel.
/// Returns the join handles and the result receivers (one per worker, same order).
/// Caller must drop its own `work_rx` after this so workers see the channel close.
pub fn spawn_hash_workers<'scope, 'env>(
    scope: &'scope Scope<'scope, 'env>,
    num_workers: usize,
    work_rx: &Receiver<PathedData>,
    cancel: &CancelToken,
    factory: &HasherFactory,
) -> (Vec<ScopedJoinHandle<'scope, ()>>, Vec<Receiver<HashOutcome>>) {
    (0..num_workers)
        .map(|id| {
            let (result_tx, result_rx) = bounded::<HashOutcome>(ChannelCaps::WORKER_RESULT);
            let work_rx = work_rx.clone();
            let cancel = cancel.clone();
            let factory = factory.clone();
            let handle =
                scope.spawn(move || hash_worker_loop(id, work_rx, result_tx, cancel, factory));
            (handle, result_rx)
        })
        .unzip()
}
