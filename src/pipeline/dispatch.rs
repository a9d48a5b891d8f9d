//! Feed discovered files to the worker pool.

use crossbeam_channel::{Sender, select};
use log::debug;

use crate::engine::progress::ProgressReporter;
use crate::utils::config::PROGRESS_MAX;

use super::cancel::CancelToken;
use super::walk::PathedData;

/// Send each item on `work_tx` until done or cancelled, reporting `index * 100 / total` per send.
///
/// Progress tracks hand-off, not completion. Items left over after cancellation are dropped
/// unopened. `work_tx` is dropped on return, which lets workers drain and exit. Returns the
/// number of items handed to workers.
pub fn dispatch_work(
    work: Vec<PathedData>,
    work_tx: Sender<PathedData>,
    cancel: &CancelToken,
    reporter: &dyn ProgressReporter,
) -> usize {
    let total = work.len();
    let mut sent = 0_usize;
    for (i, item) in work.into_iter().enumerate() {
        if cancel.is_cancelled() {
            debug!("dispatch stopped after {} of {} items", sent, total);
            break;
        }
        select! {
            send(work_tx, item) -> res => {
                if res.is_err() {
                    // Every worker is gone.
                    debug!("work channel closed after {} of {} items", sent, total);
                    break;
                }
                sent += 1;
                reporter.report_progress(i * PROGRESS_MAX / total);
            }
            recv(cancel.signal()) -> _ => {
                debug!("dispatch cancelled after {} of {} items", sent, total);
                break;
            }
        }
    }
    drop(work_tx);
    sent
}
