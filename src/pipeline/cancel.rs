//! Broadcast cancellation shared by the dispatcher, workers and collector of one walk.

use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

struct CancelState {
    cancelled: AtomicBool,
    /// Dropped on cancel; every clone of `signal` then reports disconnected and wakes any `select!`.
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
    /// Process-wide flag (Ctrl+C). Observed, never reset here.
    interrupt: Option<Arc<AtomicBool>>,
}

/// Cooperative cancellation token. Cloning shares the same state.
///
/// Cancelling only stops participants at their next loop check; in-flight reads finish.
#[derive(Clone)]
pub struct CancelToken {
    state: Arc<CancelState>,
}

impl CancelToken {
    pub fn new(interrupt: Option<Arc<AtomicBool>>) -> Self {
        let (trigger, signal) = bounded::<()>(0);
        Self {
            state: Arc::new(CancelState {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
                interrupt,
            }),
        }
    }

    /// Trip the token. Safe to call any number of times from any thread.
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::SeqCst) {
            debug!("cancellation requested");
        }
        self.state
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// True once [`cancel`](Self::cancel) ran or the interrupt flag is set.
    /// Seeing the interrupt also trips the token so blocked participants wake up.
    pub fn is_cancelled(&self) -> bool {
        if self.state.cancelled.load(Ordering::SeqCst) {
            return true;
        }
        if self.interrupted() {
            self.cancel();
            return true;
        }
        false
    }

    pub fn interrupted(&self) -> bool {
        self.state
            .interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    /// Becomes ready (disconnected) once cancelled. Use as a `recv` arm in `select!`.
    pub fn signal(&self) -> &Receiver<()> {
        &self.state.signal
    }
}
