use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A broadcast-once cancellation signal shared by every pipeline task.
///
/// Raising drops the only sender of an internal channel, so every clone of
/// the listener becomes ready at once and stays ready. That lets the signal
/// sit in a `select!` next to data channels.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    listener: Receiver<()>,
    raised: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create a new, unraised signal
    pub fn new() -> Self {
        let (tx, rx) = channel::bounded(0);
        Self {
            trigger: Arc::new(Mutex::new(Some(tx))),
            listener: rx,
            raised: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Raise the signal. Returns `true` only for the call that raised it.
    pub fn raise(&self) -> bool {
        let sender = self.trigger.lock().take();
        match sender {
            Some(sender) => {
                self.raised.store(true, Ordering::Release);
                drop(sender);
                true
            }
            None => false,
        }
    }

    /// Check whether the signal has been raised
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Receiver that becomes ready (disconnected) once the signal is raised
    pub fn listener(&self) -> &Receiver<()> {
        &self.listener
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
