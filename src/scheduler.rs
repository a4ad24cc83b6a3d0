//! The two loops around the shared buffer: the writer that moves pipeline
//! output into it, and the flusher that empties it into the sink on a timer.

use crate::buffer::RingBuffer;
use crate::error::{PipelineError, Result};
use crate::observer::{PipelineEvent, SharedObserver};
use crate::shutdown::ShutdownSignal;
use crate::sink::OutputSink;
use crossbeam::channel::{self, Receiver};
use crossbeam::select;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Push every value from `output` into `buffer` until the channel closes.
///
/// Runs on the calling thread and returns how many values were buffered.
pub fn write_to_buffer(
    output: &Receiver<i64>,
    buffer: &RingBuffer,
    sink: &dyn OutputSink,
    observer: &SharedObserver,
) -> usize {
    let mut written = 0;
    for value in output.iter() {
        buffer.push(value);
        sink.accepted(value);
        observer.record(&PipelineEvent::Buffered { value });
        written += 1;
    }
    written
}

/// Drain `buffer` once and hand a non-empty snapshot to the sink.
///
/// Returns the number of values flushed; an empty buffer produces no sink call.
pub fn flush_once(buffer: &RingBuffer, sink: &dyn OutputSink, observer: &SharedObserver) -> usize {
    match buffer.drain() {
        Some(snapshot) => {
            sink.flushed(&snapshot);
            observer.record(&PipelineEvent::Flushed {
                len: snapshot.len(),
            });
            snapshot.len()
        }
        None => 0,
    }
}

/// Background loop that flushes the buffer every `interval`
pub struct Flusher {
    handle: JoinHandle<usize>,
}

impl Flusher {
    /// Spawn the flush loop on its own thread
    pub fn spawn(
        buffer: RingBuffer,
        sink: Arc<dyn OutputSink>,
        shutdown: ShutdownSignal,
        interval: Duration,
        observer: SharedObserver,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(PipelineError::ConfigError(
                "flush interval must be greater than zero".into(),
            ));
        }

        let handle = thread::Builder::new()
            .name("flusher".into())
            .spawn(move || {
                let ticker = channel::tick(interval);
                let mut flushes = 0;
                loop {
                    if shutdown.is_raised() {
                        break;
                    }
                    select! {
                        recv(shutdown.listener()) -> _ => break,
                        recv(ticker) -> _ => {
                            if flush_once(&buffer, sink.as_ref(), &observer) > 0 {
                                flushes += 1;
                            }
                        }
                    }
                }
                tracing::debug!(flushes, "flusher stopped");
                flushes
            })
            .map_err(|e| PipelineError::ThreadError(format!("failed to spawn flusher: {e}")))?;

        Ok(Self { handle })
    }

    /// Wait for the loop to exit; returns how many non-empty flushes it made.
    ///
    /// Only returns once the shutdown signal has been raised.
    pub fn join(self) -> Result<usize> {
        self.handle
            .join()
            .map_err(|_| PipelineError::ThreadError("flusher panicked".into()))
    }
}
