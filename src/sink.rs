use parking_lot::Mutex;
use std::io::{self, Write};

/// Where accepted values, flushed snapshots and input diagnostics end up
pub trait OutputSink: Send + Sync {
    /// A value made it through every stage and into the buffer
    fn accepted(&self, value: i64);

    /// One flush cycle drained this snapshot from the buffer
    fn flushed(&self, snapshot: &[i64]);

    /// A user-facing diagnostic, such as an unparsable token
    fn diagnostic(&self, message: &str);
}

/// Console sink writing to stdout
#[derive(Debug, Default)]
pub struct ConsoleSink {
    // keeps lines from the writer and the flusher from interleaving
    lock: Mutex<()>,
}

impl ConsoleSink {
    /// Create a console sink
    pub fn new() -> Self {
        Self::default()
    }

    fn write_line(&self, line: std::fmt::Arguments<'_>) {
        let _guard = self.lock.lock();
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{line}") {
            tracing::warn!(error = %e, "failed to write to stdout");
        }
    }
}

impl OutputSink for ConsoleSink {
    fn accepted(&self, value: i64) {
        self.write_line(format_args!("Data received: {value}"));
    }

    fn flushed(&self, snapshot: &[i64]) {
        self.write_line(format_args!("processed data: {snapshot:?}"));
    }

    fn diagnostic(&self, message: &str) {
        self.write_line(format_args!("{message}"));
    }
}

/// Sink that records everything it receives, for tests and embedding
#[derive(Debug, Default)]
pub struct CollectingSink {
    accepted: Mutex<Vec<i64>>,
    flushes: Mutex<Vec<Vec<i64>>>,
    diagnostics: Mutex<Vec<String>>,
}

impl CollectingSink {
    /// Create an empty collecting sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Values reported as accepted, in order
    pub fn accepted_values(&self) -> Vec<i64> {
        self.accepted.lock().clone()
    }

    /// Snapshots received, one per flush
    pub fn flushes(&self) -> Vec<Vec<i64>> {
        self.flushes.lock().clone()
    }

    /// Diagnostic messages received
    pub fn diagnostics(&self) -> Vec<String> {
        self.diagnostics.lock().clone()
    }
}

impl OutputSink for CollectingSink {
    fn accepted(&self, value: i64) {
        self.accepted.lock().push(value);
    }

    fn flushed(&self, snapshot: &[i64]) {
        self.flushes.lock().push(snapshot.to_vec());
    }

    fn diagnostic(&self, message: &str) {
        self.diagnostics.lock().push(message.to_string());
    }
}
