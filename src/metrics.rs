use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A simple percentile tracker that maintains a sliding window of measurements
#[derive(Debug, Clone)]
pub struct PercentileTracker {
    measurements: Arc<Mutex<VecDeque<u64>>>,
    window_size: usize,
}

impl PercentileTracker {
    /// Create a new percentile tracker with a specified window size
    pub fn new(window_size: usize) -> Self {
        Self {
            measurements: Arc::new(Mutex::new(VecDeque::with_capacity(window_size))),
            window_size,
        }
    }

    /// Record a measurement (in nanoseconds)
    pub fn record(&self, nanos: u64) {
        let mut measurements = self.measurements.lock();
        if measurements.len() >= self.window_size {
            measurements.pop_front();
        }
        measurements.push_back(nanos);
    }

    /// Median in microseconds
    pub fn p50_us(&self) -> f64 {
        self.percentile(0.50)
    }

    /// 99th percentile in microseconds
    pub fn p99_us(&self) -> f64 {
        self.percentile(0.99)
    }

    fn percentile(&self, p: f64) -> f64 {
        let measurements = self.measurements.lock();
        if measurements.is_empty() {
            return 0.0;
        }

        let mut sorted: Vec<_> = measurements.iter().copied().collect();
        sorted.sort_unstable();

        let idx = ((sorted.len() as f64 * p).ceil() as usize).saturating_sub(1);
        sorted[idx] as f64 / 1000.0
    }

    /// Get the count of recorded measurements
    pub fn count(&self) -> usize {
        self.measurements.lock().len()
    }
}

/// Per-stage counters, shared between the stage thread and whoever reports on it
#[derive(Debug, Clone)]
pub struct StageMetrics {
    received: Arc<AtomicU64>,
    passed: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
    /// Time spent blocked handing a value to the next stage
    handoff_wait: PercentileTracker,
    start_time: Instant,
}

impl StageMetrics {
    /// Create a new metrics collector for a stage
    pub fn new() -> Self {
        Self {
            received: Arc::new(AtomicU64::new(0)),
            passed: Arc::new(AtomicU64::new(0)),
            rejected: Arc::new(AtomicU64::new(0)),
            handoff_wait: PercentileTracker::new(1000),
            start_time: Instant::now(),
        }
    }

    /// Record a value received from upstream
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a value handed to the next stage
    pub fn record_passed(&self) {
        self.passed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a value discarded by the stage
    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record how long a downstream handoff blocked, in nanoseconds
    pub fn record_handoff_wait(&self, nanos: u64) {
        self.handoff_wait.record(nanos);
    }

    /// Get the total number of values received
    pub fn total_received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Get the total number of values passed downstream
    pub fn total_passed(&self) -> u64 {
        self.passed.load(Ordering::Relaxed)
    }

    /// Get the total number of values rejected
    pub fn total_rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Values received per second since the stage was created
    pub fn throughput_vps(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed == 0.0 {
            0.0
        } else {
            self.total_received() as f64 / elapsed
        }
    }

    /// Get a snapshot of current metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_received: self.total_received(),
            total_passed: self.total_passed(),
            total_rejected: self.total_rejected(),
            throughput_vps: self.throughput_vps(),
            handoff_p50_us: self.handoff_wait.p50_us(),
            handoff_p99_us: self.handoff_wait.p99_us(),
            elapsed: self.start_time.elapsed(),
        }
    }
}

impl Default for StageMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A snapshot of stage metrics at a point in time
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub total_received: u64,
    pub total_passed: u64,
    pub total_rejected: u64,
    pub throughput_vps: f64,
    pub handoff_p50_us: f64,
    pub handoff_p99_us: f64,
    pub elapsed: Duration,
}

impl MetricsSnapshot {
    /// Format metrics as a human-readable string
    pub fn format(&self) -> String {
        format!(
            "Received: {}, Passed: {}, Rejected: {}, Throughput: {:.2} values/s, \
             Handoff wait P50: {:.2}µs, P99: {:.2}µs, Elapsed: {:.2}s",
            self.total_received,
            self.total_passed,
            self.total_rejected,
            self.throughput_vps,
            self.handoff_p50_us,
            self.handoff_p99_us,
            self.elapsed.as_secs_f64()
        )
    }
}
