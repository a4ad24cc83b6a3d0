use crate::metrics::StageMetrics;
use crate::observer::{PipelineEvent, SharedObserver};
use crate::shutdown::ShutdownSignal;
use crossbeam::channel::{Receiver, Sender};
use crossbeam::select;
use std::time::Instant;

/// Trait for a processing stage in the pipeline
pub trait Stage: Send + 'static {
    /// Process one value. `None` discards it, `Some` forwards it downstream.
    fn process(&mut self, value: i64) -> Option<i64>;

    /// Get a human-readable name for this stage
    fn name(&self) -> &str {
        "stage"
    }
}

/// Why a stage stopped running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageExit {
    /// Input channel closed; the normal end of the stream
    Exhausted,
    /// The shutdown signal was raised
    Cancelled,
    /// Nobody is receiving from the output channel anymore
    DownstreamClosed,
}

/// Runs a stage by receiving from its input channel, processing, and sending
/// to its output channel until the input closes or shutdown is raised.
pub struct StageRunner {
    input: Receiver<i64>,
    output: Sender<i64>,
    shutdown: ShutdownSignal,
    observer: SharedObserver,
    metrics: StageMetrics,
}

impl StageRunner {
    /// Create a new stage runner
    pub fn new(
        input: Receiver<i64>,
        output: Sender<i64>,
        shutdown: ShutdownSignal,
        observer: SharedObserver,
    ) -> Self {
        Self {
            input,
            output,
            shutdown,
            observer,
            metrics: StageMetrics::new(),
        }
    }

    /// Share metrics with an existing collector instead of a fresh one
    pub fn with_metrics(mut self, metrics: StageMetrics) -> Self {
        self.metrics = metrics;
        self
    }

    /// Get a reference to the metrics
    pub fn metrics(&self) -> &StageMetrics {
        &self.metrics
    }

    /// Run the stage with the provided implementation.
    ///
    /// Blocks until the input is exhausted or shutdown is raised. The output
    /// sender is dropped on return, which closes the channel for the next
    /// stage.
    pub fn run(self, mut stage: Box<dyn Stage>) -> StageExit {
        let name = stage.name().to_string();
        self.observer
            .record(&PipelineEvent::StageStarted { stage: name.clone() });

        let exit = self.pump(stage.as_mut(), &name);

        let observer = self.observer.clone();
        drop(self);
        observer.record(&PipelineEvent::StageFinished { stage: name, exit });
        exit
    }

    fn pump(&self, stage: &mut dyn Stage, name: &str) -> StageExit {
        loop {
            // cancellation wins over a ready input
            if self.shutdown.is_raised() {
                return StageExit::Cancelled;
            }
            let value = select! {
                recv(self.shutdown.listener()) -> _ => return StageExit::Cancelled,
                recv(self.input) -> msg => match msg {
                    Ok(value) => value,
                    Err(_) => return StageExit::Exhausted,
                },
            };

            self.metrics.record_received();
            self.observer.record(&PipelineEvent::Received {
                stage: name.to_string(),
                value,
            });

            let Some(out) = stage.process(value) else {
                self.metrics.record_rejected();
                self.observer.record(&PipelineEvent::Rejected {
                    stage: name.to_string(),
                    value,
                });
                continue;
            };

            if self.shutdown.is_raised() {
                return StageExit::Cancelled;
            }
            let waiting = Instant::now();
            select! {
                recv(self.shutdown.listener()) -> _ => return StageExit::Cancelled,
                send(self.output, out) -> res => {
                    if res.is_err() {
                        return StageExit::DownstreamClosed;
                    }
                }
            }
            self.metrics
                .record_handoff_wait(waiting.elapsed().as_nanos() as u64);
            self.metrics.record_passed();
            self.observer.record(&PipelineEvent::Passed {
                stage: name.to_string(),
                value: out,
            });
        }
    }
}

/// A simple pass-through stage for testing
#[derive(Debug)]
pub struct PassthroughStage;

impl Stage for PassthroughStage {
    fn process(&mut self, value: i64) -> Option<i64> {
        Some(value)
    }

    fn name(&self) -> &str {
        "passthrough"
    }
}

/// A filtering stage that passes through values matching a predicate
pub struct FilterStage<F>
where
    F: Fn(i64) -> bool + Send + 'static,
{
    name: String,
    predicate: F,
}

impl<F> FilterStage<F>
where
    F: Fn(i64) -> bool + Send + 'static,
{
    /// Create a new filter stage
    pub fn new(name: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            predicate,
        }
    }
}

impl<F> Stage for FilterStage<F>
where
    F: Fn(i64) -> bool + Send + 'static,
{
    fn process(&mut self, value: i64) -> Option<i64> {
        (self.predicate)(value).then_some(value)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// A mapping stage that transforms each value
pub struct MapStage<F>
where
    F: Fn(i64) -> i64 + Send + 'static,
{
    name: String,
    mapper: F,
}

impl<F> MapStage<F>
where
    F: Fn(i64) -> i64 + Send + 'static,
{
    /// Create a new map stage
    pub fn new(name: impl Into<String>, mapper: F) -> Self {
        Self {
            name: name.into(),
            mapper,
        }
    }
}

impl<F> Stage for MapStage<F>
where
    F: Fn(i64) -> i64 + Send + 'static,
{
    fn process(&mut self, value: i64) -> Option<i64> {
        Some((self.mapper)(value))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Stage A: drops negative values
pub fn non_negative_filter() -> impl Stage {
    FilterStage::new("non_negative", |x| x >= 0)
}

/// Stage B: keeps strictly positive multiples of three
pub fn positive_multiple_of_three_filter() -> impl Stage {
    FilterStage::new("positive_multiple_of_three", |x| x > 0 && x % 3 == 0)
}
