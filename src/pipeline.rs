use crate::error::{PipelineError, Result};
use crate::metrics::StageMetrics;
use crate::observer::{NoopObserver, SharedObserver};
use crate::shutdown::ShutdownSignal;
use crate::stage::{
    non_negative_filter, positive_multiple_of_three_filter, Stage, StageExit, StageRunner,
};
use crossbeam::channel::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Builder for constructing pipelines
pub struct PipelineBuilder {
    stages: Vec<Box<dyn Stage>>,
    observer: SharedObserver,
}

impl PipelineBuilder {
    /// Create a new pipeline builder
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// The standard chain: non-negative filter, then positive multiples of three
    pub fn default_filters() -> Self {
        Self::new()
            .add_stage(non_negative_filter())
            .add_stage(positive_multiple_of_three_filter())
    }

    /// Append a stage to the end of the chain
    pub fn add_stage(mut self, stage: impl Stage) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Set the observer every stage reports to
    pub fn with_observer(mut self, observer: SharedObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Build the pipeline
    pub fn build(self) -> Result<Pipeline> {
        if self.stages.is_empty() {
            return Err(PipelineError::NoStages);
        }

        let metrics = self.stages.iter().map(|_| StageMetrics::new()).collect();
        Ok(Pipeline {
            stages: self.stages,
            metrics,
            observer: self.observer,
        })
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An assembled, not yet running, chain of stages
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    metrics: Vec<StageMetrics>,
    observer: SharedObserver,
}

impl Pipeline {
    /// Number of stages in the chain
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// A built pipeline always has at least one stage
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Get metrics for a specific stage
    pub fn stage_metrics(&self, index: usize) -> Option<&StageMetrics> {
        self.metrics.get(index)
    }

    /// Wire the stages together and spawn one thread per stage.
    ///
    /// Stage `i` sends on a rendezvous channel that stage `i + 1` receives
    /// from; `input` feeds the first stage and the last stage's channel is
    /// returned as the pipeline output.
    pub fn start(self, input: Receiver<i64>, shutdown: &ShutdownSignal) -> Result<RunningPipeline> {
        let mut handles = Vec::with_capacity(self.stages.len());
        let mut upstream = input;

        for (stage, metrics) in self.stages.into_iter().zip(self.metrics.iter()) {
            let (tx, rx) = channel::bounded(0);
            let name = stage.name().to_string();
            let runner = StageRunner::new(upstream, tx, shutdown.clone(), self.observer.clone())
                .with_metrics(metrics.clone());

            let handle = thread::Builder::new()
                .name(format!("stage-{name}"))
                .spawn(move || runner.run(stage))
                .map_err(|e| {
                    // stages already running must not be left blocked
                    shutdown.raise();
                    PipelineError::ThreadError(format!("failed to spawn stage {name}: {e}"))
                })?;

            handles.push((name, handle));
            upstream = rx;
        }

        Ok(RunningPipeline {
            output: upstream,
            handles,
            metrics: self.metrics,
        })
    }
}

/// A running pipeline that can be drained, monitored and joined
pub struct RunningPipeline {
    output: Receiver<i64>,
    handles: Vec<(String, JoinHandle<StageExit>)>,
    metrics: Vec<StageMetrics>,
}

impl RunningPipeline {
    /// Receiver for values that made it through every stage
    pub fn output(&self) -> &Receiver<i64> {
        &self.output
    }

    /// Get metrics for a stage
    pub fn stage_metrics(&self, index: usize) -> Option<&StageMetrics> {
        self.metrics.get(index)
    }

    /// Get a summary of all metrics
    pub fn metrics_summary(&self) -> String {
        let mut summary = String::from("Pipeline Metrics Summary:\n");
        for (i, ((name, _), metrics)) in self.handles.iter().zip(&self.metrics).enumerate() {
            summary.push_str(&format!(
                "  Stage {} ({}): {}\n",
                i,
                name,
                metrics.snapshot().format()
            ));
        }
        summary
    }

    /// Wait for every stage thread and report how each one stopped
    pub fn join(self) -> Result<Vec<StageExit>> {
        // release the final receiver so a last stage blocked on send can exit
        drop(self.output);

        let mut exits = Vec::with_capacity(self.handles.len());
        for (name, handle) in self.handles {
            let exit = handle
                .join()
                .map_err(|_| PipelineError::ThreadError(format!("stage {name} panicked")))?;
            exits.push(exit);
        }
        Ok(exits)
    }
}
