//! Wires reader, pipeline, writer and flusher together for one run.

use crate::buffer::RingBuffer;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::input::{read_input, InputOutcome};
use crate::observer::SharedObserver;
use crate::pipeline::PipelineBuilder;
use crate::scheduler::{flush_once, write_to_buffer, Flusher};
use crate::shutdown::ShutdownSignal;
use crate::sink::OutputSink;
use crate::stage::StageExit;
use crossbeam::channel;
use std::io::BufRead;
use std::sync::Arc;
use std::thread;

/// Message sent to the sink when the exit command ends the run
pub const COMPLETION_MESSAGE: &str = "The program has completed its work";

/// What happened during one run of the default pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// How the input ended
    pub outcome: InputOutcome,
    /// Values that passed every stage and entered the buffer
    pub accepted: usize,
    /// Non-empty flushes, including the final one on exhaustion
    pub flushes: usize,
    /// How each stage stopped, in chain order
    pub stage_exits: Vec<StageExit>,
}

impl RunReport {
    /// `false` only when the input stream failed
    pub fn succeeded(&self) -> bool {
        !matches!(self.outcome, InputOutcome::Failed(_))
    }
}

/// Run the default filter chain over `reader` until it ends.
///
/// The exit command stops everything without a final flush. End of input or
/// a read failure drains the chain and flushes what is left in the buffer.
pub fn run_pipeline<R>(
    reader: R,
    sink: Arc<dyn OutputSink>,
    config: PipelineConfig,
    observer: SharedObserver,
) -> Result<RunReport>
where
    R: BufRead + Send + 'static,
{
    config.validate()?;

    let shutdown = ShutdownSignal::new();
    let buffer = RingBuffer::new(config.buffer_capacity)?;

    let (tx, rx) = channel::bounded(0);
    let running = PipelineBuilder::default_filters()
        .with_observer(observer.clone())
        .build()?
        .start(rx, &shutdown)?;

    let reader = {
        let reader_shutdown = shutdown.clone();
        let sink = Arc::clone(&sink);
        let observer = observer.clone();
        thread::Builder::new()
            .name("input-reader".into())
            .spawn(move || read_input(reader, tx, &reader_shutdown, sink.as_ref(), &observer))
            .map_err(|e| {
                shutdown.raise();
                PipelineError::ThreadError(format!("failed to spawn reader: {e}"))
            })?
    };

    let flusher = Flusher::spawn(
        buffer.clone(),
        Arc::clone(&sink),
        shutdown.clone(),
        config.flush_interval,
        observer.clone(),
    )?;

    // blocks until the last stage closes its output
    let accepted = write_to_buffer(running.output(), &buffer, sink.as_ref(), &observer);

    let outcome = reader
        .join()
        .map_err(|_| PipelineError::ThreadError("reader panicked".into()))?;
    shutdown.raise();
    let mut flushes = flusher.join()?;

    tracing::info!("{}", running.metrics_summary());
    let stage_exits = running.join()?;

    match &outcome {
        InputOutcome::ExitRequested => sink.diagnostic(COMPLETION_MESSAGE),
        InputOutcome::Exhausted | InputOutcome::Cancelled | InputOutcome::Failed(_) => {
            if flush_once(&buffer, sink.as_ref(), &observer) > 0 {
                flushes += 1;
            }
        }
    }

    tracing::info!(accepted, flushes, stages = ?stage_exits, "pipeline has shut down");
    Ok(RunReport {
        outcome,
        accepted,
        flushes,
        stage_exits,
    })
}
