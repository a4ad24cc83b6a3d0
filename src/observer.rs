//! Injected event recording.
//!
//! Components never log through global state; they report what happened to an
//! [`EventObserver`] they were handed. The binary wires in [`TracingObserver`],
//! tests use [`NoopObserver`] or their own recorder.

use crate::stage::StageExit;
use std::sync::Arc;

/// Something that happened inside the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    StageStarted { stage: String },
    Received { stage: String, value: i64 },
    Passed { stage: String, value: i64 },
    Rejected { stage: String, value: i64 },
    StageFinished { stage: String, exit: StageExit },
    Buffered { value: i64 },
    Flushed { len: usize },
    InvalidToken { token: String },
    InputClosed,
    ExitRequested,
}

/// Narrow "record event" interface handed to every component
pub trait EventObserver: Send + Sync {
    fn record(&self, event: &PipelineEvent);
}

/// Shared handle to an observer
pub type SharedObserver = Arc<dyn EventObserver>;

/// Observer that discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl EventObserver for NoopObserver {
    fn record(&self, _event: &PipelineEvent) {}
}

/// Observer that turns events into structured `tracing` events
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl EventObserver for TracingObserver {
    fn record(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StageStarted { stage } => {
                tracing::info!(stage = %stage, "stage started");
            }
            PipelineEvent::Received { stage, value } => {
                tracing::debug!(stage = %stage, value, "value entered stage");
            }
            PipelineEvent::Passed { stage, value } => {
                tracing::debug!(stage = %stage, value, "value passed stage");
            }
            PipelineEvent::Rejected { stage, value } => {
                tracing::debug!(stage = %stage, value, "value rejected by stage");
            }
            PipelineEvent::StageFinished { stage, exit } => {
                tracing::info!(stage = %stage, exit = ?exit, "stage finished");
            }
            PipelineEvent::Buffered { value } => {
                tracing::debug!(value, "value passed all stages and was buffered");
            }
            PipelineEvent::Flushed { len } => {
                tracing::info!(len, "buffer flushed to sink and cleared");
            }
            PipelineEvent::InvalidToken { token } => {
                tracing::warn!(token = %token, "invalid input token skipped");
            }
            PipelineEvent::InputClosed => {
                tracing::info!("input closed");
            }
            PipelineEvent::ExitRequested => {
                tracing::info!("exit requested, shutting down");
            }
        }
    }
}

/// The default observer: forwards to `tracing`
pub fn tracing_observer() -> SharedObserver {
    Arc::new(TracingObserver)
}
