//! A cancellable integer filter pipeline with a sliding-window buffer.
//!
//! Integers enter a linear chain of stages, each on its own thread and joined
//! to the next by a rendezvous channel. Values that survive every stage land
//! in a fixed-capacity [`RingBuffer`] that keeps only the most recent values,
//! and a [`Flusher`] drains that buffer into an [`OutputSink`] on a timer.
//!
//! # Features
//!
//! - Unbuffered handoff between stages, so order is preserved end to end
//! - One broadcast [`ShutdownSignal`] observed at every channel operation
//! - Closing the input drains the chain; raising shutdown abandons it
//! - Injected [`EventObserver`] instead of global logging state
//! - Per-stage metrics: received, passed, rejected, handoff wait percentiles
//!
//! # Example
//!
//! ```ignore
//! use sieve_pipeline::{PipelineBuilder, RingBuffer, ShutdownSignal};
//!
//! let shutdown = ShutdownSignal::new();
//! let (tx, rx) = crossbeam::channel::bounded(0);
//! let running = PipelineBuilder::default_filters().build()?.start(rx, &shutdown)?;
//!
//! // Feed `tx` from another thread...
//! let buffer = RingBuffer::new(10)?;
//! write_to_buffer(running.output(), &buffer, &sink, &observer);
//! running.join()?;
//! ```

pub mod buffer;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod input;
pub mod metrics;
pub mod observer;
pub mod pipeline;
pub mod scheduler;
pub mod shutdown;
pub mod sink;
pub mod stage;

// Re-exports for convenience
pub use buffer::RingBuffer;
pub use config::PipelineConfig;
pub use coordinator::{run_pipeline, RunReport, COMPLETION_MESSAGE};
pub use error::{PipelineError, Result};
pub use input::{parse_token, read_input, InputOutcome};
pub use metrics::{MetricsSnapshot, StageMetrics};
pub use observer::{EventObserver, NoopObserver, PipelineEvent, SharedObserver, TracingObserver};
pub use pipeline::{Pipeline, PipelineBuilder, RunningPipeline};
pub use scheduler::{flush_once, write_to_buffer, Flusher};
pub use shutdown::ShutdownSignal;
pub use sink::{CollectingSink, ConsoleSink, OutputSink};
pub use stage::{
    non_negative_filter, positive_multiple_of_three_filter, FilterStage, MapStage,
    PassthroughStage, Stage, StageExit, StageRunner,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
