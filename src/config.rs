use crate::error::{PipelineError, Result};
use std::time::Duration;

/// Number of values the sliding-window buffer keeps by default
pub const DEFAULT_BUFFER_CAPACITY: usize = 10;

/// Interval between buffer flushes by default
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// Startup configuration for the buffer and the flush loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Capacity of the sliding-window buffer
    pub buffer_capacity: usize,
    /// How often the buffer is drained to the sink
    pub flush_interval: Duration,
}

impl PipelineConfig {
    /// Create a configuration with the default capacity and interval
    pub fn new() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
        }
    }

    /// Set the buffer capacity
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the flush interval
    pub fn with_flush_interval(mut self, interval: Duration) -> Self {
        self.flush_interval = interval;
        self
    }

    /// Reject configurations the buffer and ticker cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.buffer_capacity == 0 {
            return Err(PipelineError::ConfigError(
                "buffer capacity must be at least 1".into(),
            ));
        }
        if self.flush_interval.is_zero() {
            return Err(PipelineError::ConfigError(
                "flush interval must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.buffer_capacity, 10);
        assert_eq!(config.flush_interval, Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = PipelineConfig::new().with_buffer_capacity(0);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::ConfigError(_))
        ));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = PipelineConfig::new().with_flush_interval(Duration::ZERO);
        assert!(matches!(
            config.validate(),
            Err(PipelineError::ConfigError(_))
        ));
    }
}
