use thiserror::Error;

/// Result type for sieve pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while assembling or running the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// No stages in pipeline
    #[error("Cannot start pipeline with no stages")]
    NoStages,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Input token that is not a signed integer
    #[error("Invalid number: {0} (You can only use integers)")]
    InvalidToken(String),

    /// Thread spawn or join error
    #[error("Thread error: {0}")]
    ThreadError(String),

    /// Failure reading from the input source
    #[error("Input read error: {0}")]
    Input(#[from] std::io::Error),
}
