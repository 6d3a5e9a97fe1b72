use thiserror::Error;

#[derive(Error, Debug)]
pub enum AutomationError {
    #[error("Link source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Link source is empty: {0}")]
    SourceEmpty(String),

    /// The operator tripped the fail-safe. Never retried.
    #[error("Fail-safe triggered: {0}")]
    FailSafeTriggered(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Platform-specific error: {0}")]
    PlatformError(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
