use thiserror::Error;

/// Error type for gpubench operations.
#[derive(Clone, Debug, Error)]
pub enum BenchError {
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("resource creation failed: {0}")]
    ResourceCreation(String),
    #[error("invalid measurement: {0}")]
    Measurement(String),
    #[error("cannot summarize an empty series")]
    EmptySeries,
    #[error("trial timed out: {0}")]
    Timeout(String),
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("fault injected: {0}")]
    FaultInjected(String),
    #[error("report error: {0}")]
    Report(String),
}

impl BenchError {
    pub fn context_unavailable<T: Into<String>>(msg: T) -> Self {
        BenchError::ContextUnavailable(msg.into())
    }

    pub fn resource<T: Into<String>>(msg: T) -> Self {
        BenchError::ResourceCreation(msg.into())
    }

    pub fn measurement<T: Into<String>>(msg: T) -> Self {
        BenchError::Measurement(msg.into())
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        BenchError::Timeout(msg.into())
    }

    pub fn invalid_operation<T: Into<String>>(msg: T) -> Self {
        BenchError::InvalidOperation(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        BenchError::InvalidInput(msg.into())
    }

    pub fn fault_injection<T: Into<String>>(msg: T) -> Self {
        BenchError::FaultInjected(msg.into())
    }

    pub fn report<T: Into<String>>(msg: T) -> Self {
        BenchError::Report(msg.into())
    }

    /// Whether the graphics context can no longer be used at all.
    pub fn is_fatal(&self) -> bool {
        matches!(self, BenchError::ContextUnavailable(_))
    }
}
