//! Error types for the reactive primitives.

use thiserror::Error;

/// Main error type for reflux operations.
///
/// Scope creation, subscription bookkeeping, and cancellation are
/// infallible; the fallible surface is limited to worker executors.
#[derive(Debug, Error)]
pub enum FluxError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Executor worker '{0}' is no longer running")]
    ExecutorUnavailable(String),
}

/// Result type for reflux operations.
pub type Result<T> = std::result::Result<T, FluxError>;
