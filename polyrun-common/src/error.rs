//! Internal sandbox error taxonomy

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SandboxError>;

/// Host-side failures: the service could not launch or manage a child
/// process at all. This is the only condition surfaced as a true error past
/// the dispatcher boundary — everything the executed code itself does wrong
/// (non-zero exit, timeout, oversized output) is reported as a structured
/// `ExecutionResult`, never through this enum.
#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("interpreter '{program}' for {language} not found on this host")]
    InterpreterMissing { language: String, program: String },

    #[error("failed to create scratch directory: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("failed to stage source into scratch directory: {0}")]
    Stage(#[source] std::io::Error),

    #[error("failed to spawn child process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("failed while waiting on child process: {0}")]
    Wait(#[source] std::io::Error),

    #[error("output capture task failed: {0}")]
    OutputCapture(String),

    #[error("execution slot pool is closed")]
    SlotsClosed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
