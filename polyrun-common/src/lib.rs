//! Shared types for the polyrun execution service.
//!
//! Everything external collaborators and internal crates agree on lives
//! here: the request/result data model, the failure taxonomy, and the wire
//! contract exposed over HTTP.

pub mod error;
pub mod types;
pub mod wire;

pub use error::{Result, SandboxError};
pub use types::{
    ExecutionId, ExecutionRequest, ExecutionResult, LanguageId, Outcome, UnknownLanguage,
};
pub use wire::{RunRequest, RunResponse};
