//! External request/response contract
//!
//! Collaborators (challenge graders, REPL widgets) see a deliberately flat
//! shape: `{success, output}` or `{success, error}`. The richer internal
//! taxonomy stays in [`crate::types`]; callers that need it should be handed
//! an [`ExecutionResult`] directly rather than parsing `error` strings.

use crate::types::{ExecutionResult, Outcome};
use serde::{Deserialize, Serialize};

/// Inbound execute request as posted by external collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// Language identifier string; parsed against [`crate::LanguageId`].
    pub language: String,

    /// Source code to run.
    pub code: String,

    /// Optional wall-clock bound in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    /// Ordered stdin lines.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inputs: Vec<String>,
}

/// Outbound response for one execute request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunResponse {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(message.into()),
        }
    }

    /// Map an internal result onto the external contract.
    ///
    /// On success the output is the normalized stdout; stderr is appended
    /// only when the runtime wrote diagnostics alongside a zero exit. On
    /// failure the error carries the runtime's own diagnostic text verbatim.
    pub fn from_result(result: &ExecutionResult) -> Self {
        match result.outcome {
            Outcome::Success => {
                let mut output = result.stdout.clone();
                if !result.stderr.is_empty() {
                    output.push_str(&result.stderr);
                }
                Self::ok(output)
            }
            Outcome::TimeoutFailure => Self::err("execution timed out"),
            Outcome::UnsupportedLanguage => Self::err("unsupported language"),
            Outcome::CompileFailure | Outcome::RuntimeFailure => {
                if result.stderr.is_empty() {
                    match result.exit_code {
                        Some(code) => Self::err(format!("process exited with code {code}")),
                        None => Self::err("process was terminated"),
                    }
                } else {
                    Self::err(result.stderr.clone())
                }
            }
        }
    }
}
