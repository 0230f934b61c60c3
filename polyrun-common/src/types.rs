//! Core types for execution requests and results

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Identifier of a supported language runtime.
///
/// Unknown identifier strings are rejected at the request boundary; a
/// `LanguageId` that parses may still be unregistered on a given
/// deployment, in which case the dispatcher reports
/// [`Outcome::UnsupportedLanguage`] without spawning anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    Python,
    JavaScript,
    Java,
}

impl LanguageId {
    /// All identifiers the data model knows about.
    pub fn all() -> &'static [LanguageId] {
        &[LanguageId::Python, LanguageId::JavaScript, LanguageId::Java]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageId::Python => "python",
            LanguageId::JavaScript => "javascript",
            LanguageId::Java => "java",
        }
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an identifier string names no known language.
#[derive(Debug, Clone, Error)]
#[error("unknown language identifier: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for LanguageId {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "python3" | "py" => Ok(LanguageId::Python),
            "javascript" | "js" | "node" => Ok(LanguageId::JavaScript),
            "java" => Ok(LanguageId::Java),
            other => Err(UnknownLanguage(other.to_string())),
        }
    }
}

/// Request to execute a snippet of untrusted source code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Target language runtime.
    pub language: LanguageId,

    /// The source text to run. Must be non-empty.
    pub source: String,

    /// Optional wall-clock bound; clamped to the service maximum.
    #[serde(default, with = "humantime_serde::option")]
    pub timeout: Option<Duration>,

    /// Ordered lines fed to the child's stdin.
    #[serde(default)]
    pub inputs: Vec<String>,
}

impl ExecutionRequest {
    pub fn new(language: LanguageId, source: impl Into<String>) -> Self {
        Self {
            language,
            source: source.into(),
            timeout: None,
            inputs: Vec::new(),
        }
    }

    /// Set the wall-clock bound for this request.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Append one stdin line.
    pub fn with_input(mut self, line: impl Into<String>) -> Self {
        self.inputs.push(line.into());
        self
    }

    /// Replace the stdin line sequence.
    pub fn with_inputs(mut self, inputs: Vec<String>) -> Self {
        self.inputs = inputs;
        self
    }

    /// The stdin payload the child receives: one line per input, each
    /// newline-terminated. `None` when no inputs were supplied.
    pub fn stdin_payload(&self) -> Option<String> {
        if self.inputs.is_empty() {
            return None;
        }
        let mut payload = String::new();
        for line in &self.inputs {
            payload.push_str(line);
            payload.push('\n');
        }
        Some(payload)
    }
}

/// Classified result variant of one execution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Process ran and exited zero.
    Success,
    /// Compile step of a compiled-language adapter failed; nothing ran.
    CompileFailure,
    /// Process ran and exited non-zero (or died on a signal).
    RuntimeFailure,
    /// Wall-clock bound exceeded; process force-terminated.
    TimeoutFailure,
    /// Requested language has no registered adapter; nothing was spawned.
    UnsupportedLanguage,
}

/// Result of one execution attempt.
///
/// `stdout` and `stderr` are always present, possibly empty, even on
/// timeout (best-effort partial capture). Exactly one [`Outcome`] is set;
/// `truncated` composes with any outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub outcome: Outcome,
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed before exiting on its own.
    pub exit_code: Option<i32>,
    pub duration_millis: u64,
    /// Output was cut off at the configured byte ceiling.
    #[serde(default)]
    pub truncated: bool,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    /// Result reported for a language with no registered adapter.
    pub fn unsupported(language: LanguageId) -> Self {
        Self {
            outcome: Outcome::UnsupportedLanguage,
            stdout: String::new(),
            stderr: format!("unsupported language: {language}"),
            exit_code: None,
            duration_millis: 0,
            truncated: false,
        }
    }
}

/// Unique execution identifier, used for log correlation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionId(pub uuid::Uuid);

impl ExecutionId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ExecutionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
