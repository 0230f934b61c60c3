//! Output normalization and outcome classification

use crate::sandbox::RawOutput;
use polyrun_common::{ExecutionResult, Outcome};

/// Decode captured bytes with a fixed encoding. Undecodable sequences
/// become U+FFFD; normalization itself never fails.
fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Classify a run-stage capture into an execution result.
///
/// Timeout dominates the exit code; a clean zero exit is the only success.
/// A child killed before exiting on its own (output overflow, caller
/// cancellation, signal death) has no exit code and classifies as a
/// runtime failure. stderr is carried verbatim so callers can pattern-match
/// language-specific diagnostics.
pub fn normalize(raw: RawOutput) -> ExecutionResult {
    let outcome = if raw.timed_out {
        Outcome::TimeoutFailure
    } else if raw.exit_code == Some(0) {
        Outcome::Success
    } else {
        Outcome::RuntimeFailure
    };
    ExecutionResult {
        outcome,
        stdout: decode(&raw.stdout),
        stderr: decode(&raw.stderr),
        exit_code: raw.exit_code,
        duration_millis: raw.duration.as_millis() as u64,
        truncated: raw.truncated,
    }
}

/// Classify a failed compile-stage capture. The compiler's diagnostic is
/// the result's stderr; the run invocation was never attempted.
pub fn compile_failure(raw: RawOutput) -> ExecutionResult {
    let outcome = if raw.timed_out {
        Outcome::TimeoutFailure
    } else {
        Outcome::CompileFailure
    };
    ExecutionResult {
        outcome,
        stdout: String::new(),
        stderr: decode(&raw.stderr),
        exit_code: raw.exit_code,
        duration_millis: raw.duration.as_millis() as u64,
        truncated: raw.truncated,
    }
}
