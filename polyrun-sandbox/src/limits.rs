//! Resource limits for sandboxed execution

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Resource bounds applied to every child process.
///
/// All numeric values are deployment-tunable; the presets below are the
/// shipped defaults, not a policy baked into the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceLimits {
    /// Wall-clock deadline used when a request does not carry its own.
    #[serde(with = "humantime_serde")]
    pub default_timeout: Duration,

    /// Upper bound any request-supplied timeout is clamped to.
    #[serde(with = "humantime_serde")]
    pub max_timeout: Duration,

    /// CPU-time ceiling (RLIMIT_CPU), rounded up to whole seconds.
    #[serde(with = "humantime_serde::option")]
    pub max_cpu_time: Option<Duration>,

    /// Address-space ceiling in bytes (RLIMIT_AS) where the platform
    /// supports it.
    pub max_memory_bytes: Option<u64>,

    /// Byte ceiling per captured stream; exceeding it terminates the child
    /// early and marks the result truncated.
    pub max_output_bytes: usize,

    /// Process/thread ceiling (RLIMIT_NPROC).
    pub max_processes: Option<u64>,

    /// Open file descriptor ceiling (RLIMIT_NOFILE).
    pub max_open_files: Option<u64>,

    /// Largest file the child may create (RLIMIT_FSIZE).
    pub max_file_size_bytes: Option<u64>,
}

impl Default for ResourceLimits {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(10),
            max_timeout: Duration::from_secs(60),
            max_cpu_time: Some(Duration::from_secs(10)),
            max_memory_bytes: Some(256 * 1024 * 1024), // 256 MiB
            max_output_bytes: 1024 * 1024,             // 1 MiB per stream
            // RLIMIT_NPROC counts the whole uid, not just the sandbox tree;
            // leave headroom for the host's own processes.
            max_processes: Some(512),
            max_open_files: Some(256),
            max_file_size_bytes: Some(8 * 1024 * 1024),
        }
    }
}

impl ResourceLimits {
    /// Tight bounds for completely untrusted, short-running snippets.
    pub fn strict() -> Self {
        Self {
            default_timeout: Duration::from_secs(2),
            max_timeout: Duration::from_secs(5),
            max_cpu_time: Some(Duration::from_secs(2)),
            max_memory_bytes: Some(64 * 1024 * 1024),
            max_output_bytes: 64 * 1024,
            max_processes: Some(16),
            max_open_files: Some(64),
            max_file_size_bytes: Some(1024 * 1024),
        }
    }

    /// Loose bounds for trusted batch workloads.
    pub fn permissive() -> Self {
        Self {
            default_timeout: Duration::from_secs(60),
            max_timeout: Duration::from_secs(300),
            max_cpu_time: Some(Duration::from_secs(120)),
            max_memory_bytes: None,
            max_output_bytes: 10 * 1024 * 1024,
            max_processes: Some(256),
            max_open_files: Some(1024),
            max_file_size_bytes: None,
        }
    }

    /// Deadline for one request: the requested bound clamped to
    /// `max_timeout`, or `default_timeout` when none was requested.
    pub fn effective_timeout(&self, requested: Option<Duration>) -> Duration {
        requested
            .unwrap_or(self.default_timeout)
            .min(self.max_timeout)
    }
}
