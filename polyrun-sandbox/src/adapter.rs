//! Runtime adapter contract

use crate::limits::ResourceLimits;
use async_trait::async_trait;
use polyrun_common::LanguageId;
use std::path::{Path, PathBuf};

/// A concrete, sandbox-ready process invocation.
#[derive(Debug, Clone)]
pub struct Invocation {
    /// Executable name or path; resolved against the child's PATH.
    pub program: String,

    pub args: Vec<String>,

    /// Working directory, always the per-request scratch directory.
    pub workdir: PathBuf,

    /// Language-specific environment entries. The sandbox clears the child
    /// environment and sets only these plus the configured allowlist.
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            workdir: workdir.into(),
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }
}

/// Translates source text into process invocations for one language.
///
/// Adapters never execute anything themselves - they only describe *how* to
/// execute. The process sandbox is the sole component that spawns children
/// and the sole place limits are enforced, so adding a language touches
/// neither sandboxing nor output capture.
#[async_trait]
pub trait RuntimeAdapter: Send + Sync {
    fn language(&self) -> LanguageId;

    /// Executable the registry probes at startup. A registered adapter
    /// whose interpreter is missing fails startup validation, never a
    /// first request.
    fn interpreter(&self) -> &str;

    /// Materialize `source` as a standalone runnable unit inside the
    /// scratch directory.
    async fn stage(&self, source: &str, scratch: &Path) -> std::io::Result<()>;

    /// Compile invocation for compiled languages; `None` for interpreted
    /// ones. A non-zero compile exit short-circuits the request and the
    /// run invocation is never attempted.
    fn compile(&self, _scratch: &Path) -> Option<Invocation> {
        None
    }

    /// The invocation that runs the staged unit.
    fn run(&self, scratch: &Path) -> Invocation;

    /// Per-language adjustment of the run-stage limits. Most adapters use
    /// the service defaults unchanged.
    fn run_limits(&self, base: &ResourceLimits) -> ResourceLimits {
        base.clone()
    }

    /// Per-language adjustment of the compile-stage limits.
    fn compile_limits(&self, base: &ResourceLimits) -> ResourceLimits {
        self.run_limits(base)
    }
}
