//! Single synchronous entry point per execution request

use crate::limits::ResourceLimits;
use crate::normalize;
use crate::registry::AdapterRegistry;
use crate::sandbox::ProcessSandbox;
use polyrun_common::{
    ExecutionId, ExecutionRequest, ExecutionResult, LanguageId, Result, SandboxError,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Routes a request to its runtime adapter and mediates every execution
/// through the process sandbox.
///
/// Stateless across calls: concurrent requests share only the read-only
/// adapter registry and the bounded slot pool. One caller's stuck code
/// never delays another's beyond waiting for a free slot.
pub struct Dispatcher {
    registry: Arc<AdapterRegistry>,
    sandbox: ProcessSandbox,
    limits: ResourceLimits,
    slots: Arc<Semaphore>,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<AdapterRegistry>,
        sandbox: ProcessSandbox,
        limits: ResourceLimits,
        max_concurrency: usize,
    ) -> Self {
        Self {
            registry,
            sandbox,
            limits,
            slots: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    /// Registered language identifiers.
    pub fn languages(&self) -> Vec<LanguageId> {
        self.registry.languages()
    }

    pub async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionResult> {
        self.execute_with_cancel(request, CancellationToken::new())
            .await
    }

    /// Execute one request; cancelling `cancel` terminates the in-flight
    /// child through the same kill path as the deadline.
    pub async fn execute_with_cancel(
        &self,
        request: ExecutionRequest,
        cancel: CancellationToken,
    ) -> Result<ExecutionResult> {
        if request.source.trim().is_empty() {
            return Err(SandboxError::InvalidRequest(
                "source must not be empty".to_string(),
            ));
        }

        let id = ExecutionId::new();

        // Unregistered language: report immediately, no scratch directory,
        // no child process, no slot consumed.
        let Some(adapter) = self.registry.get(request.language) else {
            tracing::debug!(execution_id = %id, language = %request.language, "unsupported language");
            return Ok(ExecutionResult::unsupported(request.language));
        };

        let _permit = self
            .slots
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| SandboxError::SlotsClosed)?;

        let scratch = tempfile::Builder::new()
            .prefix("polyrun-")
            .tempdir()
            .map_err(SandboxError::Scratch)?;
        adapter
            .stage(&request.source, scratch.path())
            .await
            .map_err(SandboxError::Stage)?;

        let timeout = self.limits.effective_timeout(request.timeout);
        tracing::info!(
            execution_id = %id,
            language = %request.language,
            source_len = request.source.len(),
            timeout_ms = timeout.as_millis() as u64,
            "executing request"
        );

        let started = Instant::now();

        // Compile stage for compiled languages; a non-zero exit
        // short-circuits and the run invocation is never attempted.
        if let Some(compile) = adapter.compile(scratch.path()) {
            let compile_limits = adapter.compile_limits(&self.limits);
            let raw = self
                .sandbox
                .run(&compile, None, timeout, &cancel, &compile_limits)
                .await?;
            if raw.timed_out || raw.exit_code != Some(0) {
                let mut result = normalize::compile_failure(raw);
                result.duration_millis = started.elapsed().as_millis() as u64;
                tracing::info!(
                    execution_id = %id,
                    outcome = ?result.outcome,
                    duration_ms = result.duration_millis,
                    "compile stage failed"
                );
                return Ok(result);
            }
        }

        let run_limits = adapter.run_limits(&self.limits);
        let raw = self
            .sandbox
            .run(
                &adapter.run(scratch.path()),
                request.stdin_payload(),
                timeout,
                &cancel,
                &run_limits,
            )
            .await?;

        let mut result = normalize::normalize(raw);
        result.duration_millis = started.elapsed().as_millis() as u64;
        tracing::info!(
            execution_id = %id,
            outcome = ?result.outcome,
            exit_code = ?result.exit_code,
            duration_ms = result.duration_millis,
            truncated = result.truncated,
            "execution finished"
        );
        Ok(result)
        // scratch drops here: the directory is removed on every path.
    }
}
