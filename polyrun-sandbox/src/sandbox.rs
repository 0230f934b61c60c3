//! Out-of-process execution with resource bounds and output capture
//!
//! One sandbox invocation owns exactly one child process. The child runs in
//! its own session/process group with a cleared environment and kernel
//! resource limits; stdout and stderr are pumped concurrently with the
//! child's execution so oversized output cannot deadlock the pipe and
//! partial output survives a timeout. Whatever path `run` returns through -
//! normal exit, deadline, cancellation, or output overflow - neither the
//! child nor any descendant it forked is left running.

use crate::adapter::Invocation;
use crate::limits::ResourceLimits;
use polyrun_common::{Result, SandboxError};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Raw output of one bounded child execution, before normalization.
#[derive(Debug)]
pub struct RawOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// `None` when the child was killed before exiting on its own.
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub truncated: bool,
    pub duration: Duration,
}

/// Launches adapter invocations as bounded child processes.
pub struct ProcessSandbox {
    /// Host environment variables forwarded to the child by name. Everything
    /// else is cleared before exec.
    inherit_env: Vec<String>,
    isolate_network: bool,
}

impl Default for ProcessSandbox {
    fn default() -> Self {
        Self {
            inherit_env: vec!["PATH".to_string()],
            isolate_network: true,
        }
    }
}

enum WaitEnd {
    Exited(std::process::ExitStatus),
    Deadline,
    Killed,
}

impl ProcessSandbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_inherit_env(mut self, names: Vec<String>) -> Self {
        self.inherit_env = names;
        self
    }

    pub fn with_network_isolation(mut self, enabled: bool) -> Self {
        self.isolate_network = enabled;
        self
    }

    /// Run one invocation to completion under `limits`, bounded by
    /// `timeout` and by `cancel`. Both termination paths SIGKILL the
    /// child's whole process group.
    pub async fn run(
        &self,
        invocation: &Invocation,
        stdin: Option<String>,
        timeout: Duration,
        cancel: &CancellationToken,
        limits: &ResourceLimits,
    ) -> Result<RawOutput> {
        let start = Instant::now();

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.workdir)
            .env_clear()
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        for name in &self.inherit_env {
            if let Ok(value) = std::env::var(name) {
                cmd.env(name, value);
            }
        }
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        harden(&mut cmd, limits, self.isolate_network);

        let mut child = cmd.spawn().map_err(SandboxError::Spawn)?;
        tracing::debug!(
            program = %invocation.program,
            pid = child.id(),
            "spawned sandboxed child"
        );

        if let (Some(payload), Some(mut handle)) = (stdin, child.stdin.take()) {
            tokio::spawn(async move {
                let _ = handle.write_all(payload.as_bytes()).await;
                let _ = handle.shutdown().await;
            });
        }

        let cap = limits.max_output_bytes;
        let (overflow_tx, mut overflow_rx) = mpsc::channel::<()>(2);
        let stdout_task = tokio::spawn(pump(child.stdout.take(), cap, overflow_tx.clone()));
        let stderr_task = tokio::spawn(pump(child.stderr.take(), cap, overflow_tx));

        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);
        let mut overflow_closed = false;

        let end = loop {
            tokio::select! {
                status = child.wait() => {
                    break WaitEnd::Exited(status.map_err(SandboxError::Wait)?);
                }
                _ = &mut deadline => break WaitEnd::Deadline,
                _ = cancel.cancelled() => break WaitEnd::Killed,
                seen = overflow_rx.recv(), if !overflow_closed => {
                    match seen {
                        Some(()) => break WaitEnd::Killed,
                        // Both pumps finished without overflow; keep waiting
                        // on the child itself.
                        None => overflow_closed = true,
                    }
                }
            }
        };

        let (status, timed_out) = match end {
            WaitEnd::Exited(status) => (Some(status), false),
            WaitEnd::Deadline => {
                kill_tree(&mut child);
                (child.wait().await.ok(), true)
            }
            WaitEnd::Killed => {
                kill_tree(&mut child);
                // A child that already exited keeps its real status; one we
                // killed reports signal death (no exit code).
                (child.wait().await.ok(), false)
            }
        };

        let (stdout, stdout_over) = stdout_task
            .await
            .map_err(|err| SandboxError::OutputCapture(err.to_string()))?;
        let (stderr, stderr_over) = stderr_task
            .await
            .map_err(|err| SandboxError::OutputCapture(err.to_string()))?;

        Ok(RawOutput {
            stdout,
            stderr,
            exit_code: status.and_then(|s| s.code()),
            timed_out,
            truncated: stdout_over || stderr_over,
            duration: start.elapsed(),
        })
    }
}

/// Read one child stream to EOF, keeping at most `cap` bytes. Signals
/// `overflow` and stops reading once the cap is exceeded; the supervisor
/// kills the child in response.
async fn pump<R>(stream: Option<R>, cap: usize, overflow: mpsc::Sender<()>) -> (Vec<u8>, bool)
where
    R: tokio::io::AsyncRead + Unpin + Send,
{
    let mut captured = Vec::new();
    let Some(mut stream) = stream else {
        return (captured, false);
    };
    let mut chunk = [0u8; 8192];
    loop {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let remaining = cap.saturating_sub(captured.len());
                let take = n.min(remaining);
                captured.extend_from_slice(&chunk[..take]);
                if take < n {
                    let _ = overflow.try_send(());
                    return (captured, true);
                }
            }
        }
    }
    (captured, false)
}

/// SIGKILL the child's whole process group, then the direct child as a
/// fallback. The group exists because `harden` calls setsid before exec.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        unsafe {
            libc::kill(-(pid as libc::pid_t), libc::SIGKILL);
        }
    }
    if let Err(err) = child.start_kill() {
        // InvalidInput means the child already exited; anything else is
        // worth a trace.
        if err.kind() != std::io::ErrorKind::InvalidInput {
            tracing::debug!(error = %err, "direct child kill failed");
        }
    }
}

/// Apply pre-exec hardening: own session/process group, parent-death
/// signal, optional network namespace, and kernel rlimits.
#[cfg(target_os = "linux")]
fn harden(cmd: &mut Command, limits: &ResourceLimits, isolate_network: bool) {
    let memory = limits.max_memory_bytes;
    let nproc = limits.max_processes;
    let nofile = limits.max_open_files;
    let fsize = limits.max_file_size_bytes;
    let cpu_secs = limits.max_cpu_time.map(|d| {
        let secs = d.as_secs() + u64::from(d.subsec_nanos() > 0);
        secs.max(1)
    });
    unsafe {
        cmd.pre_exec(move || {
            // Own session and process group so the supervisor can signal
            // every descendant at once.
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            // Die with the service instead of outliving it.
            libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGKILL as libc::c_ulong);
            if isolate_network {
                // Best effort: requires unprivileged user namespaces. A
                // deployment without them falls back to the env/rlimit
                // boundary.
                libc::unshare(libc::CLONE_NEWUSER | libc::CLONE_NEWNET);
            }
            if let Some(bytes) = memory {
                set_rlimit(libc::RLIMIT_AS as u32, bytes, bytes)?;
            }
            if let Some(n) = nproc {
                set_rlimit(libc::RLIMIT_NPROC as u32, n, n)?;
            }
            if let Some(n) = nofile {
                set_rlimit(libc::RLIMIT_NOFILE as u32, n, n)?;
            }
            if let Some(bytes) = fsize {
                set_rlimit(libc::RLIMIT_FSIZE as u32, bytes, bytes)?;
            }
            if let Some(secs) = cpu_secs {
                // soft -> SIGXCPU, hard -> SIGKILL one second later.
                set_rlimit(libc::RLIMIT_CPU as u32, secs, secs + 1)?;
            }
            set_rlimit(libc::RLIMIT_CORE as u32, 0, 0)?;
            Ok(())
        });
    }
}

#[cfg(all(unix, not(target_os = "linux")))]
fn harden(cmd: &mut Command, _limits: &ResourceLimits, _isolate_network: bool) {
    unsafe {
        cmd.pre_exec(|| {
            if libc::setsid() == -1 {
                return Err(std::io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(unix))]
fn harden(_cmd: &mut Command, _limits: &ResourceLimits, _isolate_network: bool) {}

#[cfg(target_os = "linux")]
fn set_rlimit(resource: u32, soft: u64, hard: u64) -> std::io::Result<()> {
    let limit = libc::rlimit {
        rlim_cur: soft as libc::rlim_t,
        rlim_max: hard as libc::rlim_t,
    };
    if unsafe { libc::setrlimit(resource as _, &limit) } != 0 {
        return Err(std::io::Error::last_os_error());
    }
    Ok(())
}
