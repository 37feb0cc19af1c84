//! Bounded execution of the prover process.
//!
//! The runner is the timeout enforcer: the child runs in its own process
//! group, is SIGKILLed (group-wide) when the wall-clock bound expires, and
//! the kill is reported through the reserved exit code 124. Child-level
//! failure never surfaces as an error; everything the prover does ends up in
//! the returned [`ProcessOutcome`].

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::debug;

use crate::error::PipelineError;

/// Reserved exit code meaning the wall-clock timeout killed the child.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Immutable description of one prover invocation.
#[derive(Debug, Clone)]
pub struct InvocationSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Wall-clock bound enforced by the runner itself.
    pub timeout: Duration,
    /// Address-space ceiling applied to the child process.
    pub memory_limit_bytes: u64,
    /// How much of each captured stream is retained.
    pub capture_limit_bytes: u64,
}

/// What the child did: both streams and an exit code, always populated.
///
/// A timeout kill reports [`TIMEOUT_EXIT_CODE`]; death by signal reports
/// 128 plus the signal number.
#[derive(Debug, Clone)]
pub struct ProcessOutcome {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Run the command described by `spec` to completion, timeout, or crash.
///
/// Errs only when the binary cannot be spawned or waited on at all; by the
/// time this returns, no child or descendant of this invocation is alive.
pub async fn run(spec: &InvocationSpec) -> Result<ProcessOutcome, PipelineError> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    #[cfg(unix)]
    {
        cmd.process_group(0);
        apply_memory_limit(&mut cmd, spec.memory_limit_bytes);
    }

    let mut child = cmd.spawn().map_err(|source| PipelineError::Spawn {
        program: spec.program.clone(),
        source,
    })?;

    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();
    let cap = spec.capture_limit_bytes;
    let stdout_task = tokio::spawn(async move { read_capped(stdout_pipe, cap).await });
    let stderr_task = tokio::spawn(async move { read_capped(stderr_pipe, cap).await });

    let exit_code = match timeout(spec.timeout, child.wait()).await {
        Ok(Ok(status)) => exit_code_of(status),
        Ok(Err(source)) => return Err(PipelineError::Wait { source }),
        Err(_) => {
            debug!(timeout = ?spec.timeout, "wall-clock bound expired, killing process group");
            kill_group(&child);
            // kill() reaps the child after SIGKILL; the group signal above
            // already took any descendants with it.
            let _ = child.kill().await;
            TIMEOUT_EXIT_CODE
        }
    };

    let stdout = stdout_task.await.unwrap_or_default();
    let stderr = stderr_task.await.unwrap_or_default();

    Ok(ProcessOutcome {
        stdout,
        stderr,
        exit_code,
    })
}

fn exit_code_of(status: ExitStatus) -> i32 {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    status.code().unwrap_or(-1)
}

#[cfg(unix)]
fn kill_group(child: &Child) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    // The child was spawned with process_group(0), so its pid is the pgid.
    if let Some(pid) = child.id() {
        let _ = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL);
    }
}

#[cfg(not(unix))]
fn kill_group(_child: &Child) {}

#[cfg(unix)]
fn apply_memory_limit(cmd: &mut Command, bytes: u64) {
    // SAFETY: the closure runs between fork and exec in the child and only
    // calls setrlimit, which is async-signal-safe; it captures one Copy value.
    unsafe {
        cmd.pre_exec(move || {
            let limit = libc::rlimit {
                rlim_cur: bytes,
                rlim_max: bytes,
            };
            libc::setrlimit(libc::RLIMIT_AS, &limit);
            Ok(())
        });
    }
}

/// Read at most `limit` bytes from the pipe, then drain the rest so the
/// child never blocks on a full pipe buffer.
async fn read_capped<R>(pipe: Option<R>, limit: u64) -> String
where
    R: AsyncReadExt + Unpin,
{
    let Some(reader) = pipe else {
        return String::new();
    };
    let mut capped = reader.take(limit);
    let mut buf = Vec::new();
    let _ = capped.read_to_end(&mut buf).await;

    let mut rest = capped.into_inner();
    let mut sink = [0u8; 8192];
    loop {
        match rest.read(&mut sink).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}
