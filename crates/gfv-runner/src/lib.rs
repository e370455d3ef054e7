// SPDX-License-Identifier: MIT OR Apache-2.0
//! gfv-runner
#![deny(unsafe_code)]
#![warn(missing_docs)]
//!
//! Runs one [`InvocationPlan`] to completion and captures its streams.
//!
//! stdin is fed and stdout/stderr are drained on separate tasks while the
//! runner waits for exit, a timeout, or cancellation, so a tool that fills a
//! pipe before reading its input cannot deadlock the invocation. Whatever
//! path the invocation takes, the child (and on POSIX its whole process
//! group) is killed if still alive and reaped before [`ProcessRunner::run`]
//! returns.

pub mod cancel;
mod guard;
mod pipes;

pub use cancel::CancelToken;

use chrono::Utc;
use gfv_core::{InvocationPlan, RunResult, RunStatus};
use guard::ChildGuard;
use pipes::Drain;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

/// How long output readers may keep going after the child has exited.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// Executes invocation plans. Holds no per-invocation state, so one runner
/// can serve any number of concurrent invocations.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    drain_grace: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner {
    /// Runner with [`DEFAULT_DRAIN_GRACE`].
    pub fn new() -> Self {
        Self {
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }

    /// Override the post-exit drain grace period.
    pub fn with_drain_grace(mut self, grace: Duration) -> Self {
        self.drain_grace = grace;
        self
    }

    /// Run `plan`, writing `input` to stdin, and wait at most `timeout`
    /// (`None` waits indefinitely).
    pub async fn run(
        &self,
        plan: &InvocationPlan,
        input: &[u8],
        timeout: Option<Duration>,
    ) -> RunResult {
        self.run_with_cancel(plan, input, timeout, &CancelToken::new())
            .await
    }

    /// Like [`run`](Self::run), but also stops with
    /// [`RunStatus::Killed`] once `cancel` fires.
    pub async fn run_with_cancel(
        &self,
        plan: &InvocationPlan,
        input: &[u8],
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> RunResult {
        let invocation_id = Uuid::new_v4();
        let span = info_span!(
            target: "gfv.runner",
            "invocation",
            id = %invocation_id,
            program = %plan.program
        );
        self.execute(invocation_id, plan, input, timeout, cancel)
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        invocation_id: Uuid,
        plan: &InvocationPlan,
        input: &[u8],
        timeout: Option<Duration>,
        cancel: &CancelToken,
    ) -> RunResult {
        let started_at = Utc::now();
        let start = Instant::now();

        debug!(target: "gfv.runner", command = %plan.display_command(), ?timeout, "spawning");
        let child = match build_command(plan).spawn() {
            Ok(child) => child,
            Err(e) => {
                let reason = describe_spawn_error(&plan.program, &e);
                warn!(target: "gfv.runner", %reason, "launch failed");
                return RunResult::launch_failed(invocation_id, reason);
            }
        };

        let mut guard = ChildGuard::new(child, plan.new_process_group);
        let pid = guard.pid();

        let stdout = guard.take_stdout().map(|s| Drain::spawn(s, "stdout"));
        let stderr = guard.take_stderr().map(|s| Drain::spawn(s, "stderr"));
        let mut feed = match guard.take_stdin() {
            Some(stdin) => tokio::spawn(pipes::feed(stdin, input.to_vec())),
            None => {
                if !input.is_empty() {
                    debug!(target: "gfv.runner", bytes = input.len(), "stdin not piped; payload dropped");
                }
                tokio::spawn(async { Ok::<(), std::io::Error>(()) })
            }
        };
        let mut feed_done = false;

        let deadline = async {
            match timeout {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(deadline);

        let mut status = loop {
            tokio::select! {
                res = guard.wait() => break match res {
                    Ok(st) => exit_to_status(st),
                    Err(e) => RunStatus::IoFailed(format!("failed to wait for child: {e}")),
                },
                res = &mut feed, if !feed_done => {
                    feed_done = true;
                    match res {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => break RunStatus::IoFailed(format!("failed to write stdin: {e}")),
                        Err(join) => break RunStatus::IoFailed(format!("stdin writer failed: {join}")),
                    }
                }
                () = &mut deadline => break RunStatus::TimedOut,
                () = cancel.cancelled() => break RunStatus::Killed,
            }
        };

        guard.terminate().await;
        if !feed_done {
            feed.abort();
        }

        let ((stdout, out_err), (stderr, err_err)) = tokio::join!(
            finish_drain(stdout, self.drain_grace),
            finish_drain(stderr, self.drain_grace),
        );
        if let (true, Some(reason)) = (status.ran_to_completion(), out_err.or(err_err)) {
            status = RunStatus::IoFailed(reason);
        }

        let elapsed = start.elapsed();
        info!(
            target: "gfv.runner",
            %status,
            ?pid,
            elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            "invocation finished"
        );

        RunResult {
            invocation_id,
            pid,
            status,
            stdout,
            stderr,
            started_at,
            elapsed,
        }
    }
}

async fn finish_drain(drain: Option<Drain>, grace: Duration) -> (Vec<u8>, Option<String>) {
    match drain {
        Some(d) => d.finish(grace).await,
        None => (Vec::new(), None),
    }
}

/// Run `plan` with a default [`ProcessRunner`].
pub async fn run(plan: &InvocationPlan, input: &[u8], timeout: Option<Duration>) -> RunResult {
    ProcessRunner::new().run(plan, input, timeout).await
}

fn build_command(plan: &InvocationPlan) -> Command {
    let mut cmd = Command::new(&plan.program);

    #[cfg(windows)]
    {
        if plan.verbatim_args {
            for a in &plan.args {
                cmd.raw_arg(a);
            }
        } else {
            cmd.args(&plan.args);
        }
        cmd.creation_flags(plan.creation_flags);
    }
    #[cfg(not(windows))]
    {
        cmd.args(&plan.args);
    }

    #[cfg(unix)]
    {
        if plan.new_process_group {
            cmd.process_group(0);
        }
    }

    if let Some(cwd) = &plan.cwd {
        cmd.current_dir(cwd);
    }
    cmd.env_clear().envs(&plan.env);

    cmd.stdin(if plan.pipe_stdin {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);
    cmd
}

fn exit_to_status(status: ExitStatus) -> RunStatus {
    if let Some(code) = status.code() {
        return RunStatus::from_code(code);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        debug!(target: "gfv.runner", signal = ?status.signal(), "child terminated by signal");
    }
    RunStatus::Killed
}

fn describe_spawn_error(program: &str, e: &std::io::Error) -> String {
    match e.kind() {
        std::io::ErrorKind::NotFound => format!("command not found: {program}"),
        std::io::ErrorKind::PermissionDenied => format!("permission denied: {program}"),
        _ => format!("failed to spawn {program}: {e}"),
    }
}
